//! OpenAI-compatible completion provider
//!
//! Sends one system + user message pair to `{base_url}/v1/chat/completions`
//! and returns the first choice. Quota and rate-limit refusals become
//! [`AiResponse::Quota`]; everything else is an error.

use crate::assistant::provider::{
    is_quota_error, AiResponse, ProviderMode, QuotaSignal, ResponseProvider,
};
use crate::config::AssistantConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

const QUICK_CHECK_PROMPT: &str = "Test rapido, rispondi solo 'OK'";

/// Live completion provider
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
    system_prompt: String,
    max_tokens: u32,
    temperature: f32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

impl OpenAiProvider {
    /// Build a provider from configuration and an optional resolved key
    pub fn new(config: &AssistantConfig, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        let base_url = config.base_url.trim().trim_end_matches('/');

        Ok(Self {
            client,
            api_key,
            api_url: format!("{}/v1/chat/completions", base_url),
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            presence_penalty: config.presence_penalty,
            frequency_penalty: config.frequency_penalty,
        })
    }

    fn key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::Provider("API key mancante".to_string()))
    }

    /// POST a completion body and return the first choice's content.
    async fn complete(&self, body: Value) -> Result<String> {
        let key = self.key()?;
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            let preview = String::from_utf8_lossy(&bytes[..bytes.len().min(500)]);
            return Err(Error::Provider(format!(
                "status {}: {}",
                status.as_u16(),
                preview
            )));
        }

        let payload: Value = serde_json::from_slice(&bytes)?;
        payload
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| Error::Provider("completion payload has no message content".to_string()))
    }
}

#[async_trait]
impl ResponseProvider for OpenAiProvider {
    fn mode(&self) -> ProviderMode {
        if self.api_key.is_some() {
            ProviderMode::Live
        } else {
            ProviderMode::NoKey
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn get_reply(&self, text: &str) -> Result<AiResponse> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": self.system_prompt},
                {"role": "user", "content": text},
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "presence_penalty": self.presence_penalty,
            "frequency_penalty": self.frequency_penalty,
        });

        match self.complete(body).await {
            Ok(reply) => Ok(AiResponse::reply(reply, false)),
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(error = %message, "Completion provider error");
                if is_quota_error(&message) {
                    Ok(AiResponse::Quota(QuotaSignal::exhausted()))
                } else {
                    Err(e)
                }
            }
        }
    }

    async fn quick_check(&self) -> Result<()> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": QUICK_CHECK_PROMPT}],
            "max_tokens": 10,
            "temperature": 0,
        });
        self.complete(body).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use std::net::SocketAddr;

    /// Serve a fixed completion response on an ephemeral port.
    async fn spawn_completion_server(status: StatusCode, body: Value) -> SocketAddr {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(_req): Json<Value>| {
                let body = body.clone();
                async move { (status, Json(body)) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn provider_for(addr: SocketAddr, key: Option<&str>) -> OpenAiProvider {
        let config = AssistantConfig {
            base_url: format!("http://{}/", addr),
            ..Default::default()
        };
        OpenAiProvider::new(&config, key.map(str::to_string)).unwrap()
    }

    #[test]
    fn test_mode_depends_on_key() {
        let config = AssistantConfig::default();
        let without = OpenAiProvider::new(&config, None).unwrap();
        let with = OpenAiProvider::new(&config, Some("sk-test".to_string())).unwrap();
        assert_eq!(without.mode(), ProviderMode::NoKey);
        assert_eq!(with.mode(), ProviderMode::Live);
        assert_eq!(with.model(), "gpt-3.5-turbo");
    }

    #[test]
    fn test_api_url_strips_trailing_slash() {
        let config = AssistantConfig {
            base_url: "https://llm.example.com/ ".to_string(),
            ..Default::default()
        };
        let provider = OpenAiProvider::new(&config, None).unwrap();
        assert_eq!(provider.api_url, "https://llm.example.com/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_missing_key_is_error() {
        let provider = OpenAiProvider::new(&AssistantConfig::default(), None).unwrap();
        let err = provider.get_reply("ciao").await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn test_successful_completion_is_trimmed() {
        let addr = spawn_completion_server(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": "  Ciao viaggiatore! \n"}}]}),
        )
        .await;
        let provider = provider_for(addr, Some("sk-test"));

        let response = provider.get_reply("ciao").await.unwrap();
        assert_eq!(response, AiResponse::reply("Ciao viaggiatore!", false));
    }

    #[tokio::test]
    async fn test_rate_limit_becomes_quota_signal() {
        let addr = spawn_completion_server(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"code": "insufficient_quota", "message": "You exceeded your quota"}}),
        )
        .await;
        let provider = provider_for(addr, Some("sk-test"));

        let response = provider.get_reply("ciao").await.unwrap();
        assert_eq!(response, AiResponse::Quota(QuotaSignal::exhausted()));
    }

    #[tokio::test]
    async fn test_server_error_propagates() {
        let addr = spawn_completion_server(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": {"message": "boom"}}),
        )
        .await;
        let provider = provider_for(addr, Some("sk-test"));

        let err = provider.get_reply("ciao").await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_error() {
        let addr = spawn_completion_server(StatusCode::OK, json!({"choices": []})).await;
        let provider = provider_for(addr, Some("sk-test"));

        assert!(provider.get_reply("ciao").await.is_err());
        assert!(provider.quick_check().await.is_err());
    }
}
