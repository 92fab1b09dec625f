//! Assistant engine: provider call with deadline and canned fallback
//!
//! ```text
//! ws session ─┐
//!             ├─> Assistant::respond ─> ResponseProvider (mock | openai)
//! /api/chat ──┘          └── fallback ReplyTable on error / timeout
//! ```

use crate::assistant::mock::MockProvider;
use crate::assistant::openai::OpenAiProvider;
use crate::assistant::provider::{
    is_quota_error, AiResponse, ProviderMode, QuotaSignal, ResponseProvider,
};
use crate::assistant::replies::ReplyTable;
use crate::config::AssistantConfig;
use crate::error::{Error, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of one chat turn as seen by a client
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    /// Reply text (from the provider or the fallback table)
    Reply(String),
    /// Quota refusal to forward verbatim
    Quota(QuotaSignal),
}

/// Provider state reported by `/health`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Mock,
    NoKey,
    Quota,
    Live,
    Error(String),
}

impl ProbeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::NoKey => "no_key",
            Self::Quota => "quota",
            Self::Live => "live",
            Self::Error(_) => "error",
        }
    }
}

/// Result of the provider latency diagnostic
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiagnosticReport {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl DiagnosticReport {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Chat front-end shared by the WebSocket session and the HTTP fallback
pub struct Assistant {
    provider: Arc<dyn ResponseProvider>,
    fallback: ReplyTable,
    timeout: Duration,
    slow_threshold: Duration,
}

impl Assistant {
    pub fn new(
        provider: Arc<dyn ResponseProvider>,
        fallback: ReplyTable,
        timeout: Duration,
        slow_threshold: Duration,
    ) -> Self {
        Self {
            provider,
            fallback,
            timeout,
            slow_threshold,
        }
    }

    /// Select the provider from configuration (`use_openai` flag).
    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        let provider: Arc<dyn ResponseProvider> = if config.use_openai {
            let key = config.resolve_api_key();
            if key.is_none() {
                tracing::warn!(
                    env = %config.api_key_env,
                    "Live provider selected but API key is missing; replies will use fallback"
                );
            }
            Arc::new(OpenAiProvider::new(config, key)?)
        } else {
            Arc::new(MockProvider::new(config.mock_replies.clone()))
        };

        tracing::info!(mode = %provider.mode(), model = %provider.model(), "Assistant ready");

        Ok(Self::new(
            provider,
            config.fallback_replies.clone(),
            config.timeout(),
            Duration::from_millis(config.slow_threshold_ms),
        ))
    }

    pub fn mode(&self) -> ProviderMode {
        self.provider.mode()
    }

    /// Whether the live provider is selected (with or without a key)
    pub fn live_selected(&self) -> bool {
        self.mode() != ProviderMode::Mock
    }

    /// Call the provider with the configured deadline.
    pub async fn ask(&self, text: &str) -> Result<AiResponse> {
        match tokio::time::timeout(self.timeout, self.provider.get_reply(text)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    /// Answer one chat message. Provider failures fall back to canned replies.
    pub async fn respond(&self, text: &str) -> ChatOutcome {
        match self.ask(text).await {
            Ok(AiResponse::Reply(reply)) => ChatOutcome::Reply(reply.text),
            Ok(AiResponse::Quota(signal)) => ChatOutcome::Quota(signal),
            Err(e) => {
                tracing::warn!(error = %e, "Assistant fallback");
                ChatOutcome::Reply(self.fallback_reply(text))
            }
        }
    }

    /// Deterministic canned reply for `text`
    pub fn fallback_reply(&self, text: &str) -> String {
        self.fallback.lookup(text)
    }

    /// Live probe for health reporting
    pub async fn probe(&self) -> ProbeStatus {
        match self.mode() {
            ProviderMode::Mock => ProbeStatus::Mock,
            ProviderMode::NoKey => ProbeStatus::NoKey,
            ProviderMode::Live => match self.ask("test").await {
                Ok(AiResponse::Quota(_)) => ProbeStatus::Quota,
                Ok(AiResponse::Reply(_)) => ProbeStatus::Live,
                Err(e) => ProbeStatus::Error(e.to_string().chars().take(100).collect()),
            },
        }
    }

    /// Measure one provider round trip against the slow threshold.
    pub async fn diagnose(&self) -> DiagnosticReport {
        match self.mode() {
            ProviderMode::Mock => {
                return DiagnosticReport {
                    mode: Some("mock".to_string()),
                    ..DiagnosticReport::failed("OpenAI disabilitato")
                }
            }
            ProviderMode::NoKey => {
                return DiagnosticReport {
                    mode: Some("mock".to_string()),
                    ..DiagnosticReport::failed("API key mancante")
                }
            }
            ProviderMode::Live => {}
        }

        let started = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.provider.quick_check()).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.timeout.as_millis() as u64)),
        };
        let elapsed = started.elapsed().as_millis() as u64;

        match result {
            Ok(()) if elapsed > self.slow_threshold.as_millis() as u64 => {
                tracing::warn!(elapsed_ms = elapsed, "Provider diagnostic slow");
                DiagnosticReport {
                    response_time: Some(elapsed),
                    ..DiagnosticReport::failed(format!("Troppo lento ({}ms)", elapsed))
                }
            }
            Ok(()) => {
                tracing::info!(elapsed_ms = elapsed, "Provider diagnostic ok");
                DiagnosticReport {
                    ok: true,
                    response_time: Some(elapsed),
                    model: Some(self.provider.model().to_string()),
                    ..Default::default()
                }
            }
            Err(e) => {
                let details = e.to_string();
                tracing::warn!(error = %details, "Provider diagnostic failed");
                DiagnosticReport {
                    details: Some(details.clone()),
                    ..DiagnosticReport::failed(classify_failure(&details))
                }
            }
        }
    }
}

/// User-facing label for a diagnostic failure
fn classify_failure(details: &str) -> &'static str {
    let lowered = details.to_lowercase();
    if is_quota_error(details) || lowered.contains("quota") || lowered.contains("rate_limit") {
        "Quota esaurita"
    } else if lowered.contains("invalid") {
        "API key invalida"
    } else {
        "Errore generico"
    }
}
