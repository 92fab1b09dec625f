//! Response provider abstraction
//!
//! A provider turns user text into an [`AiResponse`]. Quota exhaustion is a
//! value (`AiResponse::Quota`) because the client is expected to see it;
//! every other failure is an `Err` the caller masks with a canned reply.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// UI text shown when the provider refuses service for usage limits
pub const QUOTA_UI_MESSAGE: &str = "Credito API esaurito. Modalità demo attiva.";

/// Provider operating mode, as reported by health and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderMode {
    /// Deterministic keyword replies
    Mock,
    /// Live provider selected but no credential available
    NoKey,
    /// Live provider with a credential
    Live,
}

impl std::fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mock => write!(f, "mock"),
            Self::NoKey => write!(f, "no_key"),
            Self::Live => write!(f, "live"),
        }
    }
}

/// Successful reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub mock: bool,
}

/// Rate/quota refusal, forwarded verbatim to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaSignal {
    pub error: bool,
    pub code: u16,
    pub ui: String,
}

impl QuotaSignal {
    pub fn exhausted() -> Self {
        Self {
            error: true,
            code: 429,
            ui: QUOTA_UI_MESSAGE.to_string(),
        }
    }
}

/// Provider result: a reply or a quota signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AiResponse {
    Quota(QuotaSignal),
    Reply(Reply),
}

impl AiResponse {
    pub fn reply(text: impl Into<String>, mock: bool) -> Self {
        Self::Reply(Reply {
            text: text.into(),
            mock,
        })
    }
}

/// Produces assistant replies for user text
#[async_trait]
pub trait ResponseProvider: Send + Sync {
    /// Current operating mode
    fn mode(&self) -> ProviderMode;

    /// Model identifier reported by diagnostics
    fn model(&self) -> &str;

    /// Reply to `text`, or signal quota exhaustion.
    async fn get_reply(&self, text: &str) -> Result<AiResponse>;

    /// Minimal round trip used by the latency diagnostic
    async fn quick_check(&self) -> Result<()>;
}

/// Whether a provider error message carries a rate-limit/quota signature
pub fn is_quota_error(message: &str) -> bool {
    message.contains("429") || message.contains("insufficient_quota")
}
