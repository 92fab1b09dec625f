//! Chat assistant
//!
//! ```text
//! ResponseProvider ── MockProvider   (keyword table, mock = true)
//!                  └─ OpenAiProvider (chat completions, quota → signal)
//! Assistant        ── deadline + canned fallback over a provider
//! handler          ── /api/chat, /api/test-openai
//! ```

pub mod engine;
pub mod handler;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod replies;

pub use engine::{Assistant, ChatOutcome, DiagnosticReport, ProbeStatus};
pub use handler::{assistant_router, AssistantState};
pub use mock::MockProvider;
pub use openai::OpenAiProvider;
pub use provider::{AiResponse, ProviderMode, QuotaSignal, Reply, ResponseProvider};
pub use replies::{ReplyRule, ReplyTable};
