//! Mock response provider
//!
//! Answers from a keyword table without any network access.

use crate::assistant::provider::{AiResponse, ProviderMode, ResponseProvider};
use crate::assistant::replies::ReplyTable;
use crate::error::Result;
use async_trait::async_trait;

/// Deterministic keyword-table provider
pub struct MockProvider {
    replies: ReplyTable,
}

impl MockProvider {
    pub fn new(replies: ReplyTable) -> Self {
        Self { replies }
    }
}

#[async_trait]
impl ResponseProvider for MockProvider {
    fn mode(&self) -> ProviderMode {
        ProviderMode::Mock
    }

    fn model(&self) -> &str {
        "mock"
    }

    async fn get_reply(&self, text: &str) -> Result<AiResponse> {
        tracing::debug!(input = %text, "Mock reply");
        Ok(AiResponse::reply(self.replies.lookup(text), true))
    }

    async fn quick_check(&self) -> Result<()> {
        Ok(())
    }
}
