//! Expired token cleanup background job.

use tracing::info;

use crate::services::TokenService;

use super::scheduler::{Job, JobFrequency};

pub struct TokenCleanupJob {
    tokens: TokenService,
    every_minutes: u64,
}

impl TokenCleanupJob {
    pub fn new(tokens: TokenService, every_minutes: u64) -> Self {
        Self {
            tokens,
            every_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for TokenCleanupJob {
    fn name(&self) -> &'static str {
        "token_cleanup"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.every_minutes)
    }

    async fn execute(&self) -> Result<(), String> {
        let deleted = self
            .tokens
            .purge_expired()
            .await
            .map_err(|e| format!("Failed to purge expired tokens: {}", e))?;

        info!(deleted, "Purged expired tokens");
        Ok(())
    }
}
