use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::Result;

/// What the provider answered. The body is kept for logging only.
#[derive(Debug, Clone)]
pub struct ModifyOutcome {
    pub status: StatusCode,
    pub body: String,
    /// The body hit the read limit and was cut.
    pub truncated: bool,
}

#[async_trait]
pub trait RecordUpdater: Send + Sync {
    /// Point the managed record at the address the request arrives from.
    async fn update_record(&self) -> Result<ModifyOutcome>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
