// History source trait - One-shot fetch of the initial sample batch
use crate::domain::sample::Sample;
use async_trait::async_trait;

#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch recent samples, newest first.
    async fn fetch_history(&self) -> anyhow::Result<Vec<Sample>>;
}
