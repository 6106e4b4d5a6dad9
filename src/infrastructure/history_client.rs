// HTTP history client - Fetches the initial sample batch from the history endpoint
use crate::application::history_source::HistorySource;
use crate::domain::sample::Sample;
use anyhow::{Context, Result};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct HttpHistoryClient {
    url: String,
    client: reqwest::Client,
}

impl HttpHistoryClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl HistorySource for HttpHistoryClient {
    async fn fetch_history(&self) -> Result<Vec<Sample>> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send history request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("History request failed with status {}: {}", status, body);
        }

        // An empty table is served as `null` rather than `[]`.
        let samples = response
            .json::<Option<Vec<Sample>>>()
            .await
            .context("Failed to parse history response")?
            .unwrap_or_default();

        tracing::debug!("Fetched {} history samples from {}", samples.len(), self.url);
        Ok(samples)
    }
}
