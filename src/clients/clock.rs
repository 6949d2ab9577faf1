use async_trait::async_trait;
use time::Date;
use tracing::error;

use super::{fetch_text, payload, ClientError};
use crate::config::ClockConfig;

/// Source of the authoritative current date.
#[async_trait]
pub trait ClockProvider: Send + Sync {
    async fn today(&self) -> Result<Date, ClientError>;
}

#[derive(Clone)]
pub struct WorldTimeClient {
    http: reqwest::Client,
    config: ClockConfig,
}

impl WorldTimeClient {
    pub fn new(http: reqwest::Client, config: ClockConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl ClockProvider for WorldTimeClient {
    async fn today(&self) -> Result<Date, ClientError> {
        let body = fetch_text(self.http.get(&self.config.api_url))
            .await
            .map_err(|e| {
                error!(error = %e, url = %self.config.api_url, "clock api call failed");
                e
            })?;
        payload::parse_current_date(&body)
    }
}
