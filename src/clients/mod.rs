//! Outbound HTTP clients for the weather and clock providers.

mod clock;
pub mod payload;
mod weather;

use std::time::Duration;

pub use clock::{ClockProvider, WorldTimeClient};
pub use payload::CurrentWeather;
pub use weather::{OpenWeatherClient, WeatherProvider};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("parse error: {0}")]
    Parse(String),
}

/// Builds the HTTP client shared by both providers.
pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client, ClientError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// GETs `request` and returns the body text of a 2xx response.
async fn fetch_text(request: reqwest::RequestBuilder) -> Result<String, ClientError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status {
            url: response.url().to_string(),
            status,
        });
    }
    Ok(response.text().await?)
}
