use async_trait::async_trait;
use tracing::{debug, error};

use super::{fetch_text, payload, ClientError, CurrentWeather};
use crate::config::WeatherConfig;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self) -> Result<CurrentWeather, ClientError>;
}

/// OpenWeatherMap "current weather" endpoint for a single configured city.
#[derive(Clone)]
pub struct OpenWeatherClient {
    http: reqwest::Client,
    config: WeatherConfig,
}

impl OpenWeatherClient {
    pub fn new(http: reqwest::Client, config: WeatherConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current_weather(&self) -> Result<CurrentWeather, ClientError> {
        let request = self.http.get(&self.config.api_url).query(&[
            ("q", self.config.city.as_str()),
            ("appid", self.config.api_key.as_str()),
        ]);
        let body = fetch_text(request).await.map_err(|e| {
            error!(error = %e, url = %self.config.api_url, "weather api call failed");
            e
        })?;
        let weather = payload::parse_weather(&body)?;
        debug!(city = %self.config.city, condition = %weather.condition, "weather fetched");
        Ok(weather)
    }
}
