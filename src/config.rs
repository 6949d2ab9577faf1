use anyhow::Context;
use time::{Time, UtcOffset};

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_url: String,
    pub api_key: String,
    pub city: String,
}

#[derive(Debug, Clone)]
pub struct ClockConfig {
    pub api_url: String,
}

/// When the daily weather refresh fires, in the service's local time.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleConfig {
    pub run_at: Time,
    pub utc_offset: UtcOffset,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub weather: WeatherConfig,
    pub clock: ClockConfig,
    pub http_timeout_secs: u64,
    pub schedule: ScheduleConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = lookup("APP_PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let weather = WeatherConfig {
            api_url: lookup("WEATHER_API_URL")
                .unwrap_or_else(|| "https://api.openweathermap.org/data/2.5/weather".into()),
            api_key: lookup("OPENWEATHERMAP_KEY").context("OPENWEATHERMAP_KEY is not set")?,
            city: lookup("WEATHER_CITY").unwrap_or_else(|| "seoul".into()),
        };
        let clock = ClockConfig {
            api_url: lookup("CLOCK_API_URL")
                .unwrap_or_else(|| "http://worldtimeapi.org/api/timezone/Asia/Seoul".into()),
        };
        let http_timeout_secs = lookup("HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);

        let hour = lookup("WEATHER_REFRESH_HOUR")
            .and_then(|v| v.parse::<u8>().ok())
            .unwrap_or(1);
        let offset_hours = lookup("WEATHER_REFRESH_UTC_OFFSET")
            .and_then(|v| v.parse::<i8>().ok())
            .unwrap_or(9);
        let schedule = ScheduleConfig {
            run_at: Time::from_hms(hour, 0, 0)
                .with_context(|| format!("WEATHER_REFRESH_HOUR out of range: {hour}"))?,
            utc_offset: UtcOffset::from_hms(offset_hours, 0, 0).with_context(|| {
                format!("WEATHER_REFRESH_UTC_OFFSET out of range: {offset_hours}")
            })?,
        };

        Ok(Self {
            host,
            port,
            database_url,
            weather,
            clock,
            http_timeout_secs,
            schedule,
        })
    }
}
