//! Typed views of the provider responses. Only the handful of fields the
//! diary keeps are modelled; everything else in the payload is ignored.

use serde::Deserialize;
use time::{macros::format_description, Date};

use super::ClientError;

/// Weather as reported by the provider right now.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    pub condition: String,
    pub icon: String,
    pub temperature: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherPayload {
    main: MainBlock,
    weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    main: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ClockPayload {
    datetime: String,
}

/// Pulls `main.temp` and `weather[0].{main,icon}` out of a weather response.
pub fn parse_weather(body: &str) -> Result<CurrentWeather, ClientError> {
    let payload: WeatherPayload = serde_json::from_str(body)
        .map_err(|e| ClientError::Parse(format!("weather payload: {e}")))?;
    let condition = payload
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::Parse("weather payload: `weather` array is empty".into()))?;
    Ok(CurrentWeather {
        condition: condition.main,
        icon: condition.icon,
        temperature: payload.main.temp,
    })
}

/// Reads the calendar date from the first ten characters of `datetime`.
pub fn parse_current_date(body: &str) -> Result<Date, ClientError> {
    let payload: ClockPayload = serde_json::from_str(body)
        .map_err(|e| ClientError::Parse(format!("clock payload: {e}")))?;
    let day = payload.datetime.get(..10).ok_or_else(|| {
        ClientError::Parse(format!(
            "clock payload: `datetime` too short: {:?}",
            payload.datetime
        ))
    })?;
    Date::parse(day, format_description!("[year]-[month]-[day]"))
        .map_err(|e| ClientError::Parse(format!("clock payload: bad date {day:?}: {e}")))
}
