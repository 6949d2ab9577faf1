use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::clients::CurrentWeather;

pub const NO_DATA: &str = "NO DATA";

/// Weather for one calendar day, either cached or attached to a diary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WeatherSnapshot {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub weather: String,
    pub icon: String,
    pub temperature: f64,
}

impl WeatherSnapshot {
    pub fn observed(date: Date, current: CurrentWeather) -> Self {
        Self {
            date,
            weather: current.condition,
            icon: current.icon,
            temperature: current.temperature,
        }
    }

    /// Placeholder for past days nobody recorded weather for.
    pub fn no_data(date: Date) -> Self {
        Self {
            date,
            weather: NO_DATA.into(),
            icon: NO_DATA.into(),
            temperature: 0.0,
        }
    }
}

/// Diary row. Weather columns are a copy taken when the entry was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DiaryEntry {
    pub id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub weather: String,
    pub icon: String,
    pub temperature: f64,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
impl DiaryEntry {
    pub fn snapshot(&self) -> WeatherSnapshot {
        WeatherSnapshot {
            date: self.date,
            weather: self.weather.clone(),
            icon: self.icon.clone(),
            temperature: self.temperature,
        }
    }
}

/// `YYYY-MM-DD` (de)serialization for [`Date`] fields.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Date};

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = date
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;
        Date::parse(&text, format_description!("[year]-[month]-[day]"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn no_data_snapshot_uses_placeholders() {
        let snapshot = WeatherSnapshot::no_data(date!(1999 - 12 - 31));
        assert_eq!(snapshot.weather, "NO DATA");
        assert_eq!(snapshot.icon, "NO DATA");
        assert_eq!(snapshot.temperature, 0.0);
        assert_eq!(snapshot.date, date!(1999 - 12 - 31));
    }

    #[test]
    fn diary_entry_serializes_iso_date() {
        let entry = DiaryEntry {
            id: Uuid::nil(),
            date: date!(2024 - 05 - 05),
            weather: "Clear".into(),
            icon: "01d".into(),
            temperature: 291.35,
            text: "일기 내용입니다.".into(),
            created_at: datetime!(2024-05-05 10:00 UTC),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], "2024-05-05");
        assert_eq!(json["text"], "일기 내용입니다.");
        assert_eq!(json["created_at"], "2024-05-05T10:00:00Z");
    }
}
