use std::sync::Arc;

use time::{macros::date, Date};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::repo::{Isolation, Store, StoreTx};
use super::repo_types::{DiaryEntry, WeatherSnapshot};
use crate::clients::{ClockProvider, WeatherProvider};
use crate::error::{AppError, LatestDate};

/// Earliest date a diary may be written or read for.
pub const MIN_DATE: Date = date!(1900 - 01 - 01);

pub struct DiaryService {
    store: Arc<dyn Store>,
    weather: Arc<dyn WeatherProvider>,
    clock: Arc<dyn ClockProvider>,
}

impl DiaryService {
    pub fn new(
        store: Arc<dyn Store>,
        weather: Arc<dyn WeatherProvider>,
        clock: Arc<dyn ClockProvider>,
    ) -> Self {
        Self {
            store,
            weather,
            clock,
        }
    }

    /// Checks `date` against `[MIN_DATE, today]` and returns today.
    /// The clock is asked on every call; it is skipped only when the lower bound already fails.
    pub async fn validate(&self, date: Date) -> Result<Date, AppError> {
        if date < MIN_DATE {
            warn!(%date, "date before {MIN_DATE} rejected");
            return Err(AppError::InvalidDate {
                date,
                earliest: MIN_DATE,
                latest: LatestDate::Today,
            });
        }
        let today = self.clock.today().await?;
        if date > today {
            warn!(%date, %today, "date after today rejected");
            return Err(AppError::InvalidDate {
                date,
                earliest: MIN_DATE,
                latest: LatestDate::Known(today),
            });
        }
        Ok(today)
    }

    #[instrument(skip(self, text))]
    pub async fn create_diary(&self, date: Date, text: &str) -> Result<DiaryEntry, AppError> {
        info!(%date, "creating diary");
        let today = self.validate(date).await?;

        let mut tx = self.store.begin(Isolation::Serializable).await?;
        let result = self.write_diary(&mut *tx, date, text, today).await;
        let entry = finish(tx, result).await?;

        info!(%date, id = %entry.id, weather = %entry.weather, "diary created");
        Ok(entry)
    }

    #[instrument(skip(self))]
    pub async fn read_diary(&self, date: Date) -> Result<Vec<DiaryEntry>, AppError> {
        info!(%date, "reading diaries");
        self.validate(date).await?;

        let mut tx = self.store.begin(Isolation::ReadOnly).await?;
        let result = tx.diaries_by_date(date).await.map_err(AppError::from);
        finish(tx, result).await
    }

    /// Entries in `[start, end]`. A reversed range matches nothing.
    #[instrument(skip(self))]
    pub async fn read_diaries(&self, start: Date, end: Date) -> Result<Vec<DiaryEntry>, AppError> {
        info!(%start, %end, "reading diaries in range");
        self.validate(start).await?;
        self.validate(end).await?;

        let mut tx = self.store.begin(Isolation::ReadOnly).await?;
        let result = tx.diaries_between(start, end).await.map_err(AppError::from);
        finish(tx, result).await
    }

    /// Rewrites the text of the earliest entry for `date`.
    /// Returns `false` when the day has no entry; that is not an error.
    #[instrument(skip(self, text))]
    pub async fn update_diary(&self, date: Date, text: &str) -> Result<bool, AppError> {
        info!(%date, "updating first diary of the day");
        self.validate(date).await?;

        let mut tx = self.store.begin(Isolation::ReadCommitted).await?;
        let result = rewrite_first(&mut *tx, date, text).await;

        match finish(tx, result).await? {
            Some(id) => {
                info!(%date, %id, "diary updated");
                Ok(true)
            }
            None => {
                warn!(%date, "no diary to update");
                Ok(false)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_diary(&self, date: Date) -> Result<u64, AppError> {
        info!(%date, "deleting diaries");
        self.validate(date).await?;

        let mut tx = self.store.begin(Isolation::ReadCommitted).await?;
        let result = tx.delete_diaries_by_date(date).await.map_err(AppError::from);
        let count = finish(tx, result).await?;

        info!(%date, count, "diaries deleted");
        Ok(count)
    }

    /// Fetches live weather and caches it under today's date.
    /// Repeated calls on the same day add further rows.
    #[instrument(skip(self))]
    pub async fn save_weather(&self) -> Result<WeatherSnapshot, AppError> {
        let today = self.clock.today().await?;
        let snapshot = WeatherSnapshot::observed(today, self.weather.current_weather().await?);

        let mut tx = self.store.begin(Isolation::ReadCommitted).await?;
        let result = tx.insert_weather(&snapshot).await.map_err(AppError::from);
        finish(tx, result).await?;

        info!(date = %today, weather = %snapshot.weather, "weather cached");
        Ok(snapshot)
    }

    async fn write_diary(
        &self,
        tx: &mut dyn StoreTx,
        date: Date,
        text: &str,
        today: Date,
    ) -> Result<DiaryEntry, AppError> {
        let weather = self.resolve_weather(tx, date, today).await?;
        Ok(tx.insert_diary(date, text, &weather).await?)
    }

    /// Cached snapshot first; for today a live fetch, which is cached too;
    /// a placeholder for any other day.
    async fn resolve_weather(
        &self,
        tx: &mut dyn StoreTx,
        date: Date,
        today: Date,
    ) -> Result<WeatherSnapshot, AppError> {
        if let Some(cached) = tx.weather_by_date(date).await?.into_iter().next() {
            return Ok(cached);
        }
        if date == today {
            let current = self.weather.current_weather().await?;
            let snapshot = WeatherSnapshot::observed(today, current);
            tx.insert_weather(&snapshot).await?;
            return Ok(snapshot);
        }
        info!(%date, "no weather recorded for this day");
        Ok(WeatherSnapshot::no_data(date))
    }
}

async fn rewrite_first(
    tx: &mut dyn StoreTx,
    date: Date,
    text: &str,
) -> Result<Option<Uuid>, AppError> {
    let Some(entry) = tx.first_diary_by_date(date).await? else {
        return Ok(None);
    };
    tx.update_diary_text(entry.id, text).await?;
    Ok(Some(entry.id))
}

/// Commits on success, rolls back on failure.
async fn finish<T>(tx: Box<dyn StoreTx>, result: Result<T, AppError>) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "rollback failed");
            }
            Err(e)
        }
    }
}
