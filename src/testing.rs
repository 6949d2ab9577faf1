//! In-memory doubles for the store and the outbound providers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::clients::{ClientError, ClockProvider, CurrentWeather, WeatherProvider};
use crate::diary::repo::{Isolation, Store, StoreTx};
use crate::diary::repo_types::{DiaryEntry, WeatherSnapshot};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tables {
    pub weather: Vec<WeatherSnapshot>,
    pub diaries: Vec<DiaryEntry>,
}

/// Transactions take the whole store lock, so every one of them is serializable.
/// The isolation each transaction asked for is recorded for inspection.
#[derive(Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    isolations: std::sync::Mutex<Vec<Isolation>>,
    fail_diary_inserts: AtomicBool,
}

impl MemoryStore {
    /// A store whose `insert_diary` always errors.
    pub fn failing_diary_inserts() -> Self {
        let store = Self::default();
        store.fail_diary_inserts.store(true, Ordering::SeqCst);
        store
    }

    pub fn isolations(&self) -> Vec<Isolation> {
        self.isolations
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    pub async fn tables(&self) -> Tables {
        self.tables.lock().await.clone()
    }

    pub async fn seed_weather(&self, snapshot: WeatherSnapshot) {
        self.tables.lock().await.weather.push(snapshot);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self, isolation: Isolation) -> anyhow::Result<Box<dyn StoreTx>> {
        if let Ok(mut log) = self.isolations.lock() {
            log.push(isolation);
        }
        let guard = self.tables.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            staged,
            fail_diary_inserts: self.fail_diary_inserts.load(Ordering::SeqCst),
        }))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
    fail_diary_inserts: bool,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn weather_by_date(&mut self, date: Date) -> anyhow::Result<Vec<WeatherSnapshot>> {
        Ok(self
            .staged
            .weather
            .iter()
            .filter(|w| w.date == date)
            .cloned()
            .collect())
    }

    async fn insert_weather(&mut self, snapshot: &WeatherSnapshot) -> anyhow::Result<()> {
        self.staged.weather.push(snapshot.clone());
        Ok(())
    }

    async fn insert_diary(
        &mut self,
        date: Date,
        text: &str,
        weather: &WeatherSnapshot,
    ) -> anyhow::Result<DiaryEntry> {
        if self.fail_diary_inserts {
            anyhow::bail!("insert diary: disk full");
        }
        let entry = DiaryEntry {
            id: Uuid::new_v4(),
            date,
            weather: weather.weather.clone(),
            icon: weather.icon.clone(),
            temperature: weather.temperature,
            text: text.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.staged.diaries.push(entry.clone());
        Ok(entry)
    }

    async fn diaries_by_date(&mut self, date: Date) -> anyhow::Result<Vec<DiaryEntry>> {
        Ok(self
            .staged
            .diaries
            .iter()
            .filter(|d| d.date == date)
            .cloned()
            .collect())
    }

    async fn diaries_between(
        &mut self,
        start: Date,
        end: Date,
    ) -> anyhow::Result<Vec<DiaryEntry>> {
        Ok(self
            .staged
            .diaries
            .iter()
            .filter(|d| start <= d.date && d.date <= end)
            .cloned()
            .collect())
    }

    async fn first_diary_by_date(&mut self, date: Date) -> anyhow::Result<Option<DiaryEntry>> {
        Ok(self.staged.diaries.iter().find(|d| d.date == date).cloned())
    }

    async fn update_diary_text(&mut self, id: Uuid, text: &str) -> anyhow::Result<()> {
        if let Some(entry) = self.staged.diaries.iter_mut().find(|d| d.id == id) {
            entry.text = text.to_string();
        }
        Ok(())
    }

    async fn delete_diaries_by_date(&mut self, date: Date) -> anyhow::Result<u64> {
        let before = self.staged.diaries.len();
        self.staged.diaries.retain(|d| d.date != date);
        Ok((before - self.staged.diaries.len()) as u64)
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let MemoryTx {
            mut guard, staged, ..
        } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct FixedClock {
    today: Option<Date>,
    pub calls: AtomicUsize,
}

impl FixedClock {
    pub fn new(today: Date) -> Self {
        Self {
            today: Some(today),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            today: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ClockProvider for FixedClock {
    async fn today(&self) -> Result<Date, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.today
            .ok_or_else(|| ClientError::Parse("clock payload: stub outage".into()))
    }
}

pub struct StubWeather {
    reply: Option<CurrentWeather>,
    pub calls: AtomicUsize,
}

impl StubWeather {
    pub fn clear() -> Self {
        Self {
            reply: Some(CurrentWeather {
                condition: "Clear".into(),
                icon: "01d".into(),
                temperature: 291.35,
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl WeatherProvider for StubWeather {
    async fn current_weather(&self) -> Result<CurrentWeather, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or_else(|| ClientError::Status {
            url: "http://weather.invalid".into(),
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        })
    }
}
