use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use time::Date;
use uuid::Uuid;

use super::repo_types::{DiaryEntry, WeatherSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isolation {
    ReadCommitted,
    ReadOnly,
    Serializable,
}

impl Isolation {
    fn set_statement(self) -> Option<&'static str> {
        match self {
            Isolation::ReadCommitted => None,
            Isolation::ReadOnly => Some("SET TRANSACTION READ ONLY"),
            Isolation::Serializable => Some("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE"),
        }
    }
}

/// Entry point to the diary and weather tables.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self, isolation: Isolation) -> anyhow::Result<Box<dyn StoreTx>>;
}

/// One open transaction. Dropping it without `commit` discards its writes.
#[async_trait]
pub trait StoreTx: Send {
    async fn weather_by_date(&mut self, date: Date) -> anyhow::Result<Vec<WeatherSnapshot>>;
    async fn insert_weather(&mut self, snapshot: &WeatherSnapshot) -> anyhow::Result<()>;

    async fn insert_diary(
        &mut self,
        date: Date,
        text: &str,
        weather: &WeatherSnapshot,
    ) -> anyhow::Result<DiaryEntry>;
    async fn diaries_by_date(&mut self, date: Date) -> anyhow::Result<Vec<DiaryEntry>>;
    async fn diaries_between(&mut self, start: Date, end: Date)
        -> anyhow::Result<Vec<DiaryEntry>>;
    /// Earliest written entry for `date`, locked for update.
    async fn first_diary_by_date(&mut self, date: Date) -> anyhow::Result<Option<DiaryEntry>>;
    async fn update_diary_text(&mut self, id: Uuid, text: &str) -> anyhow::Result<()>;
    async fn delete_diaries_by_date(&mut self, date: Date) -> anyhow::Result<u64>;

    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
    async fn rollback(self: Box<Self>) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self, isolation: Isolation) -> anyhow::Result<Box<dyn StoreTx>> {
        let mut tx = self.db.begin().await.context("begin transaction")?;
        if let Some(statement) = isolation.set_statement() {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .context("set transaction mode")?;
        }
        Ok(Box::new(PgStoreTx { tx }))
    }
}

struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgStoreTx {
    async fn weather_by_date(&mut self, date: Date) -> anyhow::Result<Vec<WeatherSnapshot>> {
        let rows = sqlx::query_as::<_, WeatherSnapshot>(
            r#"
            SELECT date, weather, icon, temperature
            FROM weather_snapshots
            WHERE date = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(date)
        .fetch_all(&mut *self.tx)
        .await
        .context("select weather by date")?;
        Ok(rows)
    }

    async fn insert_weather(&mut self, snapshot: &WeatherSnapshot) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO weather_snapshots (id, date, weather, icon, temperature)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(snapshot.date)
        .bind(&snapshot.weather)
        .bind(&snapshot.icon)
        .bind(snapshot.temperature)
        .execute(&mut *self.tx)
        .await
        .context("insert weather snapshot")?;
        Ok(())
    }

    async fn insert_diary(
        &mut self,
        date: Date,
        text: &str,
        weather: &WeatherSnapshot,
    ) -> anyhow::Result<DiaryEntry> {
        let entry = sqlx::query_as::<_, DiaryEntry>(
            r#"
            INSERT INTO diaries (id, date, weather, icon, temperature, text)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, date, weather, icon, temperature, text, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(date)
        .bind(&weather.weather)
        .bind(&weather.icon)
        .bind(weather.temperature)
        .bind(text)
        .fetch_one(&mut *self.tx)
        .await
        .context("insert diary")?;
        Ok(entry)
    }

    async fn diaries_by_date(&mut self, date: Date) -> anyhow::Result<Vec<DiaryEntry>> {
        let rows = sqlx::query_as::<_, DiaryEntry>(
            r#"
            SELECT id, date, weather, icon, temperature, text, created_at
            FROM diaries
            WHERE date = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(date)
        .fetch_all(&mut *self.tx)
        .await
        .context("select diaries by date")?;
        Ok(rows)
    }

    async fn diaries_between(
        &mut self,
        start: Date,
        end: Date,
    ) -> anyhow::Result<Vec<DiaryEntry>> {
        let rows = sqlx::query_as::<_, DiaryEntry>(
            r#"
            SELECT id, date, weather, icon, temperature, text, created_at
            FROM diaries
            WHERE date BETWEEN $1 AND $2
            ORDER BY created_at, id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&mut *self.tx)
        .await
        .context("select diaries in range")?;
        Ok(rows)
    }

    async fn first_diary_by_date(&mut self, date: Date) -> anyhow::Result<Option<DiaryEntry>> {
        let row = sqlx::query_as::<_, DiaryEntry>(
            r#"
            SELECT id, date, weather, icon, temperature, text, created_at
            FROM diaries
            WHERE date = $1
            ORDER BY created_at, id
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(date)
        .fetch_optional(&mut *self.tx)
        .await
        .context("select first diary by date")?;
        Ok(row)
    }

    async fn update_diary_text(&mut self, id: Uuid, text: &str) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE diaries SET text = $2 WHERE id = $1"#)
            .bind(id)
            .bind(text)
            .execute(&mut *self.tx)
            .await
            .context("update diary text")?;
        Ok(())
    }

    async fn delete_diaries_by_date(&mut self, date: Date) -> anyhow::Result<u64> {
        let done = sqlx::query(r#"DELETE FROM diaries WHERE date = $1"#)
            .bind(date)
            .execute(&mut *self.tx)
            .await
            .context("delete diaries by date")?;
        Ok(done.rows_affected())
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        self.tx.commit().await.context("commit transaction")
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        self.tx.rollback().await.context("rollback transaction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolation_maps_to_transaction_statement() {
        assert_eq!(Isolation::ReadCommitted.set_statement(), None);
        assert_eq!(
            Isolation::ReadOnly.set_statement(),
            Some("SET TRANSACTION READ ONLY")
        );
        assert_eq!(
            Isolation::Serializable.set_statement(),
            Some("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        );
    }
}
