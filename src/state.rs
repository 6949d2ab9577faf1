use crate::clients::{self, OpenWeatherClient, WorldTimeClient};
use crate::config::AppConfig;
use crate::diary::{repo::PgStore, services::DiaryService};
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DiaryService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connects to Postgres, applies migrations and wires the providers.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;

        let http = clients::http_client(config.http_timeout_secs)?;
        let service = Arc::new(DiaryService::new(
            Arc::new(PgStore::new(db)),
            Arc::new(OpenWeatherClient::new(http.clone(), config.weather.clone())),
            Arc::new(WorldTimeClient::new(http, config.clock.clone())),
        ));

        Ok(Self::from_parts(service, config))
    }

    pub fn from_parts(service: Arc<DiaryService>, config: Arc<AppConfig>) -> Self {
        Self { service, config }
    }
}
