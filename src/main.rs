mod app;
mod clients;
mod config;
mod diary;
mod error;
mod scheduler;
mod state;
#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "weather_diary=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    tokio::spawn(scheduler::run_weather_refresh_loop(
        app_state.service.clone(),
        app_state.config.schedule,
    ));

    let addr = app::listen_addr(&app_state.config)?;
    app::serve(app::build_app(app_state), addr).await
}
