use std::sync::Arc;
use std::time::Duration;

use time::{OffsetDateTime, Time, UtcOffset};
use tracing::{error, info};

use crate::config::ScheduleConfig;
use crate::diary::services::DiaryService;

/// Background task that caches the day's weather once per day.
///
/// Sleeps until the next configured local run time, fetches, and repeats.
/// A failed run is logged and the loop carries on with the next day.
pub async fn run_weather_refresh_loop(service: Arc<DiaryService>, schedule: ScheduleConfig) {
    loop {
        let wait = duration_until_next_run(
            OffsetDateTime::now_utc(),
            schedule.run_at,
            schedule.utc_offset,
        );
        info!(wait_secs = wait.as_secs(), "next weather refresh scheduled");
        tokio::time::sleep(wait).await;

        match service.save_weather().await {
            Ok(snapshot) => {
                info!(date = %snapshot.date, weather = %snapshot.weather, "weather refresh done")
            }
            Err(e) => error!(error = %e, "weather refresh failed"),
        }
    }
}

/// Time from `now` until the next `run_at` in `offset`, always strictly in the future.
pub fn duration_until_next_run(now: OffsetDateTime, run_at: Time, offset: UtcOffset) -> Duration {
    let local = now.to_offset(offset);
    let mut next = local.replace_time(run_at);
    if next <= local {
        next += time::Duration::days(1);
    }
    Duration::try_from(next - local).unwrap_or_default()
}
