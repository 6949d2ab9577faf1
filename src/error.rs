use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use time::Date;

use crate::clients::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid date {date}: must be between {earliest} and {latest}")]
    InvalidDate {
        date: Date,
        earliest: Date,
        /// Unknown when the date is rejected before the clock is consulted.
        latest: LatestDate,
    },
    #[error("upstream service failed: {0}")]
    Upstream(#[from] ClientError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatestDate {
    Today,
    Known(Date),
}

impl std::fmt::Display for LatestDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LatestDate::Today => f.write_str("today"),
            LatestDate::Known(date) => write!(f, "{date}"),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidDate { .. } => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn invalid_date_message_names_the_window() {
        let err = AppError::InvalidDate {
            date: date!(2030 - 01 - 01),
            earliest: date!(1900 - 01 - 01),
            latest: LatestDate::Known(date!(2024 - 05 - 05)),
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "invalid date 2030-01-01: must be between 1900-01-01 and 2024-05-05"
        );
    }

    #[test]
    fn upstream_and_internal_map_to_server_errors() {
        let upstream = AppError::from(ClientError::Parse("clock payload".into()));
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);

        let internal = AppError::from(anyhow::anyhow!("connection reset"));
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.to_string(), "connection reset");
    }
}
