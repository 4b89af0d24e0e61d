use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use strum::IntoStaticStr;

/// Errors surfaced by the attendance report.
#[derive(Debug, Display, IntoStaticStr)]
pub enum AttendanceError {
    /// Caller supplied a month/year that is not a real calendar month.
    #[display(fmt = "Invalid period: {}", _0)]
    InvalidPeriod(String),

    /// The roster or punch store could not be read.
    #[display(fmt = "Upstream unavailable: {}", _0)]
    UpstreamUnavailable(String),

    /// A single punch whose timestamp could not be parsed. Never returned
    /// to callers; the offending event is skipped.
    #[display(fmt = "Malformed punch event: {}", _0)]
    MalformedEvent(String),
}

impl AttendanceError {
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::InvalidPeriod(_) | AttendanceError::MalformedEvent(_) => {
                StatusCode::BAD_REQUEST
            }
            AttendanceError::UpstreamUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // upstream detail stays in the logs
        let message = match self {
            AttendanceError::UpstreamUnavailable(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "message": message
        }))
    }
}
