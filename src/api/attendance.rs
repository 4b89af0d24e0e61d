use crate::attendance::{AttendanceSources, Period, aggregate_month};
use crate::auth::auth::AuthUser;
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

/// Month to report on. Both values default to the current UTC month.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PeriodQuery {
    /// Month number, 1-12
    #[schema(example = "7")]
    pub month: Option<String>,
    /// Four digit year
    #[schema(example = "2024")]
    pub year: Option<String>,
}

/// Monthly attendance derived from device punches
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(PeriodQuery),
    responses(
        (status = 200, description = "One entry per employee per day with punches", body = [crate::model::attendance::AttendanceDaySummary]),
        (status = 400, description = "Invalid month or year", body = Object, example = json!({
            "error": "InvalidPeriod",
            "message": "Invalid period: month must be between 1 and 12, got 13"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Roster or punch store unavailable", body = Object, example = json!({
            "error": "UpstreamUnavailable",
            "message": "Internal Server Error"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(
    name = "attendance_report",
    skip(auth, sources, query),
    fields(user_id = auth.user_id, user = %auth.username, role = %auth.role)
)]
pub async fn monthly_attendance(
    auth: AuthUser,
    sources: web::Data<AttendanceSources>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let period = Period::from_query(
        query.month.as_deref(),
        query.year.as_deref(),
        Utc::now().date_naive(),
    )?;

    let summaries = aggregate_month(sources.get_ref(), period).await?;

    Ok(HttpResponse::Ok().json(summaries))
}
