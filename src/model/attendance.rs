use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Punch row as it comes out of the device store, timestamp still raw text.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RawPunch {
    pub device_id: String,
    pub punch_time: String,
}

#[cfg(test)]
impl RawPunch {
    pub fn new(device_id: impl Into<String>, punch_time: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            punch_time: punch_time.into(),
        }
    }
}

/// A punch whose timestamp has been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PunchEvent {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(
    example = json!({
        "employee_id": "7",
        "employee_code": "NV00007",
        "employee_name": "Nguyen Van A",
        "linked": true,
        "date": "2024-07-10",
        "check_in": "2024-07-10T01:00:00Z",
        "check_out": "2024-07-10T10:30:00Z",
        "working_hours": 9.5,
        "work_value": 1.0,
        "overtime_hours": 1.5
    })
)]
pub struct AttendanceDaySummary {
    /// Roster id, or `finger:<id>` for punches from an unlinked device
    #[schema(example = "7")]
    pub employee_id: String,

    #[schema(example = "NV00007")]
    pub employee_code: String,

    #[schema(example = "Nguyen Van A")]
    pub employee_name: String,

    /// false when the device id matched no employee
    pub linked: bool,

    #[schema(example = "2024-07-10", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "2024-07-10T01:00:00Z", value_type = String, format = "date-time")]
    pub check_in: DateTime<Utc>,

    #[schema(example = "2024-07-10T10:30:00Z", value_type = String, format = "date-time")]
    pub check_out: DateTime<Utc>,

    #[schema(example = 9.5)]
    pub working_hours: f64,

    /// Fraction of a standard 8 hour day, capped at 1
    #[schema(example = 1.0)]
    pub work_value: f64,

    #[schema(example = 1.5)]
    pub overtime_hours: f64,
}
