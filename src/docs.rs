use crate::api::attendance::PeriodQuery;
use crate::model::attendance::AttendanceDaySummary;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Attendance reporting

Monthly attendance derived from raw clocking device punches.

- Punches are grouped per employee per **UTC** calendar day
- `check_in` / `check_out` are the first and last punch of that day
- `work_value` is the fraction of a standard 8 hour day, capped at 1
- Punches from devices with no matching employee code are reported under
  a `finger:<id>` placeholder instead of being dropped

### Security
Endpoints require a **JWT Bearer** access token with the HR or Admin role.
"#,
    ),
    paths(
        crate::api::attendance::monthly_attendance,
    ),
    components(
        schemas(
            PeriodQuery,
            AttendanceDaySummary
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance reporting APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
