use serde::{Deserialize, Serialize};

/// Roster columns needed to resolve device ids.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmployeeRow {
    pub id: u64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeIdentity {
    pub id: String,
    pub display_code: String,
    pub display_name: String,
}

impl EmployeeIdentity {
    pub fn new(
        id: impl Into<String>,
        display_code: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_code: display_code.into(),
            display_name: display_name.into(),
        }
    }
}

impl From<EmployeeRow> for EmployeeIdentity {
    fn from(row: EmployeeRow) -> Self {
        let display_name = match row.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {}", row.first_name.trim(), last),
            _ => row.first_name.trim().to_string(),
        };

        Self::new(row.id.to_string(), row.employee_code, display_name)
    }
}
