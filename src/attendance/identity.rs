use std::collections::HashMap;

use crate::model::employee::EmployeeIdentity;

/// Prefix marking employee ids synthesized for unknown devices.
pub const PLACEHOLDER_PREFIX: &str = "finger:";

/// Identity a punch was attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub employee_id: String,
    pub display_code: String,
    pub display_name: String,
    pub linked: bool,
}

impl ResolvedIdentity {
    fn linked(employee: &EmployeeIdentity) -> Self {
        Self {
            employee_id: employee.id.clone(),
            display_code: employee.display_code.clone(),
            display_name: employee.display_name.clone(),
            linked: true,
        }
    }

    fn placeholder(id: &str) -> Self {
        Self {
            employee_id: format!("{PLACEHOLDER_PREFIX}{id}"),
            display_code: id.to_string(),
            display_name: format!("Unlinked device {id}"),
            linked: false,
        }
    }
}

fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Canonical form of a device id: digits only, leading zeros dropped.
///
/// Returns `None` when the id carries no digits at all. Works on the digit
/// text, so ids of any length normalize the same way.
pub fn normalize_device_id(raw: &str) -> Option<String> {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return None;
    }

    match digits.trim_start_matches('0') {
        "" => Some("0".to_string()),
        trimmed => Some(trimmed.to_string()),
    }
}

/// Device id lookup table built from one roster snapshot.
#[derive(Debug, Default)]
pub struct IdentityMap {
    by_code: HashMap<String, EmployeeIdentity>,
}

impl IdentityMap {
    pub fn from_roster(roster: &[EmployeeIdentity]) -> Self {
        let mut by_code = HashMap::with_capacity(roster.len() * 2);

        for employee in roster {
            let digits = digits_only(&employee.display_code);
            if digits.is_empty() {
                continue;
            }

            // first roster entry wins on collisions
            if let Some(normalized) = normalize_device_id(&digits) {
                by_code
                    .entry(normalized)
                    .or_insert_with(|| employee.clone());
            }
            by_code.entry(digits).or_insert_with(|| employee.clone());
        }

        Self { by_code }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    pub fn resolve(&self, device_id: &str) -> ResolvedIdentity {
        let digits = digits_only(device_id);
        let normalized = normalize_device_id(device_id);

        let found = normalized
            .as_deref()
            .and_then(|key| self.by_code.get(key))
            .or_else(|| self.by_code.get(&digits));

        match found {
            Some(employee) => ResolvedIdentity::linked(employee),
            None => {
                let id = normalized.unwrap_or_else(|| device_id.trim().to_string());
                ResolvedIdentity::placeholder(&id)
            }
        }
    }
}
