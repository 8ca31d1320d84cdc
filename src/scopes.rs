use serde::{Deserialize, Serialize};

pub const USER_READ: &str = "User.Read";
pub const CALENDARS_READ_WRITE: &str = "Calendars.ReadWrite";
pub const TASKS_READ_WRITE: &str = "Tasks.ReadWrite";
pub const MAIL_READ_WRITE: &str = "Mail.ReadWrite";
pub const MAIL_SEND: &str = "Mail.Send";

/// Capability areas that can be switched on or off independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub calendar: bool,
    pub tasks: bool,
    pub email: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            calendar: true,
            tasks: true,
            email: true,
        }
    }
}

/// Ordered permission scopes requested from the identity provider.
///
/// Computed once from [`FeatureFlags`]; equal flags always produce an equal
/// set, which keeps cached token lookups stable across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeSet(Vec<String>);

impl ScopeSet {
    pub fn from_flags(flags: FeatureFlags) -> Self {
        let mut scopes = vec![USER_READ.to_string()];
        if flags.calendar {
            scopes.push(CALENDARS_READ_WRITE.to_string());
        }
        if flags.tasks {
            scopes.push(TASKS_READ_WRITE.to_string());
        }
        if flags.email {
            scopes.push(MAIL_READ_WRITE.to_string());
            scopes.push(MAIL_SEND.to_string());
        }
        Self(scopes)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.0.iter().any(|s| s.eq_ignore_ascii_case(scope))
    }

    /// True if every scope in this set appears in `granted` (case-insensitive).
    pub fn is_covered_by(&self, granted: &[String]) -> bool {
        self.0
            .iter()
            .all(|want| granted.iter().any(|g| g.eq_ignore_ascii_case(want)))
    }

    /// Space-delimited form used on the OAuth wire.
    pub fn to_space_delimited(&self) -> String {
        self.0.join(" ")
    }
}
