use crate::error::GraphError;
use crate::scopes::FeatureFlags;

use super::types::{AppConfig, IdentityConfig, DEFAULT_TIMEZONE};

pub const CLIENT_ID_VAR: &str = "MS_GRAPH_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "MS_GRAPH_CLIENT_SECRET";
pub const REDIRECT_URI_VAR: &str = "MS_GRAPH_REDIRECT_URI";
pub const TOKEN_PATH_VAR: &str = "MS_GRAPH_TOKEN_PATH";
pub const AUTHORITY_VAR: &str = "MS_GRAPH_AUTHORITY";
pub const TIMEZONE_VAR: &str = "MS_GRAPH_TIMEZONE";
pub const ENABLE_CALENDAR_VAR: &str = "ENABLE_CALENDAR";
pub const ENABLE_TASKS_VAR: &str = "ENABLE_TASKS";
pub const ENABLE_EMAIL_VAR: &str = "ENABLE_EMAIL";

/// Load configuration from the process environment.
pub fn from_env() -> Result<AppConfig, GraphError> {
    from_lookup(|name| std::env::var(name).ok())
}

/// Load configuration through an arbitrary variable lookup.
///
/// Empty values are treated as unset, except for the feature toggles where
/// any present value that is not truthy disables the area.
pub fn from_lookup<F>(lookup: F) -> Result<AppConfig, GraphError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let client_id = non_empty(CLIENT_ID_VAR).ok_or_else(|| {
        GraphError::Config(format!(
            "{CLIENT_ID_VAR} must be set in .env file or environment variables."
        ))
    })?;

    let mut identity = IdentityConfig::new(client_id, non_empty(CLIENT_SECRET_VAR));
    if let Some(uri) = non_empty(REDIRECT_URI_VAR) {
        identity = identity.with_redirect_uri(uri);
    }
    if let Some(authority) = non_empty(AUTHORITY_VAR) {
        identity = identity.with_authority(authority);
    }
    if let Some(path) = non_empty(TOKEN_PATH_VAR) {
        identity = identity.with_token_store_path(path);
    }

    let features = FeatureFlags {
        calendar: parse_flag(lookup(ENABLE_CALENDAR_VAR).as_deref()),
        tasks: parse_flag(lookup(ENABLE_TASKS_VAR).as_deref()),
        email: parse_flag(lookup(ENABLE_EMAIL_VAR).as_deref()),
    };

    Ok(AppConfig {
        identity,
        features,
        timezone: non_empty(TIMEZONE_VAR).unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
    })
}

/// Unset toggles default to enabled; set ones must be `true`, `1` or `yes`.
pub fn parse_flag(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
    }
}
