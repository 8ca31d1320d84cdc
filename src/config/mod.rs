pub mod env;
pub mod types;

pub use env::{from_env, from_lookup, parse_flag};
pub use types::{
    AppConfig, ClientIdentity, IdentityConfig, DEFAULT_AUTHORITY, DEFAULT_REDIRECT_URI,
    DEFAULT_TIMEZONE, DEFAULT_TOKEN_PATH, GRAPH_BASE_URL,
};

/// Load `.env` from the working directory (if any), then read the environment.
pub fn load_config() -> Result<AppConfig, crate::error::GraphError> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {e}");
    }
    from_env()
}
