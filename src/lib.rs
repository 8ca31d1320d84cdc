pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod scopes;
pub mod transport;
pub mod transports;
pub mod types;

pub use auth::{Account, TokenBroker};
pub use client::GraphClient;
pub use config::{load_config, AppConfig, IdentityConfig};
pub use error::GraphError;
pub use reqwest::Method;
pub use scopes::{FeatureFlags, ScopeSet};
pub use transport::{HttpRequest, HttpTransport};
pub use transports::ReqwestTransport;
pub use types::GraphResponse;

/// One-shot convenience function: load config from the environment and
/// issue a single authenticated request.
pub async fn request_once(
    method: Method,
    path: &str,
    body: Option<&serde_json::Value>,
) -> Result<GraphResponse, GraphError> {
    let config = load_config()?;
    GraphClient::from_config(&config)
        .request(method, path, body)
        .await
}
