use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth::token::TokenGrant;
use crate::scopes::ScopeSet;

/// Error reported by the identity provider, in OAuth terms.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("{error}: {}", .error_description.as_deref().unwrap_or("no description"))]
pub struct ProviderError {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ProviderError {
    pub fn new(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_description: Some(description.into()),
        }
    }

    /// Human-readable text suitable for showing to the user.
    pub fn description(&self) -> String {
        self.error_description
            .clone()
            .unwrap_or_else(|| format!("{} (no error description returned)", self.error))
    }
}

/// A started device-code authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCode {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    #[serde(default = "default_device_expiry")]
    pub expires_in: u64,
    #[serde(default = "default_poll_interval")]
    pub interval: u64,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_device_expiry() -> u64 {
    900
}

fn default_poll_interval() -> u64 {
    5
}

impl DeviceCode {
    /// Instructions for the user: the provider's own text, or a synthesized one.
    pub fn instructions(&self) -> String {
        self.message.clone().unwrap_or_else(|| {
            format!(
                "To sign in, open {} and enter the code {}",
                self.verification_uri, self.user_code
            )
        })
    }
}

impl std::fmt::Debug for dyn IdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityProvider").finish()
    }
}

/// Protocol operations against an OAuth identity provider.
///
/// Implementations hold no token state; the broker owns the cache and
/// decides when each operation runs.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Redeem a refresh token for a new access token.
    async fn acquire_by_refresh_token(
        &self,
        refresh_token: &str,
        scopes: &ScopeSet,
    ) -> Result<TokenGrant, ProviderError>;

    /// Start a device-code flow. An error means the flow is unavailable for
    /// this client and the caller should fall back.
    async fn initiate_device_flow(&self, scopes: &ScopeSet) -> Result<DeviceCode, ProviderError>;

    /// Poll until the user completes (or abandons) a device-code flow.
    async fn acquire_by_device_flow(&self, device: &DeviceCode) -> Result<TokenGrant, ProviderError>;

    /// URL the user must visit for the authorization-code flow.
    fn authorization_url(
        &self,
        scopes: &ScopeSet,
        redirect_uri: &str,
        code_challenge: &str,
        state: &str,
    ) -> Result<String, ProviderError>;

    /// Redeem an authorization code.
    async fn acquire_by_authorization_code(
        &self,
        code: &str,
        scopes: &ScopeSet,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<TokenGrant, ProviderError>;
}
