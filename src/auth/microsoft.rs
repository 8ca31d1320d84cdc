//! Microsoft identity platform (v2.0 endpoints) backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::auth::provider::{DeviceCode, IdentityProvider, ProviderError};
use crate::auth::token::TokenGrant;
use crate::config::{ClientIdentity, IdentityConfig};
use crate::scopes::ScopeSet;

/// Reserved scopes needed for a refresh token and an ID token.
const RESERVED_SCOPES: &str = "openid profile offline_access";

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Seconds added to the polling interval on `slow_down` (RFC 8628 §3.5).
const SLOW_DOWN_STEP: u64 = 5;

#[derive(Debug, Clone)]
pub struct MicrosoftIdentity {
    identity: ClientIdentity,
    authority: String,
}

impl MicrosoftIdentity {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            identity: config.identity().clone(),
            authority: config.authority().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/oauth2/v2.0/{name}", self.authority)
    }

    fn wire_scope(scopes: &ScopeSet) -> String {
        format!("{} {RESERVED_SCOPES}", scopes.to_space_delimited())
    }

    /// POST to the token endpoint with client credentials attached.
    async fn token_request(
        &self,
        mut form: Vec<(&'static str, String)>,
    ) -> Result<TokenGrant, ProviderError> {
        form.push(("client_id", self.identity.client_id().to_string()));
        if let Some(secret) = self.identity.client_secret() {
            form.push(("client_secret", secret.to_string()));
        }

        let resp = reqwest::Client::new()
            .post(self.endpoint("token"))
            .form(&form)
            .send()
            .await
            .map_err(transport_error)?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        resp.json::<TokenGrant>().await.map_err(|e| {
            ProviderError::new("invalid_response", format!("Failed to parse token response: {e}"))
        })
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    ProviderError::new("transport_error", format!("Request to identity provider failed: {e}"))
}

async fn error_from_response(resp: reqwest::Response) -> ProviderError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    serde_json::from_str::<ProviderError>(&body)
        .unwrap_or_else(|_| ProviderError::new("http_error", format!("HTTP {status}: {body}")))
}

#[async_trait]
impl IdentityProvider for MicrosoftIdentity {
    async fn acquire_by_refresh_token(
        &self,
        refresh_token: &str,
        scopes: &ScopeSet,
    ) -> Result<TokenGrant, ProviderError> {
        self.token_request(vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token.to_string()),
            ("scope", Self::wire_scope(scopes)),
        ])
        .await
    }

    async fn initiate_device_flow(&self, scopes: &ScopeSet) -> Result<DeviceCode, ProviderError> {
        if self.identity.is_confidential() {
            return Err(ProviderError::new(
                "unsupported_client",
                "Device code flow is only available to public clients",
            ));
        }

        let resp = reqwest::Client::new()
            .post(self.endpoint("devicecode"))
            .form(&[
                ("client_id", self.identity.client_id().to_string()),
                ("scope", Self::wire_scope(scopes)),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        resp.json::<DeviceCode>().await.map_err(|e| {
            ProviderError::new("invalid_response", format!("Device code response lacks a user code: {e}"))
        })
    }

    async fn acquire_by_device_flow(&self, device: &DeviceCode) -> Result<TokenGrant, ProviderError> {
        // `None` when the advertised lifetime is past what `Instant` can hold.
        let deadline = Instant::now().checked_add(Duration::from_secs(device.expires_in));
        let mut interval = device.interval;

        loop {
            if deadline.is_some_and(|d| Instant::now() > d) {
                return Err(ProviderError::new(
                    "expired_token",
                    "The device code expired before sign-in completed",
                ));
            }

            let result = self
                .token_request(vec![
                    ("grant_type", DEVICE_CODE_GRANT.to_string()),
                    ("device_code", device.device_code.clone()),
                ])
                .await;

            match result {
                Ok(grant) => return Ok(grant),
                Err(e) if e.error == "authorization_pending" => {
                    tracing::trace!("Device authorization pending");
                }
                Err(e) if e.error == "slow_down" => {
                    interval = interval.saturating_add(SLOW_DOWN_STEP);
                    tracing::debug!("Device polling slowed to {interval}s");
                }
                Err(e) => return Err(e),
            }
            tokio::time::sleep(Duration::from_secs(interval)).await;
        }
    }

    fn authorization_url(
        &self,
        scopes: &ScopeSet,
        redirect_uri: &str,
        code_challenge: &str,
        state: &str,
    ) -> Result<String, ProviderError> {
        let endpoint = self.endpoint("authorize");
        let mut url = reqwest::Url::parse(&endpoint).map_err(|e| {
            ProviderError::new("invalid_authority", format!("Invalid authorize URL '{endpoint}': {e}"))
        })?;

        url.query_pairs_mut()
            .append_pair("client_id", self.identity.client_id())
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_mode", "query")
            .append_pair("scope", &Self::wire_scope(scopes))
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256");

        Ok(url.to_string())
    }

    async fn acquire_by_authorization_code(
        &self,
        code: &str,
        scopes: &ScopeSet,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<TokenGrant, ProviderError> {
        self.token_request(vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("redirect_uri", redirect_uri.to_string()),
            ("code_verifier", code_verifier.to_string()),
            ("scope", Self::wire_scope(scopes)),
        ])
        .await
    }
}
