#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use m365graph::auth::provider::{DeviceCode, IdentityProvider, ProviderError};
use m365graph::auth::prompt::UserPrompt;
use m365graph::auth::token::TokenGrant;
use m365graph::{
    AppConfig, FeatureFlags, GraphError, GraphResponse, HttpRequest, HttpTransport, IdentityConfig,
    ScopeSet, TokenBroker,
};

pub const HOME_ACCOUNT_ID: &str = "00000000-oid.11111111-tid";
pub const USERNAME: &str = "adele@contoso.com";

/// Config pointing the token store at `path`, every feature enabled.
pub fn app_config(path: &Path) -> AppConfig {
    AppConfig::new(IdentityConfig::new("test-client", None).with_token_store_path(path))
}

/// An unsigned JWT carrying `claims` as its payload.
pub fn make_jwt(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}

pub fn id_token() -> String {
    make_jwt(serde_json::json!({
        "oid": "00000000-oid",
        "tid": "11111111-tid",
        "sub": "subject",
        "preferred_username": USERNAME,
    }))
}

pub fn grant(access_token: &str, refresh_token: Option<&str>, with_id_token: bool) -> TokenGrant {
    TokenGrant {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expires_in: 3600,
        scope: None,
        id_token: with_id_token.then(id_token),
        token_type: "Bearer".to_string(),
    }
}

/// Write a cache file holding one account with the given access token,
/// expiring `expires_in_secs` from now, and optionally a refresh token.
pub fn write_cache(
    path: &Path,
    access_token: &str,
    expires_in_secs: i64,
    refresh_token: Option<&str>,
) {
    let scopes = ScopeSet::from_flags(FeatureFlags::default());
    let expires_at = chrono::Utc::now() + chrono::Duration::seconds(expires_in_secs);
    let refresh: Vec<serde_json::Value> = refresh_token
        .map(|rt| serde_json::json!({ "home_account_id": HOME_ACCOUNT_ID, "secret": rt }))
        .into_iter()
        .collect();
    let cache = serde_json::json!({
        "Account": [{
            "home_account_id": HOME_ACCOUNT_ID,
            "username": USERNAME,
            "tenant_id": "11111111-tid",
        }],
        "AccessToken": [{
            "home_account_id": HOME_ACCOUNT_ID,
            "secret": access_token,
            "scopes": scopes.as_slice(),
            "expires_at": expires_at.to_rfc3339(),
        }],
        "RefreshToken": refresh,
    });
    std::fs::write(path, serde_json::to_string_pretty(&cache).unwrap()).unwrap();
}

#[derive(Default)]
pub struct ProviderCalls {
    pub refresh: usize,
    pub device_initiate: usize,
    pub device_poll: usize,
    pub authorization_url: usize,
    pub authorization_code: usize,
    pub last_refresh_token: Option<String>,
    pub last_code: Option<String>,
    pub last_code_challenge: Option<String>,
    pub last_code_verifier: Option<String>,
}

/// Scripted identity provider that records what the broker asked for.
#[derive(Clone)]
pub struct FakeProvider {
    pub calls: Arc<Mutex<ProviderCalls>>,
    refresh: Result<TokenGrant, ProviderError>,
    device: Result<DeviceCode, ProviderError>,
    device_poll: Result<TokenGrant, ProviderError>,
    authorization_code: Result<TokenGrant, ProviderError>,
}

impl FakeProvider {
    /// Every operation fails until configured otherwise.
    pub fn new() -> Self {
        let unavailable = || ProviderError::new("not_configured", "not configured in test");
        Self {
            calls: Arc::new(Mutex::new(ProviderCalls::default())),
            refresh: Err(unavailable()),
            device: Err(unavailable()),
            device_poll: Err(unavailable()),
            authorization_code: Err(unavailable()),
        }
    }

    pub fn with_refresh(mut self, result: Result<TokenGrant, ProviderError>) -> Self {
        self.refresh = result;
        self
    }

    pub fn with_device_flow(mut self, poll: Result<TokenGrant, ProviderError>) -> Self {
        self.device = Ok(DeviceCode {
            device_code: "device-code".into(),
            user_code: "ABCD-EFGH".into(),
            verification_uri: "https://microsoft.com/devicelogin".into(),
            expires_in: 900,
            interval: 0,
            message: None,
        });
        self.device_poll = poll;
        self
    }

    pub fn with_authorization_code(mut self, result: Result<TokenGrant, ProviderError>) -> Self {
        self.authorization_code = result;
        self
    }

    pub fn calls(&self) -> std::sync::MutexGuard<'_, ProviderCalls> {
        self.calls.lock().unwrap()
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn acquire_by_refresh_token(
        &self,
        refresh_token: &str,
        _scopes: &ScopeSet,
    ) -> Result<TokenGrant, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        calls.refresh += 1;
        calls.last_refresh_token = Some(refresh_token.to_string());
        self.refresh.clone()
    }

    async fn initiate_device_flow(&self, _scopes: &ScopeSet) -> Result<DeviceCode, ProviderError> {
        self.calls.lock().unwrap().device_initiate += 1;
        self.device.clone()
    }

    async fn acquire_by_device_flow(&self, _device: &DeviceCode) -> Result<TokenGrant, ProviderError> {
        self.calls.lock().unwrap().device_poll += 1;
        self.device_poll.clone()
    }

    fn authorization_url(
        &self,
        _scopes: &ScopeSet,
        _redirect_uri: &str,
        code_challenge: &str,
        state: &str,
    ) -> Result<String, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        calls.authorization_url += 1;
        calls.last_code_challenge = Some(code_challenge.to_string());
        Ok(format!(
            "https://login.example/authorize?code_challenge={code_challenge}&state={state}"
        ))
    }

    async fn acquire_by_authorization_code(
        &self,
        code: &str,
        _scopes: &ScopeSet,
        _redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<TokenGrant, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        calls.authorization_code += 1;
        calls.last_code = Some(code.to_string());
        calls.last_code_verifier = Some(code_verifier.to_string());
        self.authorization_code.clone()
    }
}

pub fn broker(config: &AppConfig, provider: &FakeProvider) -> TokenBroker {
    TokenBroker::new(
        config.identity.clone(),
        config.scopes(),
        Box::new(provider.clone()),
    )
}

/// Prompt that answers the authorization-code step with a fixed paste.
#[derive(Default)]
pub struct ScriptedPrompt {
    pub pasted: String,
    pub device_codes_shown: Vec<String>,
    pub urls_shown: Vec<String>,
}

impl ScriptedPrompt {
    pub fn pasting(pasted: &str) -> Self {
        Self {
            pasted: pasted.to_string(),
            ..Default::default()
        }
    }
}

impl UserPrompt for ScriptedPrompt {
    fn show_device_code(&mut self, device: &DeviceCode) {
        self.device_codes_shown.push(device.user_code.clone());
    }

    fn request_authorization_code(&mut self, auth_url: &str) -> Result<String, GraphError> {
        self.urls_shown.push(auth_url.to_string());
        Ok(self.pasted.clone())
    }
}

/// Transport that records requests and replays queued responses.
#[derive(Clone, Default)]
pub struct StubTransport {
    pub requests: Arc<Mutex<Vec<HttpRequest>>>,
    responses: Arc<Mutex<VecDeque<GraphResponse>>>,
}

impl StubTransport {
    pub fn respond(self, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().push_back(GraphResponse {
            status,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: body.as_bytes().to_vec(),
        });
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<GraphResponse, GraphError> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or(GraphResponse {
            status: 200,
            headers: vec![],
            body: b"{}".to_vec(),
        }))
    }
}
