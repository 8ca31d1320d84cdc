use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Successful token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

/// Longest access token lifetime accepted from a token response (one day).
const MAX_EXPIRES_IN_SECS: i64 = 24 * 60 * 60;

fn default_expires_in() -> i64 {
    3600
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenGrant {
    /// Scopes the server says it granted, if it said anything.
    pub fn granted_scopes(&self) -> Option<Vec<String>> {
        self.scope
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
    }

    pub fn claims(&self) -> Option<IdTokenClaims> {
        self.id_token.as_deref().and_then(IdTokenClaims::decode)
    }

    /// Absolute expiry. The server-supplied lifetime is clamped to
    /// `0..=MAX_EXPIRES_IN_SECS`.
    pub fn expires_at(&self) -> chrono::DateTime<chrono::Utc> {
        let secs = self.expires_in.clamp(0, MAX_EXPIRES_IN_SECS);
        chrono::Utc::now() + chrono::Duration::seconds(secs)
    }
}

/// The handful of ID token claims used to identify an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    #[serde(default)]
    pub oid: Option<String>,
    #[serde(default)]
    pub tid: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
}

impl IdTokenClaims {
    /// Decode the payload segment of a JWT. The signature is not checked:
    /// the token came straight from the token endpoint over TLS and is only
    /// used to label the cached account.
    pub fn decode(jwt: &str) -> Option<Self> {
        let payload = jwt.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// `<oid>.<tid>`, falling back to the subject claim.
    pub fn home_account_id(&self) -> Option<String> {
        match (&self.oid, &self.tid) {
            (Some(oid), Some(tid)) => Some(format!("{oid}.{tid}")),
            (Some(oid), None) => Some(oid.clone()),
            _ => self.sub.clone(),
        }
    }
}
