use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::token::TokenGrant;
use crate::error::GraphError;
use crate::scopes::ScopeSet;

/// Access tokens this close to expiry are treated as already expired.
const EXPIRY_SKEW_SECS: i64 = 300;

/// Placeholder id for accounts whose grant carried no ID token.
pub const LOCAL_ACCOUNT_ID: &str = "local";

/// A previously authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub home_account_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AccessTokenEntry {
    pub home_account_id: String,
    pub secret: String,
    pub scopes: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

impl AccessTokenEntry {
    fn is_usable(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECS) < self.expires_at
    }

    fn overlaps(&self, scopes: &[String]) -> bool {
        self.scopes
            .iter()
            .any(|have| scopes.iter().any(|s| s.eq_ignore_ascii_case(have)))
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshTokenEntry {
    pub home_account_id: String,
    pub secret: String,
}

/// Serializable store of every account and token the broker knows about.
///
/// Mutations raise an in-memory change flag that the credential store uses
/// to decide whether the file needs rewriting.
#[derive(Default, Serialize, Deserialize)]
pub struct TokenCache {
    #[serde(default, rename = "Account")]
    accounts: Vec<Account>,
    #[serde(default, rename = "AccessToken")]
    access_tokens: Vec<AccessTokenEntry>,
    #[serde(default, rename = "RefreshToken")]
    refresh_tokens: Vec<RefreshTokenEntry>,
    #[serde(skip)]
    state_changed: bool,
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("accounts", &self.accounts)
            .field("access_tokens", &self.access_tokens.len())
            .field("refresh_tokens", &self.refresh_tokens.len())
            .field("state_changed", &self.state_changed)
            .finish()
    }
}

impl TokenCache {
    pub fn from_json(data: &str) -> Result<Self, GraphError> {
        serde_json::from_str(data).map_err(|e| GraphError::CacheCorrupt(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, GraphError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GraphError::CacheCorrupt(format!("Failed to serialize token cache: {e}")))
    }

    pub fn has_state_changed(&self) -> bool {
        self.state_changed
    }

    pub(crate) fn clear_state_changed(&mut self) {
        self.state_changed = false;
    }

    /// Accounts in discovery order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// An unexpired access token for `account` that covers all of `scopes`.
    pub fn find_access_token(&self, account: &Account, scopes: &ScopeSet) -> Option<&str> {
        let now = Utc::now();
        self.access_tokens
            .iter()
            .filter(|at| at.home_account_id == account.home_account_id)
            .find(|at| at.is_usable(now) && scopes.is_covered_by(&at.scopes))
            .map(|at| at.secret.as_str())
    }

    pub fn refresh_token_for(&self, account: &Account) -> Option<&str> {
        self.refresh_tokens
            .iter()
            .find(|rt| rt.home_account_id == account.home_account_id)
            .map(|rt| rt.secret.as_str())
    }

    /// Record a token grant, returning the account it belongs to.
    ///
    /// The account comes from the grant's ID token when present, otherwise
    /// `known` (the account being refreshed), otherwise a local placeholder.
    /// Access tokens sharing any scope with the new one are replaced.
    pub fn apply_grant(
        &mut self,
        grant: &TokenGrant,
        requested: &ScopeSet,
        known: Option<&Account>,
    ) -> Account {
        let account = match grant.claims() {
            Some(claims) => Account {
                home_account_id: claims
                    .home_account_id()
                    .unwrap_or_else(|| LOCAL_ACCOUNT_ID.to_string()),
                username: claims.preferred_username.clone(),
                tenant_id: claims.tid.clone(),
            },
            None => known.cloned().unwrap_or_else(|| Account {
                home_account_id: LOCAL_ACCOUNT_ID.to_string(),
                username: None,
                tenant_id: None,
            }),
        };

        match self
            .accounts
            .iter_mut()
            .find(|a| a.home_account_id == account.home_account_id)
        {
            Some(existing) => *existing = account.clone(),
            None => self.accounts.push(account.clone()),
        }

        let scopes = grant
            .granted_scopes()
            .unwrap_or_else(|| requested.as_slice().to_vec());
        self.access_tokens.retain(|at| {
            at.home_account_id != account.home_account_id || !at.overlaps(&scopes)
        });
        self.access_tokens.push(AccessTokenEntry {
            home_account_id: account.home_account_id.clone(),
            secret: grant.access_token.clone(),
            scopes,
            expires_at: grant.expires_at(),
        });

        if let Some(ref rt) = grant.refresh_token {
            self.refresh_tokens
                .retain(|r| r.home_account_id != account.home_account_id);
            self.refresh_tokens.push(RefreshTokenEntry {
                home_account_id: account.home_account_id.clone(),
                secret: rt.clone(),
            });
        }

        self.state_changed = true;
        account
    }
}
