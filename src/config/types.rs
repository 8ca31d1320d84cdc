use std::path::PathBuf;

use crate::scopes::{FeatureFlags, ScopeSet};

pub const DEFAULT_REDIRECT_URI: &str = "https://login.microsoftonline.com/common/oauth2/nativeclient";
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/common";
pub const DEFAULT_TOKEN_PATH: &str = "graph_token.json";
pub const DEFAULT_TIMEZONE: &str = "China Standard Time";
pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// OAuth client identity, fixed when the configuration is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientIdentity {
    Public { client_id: String },
    Confidential { client_id: String, client_secret: String },
}

impl ClientIdentity {
    pub fn client_id(&self) -> &str {
        match self {
            ClientIdentity::Public { client_id } => client_id,
            ClientIdentity::Confidential { client_id, .. } => client_id,
        }
    }

    pub fn client_secret(&self) -> Option<&str> {
        match self {
            ClientIdentity::Public { .. } => None,
            ClientIdentity::Confidential { client_secret, .. } => Some(client_secret),
        }
    }

    pub fn is_confidential(&self) -> bool {
        matches!(self, ClientIdentity::Confidential { .. })
    }
}

/// Everything needed to talk to the identity provider and persist tokens.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    identity: ClientIdentity,
    redirect_uri: String,
    authority: String,
    token_store_path: PathBuf,
}

impl IdentityConfig {
    /// Build a configuration; a secret selects the confidential identity.
    pub fn new(client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        let client_id = client_id.into();
        let identity = match client_secret {
            Some(client_secret) => ClientIdentity::Confidential {
                client_id,
                client_secret,
            },
            None => ClientIdentity::Public { client_id },
        };
        Self {
            identity,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            authority: DEFAULT_AUTHORITY.to_string(),
            token_store_path: PathBuf::from(DEFAULT_TOKEN_PATH),
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_token_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_store_path = path.into();
        self
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub fn client_id(&self) -> &str {
        self.identity.client_id()
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn token_store_path(&self) -> &PathBuf {
        &self.token_store_path
    }
}

/// Process-level settings: identity, enabled capability areas and the
/// time zone Graph should render date/time fields in.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub identity: IdentityConfig,
    pub features: FeatureFlags,
    pub timezone: String,
}

impl AppConfig {
    pub fn new(identity: IdentityConfig) -> Self {
        Self {
            identity,
            features: FeatureFlags::default(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }

    pub fn scopes(&self) -> ScopeSet {
        ScopeSet::from_flags(self.features)
    }
}
