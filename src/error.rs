#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Not authenticated. Run: m365graph auth")]
    Unauthenticated,

    #[error("Microsoft Graph API error ({code}): {message}")]
    Remote {
        status: u16,
        code: String,
        message: String,
    },

    /// A 2xx response whose body could not be decoded.
    #[error("Invalid response from Microsoft Graph (HTTP {status}): {message}")]
    Decode { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    #[error("Token cache is corrupt: {0}")]
    CacheCorrupt(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphError {
    /// Error code string for structured JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            GraphError::Unauthenticated => "unauthenticated",
            GraphError::Remote { .. } => "remote_error",
            GraphError::Decode { .. } => "decode_error",
            GraphError::Transport(_) => "transport_error",
            GraphError::CacheCorrupt(_) => "cache_corrupt",
            GraphError::Config(_) => "config_error",
            GraphError::AuthFailed(_) => "auth_failed",
            GraphError::Io(_) => "io_error",
        }
    }

    /// HTTP status of the Graph response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            GraphError::Remote { status, .. } | GraphError::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Provider error code (e.g. `ItemNotFound`), for remote errors.
    pub fn remote_code(&self) -> Option<&str> {
        match self {
            GraphError::Remote { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        if let Some(status) = self.status() {
            obj.insert("status".into(), serde_json::Value::from(status));
        }
        if let Some(remote) = self.remote_code() {
            obj.insert("remoteCode".into(), serde_json::Value::String(remote.to_string()));
        }
        obj.insert("message".into(), serde_json::Value::String(self.to_string()));
        obj.insert("code".into(), serde_json::Value::String(self.code().to_string()));
        serde_json::json!({ "error": obj })
    }
}
