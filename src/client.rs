use reqwest::Method;
use tokio::sync::Mutex;

use crate::auth::broker::TokenBroker;
use crate::auth::cache::Account;
use crate::auth::prompt::UserPrompt;
use crate::config::{AppConfig, GRAPH_BASE_URL};
use crate::error::GraphError;
use crate::scopes::ScopeSet;
use crate::transport::{HttpRequest, HttpTransport};
use crate::transports::ReqwestTransport;
use crate::types::{ErrorEnvelope, GraphResponse};

/// Headers the client always sets itself; callers cannot override them.
const RESERVED_HEADERS: [&str; 2] = ["authorization", "prefer"];

/// The authenticated entry point every capability call goes through.
///
/// Attaches a bearer token and the time zone preference to each request
/// and turns non-2xx answers into [`GraphError::Remote`]. Performs no
/// retries.
#[derive(Debug)]
pub struct GraphClient {
    broker: Mutex<TokenBroker>,
    transport: Box<dyn HttpTransport>,
    base_url: String,
    timezone: String,
}

impl GraphClient {
    pub fn new(
        broker: TokenBroker,
        transport: Box<dyn HttpTransport>,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            broker: Mutex::new(broker),
            transport,
            base_url: GRAPH_BASE_URL.to_string(),
            timezone: timezone.into(),
        }
    }

    /// Client using the Microsoft identity platform and HTTPS transport.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            TokenBroker::from_config(config),
            Box::new(ReqwestTransport::new()),
            config.timezone.clone(),
        )
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// `/me/events` becomes `<base>/me/events`; anything else (such as an
    /// `@odata.nextLink`) is used as-is.
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            path.to_string()
        }
    }

    /// True iff a token can be obtained right now without user interaction.
    pub async fn is_authenticated(&self) -> bool {
        self.broker.lock().await.is_authenticated().await
    }

    pub async fn account(&self) -> Option<Account> {
        self.broker.lock().await.account().cloned()
    }

    pub async fn scopes(&self) -> ScopeSet {
        self.broker.lock().await.scopes().clone()
    }

    pub async fn authenticate_interactive(
        &self,
        prompt: &mut dyn UserPrompt,
    ) -> Result<Account, GraphError> {
        self.broker.lock().await.authenticate_interactive(prompt).await
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<GraphResponse, GraphError> {
        self.request_with_headers(method, path, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        headers: &[(&str, &str)],
    ) -> Result<GraphResponse, GraphError> {
        let token = self
            .broker
            .lock()
            .await
            .get_access_token()
            .await
            .ok_or(GraphError::Unauthenticated)?;

        let mut all_headers: Vec<(String, String)> = headers
            .iter()
            .filter(|(name, _)| {
                !RESERVED_HEADERS
                    .iter()
                    .any(|reserved| name.eq_ignore_ascii_case(reserved))
            })
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        all_headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        all_headers.push((
            "Prefer".to_string(),
            format!("outlook.timezone=\"{}\"", self.timezone),
        ));

        let request = HttpRequest {
            method,
            url: self.resolve_url(path),
            headers: all_headers,
            body: body.cloned(),
        };

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            let err = remote_error(response.status, &response.body);
            tracing::debug!("Graph call failed: {err}");
            return Err(err);
        }
        Ok(response)
    }
}

/// Build the error for a non-2xx response from its body.
pub fn remote_error(status: u16, body: &[u8]) -> GraphError {
    let fallback_message = || {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status")
            .to_string()
    };

    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => GraphError::Remote {
            status,
            code: envelope.error.code,
            message: envelope.error.message.unwrap_or_else(fallback_message),
        },
        Err(_) => GraphError::Remote {
            status,
            code: format!("Http{status}"),
            message: fallback_message(),
        },
    }
}
