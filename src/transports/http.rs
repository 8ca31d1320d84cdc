use async_trait::async_trait;

use crate::error::GraphError;
use crate::transport::{HttpRequest, HttpTransport};
use crate::types::GraphResponse;

/// HTTPS transport over `reqwest`.
///
/// Every call builds its own client, so no connection state is shared
/// between requests.
#[derive(Debug, Default, Clone)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<GraphResponse, GraphError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| GraphError::Transport(Box::new(e)))?;

        let mut http_req = client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            http_req = http_req.header(name.as_str(), value.as_str());
        }
        if let Some(ref body) = request.body {
            http_req = http_req.json(body);
        }

        tracing::debug!("{} {}", request.method, request.url);
        let response = http_req
            .send()
            .await
            .map_err(|e| GraphError::Transport(Box::new(e)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| GraphError::Transport(Box::new(e)))?
            .to_vec();

        tracing::debug!("{} {} -> {status}", request.method, request.url);
        Ok(GraphResponse {
            status,
            headers,
            body,
        })
    }
}
