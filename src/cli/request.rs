use reqwest::Method;

use crate::client::GraphClient;
use crate::config::AppConfig;
use crate::error::GraphError;

use super::output::print_response;

/// clap value parser for HTTP methods (case-insensitive).
pub fn parse_method(input: &str) -> Result<Method, String> {
    let upper = input.trim().to_ascii_uppercase();
    match upper.as_str() {
        "GET" | "POST" | "PUT" | "PATCH" | "DELETE" => {
            Method::from_bytes(upper.as_bytes()).map_err(|e| e.to_string())
        }
        _ => Err(format!(
            "unsupported method '{input}': expected GET, POST, PUT, PATCH or DELETE"
        )),
    }
}

/// clap value parser for a JSON request body.
pub fn parse_body(input: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(input).map_err(|e| format!("body is not valid JSON: {e}"))
}

/// Issue one authenticated Graph call and print the result.
pub async fn run_request(
    config: &AppConfig,
    method: Method,
    path: &str,
    body: Option<&serde_json::Value>,
) -> Result<(), GraphError> {
    let client = GraphClient::from_config(config);
    let response = client.request(method, path, body).await?;
    print_response(&response);
    Ok(())
}
