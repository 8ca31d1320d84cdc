use std::io::{BufRead, Write};

use crate::auth::provider::DeviceCode;
use crate::error::GraphError;

/// The human side of interactive authentication.
pub trait UserPrompt {
    /// Tell the user where to go and which code to enter.
    fn show_device_code(&mut self, device: &DeviceCode);

    /// Send the user to `auth_url` and return what they paste back: either
    /// the bare authorization code or the full redirect URL.
    fn request_authorization_code(&mut self, auth_url: &str) -> Result<String, GraphError>;
}

/// Terminal prompt: prints to stdout, reads one line from stdin.
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl UserPrompt for ConsolePrompt {
    fn show_device_code(&mut self, device: &DeviceCode) {
        println!("{}", device.instructions());
    }

    fn request_authorization_code(&mut self, auth_url: &str) -> Result<String, GraphError> {
        println!("Please visit this URL to authorize: {auth_url}");
        if webbrowser::open(auth_url).is_err() {
            tracing::warn!("Could not open browser automatically");
        }
        print!("Enter the code (or the full redirect URL): ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

/// Pull the authorization code out of whatever the user pasted.
///
/// Accepts a full redirect URL, a bare `code=...&state=...` query, or the
/// code itself. An `error` parameter in the pasted query is reported.
pub fn extract_authorization_code(pasted: &str) -> Result<String, GraphError> {
    let input = pasted.trim();
    if input.is_empty() {
        return Err(GraphError::AuthFailed("No authorization code entered".into()));
    }

    if !input.contains('=') {
        return Ok(input.to_string());
    }

    let query = match input.split_once('?') {
        Some((_, q)) => q,
        None => input,
    };
    let query = query.split('#').next().unwrap_or_default();
    let url = reqwest::Url::parse(&format!("http://localhost/?{query}"))
        .map_err(|e| GraphError::AuthFailed(format!("Cannot parse pasted redirect: {e}")))?;

    let mut error = None;
    let mut description = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" if !value.is_empty() => return Ok(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => description = Some(value.into_owned()),
            _ => {}
        }
    }

    Err(GraphError::AuthFailed(match (description, error) {
        (Some(d), _) => d,
        (None, Some(e)) => e,
        (None, None) => "No authorization code found in pasted redirect".to_string(),
    }))
}
