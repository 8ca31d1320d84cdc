use colored::Colorize;

use crate::error::GraphError;
use crate::types::GraphResponse;

/// Text for a successful response: pretty JSON, raw text for other
/// UTF-8 bodies (iCalendar, MIME), a size line for binary content.
pub fn render_response(response: &GraphResponse) -> String {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return format!("{} (no content)", response.status);
    }
    let pretty = serde_json::from_slice::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok());
    if let Some(pretty) = pretty {
        return pretty;
    }
    match std::str::from_utf8(&response.body) {
        Ok(text) => text.to_string(),
        Err(_) => format!(
            "{} ({} bytes of {})",
            response.status,
            response.body.len(),
            response.header("content-type").unwrap_or("binary content")
        ),
    }
}

pub fn print_response(response: &GraphResponse) {
    println!("{}", render_response(response));
}

pub fn print_error(err: &GraphError, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&err.to_json()).unwrap_or_default());
    } else {
        eprintln!("{}", err);
    }
}

/// A `label: value` line, with the label highlighted on a terminal.
pub fn field_line(label: &str, value: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}: {}", label.bold(), value)
    } else {
        format!("{label}: {value}")
    }
}

pub fn state_label(ok: bool, is_tty: bool) -> String {
    let text = if ok { "authenticated" } else { "not authenticated" };
    match (is_tty, ok) {
        (false, _) => text.to_string(),
        (true, true) => text.green().bold().to_string(),
        (true, false) => text.red().bold().to_string(),
    }
}
