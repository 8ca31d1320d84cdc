use std::io::IsTerminal;

use serde::Serialize;

use crate::client::GraphClient;
use crate::config::AppConfig;
use crate::error::GraphError;

use super::output::{field_line, state_label};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub authenticated: bool,
    pub account: Option<String>,
    pub client_type: &'static str,
    pub scopes: Vec<String>,
    pub token_store: String,
    pub timezone: String,
}

impl StatusReport {
    pub fn render(&self, is_tty: bool) -> String {
        let mut lines = vec![
            field_line("Status", &state_label(self.authenticated, is_tty), is_tty),
            field_line("Account", self.account.as_deref().unwrap_or("(none)"), is_tty),
            field_line("Client", self.client_type, is_tty),
            field_line("Scopes", &self.scopes.join(" "), is_tty),
            field_line("Token store", &self.token_store, is_tty),
            field_line("Time zone", &self.timezone, is_tty),
        ];
        if !self.authenticated {
            lines.push("Run `m365graph auth` to sign in.".to_string());
        }
        lines.join("\n")
    }
}

pub async fn collect_status(config: &AppConfig) -> StatusReport {
    let client = GraphClient::from_config(config);
    let authenticated = client.is_authenticated().await;
    let account = client
        .account()
        .await
        .map(|a| a.username.unwrap_or(a.home_account_id));

    StatusReport {
        authenticated,
        account,
        client_type: if config.identity.identity().is_confidential() {
            "confidential"
        } else {
            "public"
        },
        scopes: client.scopes().await.as_slice().to_vec(),
        token_store: config.identity.token_store_path().display().to_string(),
        timezone: client.timezone().to_string(),
    }
}

pub async fn run_status(config: &AppConfig, json: bool) -> Result<(), GraphError> {
    let report = collect_status(config).await;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_default()
        );
    } else {
        println!("{}", report.render(std::io::stdout().is_terminal()));
    }
    Ok(())
}
