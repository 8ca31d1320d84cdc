use std::io::IsTerminal;

use colored::Colorize;

use crate::auth::prompt::ConsolePrompt;
use crate::client::GraphClient;
use crate::config::AppConfig;
use crate::error::GraphError;

/// Run interactive sign-in and persist the resulting tokens.
pub async fn run_auth(config: &AppConfig) -> Result<(), GraphError> {
    let client = GraphClient::from_config(config);
    let mut prompt = ConsolePrompt;
    let account = client.authenticate_interactive(&mut prompt).await?;

    let who = account
        .username
        .as_deref()
        .unwrap_or(account.home_account_id.as_str());
    let msg = format!("Authentication successful! Signed in as {who}");
    if std::io::stdout().is_terminal() {
        println!("{}", msg.green());
    } else {
        println!("{msg}");
    }
    println!(
        "Tokens saved to {}",
        config.identity.token_store_path().display()
    );
    Ok(())
}
