use clap::{Parser, Subcommand};
use m365graph::cli::request::{parse_body, parse_method};
use m365graph::Method;

#[derive(Parser)]
#[command(name = "m365graph", version, about = "Authenticated access to Microsoft Graph")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in interactively and store tokens for later calls
    Auth,

    /// Show whether a token can be obtained without signing in
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Issue one authenticated Graph request and print the response
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        #[arg(value_parser = parse_method)]
        method: Method,

        /// Path relative to the Graph base URL (e.g. /me) or an absolute URL
        path: String,

        /// JSON request body
        #[arg(long, value_parser = parse_body)]
        body: Option<serde_json::Value>,

        /// Print errors as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("M365GRAPH_LOG_LEVEL")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_errors = matches!(cli.command, Commands::Request { json: true, .. });

    let result = run(cli).await;
    if let Err(e) = result {
        if json_errors {
            m365graph::cli::output::print_error(&e, true);
        } else {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), m365graph::GraphError> {
    let config = m365graph::load_config()?;
    match cli.command {
        Commands::Auth => m365graph::cli::auth::run_auth(&config).await,
        Commands::Status { json } => m365graph::cli::status::run_status(&config, json).await,
        Commands::Request {
            method,
            path,
            body,
            json: _,
        } => m365graph::cli::request::run_request(&config, method, &path, body.as_ref()).await,
    }
}
