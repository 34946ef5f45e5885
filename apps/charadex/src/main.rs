//! # Charadex
//!
//! Browse, filter and star characters from a GraphQL catalog.
//!
//! ## Usage
//!
//! ```bash
//! # List characters (default view: everyone not starred, A to Z)
//! charadex list --species human --sort desc
//!
//! # Exact-name detail
//! charadex show "Rick Sanchez"
//!
//! # Favorites
//! charadex star 1
//! charadex comment 1 "the smartest man in the universe"
//! charadex favorites
//!
//! # Interactive session and HTTP API
//! charadex browse
//! charadex serve --port 8787
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // CHARADEX_LOG_FORMAT=json enables machine-parseable output.
    // Logs go to stderr; stdout carries command output.
    let log_format = std::env::var("CHARADEX_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "charadex=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = charadex::cli::Cli::parse();

    if let Err(e) = charadex::cli::execute(cli).await {
        tracing::error!(error = ?e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
