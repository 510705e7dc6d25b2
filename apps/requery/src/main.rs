//! # requery demo binary
//!
//! Runs a scripted multi-producer scenario against a simulated list view to
//! show coalescing, single-flight execution and the mid-flight rerun.
//!
//! ## Usage
//!
//! ```bash
//! # Default scenario (textual surface, 50 ms debounce)
//! requery
//!
//! # Structured surface, JSON output of every issued refresh
//! requery --offline --json-mode
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — REQUERY_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("REQUERY_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "requery=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the requery startup banner.
fn print_banner() {
    println!("requery {} — coalescing refresh scheduler", env!("CARGO_PKG_VERSION"));
    println!("producers -> debounce -> compose -> single-flight refresh");
    println!();
}
