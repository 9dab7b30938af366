//! # Condoscope - Executive Risk Dashboard
//!
//! The main binary for the Condoscope condominium scoring service.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for evaluation, import and export
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │            apps/condoscope (THE BINARY)           │
//! │                                                   │
//! │   ┌─────────────┐            ┌─────────────┐      │
//! │   │    CLI      │            │  HTTP API   │      │
//! │   │   (clap)    │            │   (axum)    │      │
//! │   └──────┬──────┘            └──────┬──────┘      │
//! │          └─────────────┬────────────┘             │
//! │                        ▼                          │
//! │               ┌─────────────────┐                 │
//! │               │ condoscope-core │                 │
//! │               │   (THE LOGIC)   │                 │
//! │               └─────────────────┘                 │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! condoscope server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! condoscope import -i dataset.json
//! condoscope evaluate --condominium c-1
//! condoscope status
//! ```

use clap::Parser;
use condoscope::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // CONDOSCOPE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("CONDOSCOPE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "condoscope=debug,condoscope_core=debug,tower_http=debug"
    } else {
        "condoscope=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

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

    if !cli.quiet {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Condoscope startup banner.
fn print_banner() {
    println!(
        r#"
   ___              _
  / __|___ _ _  __| |___ ___ __ ___ _ __  ___
 | (__/ _ \ ' \/ _` / _ (_-</ _/ _ \ '_ \/ -_)
  \___\___/_||_\__,_\___/__/\__\___/ .__/\___|
                                   |_|
  Executive Risk Dashboard v{}

  Governance • Finance • Maintenance • Compliance
"#,
        env!("CARGO_PKG_VERSION")
    );
}
