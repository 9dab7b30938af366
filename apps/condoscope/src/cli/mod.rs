//! # Condoscope CLI Module
//!
//! This module implements the CLI interface for Condoscope.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `evaluate` - Print the executive summary
//! - `status` - Show row counts
//! - `import` - Load a JSON dataset into the store
//! - `export` - Dump the store as a JSON dataset
//! - `tenants` - List condominium ids present in the store
//! - `init` - Initialize new database

mod commands;

use crate::config::{Backend, CliOverrides, Config, FileConfig};
use clap::{Parser, Subcommand};
use condoscope_core::CondoscopeError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Condoscope - executive risk dashboard for condominium management
///
/// Scores a condominium across seven maturity pillars and lists the
/// alerts that explain the score.
#[derive(Parser, Debug)]
#[command(name = "condoscope")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the config file (default: ./condoscope.toml when present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the database (redb file or JSON dataset)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend
    #[arg(short = 'B', long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the executive summary
    Evaluate {
        /// Only rows of this condominium
        #[arg(short = 'C', long)]
        condominium: Option<String>,

        /// Evaluate as of this date (YYYY-MM-DD) instead of now
        #[arg(long)]
        now: Option<String>,
    },
    /// Show row counts
    Status {
        /// Only rows of this condominium
        #[arg(short = 'C', long)]
        condominium: Option<String>,
    },
    /// Load a JSON dataset into the store
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Dump the store as a JSON dataset
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List condominium ids present in the store
    Tenants,
    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CondoscopeError> {
    let config = resolve_config(&cli)?;
    let json_mode = cli.json_mode;

    tracing::debug!(
        backend = %config.backend,
        database = %config.database.display(),
        "Configuration resolved"
    );

    match cli.command {
        Some(Commands::Server { .. }) => cmd_server(&config).await,
        Some(Commands::Evaluate { condominium, now }) => {
            cmd_evaluate(&config, json_mode, condominium.as_deref(), now.as_deref())
        }
        Some(Commands::Status { condominium }) => {
            cmd_status(&config, json_mode, condominium.as_deref())
        }
        Some(Commands::Import { input }) => cmd_import(&config, &input),
        Some(Commands::Export { output }) => cmd_export(&config, &output),
        Some(Commands::Tenants) => cmd_tenants(&config, json_mode),
        Some(Commands::Init { force }) => cmd_init(&config, force),
        None => {
            // No subcommand - show status by default
            cmd_status(&config, json_mode, None)
        }
    }
}

/// Merge the config file, the environment and the command line.
pub fn resolve_config(cli: &Cli) -> Result<Config, CondoscopeError> {
    let file = FileConfig::load(cli.config.as_deref())?;
    let (host, port) = match &cli.command {
        Some(Commands::Server { host, port }) => (host.clone(), *port),
        _ => (None, None),
    };
    let overrides = CliOverrides {
        host,
        port,
        backend: cli.backend,
        database: cli.database.clone(),
    };
    Config::from_sources(file, overrides)
}

// =============================================================================
// TESTS
// =============================================================================
