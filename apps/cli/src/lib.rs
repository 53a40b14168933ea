//! # shoebox-cli
//!
//! Command-line front-end for the Shoebox inventory.
//!
//! ## Startup Sequence
//! 1. Parse arguments ([`cli::Cli`])
//! 2. Load configuration (`--config` / platform dir / environment)
//! 3. Initialize tracing on stderr
//! 4. Open the database (migrations run on connect)
//! 5. Dispatch to [`commands::execute`]
//!
//! `main.rs` only maps the final [`error::CliError`] to an exit code; the
//! setup lives here so it can be exercised from tests.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

use chrono::Local;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shoebox_db::{AppConfig, Database};

use crate::cli::Cli;
use crate::commands::Context;
use crate::error::CliResult;

/// Loads configuration, applying the `--db` override.
pub fn load_config(cli: &Cli) -> CliResult<AppConfig> {
    let mut config = AppConfig::load(cli.config.clone())?;
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }
    Ok(config)
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins; otherwise the configured level, or `debug` with
/// `--verbose`. Logs go to stderr.
pub fn init_tracing(level: &str, verbose: bool) {
    let fallback = if verbose {
        "debug,sqlx=warn".to_string()
    } else {
        format!("{level},sqlx=warn")
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Runs one CLI invocation against stdout / stdin.
pub async fn run(cli: Cli, config: AppConfig) -> CliResult<()> {
    let db = Database::new(config.db_config()).await?;
    info!(path = %config.database.path.display(), "Database ready");

    let ctx = Context {
        db,
        config,
        config_path: cli.config,
        today: Local::now().date_naive(),
    };

    let stdout = std::io::stdout();
    let stdin = std::io::stdin();
    let result = commands::execute(cli.command, &ctx, &mut stdout.lock(), &mut stdin.lock()).await;

    ctx.db.close().await;
    result
}
