//! # shoebox-web
//!
//! ```bash
//! shoebox-web                      # platform config file, or defaults
//! shoebox-web ./shoebox.toml       # explicit config file
//! SHOEBOX_WEB_PORT=9000 shoebox-web
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use tokio::net::TcpListener;
use tracing::{error, info};

use shoebox_db::{AppConfig, Database};
use shoebox_web::{app, init_tracing, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);

    let config = match AppConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::from(2);
        }
    };
    init_tracing(&config.log_level);

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server stopped: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(path = %config.database.path.display(), "Opening database");
    let db = Database::new(config.db_config()).await?;

    let state = AppState::new(db.clone(), config.inventory.clone());
    let address = config.web.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("🚀 Shoebox API listening on http://{}", address);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
