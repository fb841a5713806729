//! Insight — selection relay daemon.
//!
//! Accepts text selections from capture surfaces (WebSocket channels or
//! one-shot HTTP), dispatches each to the analysis backend with a bounded
//! timeout, and fans outcomes out to every attached observer plus a durable
//! snapshot for late attachers.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("INSIGHT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "--help" | "-h" | "help" => {
                println!("Insight — selection relay daemon");
                println!();
                println!("Usage: insight");
                println!();
                println!("Environment:");
                println!("  PORT                        HTTP port (default 8000)");
                println!("  INSIGHT_DATA_DIR            Data directory (default ./data)");
                println!("  INSIGHT_BACKEND_URL         Analysis backend (default: built-in /analyze)");
                println!("  INSIGHT_ANALYSIS_TIMEOUT_S  Dispatch bound, 5-30 s (default 10)");
                println!("  OLLAMA_MODEL                Model for analyzer enrichment (optional)");
                return Ok(());
            }
            other => {
                eprintln!("Unknown command: {}. Use 'insight help' for usage.", other);
                std::process::exit(1);
            }
        }
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = insight_core::InsightConfig::from_env(&data_dir)?;
    let port = config.port;

    let store = Arc::new(
        insight_snapshot::SnapshotStore::open(&config.data_paths.snapshot)
            .map_err(|e| anyhow::anyhow!("Failed to open snapshot store: {}", e))?,
    );

    info!("Analysis backend: {}", config.backend_url);
    let state = Arc::new(AppState::new(config, store));

    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Insight relay listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
