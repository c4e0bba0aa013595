//! component-registry HTTP API server.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tower_http::trace::TraceLayer;

use component_registry::server::{AppState, Config, init_logging, router};

/// component-registry HTTP API server.
#[derive(Parser, Debug)]
#[command(name = "component-registry-server")]
#[command(about = "HTTP API server for the component registry")]
struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "component-registry.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration before logging so the subscriber follows it
    let config = Config::from_file(&args.config)?;
    init_logging(&config.logging)?;
    let bind_addr = config.bind_addr();

    tracing::info!(
        path = %config.storage.path,
        seed = config.registry.seed.len(),
        "Opening snapshot store"
    );
    let state = AppState::from_config(&config)?;

    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = bind_addr.parse()?;

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received");
}
