//! dedupit server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use dedupit::DedupeConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(DedupeConfig::from_env());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(target: "dedupit::server", error = %err, %addr, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(target: "dedupit::server", %addr, "dedupit server listening");

    let app = dedupit_server::router(config);
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(target: "dedupit::server", error = %err, "server exited with error");
        std::process::exit(1);
    }

    tracing::info!(target: "dedupit::server", "shut down cleanly");
}

async fn shutdown_signal() {
    // Either signal handler failing means we just serve until killed
    let _ = tokio::signal::ctrl_c().await;
}
