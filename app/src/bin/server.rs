//! Server binary: serves the QR backdrop UI and API until Ctrl+C.

use tracing_subscriber::EnvFilter;

use qr_backdrop_lib::app::SharedState;
use qr_backdrop_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting QR backdrop server");

    let config = qr_backdrop_lib::init_config();
    let state = SharedState::new(config);

    let server_handle = server::spawn_server(state.clone());

    tracing::info!(
        port = state.server_port(),
        "Server running. Press Ctrl+C to stop."
    );

    tokio::select! {
        res = tokio::signal::ctrl_c() => res?,
        _ = state.shutdown_token().cancelled() => {}
    }
    tracing::info!("Shutting down...");

    state.shutdown_token().cancel();
    server_handle.await?
}
