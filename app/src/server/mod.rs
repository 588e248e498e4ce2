pub mod api;
pub mod assets;
pub mod router;

use crate::app::SharedState;
use anyhow::Result;
use tokio::task::JoinHandle;

/// Start the axum HTTP server and run until the shutdown token is cancelled.
pub async fn start_server(state: SharedState) -> Result<()> {
    let addr = format!("{}:{}", state.config().bind_address, state.server_port());
    let shutdown_token = state.shutdown_token().clone();
    let app = router::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("QR backdrop server listening on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await?;

    Ok(())
}

/// Run the server in a background task. A failed start or serve cancels the
/// shutdown token so the rest of the process stops waiting on it.
pub fn spawn_server(state: SharedState) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let shutdown_token = state.shutdown_token().clone();
        let result = start_server(state).await;
        if let Err(e) = &result {
            tracing::error!("Server failed: {e}");
            shutdown_token.cancel();
        }
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use std::time::Duration;

    #[tokio::test]
    async fn bind_failure_cancels_shutdown_token() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = AppConfig {
            bind_address: "127.0.0.1".into(),
            server_port: taken.local_addr().unwrap().port(),
            ..AppConfig::default()
        };
        let state = SharedState::new(config);

        let handle = spawn_server(state.clone());
        tokio::time::timeout(Duration::from_secs(5), state.shutdown_token().cancelled())
            .await
            .expect("token should be cancelled after bind failure");
        assert!(handle.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn cancelling_token_stops_running_server() {
        let config = AppConfig {
            bind_address: "127.0.0.1".into(),
            server_port: 0,
            ..AppConfig::default()
        };
        let state = SharedState::new(config);

        let handle = spawn_server(state.clone());
        state.shutdown_token().cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("server should stop after cancellation");
        assert!(result.unwrap().is_ok());
    }
}
