//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::RelayConfig,
    domain::inbound_queue,
    usecase::{Broadcaster, Dispatcher},
};

use super::{
    handler::{health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket message relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(RelayConfig::default());
/// server.run().await?;
/// ```
pub struct Server {
    config: RelayConfig,
}

impl Server {
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }

    /// Bind to the configured address and serve until a shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener).await
    }

    /// Serve on an already bound listener until a shutdown signal.
    pub async fn serve(self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        tracing::info!("Message relay listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Start the dispatcher task and build the router feeding it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn router(self) -> Router {
        let (inbox, outbox) = inbound_queue();
        let dispatcher = Dispatcher::new(Broadcaster::new(self.config.send_timeout));
        tokio::spawn(dispatcher.run(outbox));

        let app_state = Arc::new(AppState {
            inbox,
            config: self.config,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }
}
