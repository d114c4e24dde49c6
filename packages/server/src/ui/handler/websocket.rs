//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::stream::StreamExt;

use crate::{
    domain::{ConnectionHandle, InboundEvent, InboundEventKind},
    infrastructure::connection::WebSocketConnection,
    ui::{
        reader::{ReaderExit, supervise_reader},
        state::AppState,
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one upgraded connection until its reader stops.
///
/// The handle is registered through the inbound queue before the reader
/// starts, so `Join` always precedes the connection's own events.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();

    let handle = Arc::new(WebSocketConnection::spawn(
        sender,
        state.config.outbound_buffer,
    ));
    let connection = handle.id();
    let closed = handle.closed();
    tracing::info!("Client connected as '{}'", connection);

    if state.inbox.send(InboundEvent::join(handle)).is_err() {
        tracing::error!("Dispatcher is not running, dropping '{}'", connection);
        return;
    }

    let exit = supervise_reader(connection, receiver, state.inbox.clone(), closed).await;
    tracing::info!("Reader for '{}' stopped: {:?}", connection, exit);

    // An evicted or departed connection is already out of the registry.
    let removed = matches!(exit, ReaderExit::DispatcherGone | ReaderExit::Evicted);
    if state.config.leave_on_disconnect && !removed {
        let _ = state
            .inbox
            .send(InboundEvent::new(connection, InboundEventKind::Leave));
    }
}
