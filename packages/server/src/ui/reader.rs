//! Reader loop: one per connection.
//!
//! Reads frames from the socket, decodes them and forwards the resulting events
//! to the dispatcher. The loop never closes the connection; cleanup is left to
//! the dispatcher (explicit `Leave` or eviction on the next failed send).

use std::fmt::Display;

use axum::extract::ws::Message;
use futures_util::{Stream, StreamExt};
use tokio::sync::watch;

use crate::{
    domain::{ConnectionId, InboundEvent, InboundEventKind, InboundSender},
    infrastructure::dto::websocket::InboundMessage,
};

/// Why a reader loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderExit {
    /// Peer sent a Close frame or the stream ended
    Closed,
    /// The transport returned an error
    ReadFailed,
    /// A text frame was not a valid inbound message
    DecodeFailed,
    /// The dispatcher is no longer receiving events
    DispatcherGone,
    /// The loop panicked
    Faulted,
    /// The connection was closed on the dispatcher side
    Evicted,
}

/// Forward every decoded frame of `stream` to `inbox` until the stream stops.
pub async fn reader_loop<S, E>(
    connection: ConnectionId,
    mut stream: S,
    inbox: InboundSender,
) -> ReaderExit
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("Read from connection '{}' failed: {}", connection, e);
                return ReaderExit::ReadFailed;
            }
        };

        match frame {
            Message::Text(text) => {
                let message = match serde_json::from_str::<InboundMessage>(text.as_str()) {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::warn!("Undecodable frame from '{}': {}", connection, e);
                        return ReaderExit::DecodeFailed;
                    }
                };

                let kind = match InboundEventKind::try_from(message) {
                    Ok(kind) => kind,
                    Err(e) => {
                        tracing::warn!("Ignoring frame from '{}': {}", connection, e);
                        continue;
                    }
                };

                tracing::trace!("Received {:?} from '{}'", kind, connection);
                if inbox.send(InboundEvent::new(connection, kind)).is_err() {
                    return ReaderExit::DispatcherGone;
                }
            }
            Message::Close(_) => {
                tracing::info!("Connection '{}' requested close", connection);
                return ReaderExit::Closed;
            }
            // Ping/pong is handled by the WebSocket protocol
            _ => {}
        }
    }

    ReaderExit::Closed
}

/// Run [`reader_loop`] in its own task so a panic only ends this connection's
/// loop.
///
/// The loop is aborted as soon as `closed` turns `true` (or its sender goes
/// away), which drops the read half of the socket.
pub async fn supervise_reader<S, E>(
    connection: ConnectionId,
    stream: S,
    inbox: InboundSender,
    mut closed: watch::Receiver<bool>,
) -> ReaderExit
where
    S: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
    E: Display + Send + 'static,
{
    let mut reader = tokio::spawn(reader_loop(connection, stream, inbox));

    tokio::select! {
        joined = &mut reader => match joined {
            Ok(exit) => exit,
            Err(e) => {
                tracing::error!("Reader loop for '{}' crashed: {}", connection, e);
                ReaderExit::Faulted
            }
        },
        _ = closed.wait_for(|closed| *closed) => {
            reader.abort();
            tracing::debug!("Reader for connection '{}' stopped after close", connection);
            ReaderExit::Evicted
        }
    }
}
