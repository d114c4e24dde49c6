//! WebSocket を使った ConnectionHandle 実装
//!
//! ## 責務
//!
//! - 通知を JSON フレームにエンコードし、接続ごとの送信バッファに積む
//! - 専用の writer タスク（pusher loop）がバッファを WebSocket へ書き出す
//!
//! ## 設計ノート
//!
//! `send` はバッファに積むだけなので、Dispatcher は遅いクライアントの書き込みを
//! 待たない。バッファが満杯のまま空かない場合は Broadcaster のタイムアウトで
//! evict される。writer タスクが書き込みに失敗して終了すると、以降の `send` は
//! `SendError::Closed` を返す。
//!
//! `close` は writer に Close フレームを送る猶予（`CLOSE_GRACE`）を与え、
//! 書き込みが終わらなければ writer タスクを abort してソケットを解放する。
//! 同時に `closed` チャンネルで reader 側にも終了を通知する。

use std::{fmt::Display, time::Duration};

use async_trait::async_trait;
use axum::extract::ws::Message;
use futures_util::{Sink, SinkExt};
use tokio::{
    sync::{Mutex, mpsc, watch},
    task::JoinHandle,
};

use crate::{
    domain::{ConnectionHandle, ConnectionId, OutboundNotification, SendError},
    infrastructure::dto::websocket::OutboundMessage,
};

/// How long a closed connection's writer may keep flushing before it is aborted
pub const CLOSE_GRACE: Duration = Duration::from_millis(500);

/// Connection handle backed by a WebSocket writer task
pub struct WebSocketConnection {
    id: ConnectionId,
    /// `None` once `close` has been called
    outbound: Mutex<Option<mpsc::Sender<Message>>>,
    /// `None` once `close` has handed the writer to its reaper
    writer: Mutex<Option<JoinHandle<()>>>,
    closed: watch::Sender<bool>,
}

impl WebSocketConnection {
    /// Start the writer task for `sink` and return the handle feeding it.
    ///
    /// # Arguments
    ///
    /// * `sink` - Write half of the upgraded socket
    /// * `buffer` - Number of frames that may wait for the writer
    pub fn spawn<S>(sink: S, buffer: usize) -> Self
    where
        S: Sink<Message> + Unpin + Send + 'static,
        S::Error: Display,
    {
        let id = ConnectionId::generate();
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let writer = pusher_loop(id, rx, sink);
        let (closed, _) = watch::channel(false);
        Self {
            id,
            outbound: Mutex::new(Some(tx)),
            writer: Mutex::new(Some(writer)),
            closed,
        }
    }

    /// Flips to `true` when the connection is closed.
    ///
    /// The read half of the socket should stop once this fires.
    pub fn closed(&self) -> watch::Receiver<bool> {
        self.closed.subscribe()
    }
}

/// Spawns the task that drains `rx` into the WebSocket sink.
///
/// The task ends when a write fails or when the handle is closed; in the latter
/// case a Close frame is sent first.
fn pusher_loop<S>(id: ConnectionId, mut rx: mpsc::Receiver<Message>, mut sink: S) -> JoinHandle<()>
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: Display,
{
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = sink.send(frame).await {
                tracing::debug!("Write to connection '{}' failed: {}", id, e);
                return;
            }
        }

        if let Err(e) = sink.send(Message::Close(None)).await {
            tracing::debug!("Failed to send close frame to '{}': {}", id, e);
        }
        let _ = sink.close().await;
        tracing::debug!("Writer for connection '{}' finished", id);
    })
}

#[async_trait]
impl ConnectionHandle for WebSocketConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, notification: &OutboundNotification) -> Result<(), SendError> {
        let json = serde_json::to_string(&OutboundMessage::from(notification))
            .map_err(|e| SendError::Encode(e.to_string()))?;

        let sender = self.outbound.lock().await.clone().ok_or(SendError::Closed)?;
        sender
            .send(Message::Text(json.into()))
            .await
            .map_err(|_| SendError::Closed)
    }

    async fn close(&self) {
        // Dropping the last sender lets the writer flush and send a Close frame.
        if self.outbound.lock().await.take().is_some() {
            tracing::debug!("Closing connection '{}'", self.id);
        }
        self.closed.send_replace(true);

        let Some(mut writer) = self.writer.lock().await.take() else {
            return;
        };
        let id = self.id;
        tokio::spawn(async move {
            if tokio::time::timeout(CLOSE_GRACE, &mut writer).await.is_err() {
                writer.abort();
                tracing::debug!("Writer for connection '{}' aborted after {:?}", id, CLOSE_GRACE);
            }
        });
    }
}
