//! Broadcaster: fan-out with eviction
//!
//! ## 概要
//!
//! Registry のスナップショットに対して通知を送信し、送信に失敗した接続を
//! Registry から取り除いて閉じる（eviction）。
//!
//! - 1 つの接続の失敗が他の接続への配信を妨げることはない
//! - 再送はしない
//! - 各接続への送信は並行に行い、`send_timeout` で打ち切る
//! - eviction によるメンバー一覧の再通知は行わない

use std::time::Duration;

use futures_util::future::join_all;

use crate::domain::{
    ConnectionHandle, ConnectionId, ConnectionRegistry, OutboundNotification, SendError,
};

/// Outcome of one fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Number of connections that accepted the notification
    pub delivered: usize,
    /// Connections removed because their send failed
    pub evicted: Vec<ConnectionId>,
}

#[derive(Debug, Clone)]
pub struct Broadcaster {
    send_timeout: Duration,
}

impl Broadcaster {
    pub fn new(send_timeout: Duration) -> Self {
        Self { send_timeout }
    }

    /// Send `notification` to every registered connection.
    ///
    /// Connections whose send fails or times out are evicted before this
    /// returns.
    pub async fn broadcast(
        &self,
        registry: &mut ConnectionRegistry,
        notification: &OutboundNotification,
    ) -> BroadcastReport {
        let recipients = registry.snapshot();

        let outcomes = join_all(recipients.iter().map(|(id, handle)| {
            let id = *id;
            async move { (id, self.deliver(handle.as_ref(), notification).await) }
        }))
        .await;

        let mut report = BroadcastReport::default();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!("Failed to send to connection '{}': {}", id, e);
                    self.evict(registry, id).await;
                    report.evicted.push(id);
                }
            }
        }

        tracing::debug!(
            "Broadcast delivered to {} connection(s), evicted {}",
            report.delivered,
            report.evicted.len()
        );
        report
    }

    /// Send `notification` to a single registered connection, evicting it on
    /// failure.
    ///
    /// Sending to a connection that is not registered is a no-op.
    pub async fn send_to(
        &self,
        registry: &mut ConnectionRegistry,
        id: ConnectionId,
        notification: &OutboundNotification,
    ) -> Result<(), SendError> {
        let Some(handle) = registry.handle(id) else {
            tracing::debug!("Connection '{}' not registered, skipping send", id);
            return Ok(());
        };

        if let Err(e) = self.deliver(handle.as_ref(), notification).await {
            tracing::warn!("Failed to send to connection '{}': {}", id, e);
            self.evict(registry, id).await;
            return Err(e);
        }
        Ok(())
    }

    async fn deliver(
        &self,
        handle: &dyn ConnectionHandle,
        notification: &OutboundNotification,
    ) -> Result<(), SendError> {
        match tokio::time::timeout(self.send_timeout, handle.send(notification)).await {
            Ok(result) => result,
            Err(_) => Err(SendError::TimedOut(self.send_timeout)),
        }
    }

    async fn evict(&self, registry: &mut ConnectionRegistry, id: ConnectionId) {
        if let Some(handle) = registry.remove(id) {
            handle.close().await;
            tracing::info!("Evicted connection '{}'", id);
        }
    }
}
