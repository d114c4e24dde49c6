//! Connection Handle trait 定義
//!
//! アップグレード済みの双方向トランスポート 1 本を表す抽象。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{ConnectionId, OutboundNotification, SendError};

/// One live bidirectional connection.
///
/// Handles are compared by [`ConnectionId`], never by display name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionHandle: Send + Sync {
    /// Identity of the underlying transport
    fn id(&self) -> ConnectionId;

    /// Deliver a notification to the peer
    async fn send(&self, notification: &OutboundNotification) -> Result<(), SendError>;

    /// Close the transport. Closing twice is a no-op.
    async fn close(&self);
}
