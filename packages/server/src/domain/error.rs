//! Domain errors.

use std::time::Duration;

use thiserror::Error;

use super::ConnectionId;

/// Registry errors
///
/// どちらも接続ライフサイクルの不整合を示すロジックエラー。黙って無視せず、
/// 呼び出し側でエラーログに残すこと。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The connection is already registered
    #[error("Connection '{0}' is already registered")]
    DuplicateConnection(ConnectionId),

    /// The connection is not registered (never joined or already evicted)
    #[error("Connection '{0}' is not registered")]
    UnknownConnection(ConnectionId),
}

/// Errors raised while sending a notification to one connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The transport is closed (writer stopped or `close` was called)
    #[error("Connection is closed")]
    Closed,

    /// The connection did not accept the notification in time
    #[error("Send timed out after {0:?}")]
    TimedOut(Duration),

    /// The notification could not be encoded for the wire
    #[error("Failed to encode notification: {0}")]
    Encode(String),
}
