//! UseCase: Dispatcher
//!
//! 全接続からのイベントを 1 本のキューで受け取り、到着順に処理する唯一のタスク。
//! Registry はこのタスクだけが所有するため、ロックなしで変更の全順序が保証される。
//!
//! | Event     | Registry への作用    | 通知                         |
//! |-----------|----------------------|------------------------------|
//! | Join      | register             | 接続通知（本人のみ）         |
//! | SetName   | set_name             | MemberListUpdated（全員）    |
//! | Leave     | remove + close       | MemberListUpdated（全員）    |
//! | Broadcast | なし                 | MessageBroadcast（全員）     |

use std::sync::Arc;

use crate::domain::{
    ConnectionHandle, ConnectionId, ConnectionRegistry, DisplayName, InboundEvent,
    InboundEventKind, InboundReceiver, OutboundNotification, RegistryError,
};

use super::broadcaster::Broadcaster;

/// Single owner of the connection registry
pub struct Dispatcher {
    registry: ConnectionRegistry,
    broadcaster: Broadcaster,
}

impl Dispatcher {
    pub fn new(broadcaster: Broadcaster) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            broadcaster,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Drain the inbound queue until every sender is dropped.
    ///
    /// Errors from individual events are logged and never stop the loop.
    /// Returns the dispatcher so the final registry can be inspected.
    pub async fn run(mut self, mut inbox: InboundReceiver) -> Self {
        tracing::info!("Dispatcher started");

        while let Some(event) = inbox.recv().await {
            let connection = event.connection;
            match self.handle(event).await {
                Ok(()) => {}
                // Frames already queued when the connection was evicted or left
                Err(e @ RegistryError::UnknownConnection(_)) => {
                    tracing::warn!("Dropping event from '{}': {}", connection, e);
                }
                Err(e) => {
                    tracing::error!("Failed to dispatch event from '{}': {}", connection, e);
                }
            }
        }

        tracing::info!(
            "Dispatcher stopped with {} connection(s) registered",
            self.registry.len()
        );
        self
    }

    /// Apply one inbound event.
    ///
    /// # Errors
    ///
    /// `RegistryError` if the event refers to a connection in a state it cannot
    /// be in (duplicate join, unknown connection).
    pub async fn handle(&mut self, event: InboundEvent) -> Result<(), RegistryError> {
        let InboundEvent { connection, kind } = event;

        match kind {
            InboundEventKind::Join { handle } => self.join(handle).await,
            InboundEventKind::SetName { name } => self.set_name(connection, name).await,
            InboundEventKind::Leave => {
                self.leave(connection).await;
                Ok(())
            }
            InboundEventKind::Broadcast { text } => self.broadcast_message(connection, text).await,
        }
    }

    async fn join(&mut self, handle: Arc<dyn ConnectionHandle>) -> Result<(), RegistryError> {
        let connection = handle.id();
        self.registry.register(handle)?;
        tracing::info!(
            "Connection '{}' registered ({} connected)",
            connection,
            self.registry.len()
        );

        // A failed greeting evicts the connection; nothing else to do here.
        let _ = self
            .broadcaster
            .send_to(
                &mut self.registry,
                connection,
                &OutboundNotification::connected(),
            )
            .await;
        Ok(())
    }

    async fn set_name(
        &mut self,
        connection: ConnectionId,
        name: DisplayName,
    ) -> Result<(), RegistryError> {
        self.registry.set_name(connection, name.clone())?;
        tracing::info!("Connection '{}' is now known as '{}'", connection, name);
        self.publish_member_list().await;
        Ok(())
    }

    async fn leave(&mut self, connection: ConnectionId) {
        match self.registry.remove(connection) {
            Some(handle) => {
                handle.close().await;
                tracing::info!("Connection '{}' left", connection);
            }
            None => tracing::debug!("Connection '{}' already removed", connection),
        }
        self.publish_member_list().await;
    }

    async fn broadcast_message(
        &mut self,
        connection: ConnectionId,
        text: String,
    ) -> Result<(), RegistryError> {
        let author = self.registry.name_of(connection)?.as_str().to_string();
        tracing::debug!("Broadcasting message from '{}'", author);

        let notification = OutboundNotification::MessageBroadcast { author, text };
        self.broadcaster
            .broadcast(&mut self.registry, &notification)
            .await;
        Ok(())
    }

    async fn publish_member_list(&mut self) {
        let notification = OutboundNotification::MemberListUpdated {
            names: self.registry.list_names(),
        };
        self.broadcaster
            .broadcast(&mut self.registry, &notification)
            .await;
    }
}
