//! Inbound events and outbound notifications.

use std::{fmt, sync::Arc};

use tokio::sync::mpsc;

use super::{ConnectionHandle, ConnectionId, DisplayName};

/// Producer side of the inbound event queue (one clone per connection)
pub type InboundSender = mpsc::UnboundedSender<InboundEvent>;

/// Consumer side of the inbound event queue (owned by the dispatcher)
pub type InboundReceiver = mpsc::UnboundedReceiver<InboundEvent>;

/// Create the inbound event queue.
///
/// The queue is unbounded: producers never wait for the dispatcher.
pub fn inbound_queue() -> (InboundSender, InboundReceiver) {
    mpsc::unbounded_channel()
}

/// An event emitted on behalf of one connection
#[derive(Debug)]
pub struct InboundEvent {
    /// Originating connection
    pub connection: ConnectionId,
    pub kind: InboundEventKind,
}

impl InboundEvent {
    pub fn new(connection: ConnectionId, kind: InboundEventKind) -> Self {
        Self { connection, kind }
    }

    /// A freshly upgraded connection asking to be registered
    pub fn join(handle: Arc<dyn ConnectionHandle>) -> Self {
        Self {
            connection: handle.id(),
            kind: InboundEventKind::Join { handle },
        }
    }
}

pub enum InboundEventKind {
    /// Register the connection with an empty name
    Join { handle: Arc<dyn ConnectionHandle> },
    /// Announce or change the display name
    SetName { name: DisplayName },
    /// Leave the relay
    Leave,
    /// Send a text message to everyone
    Broadcast { text: String },
}

impl fmt::Debug for InboundEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Join { handle } => f.debug_struct("Join").field("handle", &handle.id()).finish(),
            Self::SetName { name } => f.debug_struct("SetName").field("name", name).finish(),
            Self::Leave => f.write_str("Leave"),
            Self::Broadcast { text } => f.debug_struct("Broadcast").field("text", text).finish(),
        }
    }
}

/// A notification fanned out to connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundNotification {
    /// Greeting sent once to a connection right after it joins
    Connected { notice: String },
    /// Sorted list of named members
    MemberListUpdated { names: Vec<String> },
    /// Text message from a member
    MessageBroadcast { author: String, text: String },
}

impl OutboundNotification {
    pub const CONNECTED_NOTICE: &'static str = "<em><small>Connected to server</small></em>";

    pub fn connected() -> Self {
        Self::Connected {
            notice: Self::CONNECTED_NOTICE.to_string(),
        }
    }
}
