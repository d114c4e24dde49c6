//! Domain layer: connections, the registry and the event model.

pub mod connection;
pub mod error;
pub mod event;
pub mod registry;
pub mod value_object;

pub use connection::ConnectionHandle;
pub use error::{RegistryError, SendError};
pub use event::{
    InboundEvent, InboundEventKind, InboundReceiver, InboundSender, OutboundNotification,
    inbound_queue,
};
pub use registry::ConnectionRegistry;
pub use value_object::{ConnectionId, DisplayName};

#[cfg(test)]
pub use connection::MockConnectionHandle;
