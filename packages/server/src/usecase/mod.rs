//! UseCase layer: serialization of inbound events and fan-out.

pub mod broadcaster;
pub mod dispatcher;

pub use broadcaster::{BroadcastReport, Broadcaster};
pub use dispatcher::Dispatcher;
