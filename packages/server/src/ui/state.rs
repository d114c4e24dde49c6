//! Server state shared with the handlers.

use crate::{config::RelayConfig, domain::InboundSender};

/// Shared application state
///
/// The registry is not here: only the dispatcher task owns it. Handlers talk
/// to it through the inbound queue.
pub struct AppState {
    /// Producer side of the inbound event queue
    pub inbox: InboundSender,
    pub config: RelayConfig,
}
