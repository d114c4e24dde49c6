//! WebSocket message DTOs.

use serde::{Deserialize, Serialize};

/// Actions a client may send
pub mod action {
    pub const USERNAME: &str = "username";
    pub const LEFT: &str = "left";
    pub const BROADCAST: &str = "broadcast";
    pub const LIST_USERS: &str = "list_users";
}

/// Frame received from a client
///
/// Missing fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InboundMessage {
    pub action: String,
    pub username: String,
    pub message: String,
}

/// Frame sent to clients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub action: String,
    pub message: String,
    pub message_type: String,
    pub connected_users: Vec<String>,
}
