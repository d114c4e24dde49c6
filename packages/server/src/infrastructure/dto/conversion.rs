//! Conversion logic between DTOs and domain events.

use thiserror::Error;

use crate::domain::{DisplayName, InboundEventKind, OutboundNotification};
use crate::infrastructure::dto::websocket::{self as dto, action};

/// A decoded frame that does not map to any event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unknown action '{0}'")]
    UnknownAction(String),
}

// ========================================
// DTO → Domain Event
// ========================================

impl TryFrom<dto::InboundMessage> for InboundEventKind {
    type Error = DecodeError;

    fn try_from(message: dto::InboundMessage) -> Result<Self, Self::Error> {
        match message.action.as_str() {
            action::USERNAME => Ok(Self::SetName {
                name: DisplayName::new(message.username),
            }),
            action::LEFT => Ok(Self::Leave),
            action::BROADCAST => Ok(Self::Broadcast {
                text: message.message,
            }),
            _ => Err(DecodeError::UnknownAction(message.action)),
        }
    }
}

// ========================================
// Domain Notification → DTO
// ========================================

impl From<&OutboundNotification> for dto::OutboundMessage {
    fn from(notification: &OutboundNotification) -> Self {
        match notification {
            OutboundNotification::Connected { notice } => Self {
                message: notice.clone(),
                ..Self::default()
            },
            OutboundNotification::MemberListUpdated { names } => Self {
                action: action::LIST_USERS.to_string(),
                connected_users: names.clone(),
                ..Self::default()
            },
            OutboundNotification::MessageBroadcast { author, text } => Self {
                action: action::BROADCAST.to_string(),
                message: format!("<strong>{}</strong>: {}", author, text),
                ..Self::default()
            },
        }
    }
}
