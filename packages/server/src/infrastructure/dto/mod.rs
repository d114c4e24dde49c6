//! Data Transfer Objects (DTOs) for the relay.
//!
//! - `websocket`: JSON frames exchanged over `/ws`
//! - `conversion`: mapping between DTOs and domain events

pub mod conversion;
pub mod websocket;
