//! Real-time WebSocket message relay.
//!
//! Clients connect over WebSocket, announce a display name and exchange short
//! text messages that are fanned out to every connected client. All registry
//! mutation happens on a single dispatcher task fed by one inbound queue.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
