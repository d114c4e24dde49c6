//! UI layer: HTTP/WebSocket transport around the dispatcher.

mod handler;
pub mod reader;
mod server;
mod signal;
pub mod state;

pub use server::Server;
