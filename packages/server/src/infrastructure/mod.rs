//! Infrastructure layer: wire DTOs and transport-backed connection handles.

pub mod connection;
pub mod dto;
