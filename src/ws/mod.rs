//! WebSocket transport

pub mod channel;
pub mod handler;
pub mod protocol;
