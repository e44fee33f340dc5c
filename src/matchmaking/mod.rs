//! Matchmaking and match orchestration

pub mod invitation;
pub mod queue;
pub mod service;

pub use service::{GameServer, ServerSettings};
