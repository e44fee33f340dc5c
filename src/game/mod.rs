//! Game simulation modules

pub mod ai;
pub mod combat;
pub mod data;
pub mod r#match;
pub mod physics;
pub mod player;
pub mod registry;
pub mod snapshot;

pub use ai::AiAgent;
pub use r#match::{ActionError, GameMatch, MatchPhase, MatchSettings};
pub use registry::{ActiveMatch, MatchRegistry};

use uuid::Uuid;

/// Match identifier, also the broadcast group of its players
pub type GameId = Uuid;
