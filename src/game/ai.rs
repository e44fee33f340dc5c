//! Server-side AI opponent
//!
//! One agent per AI match. It owns its own seeded RNG so an AI match replays
//! identically for a given seed.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::data::{BuildingData, BuildingType, Race, GROUND_Y};
use super::player::{PlayerId, Position};
use super::GameMatch;

/// Seconds between two placement attempts
pub const AI_BUILD_INTERVAL: f32 = 2.0;
/// The AI stops building once it owns this many buildings
pub const AI_MAX_BUILDINGS: usize = 4;

/// Display name for AI players
pub const AI_NAME: &str = "AI Bot";

pub struct AiAgent {
    rng: ChaCha8Rng,
    build_timer: f32,
}

impl AiAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            build_timer: 0.0,
        }
    }

    pub fn choose_race(&mut self) -> Race {
        Race::ALL.choose(&mut self.rng).copied().unwrap_or(Race::Human)
    }

    /// Let the AI act for one tick of the building phase.
    /// Returns true when it placed a building.
    pub fn act(&mut self, game: &mut GameMatch, ai_id: PlayerId, dt: f32) -> bool {
        self.build_timer += dt;
        if self.build_timer < AI_BUILD_INTERVAL {
            return false;
        }
        self.build_timer = 0.0;

        let Some(ai) = game.player(ai_id) else {
            return false;
        };
        let Some(race) = ai.race else {
            return false;
        };
        if ai.buildings.len() >= AI_MAX_BUILDINGS {
            return false;
        }

        let options: Vec<BuildingType> = BuildingType::for_race(race).collect();
        let Some(&pick) = options.choose(&mut self.rng) else {
            return false;
        };
        if BuildingData::for_type(pick).cost > ai.gold {
            return false;
        }

        let side = ai.side;
        let x = side.mirror_x(self.rng.gen_range(6.0..=10.0));
        let z = self.rng.gen_range(-3.0..=3.0);

        match game.place_building(ai_id, pick, Position::new(x, GROUND_Y, z)) {
            Ok(_) => true,
            Err(err) => {
                debug!(game_id = %game.id, building = ?pick, %err, "AI placement rejected");
                false
            }
        }
    }
}
