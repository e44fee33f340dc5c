//! Full-state snapshot building
//!
//! Clients never simulate locally, they render the latest snapshot. Every
//! snapshot therefore carries the whole match, not a delta.

use crate::ws::protocol::{BuildingSnapshot, GameSnapshot, PlayerSnapshot, ServerMsg, UnitSnapshot};

use super::player::Player;
use super::GameMatch;

/// Builds snapshots for network transmission
pub struct SnapshotBuilder;

impl SnapshotBuilder {
    pub fn build(game: &GameMatch) -> GameSnapshot {
        GameSnapshot {
            game_id: game.id,
            phase: game.phase,
            time_until_combat: game.time_until_combat,
            players: game.players.iter().map(Self::player).collect(),
            winner: game.winner,
        }
    }

    pub fn player(p: &Player) -> PlayerSnapshot {
        PlayerSnapshot {
            id: p.id,
            name: p.name.clone(),
            side: p.side,
            race: p.race,
            gold: p.gold,
            income: p.income,
            castle_health: p.castle_health,
            buildings: p.buildings.iter().map(BuildingSnapshot::from).collect(),
            units: p.units.iter().map(UnitSnapshot::from).collect(),
            is_ai: p.is_ai,
            is_ready: p.is_ready,
        }
    }
}

impl GameMatch {
    pub fn snapshot(&self) -> GameSnapshot {
        SnapshotBuilder::build(self)
    }

    /// `gameState` message for broadcasting
    pub fn state_message(&self) -> ServerMsg {
        ServerMsg::GameState(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::data::{BuildingType, Race};
    use crate::game::player::Position;
    use crate::game::{MatchPhase, MatchSettings};
    use uuid::Uuid;

    #[test]
    fn snapshot_mirrors_match_state() {
        let mut game = GameMatch::new(Uuid::new_v4(), 3, MatchSettings::default());
        let alice = Uuid::new_v4();
        let bot = Uuid::new_v4();
        game.add_player(alice, "Alice".into()).unwrap();
        game.add_ai_player(bot, "AI Bot".into()).unwrap();
        game.begin_race_selection().unwrap();
        game.set_player_race(bot, Race::Fire).unwrap();
        game.set_player_race(alice, Race::Human).unwrap();
        game.place_building(alice, BuildingType::HumanBarracks, Position::new(-6.0, 0.5, 0.0))
            .unwrap();

        let snapshot = game.snapshot();
        assert_eq!(snapshot.game_id, game.id);
        assert_eq!(snapshot.phase, MatchPhase::Building);
        assert_eq!(snapshot.time_until_combat, 120);
        assert_eq!(snapshot.players.len(), 2);

        let human = &snapshot.players[0];
        assert_eq!(human.id, alice);
        assert_eq!(human.gold, 350);
        assert_eq!(human.buildings.len(), 1);
        assert_eq!(human.buildings[0].building_type, BuildingType::HumanBarracks);
        assert!(!human.is_ai);

        let ai = &snapshot.players[1];
        assert!(ai.is_ai && ai.is_ready);
        assert_eq!(ai.race, Some(Race::Fire));
        assert_eq!(ai.buildings.len(), 3);
    }

    #[test]
    fn state_message_is_a_game_state_event() {
        let game = GameMatch::new(Uuid::new_v4(), 3, MatchSettings::default());
        assert!(matches!(game.state_message(), ServerMsg::GameState(s) if s.players.is_empty()));
    }
}
