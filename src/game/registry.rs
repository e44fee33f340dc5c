//! Registry of live matches and the player -> match index

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

use super::ai::AiAgent;
use super::player::PlayerId;
use super::{GameId, GameMatch, MatchPhase};

/// A match plus the server-side state that travels with it
pub struct ActiveMatch {
    pub game: GameMatch,
    /// AI opponent of this match, if any
    pub ai: Option<(PlayerId, AiAgent)>,
    /// The final game-over notification went out
    pub game_over_announced: bool,
}

impl ActiveMatch {
    pub fn new(game: GameMatch) -> Self {
        Self {
            game,
            ai: None,
            game_over_announced: false,
        }
    }
}

/// Shared handle to a match. The mutex is the per-match lock: every action
/// and every tick for one match goes through it.
pub type MatchHandle = Arc<Mutex<ActiveMatch>>;

/// Registry of all active matches
pub struct MatchRegistry {
    matches: DashMap<GameId, MatchHandle>,
    player_matches: DashMap<PlayerId, GameId>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self {
            matches: DashMap::new(),
            player_matches: DashMap::new(),
        }
    }

    pub fn insert(&self, active: ActiveMatch) -> MatchHandle {
        let id = active.game.id;
        let handle = Arc::new(Mutex::new(active));
        self.matches.insert(id, handle.clone());
        handle
    }

    pub fn get(&self, id: &GameId) -> Option<MatchHandle> {
        self.matches.get(id).map(|m| m.value().clone())
    }

    /// Drop a match and every player binding that points at it
    pub fn remove(&self, id: &GameId) -> Option<MatchHandle> {
        self.player_matches.retain(|_, game_id| game_id != id);
        self.matches.remove(id).map(|(_, h)| h)
    }

    /// Snapshot of all handles, so the tick loop never holds a map shard
    /// while it locks a match
    pub fn handles(&self) -> Vec<MatchHandle> {
        self.matches.iter().map(|m| m.value().clone()).collect()
    }

    pub fn bind(&self, player: PlayerId, game: GameId) {
        self.player_matches.insert(player, game);
    }

    pub fn unbind(&self, player: &PlayerId) -> Option<GameId> {
        self.player_matches.remove(player).map(|(_, id)| id)
    }

    pub fn match_of(&self, player: &PlayerId) -> Option<GameId> {
        self.player_matches.get(player).map(|id| *id)
    }

    pub fn active_matches(&self) -> usize {
        self.matches.len()
    }

    pub fn bound_players(&self) -> usize {
        self.player_matches.len()
    }

    /// A waiting match with one human and a free slot
    pub fn find_open_lobby(&self) -> Option<MatchHandle> {
        self.handles().into_iter().find(|handle| {
            let active = handle.lock();
            active.game.phase == MatchPhase::Waiting
                && active.game.player_count() == 1
                && active.ai.is_none()
        })
    }
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::MatchSettings;
    use uuid::Uuid;

    fn lobby(registry: &MatchRegistry, owner: PlayerId) -> GameId {
        let mut game = GameMatch::new(Uuid::new_v4(), 1, MatchSettings::default());
        game.add_player(owner, "Alice".into()).unwrap();
        game.open_lobby().unwrap();
        let id = game.id;
        registry.insert(ActiveMatch::new(game));
        registry.bind(owner, id);
        id
    }

    #[test]
    fn bindings_follow_the_match() {
        let registry = MatchRegistry::new();
        let alice = Uuid::new_v4();
        let id = lobby(&registry, alice);

        assert_eq!(registry.match_of(&alice), Some(id));
        assert_eq!(registry.active_matches(), 1);

        registry.remove(&id);
        assert_eq!(registry.match_of(&alice), None);
        assert_eq!(registry.active_matches(), 0);
    }

    #[test]
    fn open_lobby_needs_a_free_slot() {
        let registry = MatchRegistry::new();
        let id = lobby(&registry, Uuid::new_v4());
        let handle = registry.find_open_lobby().unwrap();
        assert_eq!(handle.lock().game.id, id);

        handle.lock().game.add_player(Uuid::new_v4(), "Bob".into()).unwrap();
        assert!(registry.find_open_lobby().is_none());
    }
}
