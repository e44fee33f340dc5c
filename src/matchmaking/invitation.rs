//! Mutual-accept handshake between two paired players

use std::collections::HashSet;
use tokio::task::JoinHandle;

use crate::game::player::PlayerId;
use crate::game::GameId;

/// Invitation to a freshly created match, held until both players accept
#[derive(Debug)]
pub struct PendingInvitation {
    pub game_id: GameId,
    pub players: [PlayerId; 2],
    accepted: HashSet<PlayerId>,
    /// Expiry task, or the countdown task once both accepted
    timer: Option<JoinHandle<()>>,
}

impl PendingInvitation {
    pub fn new(game_id: GameId, players: [PlayerId; 2]) -> Self {
        Self {
            game_id,
            players,
            accepted: HashSet::new(),
            timer: None,
        }
    }

    pub fn involves(&self, player: &PlayerId) -> bool {
        self.players.contains(player)
    }

    /// The other invited player
    pub fn opponent_of(&self, player: &PlayerId) -> Option<PlayerId> {
        match self.players {
            [a, b] if a == *player => Some(b),
            [a, b] if b == *player => Some(a),
            _ => None,
        }
    }

    /// Record an acceptance, returns true once both players accepted
    pub fn accept(&mut self, player: PlayerId) -> bool {
        if self.involves(&player) {
            self.accepted.insert(player);
        }
        self.all_accepted()
    }

    pub fn has_accepted(&self, player: &PlayerId) -> bool {
        self.accepted.contains(player)
    }

    pub fn all_accepted(&self) -> bool {
        self.players.iter().all(|p| self.accepted.contains(p))
    }

    /// Replace the pending timer, cancelling the previous one
    pub fn set_timer(&mut self, handle: JoinHandle<()>) {
        if let Some(old) = self.timer.replace(handle) {
            old.abort();
        }
    }

    pub fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for PendingInvitation {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
