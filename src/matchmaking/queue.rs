//! Global waiting room for online matchmaking

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

use crate::game::player::PlayerId;

/// Player in the waiting room
#[derive(Debug, Clone)]
pub struct QueuedPlayer {
    pub id: PlayerId,
    pub name: String,
    pub queued_at: Instant,
}

impl QueuedPlayer {
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            queued_at: Instant::now(),
        }
    }

    /// How long this player has been waiting
    pub fn wait_time(&self) -> Duration {
        self.queued_at.elapsed()
    }
}

/// FIFO pool of players looking for an opponent
#[derive(Debug, Default)]
pub struct WaitingRoom {
    queue: VecDeque<QueuedPlayer>,
}

impl WaitingRoom {
    /// Add a player. Re-joining keeps the original place in line.
    pub fn enqueue(&mut self, player: QueuedPlayer) -> bool {
        if self.contains(&player.id) {
            return false;
        }
        self.queue.push_back(player);
        true
    }

    /// Remove a player from the pool
    pub fn dequeue(&mut self, id: PlayerId) -> Option<QueuedPlayer> {
        let pos = self.queue.iter().position(|p| p.id == id)?;
        self.queue.remove(pos)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.queue.iter().any(|p| &p.id == id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Take the two longest-waiting players, if there are two
    pub fn try_pair(&mut self) -> Option<(QueuedPlayer, QueuedPlayer)> {
        if self.queue.len() < 2 {
            return None;
        }
        let first = self.queue.pop_front()?;
        let second = self.queue.pop_front()?;
        Some((first, second))
    }
}
