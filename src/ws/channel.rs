//! Outbound message routing
//!
//! The orchestrator never touches sockets. It addresses connections and
//! groups through [`GroupChannel`]; [`ConnectionRegistry`] implements it on
//! top of per-connection queues drained by each socket's writer task.

use dashmap::DashMap;
use std::collections::HashSet;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::game::GameId;
use crate::ws::protocol::ServerMsg;

/// Connection identity, also used as the player id
pub type ConnectionId = Uuid;

/// Outbound queue depth per connection
pub const OUTBOUND_QUEUE_SIZE: usize = 256;

/// Broadcast group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupId {
    /// Everyone in the matchmaking pool
    WaitingRoom,
    /// Everyone bound to a match
    Match(GameId),
}

/// Delivery of server events to connections and groups.
/// All sends are fire-and-forget.
pub trait GroupChannel: Send + Sync {
    fn send(&self, group: &GroupId, msg: &ServerMsg);
    fn send_to(&self, conn: ConnectionId, msg: &ServerMsg);
    fn join(&self, group: GroupId, conn: ConnectionId);
    fn leave(&self, group: &GroupId, conn: ConnectionId);
}

/// Live connections and their group memberships
pub struct ConnectionRegistry {
    senders: DashMap<ConnectionId, mpsc::Sender<ServerMsg>>,
    groups: DashMap<GroupId, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            senders: DashMap::new(),
            groups: DashMap::new(),
        }
    }

    /// Register a connection, returning the queue its writer task drains
    pub fn register(&self, conn: ConnectionId) -> mpsc::Receiver<ServerMsg> {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        self.senders.insert(conn, tx);
        rx
    }

    /// Forget a connection and drop it from every group
    pub fn unregister(&self, conn: ConnectionId) {
        self.senders.remove(&conn);
        for mut group in self.groups.iter_mut() {
            group.value_mut().remove(&conn);
        }
        self.groups.retain(|_, members| !members.is_empty());
    }

    pub fn connection_count(&self) -> usize {
        self.senders.len()
    }

    #[cfg(test)]
    pub fn group_size(&self, group: &GroupId) -> usize {
        self.groups.get(group).map(|m| m.len()).unwrap_or(0)
    }

    fn deliver(&self, conn: ConnectionId, msg: ServerMsg) {
        let Some(tx) = self.senders.get(&conn) else {
            debug!(conn_id = %conn, "Dropping message for unknown connection");
            return;
        };
        match tx.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(conn_id = %conn, "Outbound queue full, dropping message");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(conn_id = %conn, "Outbound queue closed");
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupChannel for ConnectionRegistry {
    fn send(&self, group: &GroupId, msg: &ServerMsg) {
        let members: Vec<ConnectionId> = match self.groups.get(group) {
            Some(members) => members.iter().copied().collect(),
            None => return,
        };
        for conn in members {
            self.deliver(conn, msg.clone());
        }
    }

    fn send_to(&self, conn: ConnectionId, msg: &ServerMsg) {
        self.deliver(conn, msg.clone());
    }

    fn join(&self, group: GroupId, conn: ConnectionId) {
        self.groups.entry(group).or_default().insert(conn);
    }

    fn leave(&self, group: &GroupId, conn: ConnectionId) {
        if let Some(mut members) = self.groups.get_mut(group) {
            members.remove(&conn);
        }
        self.groups.remove_if(group, |_, members| members.is_empty());
    }
}
