//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::MatchRegistry;
use crate::matchmaking::{GameServer, ServerSettings};
use crate::ws::channel::{ConnectionRegistry, GroupChannel};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub connections: Arc<ConnectionRegistry>,
    pub server: Arc<GameServer>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        // Live sockets double as the server's broadcast channel
        let connections = Arc::new(ConnectionRegistry::new());
        let channel: Arc<dyn GroupChannel> = connections.clone();

        let server = Arc::new(GameServer::new(
            ServerSettings::from_config(&config),
            channel,
            Arc::new(MatchRegistry::new()),
        ));

        Self {
            config,
            connections,
            server,
        }
    }
}
