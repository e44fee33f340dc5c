//! Game server - sessions, matchmaking handshake, match lifecycle and the
//! tick loop that drives every live match.
//!
//! Locking: the lobby mutex guards the waiting room, pending invitations and
//! player names; each match has its own mutex. When both are needed the
//! lobby is always taken first. The tick loop only ever takes match locks.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::game::ai::AI_NAME;
use crate::game::player::PlayerId;
use crate::game::{
    ActionError, ActiveMatch, AiAgent, GameId, GameMatch, MatchPhase, MatchRegistry, MatchSettings,
};
use crate::util::time::{tick_delta, DEFAULT_TICK_RATE};
use crate::ws::channel::{ConnectionId, GroupChannel, GroupId};
use crate::ws::protocol::{ClientMsg, GameMode, ServerMsg};

use super::invitation::PendingInvitation;
use super::queue::{QueuedPlayer, WaitingRoom};

/// Server-wide timings
#[derive(Debug, Clone, Copy)]
pub struct ServerSettings {
    /// Simulation ticks per second
    pub tick_rate: u32,
    pub match_settings: MatchSettings,
    /// Delay between both players accepting and race selection
    pub countdown: Duration,
    /// How long an invitation stays open
    pub invitation_timeout: Duration,
}

impl ServerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tick_rate: config.tick_rate,
            match_settings: MatchSettings {
                building_phase_secs: config.building_phase_secs,
            },
            countdown: Duration::from_secs(config.match_countdown_secs),
            invitation_timeout: Duration::from_secs(config.invitation_timeout_secs),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            match_settings: MatchSettings::default(),
            countdown: Duration::from_secs(3),
            invitation_timeout: Duration::from_secs(20),
        }
    }
}

/// Matchmaking state shared by all connections
#[derive(Default)]
struct Lobby {
    waiting_room: WaitingRoom,
    invitations: HashMap<GameId, PendingInvitation>,
    names: HashMap<PlayerId, String>,
}

impl Lobby {
    fn name_of(&self, id: PlayerId) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| default_name(id))
    }

    fn invitation_of(&self, id: &PlayerId) -> Option<GameId> {
        self.invitations
            .values()
            .find(|i| i.involves(id))
            .map(|i| i.game_id)
    }
}

fn default_name(id: PlayerId) -> String {
    format!("Player_{}", &id.simple().to_string()[..8])
}

/// The authoritative game server
pub struct GameServer {
    settings: ServerSettings,
    channel: Arc<dyn GroupChannel>,
    registry: Arc<MatchRegistry>,
    lobby: Mutex<Lobby>,
}

impl GameServer {
    pub fn new(
        settings: ServerSettings,
        channel: Arc<dyn GroupChannel>,
        registry: Arc<MatchRegistry>,
    ) -> Self {
        Self {
            settings,
            channel,
            registry,
            lobby: Mutex::new(Lobby::default()),
        }
    }

    pub fn registry(&self) -> &Arc<MatchRegistry> {
        &self.registry
    }

    pub fn waiting_room_size(&self) -> usize {
        self.lobby.lock().waiting_room.len()
    }

    /// Run the fixed-rate tick loop
    pub async fn run(self: Arc<Self>) {
        let dt = tick_delta(self.settings.tick_rate);
        let mut ticker = interval(Duration::from_secs_f32(dt));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(tick_rate = self.settings.tick_rate, "Game loop started");

        loop {
            ticker.tick().await;
            self.tick(dt);
        }
    }

    /// Advance every match that is building or fighting by `dt` seconds
    pub fn tick(&self, dt: f32) {
        for handle in self.registry.handles() {
            let mut active = handle.lock();
            let group = GroupId::Match(active.game.id);
            let phase = active.game.phase;

            match phase {
                MatchPhase::Building => {
                    let ActiveMatch { game, ai, .. } = &mut *active;
                    let mut changed = match ai.as_mut() {
                        Some((ai_id, agent)) => agent.act(game, *ai_id, dt),
                        None => false,
                    };

                    let outcome = game.tick(dt);
                    changed |= outcome.state_changed;
                    if let Some(phase) = outcome.phase_change {
                        self.channel.send(&group, &ServerMsg::GamePhaseChange(phase));
                        changed = true;
                    }
                    if changed {
                        self.channel.send(&group, &game.state_message());
                    }
                }
                MatchPhase::Combat => {
                    active.game.tick(dt);
                    self.channel.send(&group, &active.game.state_message());
                    self.announce_game_over(&mut active);
                }
                _ => {}
            }
        }
    }

    /// Send the final phase change once per match
    fn announce_game_over(&self, active: &mut ActiveMatch) {
        if active.game_over_announced || !active.game.is_game_over() {
            return;
        }
        active.game_over_announced = true;

        let group = GroupId::Match(active.game.id);
        self.channel
            .send(&group, &ServerMsg::GamePhaseChange(MatchPhase::GameOver));
        self.channel.send(&group, &active.game.state_message());
        info!(game_id = %active.game.id, winner = ?active.game.winner, "Game over announced");
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    pub fn handle_connect(&self, conn: ConnectionId, name: Option<String>) {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| default_name(conn));
        info!(player_id = %conn, name = %name, "Player connected");
        self.lobby.lock().names.insert(conn, name);
    }

    pub fn handle_message(self: &Arc<Self>, conn: ConnectionId, msg: ClientMsg) {
        debug!(player_id = %conn, ?msg, "Client message");

        match msg {
            ClientMsg::JoinGame { player_name } => self.join_game(conn, player_name),
            ClientMsg::JoinWaitingRoom => self.join_waiting_room(conn),
            ClientMsg::LeaveWaitingRoom => self.leave_waiting_room(conn),
            ClientMsg::CreateGame { mode: GameMode::Ai } => self.create_ai_game(conn),
            ClientMsg::CreateGame {
                mode: GameMode::Online,
            } => self.join_waiting_room(conn),
            ClientMsg::AcceptGame => self.accept_game(conn),
            ClientMsg::DeclineGame { game_id } => self.decline_game(conn, game_id),
            ClientMsg::SelectRace { race } => {
                self.apply_action(conn, |game| game.set_player_race(conn, race))
            }
            ClientMsg::PlaceBuilding {
                building_type,
                position,
            } => self.apply_action(conn, |game| {
                game.place_building(conn, building_type, position).map(|_| ())
            }),
            ClientMsg::StartCombatPhase => self.apply_action(conn, |game| {
                if game.player(conn).is_none() {
                    return Err(ActionError::UnknownPlayer);
                }
                game.start_combat_phase()
            }),
            ClientMsg::PlayerReady { ready } => {
                self.apply_action(conn, |game| game.set_ready(conn, ready))
            }
            ClientMsg::LeaveGame { game_id } => self.leave_game(conn, game_id),
        }
    }

    /// Clean up everything a closed connection was part of
    pub fn handle_disconnect(self: &Arc<Self>, conn: ConnectionId) {
        let mut lobby = self.lobby.lock();

        self.remove_from_waiting_room(&mut lobby, conn);
        if let Some(game_id) = lobby.invitation_of(&conn) {
            self.withdraw_invitation(&mut lobby, conn, game_id, false);
        }
        self.leave_bound_match(&mut lobby, conn);
        lobby.names.remove(&conn);
        drop(lobby);

        info!(player_id = %conn, "Player disconnected");
    }

    fn send_error(&self, conn: ConnectionId, message: impl Into<String>) {
        self.channel.send_to(conn, &ServerMsg::Error(message.into()));
    }

    /// Run a player action against the caller's match and rebroadcast
    fn apply_action<F>(&self, conn: ConnectionId, action: F)
    where
        F: FnOnce(&mut GameMatch) -> Result<(), ActionError>,
    {
        let Some(game_id) = self.registry.match_of(&conn) else {
            self.send_error(conn, "not in a game");
            return;
        };
        let Some(handle) = self.registry.get(&game_id) else {
            error!(player_id = %conn, game_id = %game_id, "Binding points at a missing match");
            self.registry.unbind(&conn);
            self.send_error(conn, "not in a game");
            return;
        };

        let mut active = handle.lock();
        let before = active.game.phase;

        if let Err(err) = action(&mut active.game) {
            debug!(player_id = %conn, game_id = %game_id, %err, "Action rejected");
            self.send_error(conn, err.to_string());
            return;
        }

        let group = GroupId::Match(game_id);
        if active.game.phase != before {
            self.channel
                .send(&group, &ServerMsg::GamePhaseChange(active.game.phase));
        }
        self.channel.send(&group, &active.game.state_message());
    }

    // ------------------------------------------------------------------
    // Direct join
    // ------------------------------------------------------------------

    /// Fill an open lobby, or open a new one
    fn join_game(self: &Arc<Self>, conn: ConnectionId, player_name: String) {
        let mut lobby = self.lobby.lock();
        if !player_name.trim().is_empty() {
            lobby.names.insert(conn, player_name.trim().to_string());
        }

        if lobby.invitation_of(&conn).is_some() || !self.release_idle_binding(conn) {
            self.channel.send_to(
                conn,
                &ServerMsg::JoinGameResult {
                    success: false,
                    game_id: None,
                },
            );
            self.send_error(conn, "already in a game");
            return;
        }
        self.remove_from_waiting_room(&mut lobby, conn);
        let name = lobby.name_of(conn);

        if let Some(handle) = self.registry.find_open_lobby() {
            let mut active = handle.lock();
            let game_id = active.game.id;
            let owner = active.game.players.first().map(|p| p.id);

            let joined = active
                .game
                .add_player(conn, name.clone())
                .and_then(|_| active.game.begin_race_selection());
            if let Err(err) = joined {
                error!(game_id = %game_id, player_id = %conn, %err, "Failed to fill open lobby");
                active.game.remove_player(conn);
            } else {
                self.registry.bind(conn, game_id);
                let group = GroupId::Match(game_id);
                self.channel.join(group, conn);
                self.channel.send_to(
                    conn,
                    &ServerMsg::JoinGameResult {
                        success: true,
                        game_id: Some(game_id),
                    },
                );
                self.channel.send(&group, &ServerMsg::PlayerJoined(conn));
                self.channel.send(&group, &ServerMsg::GameJoined { game_id });
                self.channel.send(&group, &active.game.state_message());
                self.channel
                    .send(&group, &ServerMsg::GamePhaseChange(MatchPhase::RaceSelection));
                drop(active);

                if let Some(owner) = owner {
                    self.remove_from_waiting_room(&mut lobby, owner);
                }
                info!(game_id = %game_id, player_id = %conn, "Player filled open match");
                return;
            }
        }

        let mut game = GameMatch::new(Uuid::new_v4(), rand::random(), self.settings.match_settings);
        let game_id = game.id;
        if let Err(err) = game.add_player(conn, name).and_then(|_| game.open_lobby()) {
            error!(game_id = %game_id, %err, "Failed to open match");
            self.channel.send_to(
                conn,
                &ServerMsg::JoinGameResult {
                    success: false,
                    game_id: None,
                },
            );
            return;
        }
        let state = game.state_message();
        self.registry.insert(ActiveMatch::new(game));
        self.registry.bind(conn, game_id);
        self.channel.join(GroupId::Match(game_id), conn);
        self.channel.send_to(
            conn,
            &ServerMsg::JoinGameResult {
                success: true,
                game_id: Some(game_id),
            },
        );
        self.channel.send_to(conn, &state);

        info!(game_id = %game_id, player_id = %conn, "Opened match, waiting for opponent");
    }

    // ------------------------------------------------------------------
    // Waiting room and invitations
    // ------------------------------------------------------------------

    fn join_waiting_room(self: &Arc<Self>, conn: ConnectionId) {
        let mut lobby = self.lobby.lock();

        if lobby.invitation_of(&conn).is_some() {
            self.send_error(conn, "an invitation is already pending");
            return;
        }
        if !self.release_idle_binding(conn) {
            self.send_error(conn, "already in a game");
            return;
        }

        self.enqueue(&mut lobby, conn);
        self.broadcast_waiting_room_size(&lobby);
        self.try_matchmake(&mut lobby);
    }

    fn leave_waiting_room(&self, conn: ConnectionId) {
        let mut lobby = self.lobby.lock();
        self.remove_from_waiting_room(&mut lobby, conn);
    }

    fn enqueue(&self, lobby: &mut Lobby, conn: ConnectionId) {
        let name = lobby.name_of(conn);
        if lobby.waiting_room.enqueue(QueuedPlayer::new(conn, name)) {
            self.channel.join(GroupId::WaitingRoom, conn);
            info!(player_id = %conn, size = lobby.waiting_room.len(), "Player joined waiting room");
        }
    }

    fn remove_from_waiting_room(&self, lobby: &mut Lobby, conn: ConnectionId) {
        if lobby.waiting_room.dequeue(conn).is_some() {
            self.channel.leave(&GroupId::WaitingRoom, conn);
            self.channel
                .send_to(conn, &ServerMsg::WaitingRoomSize { count: lobby.waiting_room.len() });
            self.broadcast_waiting_room_size(lobby);
        }
    }

    fn broadcast_waiting_room_size(&self, lobby: &Lobby) {
        self.channel.send(
            &GroupId::WaitingRoom,
            &ServerMsg::WaitingRoomSize {
                count: lobby.waiting_room.len(),
            },
        );
    }

    /// Pair waiting players into invitations
    fn try_matchmake(self: &Arc<Self>, lobby: &mut Lobby) {
        let mut paired = false;
        while let Some((a, b)) = lobby.waiting_room.try_pair() {
            self.channel.leave(&GroupId::WaitingRoom, a.id);
            self.channel.leave(&GroupId::WaitingRoom, b.id);
            self.create_invitation(lobby, a, b);
            paired = true;
        }
        if paired {
            self.broadcast_waiting_room_size(lobby);
        }
    }

    fn create_invitation(self: &Arc<Self>, lobby: &mut Lobby, a: QueuedPlayer, b: QueuedPlayer) {
        for player in [&a, &b] {
            self.release_idle_binding(player.id);
        }

        let mut game = GameMatch::new(Uuid::new_v4(), rand::random(), self.settings.match_settings);
        let game_id = game.id;
        if let Err(err) = game
            .add_player(a.id, a.name.clone())
            .and_then(|_| game.add_player(b.id, b.name.clone()))
        {
            error!(game_id = %game_id, %err, "Failed to seat paired players");
            return;
        }

        self.registry.insert(ActiveMatch::new(game));
        let group = GroupId::Match(game_id);
        for id in [a.id, b.id] {
            self.registry.bind(id, game_id);
            self.channel.join(group, id);
        }

        let mut invitation = PendingInvitation::new(game_id, [a.id, b.id]);
        let server = Arc::clone(self);
        let timeout = self.settings.invitation_timeout;
        invitation.set_timer(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            server.expire_invitation(game_id);
        }));
        lobby.invitations.insert(game_id, invitation);

        self.channel.send(&group, &ServerMsg::GameInvitation { game_id });
        info!(
            game_id = %game_id,
            first = %a.id,
            second = %b.id,
            waited_ms = a.wait_time().as_millis() as u64,
            "Match found, invitation sent"
        );
    }

    fn accept_game(self: &Arc<Self>, conn: ConnectionId) {
        let mut lobby = self.lobby.lock();
        let Some(invitation) = lobby.invitations.values_mut().find(|i| i.involves(&conn)) else {
            self.send_error(conn, "no pending invitation");
            return;
        };
        if invitation.all_accepted() || !invitation.accept(conn) {
            return;
        }

        let game_id = invitation.game_id;
        let countdown = self.settings.countdown;
        let group = GroupId::Match(game_id);
        self.channel.send(&group, &ServerMsg::GameAccepted);
        self.channel.send(
            &group,
            &ServerMsg::StartCountdown {
                seconds: countdown.as_secs() as u32,
            },
        );

        let server = Arc::clone(self);
        invitation.set_timer(tokio::spawn(async move {
            tokio::time::sleep(countdown).await;
            server.finish_countdown(game_id);
        }));
        info!(game_id = %game_id, "Both players accepted, countdown started");
    }

    /// Countdown over: the match goes live in race selection
    fn finish_countdown(&self, game_id: GameId) {
        let mut lobby = self.lobby.lock();
        if lobby.invitations.remove(&game_id).is_none() {
            return;
        }
        let Some(handle) = self.registry.get(&game_id) else {
            warn!(game_id = %game_id, "Countdown finished for a discarded match");
            return;
        };

        let mut active = handle.lock();
        if let Err(err) = active.game.begin_race_selection() {
            warn!(game_id = %game_id, %err, "Could not start race selection");
            return;
        }

        let group = GroupId::Match(game_id);
        self.channel.send(&group, &ServerMsg::GameJoined { game_id });
        self.channel.send(&group, &active.game.state_message());
        self.channel
            .send(&group, &ServerMsg::GamePhaseChange(MatchPhase::RaceSelection));
    }

    fn decline_game(self: &Arc<Self>, conn: ConnectionId, game_id: GameId) {
        let mut lobby = self.lobby.lock();
        let involved = lobby
            .invitations
            .get(&game_id)
            .is_some_and(|i| i.involves(&conn));
        if !involved {
            self.send_error(conn, "no such invitation");
            return;
        }
        self.withdraw_invitation(&mut lobby, conn, game_id, true);
    }

    /// `conn` backs out of an invitation. The other player goes back to the
    /// waiting room and the match is discarded.
    fn withdraw_invitation(
        self: &Arc<Self>,
        lobby: &mut Lobby,
        conn: ConnectionId,
        game_id: GameId,
        notify_decliner: bool,
    ) {
        let Some(invitation) = lobby.invitations.remove(&game_id) else {
            return;
        };
        self.discard_match(game_id);

        if notify_decliner {
            self.channel.send_to(conn, &ServerMsg::GameDeclined);
        }
        if let Some(other) = invitation.opponent_of(&conn) {
            self.channel.send_to(other, &ServerMsg::OpponentDeclined);
            self.enqueue(lobby, other);
        }
        info!(game_id = %game_id, player_id = %conn, "Invitation declined");

        self.broadcast_waiting_room_size(lobby);
        self.try_matchmake(lobby);
    }

    /// Nobody answered in time: whoever accepted is requeued, the rest released
    fn expire_invitation(self: &Arc<Self>, game_id: GameId) {
        let mut lobby = self.lobby.lock();
        let expired = lobby
            .invitations
            .get(&game_id)
            .is_some_and(|i| !i.all_accepted());
        if !expired {
            return;
        }
        let Some(invitation) = lobby.invitations.remove(&game_id) else {
            return;
        };
        self.discard_match(game_id);

        for player in invitation.players {
            if invitation.has_accepted(&player) {
                self.channel.send_to(player, &ServerMsg::OpponentDeclined);
                self.enqueue(&mut lobby, player);
            } else {
                self.channel.send_to(player, &ServerMsg::GameDeclined);
            }
        }
        info!(game_id = %game_id, "Invitation expired");

        self.broadcast_waiting_room_size(&lobby);
        self.try_matchmake(&mut lobby);
    }

    // ------------------------------------------------------------------
    // AI matches
    // ------------------------------------------------------------------

    fn create_ai_game(&self, conn: ConnectionId) {
        let mut lobby = self.lobby.lock();
        if lobby.invitation_of(&conn).is_some() || !self.release_idle_binding(conn) {
            self.send_error(conn, "already in a game");
            return;
        }
        self.remove_from_waiting_room(&mut lobby, conn);

        let mut game = GameMatch::new(Uuid::new_v4(), rand::random(), self.settings.match_settings);
        let mut agent = AiAgent::new(rand::random());
        let game_id = game.id;
        let ai_id = Uuid::new_v4();
        let ai_race = agent.choose_race();

        let seated = game
            .add_player(conn, lobby.name_of(conn))
            .and_then(|_| game.add_ai_player(ai_id, AI_NAME.to_string()))
            .and_then(|_| game.begin_race_selection())
            .and_then(|_| game.set_player_race(ai_id, ai_race));
        if let Err(err) = seated {
            error!(game_id = %game_id, %err, "Failed to set up AI match");
            self.send_error(conn, "could not create game");
            return;
        }

        let mut active = ActiveMatch::new(game);
        active.ai = Some((ai_id, agent));
        let handle = self.registry.insert(active);
        self.registry.bind(conn, game_id);

        let group = GroupId::Match(game_id);
        self.channel.join(group, conn);
        self.channel.send(&group, &ServerMsg::GameJoined { game_id });
        self.channel.send(&group, &handle.lock().game.state_message());
        self.channel
            .send(&group, &ServerMsg::GamePhaseChange(MatchPhase::RaceSelection));

        info!(game_id = %game_id, player_id = %conn, ai_race = ?ai_race, "AI match created");
    }

    // ------------------------------------------------------------------
    // Leaving
    // ------------------------------------------------------------------

    fn leave_game(self: &Arc<Self>, conn: ConnectionId, game_id: GameId) {
        let mut lobby = self.lobby.lock();

        if lobby.invitation_of(&conn) == Some(game_id) {
            self.withdraw_invitation(&mut lobby, conn, game_id, true);
            return;
        }
        if self.registry.match_of(&conn) != Some(game_id) {
            self.send_error(conn, "not in that game");
            return;
        }
        self.leave_bound_match(&mut lobby, conn);
    }

    /// Remove `conn` from its match.
    ///
    /// Combat counts as a forfeit. Leaving during race selection or building
    /// sends the match back to waiting and requeues whoever stays. An empty
    /// match is discarded.
    fn leave_bound_match(self: &Arc<Self>, lobby: &mut Lobby, conn: ConnectionId) {
        let Some(game_id) = self.registry.unbind(&conn) else {
            return;
        };
        let group = GroupId::Match(game_id);
        self.channel.leave(&group, conn);

        let Some(handle) = self.registry.get(&game_id) else {
            return;
        };

        let requeue: Vec<PlayerId> = {
            let mut active = handle.lock();
            let phase = active.game.phase;

            if phase == MatchPhase::Combat && active.game.forfeit(conn).is_ok() {
                self.announce_game_over(&mut active);
            }
            active.game.remove_player(conn);

            if active.game.human_count() == 0 {
                drop(active);
                self.discard_match(game_id);
                info!(game_id = %game_id, "Match empty, discarded");
                return;
            }

            self.channel.send(&group, &ServerMsg::PlayerLeft(conn));

            let mut requeue = Vec::new();
            if matches!(phase, MatchPhase::RaceSelection | MatchPhase::Building) {
                active.game.return_to_waiting();
                self.channel
                    .send(&group, &ServerMsg::GamePhaseChange(MatchPhase::Waiting));
                self.channel.send(&group, &ServerMsg::OpponentDisconnected);
                requeue.extend(active.game.players.iter().filter(|p| !p.is_ai).map(|p| p.id));
            }
            self.channel.send(&group, &active.game.state_message());
            requeue
        };

        if requeue.is_empty() {
            return;
        }
        for player in requeue {
            self.enqueue(lobby, player);
        }
        self.broadcast_waiting_room_size(lobby);
        self.try_matchmake(lobby);
    }

    /// Release a binding that no longer ties the player down: a lobby still
    /// waiting for an opponent, or a finished match. Returns false when the
    /// player is in a live match.
    fn release_idle_binding(&self, conn: ConnectionId) -> bool {
        let Some(game_id) = self.registry.match_of(&conn) else {
            return true;
        };
        let Some(handle) = self.registry.get(&game_id) else {
            self.registry.unbind(&conn);
            return true;
        };

        let mut active = handle.lock();
        if !matches!(active.game.phase, MatchPhase::Waiting | MatchPhase::GameOver) {
            return false;
        }

        let group = GroupId::Match(game_id);
        active.game.remove_player(conn);
        self.registry.unbind(&conn);
        self.channel.leave(&group, conn);

        if active.game.human_count() == 0 {
            drop(active);
            self.discard_match(game_id);
        } else {
            self.channel.send(&group, &ServerMsg::PlayerLeft(conn));
            self.channel.send(&group, &active.game.state_message());
        }
        true
    }

    /// Drop a match, its bindings and its broadcast group
    fn discard_match(&self, game_id: GameId) {
        let Some(handle) = self.registry.remove(&game_id) else {
            return;
        };
        let group = GroupId::Match(game_id);
        for player in &handle.lock().game.players {
            self.channel.leave(&group, player.id);
        }
        debug!(game_id = %game_id, "Match discarded");
    }
}
