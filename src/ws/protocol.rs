//! WebSocket protocol message definitions
//! These are the wire types for client-server communication.
//!
//! Every message is a JSON object `{"type": "<event>", "payload": ...}`;
//! events without data omit `payload`.

use serde::{Deserialize, Serialize};

use crate::game::data::{BuildingType, Race, UnitType};
use crate::game::player::{Building, PlayerId, Position, Side, Unit};
use crate::game::{GameId, MatchPhase};

/// Opponent kind requested through `createGame`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Play against a server-side AI
    Ai,
    /// Queue for a human opponent
    Online,
}

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMsg {
    /// Join an open match or open a new one
    JoinGame { player_name: String },

    /// Enter the global matchmaking pool
    JoinWaitingRoom,

    LeaveWaitingRoom,

    CreateGame { mode: GameMode },

    /// Accept the pending invitation
    AcceptGame,

    DeclineGame { game_id: GameId },

    SelectRace { race: Race },

    PlaceBuilding {
        building_type: BuildingType,
        position: Position,
    },

    /// Skip the rest of the building phase
    StartCombatPhase,

    PlayerReady { ready: bool },

    LeaveGame { game_id: GameId },
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMsg {
    /// Full authoritative state of the player's match
    GameState(GameSnapshot),

    GamePhaseChange(MatchPhase),

    /// Answer to `joinGame`
    JoinGameResult {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        game_id: Option<GameId>,
    },

    /// The match this connection is bound to is live
    GameJoined { game_id: GameId },

    /// A match was found, accept or decline it
    GameInvitation { game_id: GameId },

    /// Both players accepted
    GameAccepted,

    /// Sent to the player who declined (or let the invitation expire)
    GameDeclined,

    OpponentDeclined,

    OpponentDisconnected,

    /// Countdown before race selection starts
    StartCountdown { seconds: u32 },

    WaitingRoomSize { count: usize },

    PlayerJoined(PlayerId),

    PlayerLeft(PlayerId),

    Error(String),
}

/// Full match state broadcast after every change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub phase: MatchPhase,
    /// Whole seconds left in the building phase
    pub time_until_combat: u32,
    pub players: Vec<PlayerSnapshot>,
    pub winner: Option<PlayerId>,
}

/// Player state in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub side: Side,
    pub race: Option<Race>,
    pub gold: u32,
    pub income: u32,
    pub castle_health: i32,
    pub buildings: Vec<BuildingSnapshot>,
    pub units: Vec<UnitSnapshot>,
    #[serde(rename = "isAI")]
    pub is_ai: bool,
    pub is_ready: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingSnapshot {
    pub id: u64,
    #[serde(rename = "type")]
    pub building_type: BuildingType,
    pub position: Position,
    pub health: i32,
    pub cooldown: f32,
    pub max_cooldown: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSnapshot {
    pub id: u64,
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    pub position: Position,
    pub health: i32,
    pub max_health: i32,
    pub damage: i32,
    pub attack_cooldown: f32,
    pub attacking: bool,
}

impl From<&Building> for BuildingSnapshot {
    fn from(b: &Building) -> Self {
        Self {
            id: b.id,
            building_type: b.building_type,
            position: b.position,
            health: b.health,
            cooldown: b.cooldown,
            max_cooldown: b.max_cooldown,
        }
    }
}

impl From<&Unit> for UnitSnapshot {
    fn from(u: &Unit) -> Self {
        Self {
            id: u.id,
            unit_type: u.unit_type,
            position: u.position,
            health: u.health,
            max_health: u.max_health,
            damage: u.damage,
            attack_cooldown: u.attack_cooldown,
            attacking: u.attacking,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn client_events_use_camel_case_names() {
        let msg: ClientMsg = serde_json::from_str(
            r#"{"type":"placeBuilding","payload":{"buildingType":"human_barracks","position":[-6.0,0.5,3.0]}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMsg::PlaceBuilding {
                building_type: BuildingType::HumanBarracks,
                position: Position::new(-6.0, 0.5, 3.0),
            }
        );

        let msg: ClientMsg = serde_json::from_str(r#"{"type":"joinWaitingRoom"}"#).unwrap();
        assert_eq!(msg, ClientMsg::JoinWaitingRoom);

        let msg: ClientMsg =
            serde_json::from_str(r#"{"type":"createGame","payload":{"mode":"ai"}}"#).unwrap();
        assert_eq!(msg, ClientMsg::CreateGame { mode: GameMode::Ai });
    }

    #[test]
    fn unknown_building_is_rejected_at_the_edge() {
        let result = serde_json::from_str::<ClientMsg>(
            r#"{"type":"placeBuilding","payload":{"buildingType":"orc_hut","position":[0,0,0]}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn phase_change_carries_the_phase_name() {
        let json = serde_json::to_value(ServerMsg::GamePhaseChange(MatchPhase::RaceSelection))
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "gamePhaseChange", "payload": "race_selection"})
        );
    }

    #[test]
    fn snapshot_field_names_match_clients() {
        let id = Uuid::nil();
        let snapshot = GameSnapshot {
            game_id: id,
            phase: MatchPhase::Building,
            time_until_combat: 120,
            players: vec![PlayerSnapshot {
                id,
                name: "Alice".into(),
                side: Side::Left,
                race: Some(Race::Human),
                gold: 500,
                income: 10,
                castle_health: 1000,
                buildings: vec![],
                units: vec![],
                is_ai: false,
                is_ready: false,
            }],
            winner: None,
        };
        let json = serde_json::to_value(ServerMsg::GameState(snapshot)).unwrap();
        let payload = &json["payload"];
        assert_eq!(json["type"], "gameState");
        assert_eq!(payload["timeUntilCombat"], 120);
        assert_eq!(payload["players"][0]["castleHealth"], 1000);
        assert_eq!(payload["players"][0]["isAI"], false);
        assert_eq!(payload["players"][0]["race"], "human");
        assert!(payload["winner"].is_null());
    }
}
