//! Per-match entities: players, their buildings and their units

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::combat::CombatSystem;
use crate::game::data::{
    BuildingCategory, BuildingData, BuildingType, Race, UnitData, UnitType, BASE_INCOME,
    BUILD_ZONE_HALF_WIDTH, CASTLE_MAX_HEALTH, CASTLE_X, CASTLE_Y, STARTING_GOLD,
};

/// Connection identity of a player (AI players get a synthetic one)
pub type PlayerId = Uuid;

/// Building/unit id, unique within a match
pub type EntityId = u64;

/// Point on the board. Serialized as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f32; 3]> for Position {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Position> for [f32; 3] {
    fn from(p: Position) -> Self {
        [p.x, p.y, p.z]
    }
}

/// Half of the board a player builds on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Which way units of this side walk along x
    pub fn forward(self) -> f32 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }

    /// Inclusive x range this side may build in
    pub fn build_zone(self) -> (f32, f32) {
        match self {
            Side::Left => (-BUILD_ZONE_HALF_WIDTH, 0.0),
            Side::Right => (0.0, BUILD_ZONE_HALF_WIDTH),
        }
    }

    /// Castle belonging to this side
    pub fn castle_position(self) -> Position {
        match self {
            Side::Left => Position::new(-CASTLE_X, CASTLE_Y, 0.0),
            Side::Right => Position::new(CASTLE_X, CASTLE_Y, 0.0),
        }
    }

    /// Mirror an x coordinate written for the right side
    pub fn mirror_x(self, x: f32) -> f32 {
        match self {
            Side::Left => -x,
            Side::Right => x,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub building_type: BuildingType,
    pub position: Position,
    pub health: i32,
    /// Seconds until the next spawn
    pub cooldown: f32,
    pub max_cooldown: f32,
}

impl Building {
    /// Fresh building with a full cooldown
    pub fn new(id: EntityId, building_type: BuildingType, position: Position) -> Self {
        let data = BuildingData::for_type(building_type);
        Self {
            id,
            building_type,
            position,
            health: data.health,
            cooldown: data.cooldown,
            max_cooldown: data.cooldown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    pub position: Position,
    pub health: i32,
    pub max_health: i32,
    pub damage: i32,
    /// Seconds until the next attack; zero or below means ready
    pub attack_cooldown: f32,
    /// Engaged in combat during the last tick
    pub attacking: bool,
}

impl Unit {
    /// New unit with catalog stats, ready to attack
    pub fn spawn(id: EntityId, unit_type: UnitType, position: Position) -> Self {
        let data = UnitData::for_type(unit_type);
        Self {
            id,
            unit_type,
            position,
            health: data.health,
            max_health: data.health,
            damage: data.damage,
            attack_cooldown: 0.0,
            attacking: false,
        }
    }
}

/// Player state in a match (authoritative)
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub side: Side,
    pub race: Option<Race>,
    pub gold: u32,
    /// Gold per second
    pub income: u32,
    pub castle_health: i32,
    pub buildings: Vec<Building>,
    pub units: Vec<Unit>,
    pub is_ai: bool,
    pub is_ready: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: String, side: Side) -> Self {
        Self {
            id,
            name,
            side,
            race: None,
            gold: STARTING_GOLD,
            income: BASE_INCOME,
            castle_health: CASTLE_MAX_HEALTH,
            buildings: Vec::new(),
            units: Vec::new(),
            is_ai: false,
            is_ready: false,
        }
    }

    /// AI players are always ready
    pub fn new_ai(id: PlayerId, name: String, side: Side) -> Self {
        Self {
            is_ai: true,
            is_ready: true,
            ..Self::new(id, name, side)
        }
    }

    /// Back to match-start state, keeping identity and side
    pub fn reset(&mut self) {
        let mut fresh = Self::new(self.id, std::mem::take(&mut self.name), self.side);
        fresh.is_ai = self.is_ai;
        fresh.is_ready = self.is_ai;
        *self = fresh;
    }

    pub fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Returns false (and leaves gold untouched) when the player can't pay
    pub fn deduct_gold(&mut self, amount: u32) -> bool {
        match self.gold.checked_sub(amount) {
            Some(rest) => {
                self.gold = rest;
                true
            }
            None => false,
        }
    }

    /// Base income plus every owned economy building
    pub fn recalculate_income(&mut self) {
        self.income = BASE_INCOME
            + self
                .buildings
                .iter()
                .map(|b| BuildingData::for_type(b.building_type))
                .filter(|data| data.category == BuildingCategory::Economy)
                .map(|data| data.income_bonus)
                .sum::<u32>();
    }

    pub fn add_building(&mut self, building: Building) {
        self.buildings.push(building);
        self.recalculate_income();
    }

    pub fn add_unit(&mut self, unit: Unit) {
        self.units.push(unit);
    }

    /// Remove a unit by id. Removing an id twice is a no-op.
    pub fn remove_unit(&mut self, id: EntityId) -> bool {
        let before = self.units.len();
        self.units.retain(|u| u.id != id);
        self.units.len() != before
    }

    /// Damage a unit, returns whether it died (None if it is not here)
    pub fn damage_unit(&mut self, id: EntityId, amount: i32) -> Option<bool> {
        let unit = self.units.iter_mut().find(|u| u.id == id)?;
        let (health, dead) = CombatSystem::apply_damage(unit.health, amount);
        unit.health = health;
        Some(dead)
    }

    /// Returns true once the castle has fallen
    pub fn damage_castle(&mut self, amount: i32) -> bool {
        let (health, fallen) = CombatSystem::apply_damage(self.castle_health, amount);
        self.castle_health = health;
        fallen
    }

    pub fn castle_position(&self) -> Position {
        self.side.castle_position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(Uuid::new_v4(), "Alice".to_string(), Side::Left)
    }

    #[test]
    fn new_player_starts_with_defaults() {
        let p = player();
        assert_eq!(p.gold, 500);
        assert_eq!(p.income, 10);
        assert_eq!(p.castle_health, 1000);
        assert!(p.race.is_none());
        assert!(!p.is_ready);

        let ai = Player::new_ai(Uuid::new_v4(), "AI Bot".to_string(), Side::Right);
        assert!(ai.is_ai && ai.is_ready);
    }

    #[test]
    fn deduct_gold_never_overdraws() {
        let mut p = player();
        assert!(p.deduct_gold(150));
        assert_eq!(p.gold, 350);
        assert!(!p.deduct_gold(351));
        assert_eq!(p.gold, 350);
    }

    #[test]
    fn economy_buildings_raise_income() {
        let mut p = player();
        p.add_building(Building::new(1, BuildingType::HumanBarracks, Position::new(-5.0, 0.5, 3.0)));
        assert_eq!(p.income, 10);
        p.add_building(Building::new(2, BuildingType::HumanMarket, Position::new(-8.0, 0.5, 3.0)));
        assert_eq!(p.income, 15);
    }

    #[test]
    fn unit_removal_is_idempotent() {
        let mut p = player();
        p.add_unit(Unit::spawn(7, UnitType::HumanArcher, Position::new(0.0, 0.5, 0.0)));
        assert_eq!(p.damage_unit(7, 60), Some(true));
        assert!(p.remove_unit(7));
        assert!(!p.remove_unit(7));
        assert_eq!(p.damage_unit(7, 1), None);
    }

    #[test]
    fn reset_keeps_identity() {
        let mut p = player();
        p.race = Some(Race::Fire);
        p.gold = 3;
        p.castle_health = 10;
        p.is_ready = true;
        p.add_building(Building::new(1, BuildingType::FireMine, Position::new(-5.0, 0.5, 3.0)));

        let id = p.id;
        p.reset();
        assert_eq!(p.id, id);
        assert_eq!(p.name, "Alice");
        assert_eq!(p.side, Side::Left);
        assert_eq!(p.gold, 500);
        assert_eq!(p.income, 10);
        assert!(p.buildings.is_empty());
        assert!(p.race.is_none());
        assert!(!p.is_ready);
    }

    #[test]
    fn position_travels_as_triple() {
        let json = serde_json::to_string(&Position::new(1.0, 0.5, -2.0)).unwrap();
        assert_eq!(json, "[1.0,0.5,-2.0]");
        let back: Position = serde_json::from_str("[-3.0, 0.5, 4.0]").unwrap();
        assert_eq!(back, Position::new(-3.0, 0.5, 4.0));
    }

    #[test]
    fn sides_are_mirrored() {
        assert_eq!(Side::Left.castle_position().x, -12.0);
        assert_eq!(Side::Right.castle_position().x, 12.0);
        assert_eq!(Side::Left.forward(), 1.0);
        assert_eq!(Side::Right.mirror_x(6.0), 6.0);
        assert_eq!(Side::Left.mirror_x(6.0), -6.0);
        assert_eq!(Side::Left.opposite(), Side::Right);
    }
}
