//! Match state machine and authoritative combat simulation

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::combat::CombatSystem;
use super::data::{
    BuildingData, BuildingType, Race, BOARD_HEIGHT, BUILDING_PHASE_SECS, GROUND_Y,
    MIN_BUILDING_SPACING,
};
use super::physics::PhysicsSystem;
use super::player::{Building, EntityId, Player, PlayerId, Position, Side, Unit};
use super::GameId;

/// Players per match (1v1, an AI counts as a player)
pub const MAX_PLAYERS: usize = 2;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Created, players not yet committed
    Menu,
    /// Waiting for a second player
    Waiting,
    RaceSelection,
    /// Timed phase for placing buildings
    Building,
    Combat,
    GameOver,
}

/// A rejected player action. The match is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("action not allowed during {0:?}")]
    WrongPhase(MatchPhase),

    #[error("player is not part of this match")]
    UnknownPlayer,

    #[error("player is already in this match")]
    AlreadyJoined,

    #[error("match is full")]
    MatchFull,

    #[error("match needs {MAX_PLAYERS} players")]
    NotEnoughPlayers,

    #[error("select a race first")]
    RaceNotSelected,

    #[error("race already selected")]
    RaceAlreadySelected,

    #[error("building belongs to another race")]
    RaceMismatch,

    #[error("not enough gold (need {needed}, have {available})")]
    InsufficientGold { needed: u32, available: u32 },

    #[error("invalid building placement")]
    InvalidPlacement,
}

/// Tunables fixed at match creation
#[derive(Debug, Clone, Copy)]
pub struct MatchSettings {
    /// `time_until_combat` at the start of the building phase
    pub building_phase_secs: u32,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            building_phase_secs: BUILDING_PHASE_SECS,
        }
    }
}

/// What a tick changed, so the caller knows what to broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// New phase if the tick caused a transition
    pub phase_change: Option<MatchPhase>,
    /// Something visible changed (countdown second, simulation step)
    pub state_changed: bool,
}

/// Starting layout for AI players, written for the right side
const AI_LAYOUT: [(f32, f32); 3] = [(6.0, 2.0), (8.0, -2.0), (10.0, 0.0)];

fn ai_starting_buildings(race: Race) -> [BuildingType; 3] {
    use BuildingType::*;
    match race {
        Race::Human => [HumanBarracks, HumanArchery, HumanMarket],
        Race::Undead => [UndeadCrypt, UndeadGraveyard, UndeadMine],
        Race::Nature => [NatureGrove, NatureDen, NatureFarm],
        Race::Fire => [FireForge, FireAltar, FireMine],
    }
}

/// One authoritative 1v1 match
pub struct GameMatch {
    pub id: GameId,
    pub phase: MatchPhase,
    /// Whole seconds left in the building phase
    pub time_until_combat: u32,
    /// Join order is kept stable, it is also the simulation order
    pub players: Vec<Player>,
    pub winner: Option<PlayerId>,
    settings: MatchSettings,
    rng: ChaCha8Rng,
    /// Fraction of a second accumulated toward the next income payout
    income_timer: f32,
    /// Fraction of a second accumulated toward the next countdown step
    countdown_timer: f32,
    next_entity_id: EntityId,
}

impl GameMatch {
    pub fn new(id: GameId, seed: u64, settings: MatchSettings) -> Self {
        Self {
            id,
            phase: MatchPhase::Menu,
            time_until_combat: settings.building_phase_secs,
            players: Vec::with_capacity(MAX_PLAYERS),
            winner: None,
            settings,
            rng: ChaCha8Rng::seed_from_u64(seed),
            income_timer: 0.0,
            countdown_timer: 0.0,
            next_entity_id: 1,
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn human_count(&self) -> usize {
        self.players.iter().filter(|p| !p.is_ai).count()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == MatchPhase::GameOver
    }

    fn next_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    /// Bind a human player. The first human takes the left side.
    pub fn add_player(&mut self, id: PlayerId, name: String) -> Result<(), ActionError> {
        self.insert_player(id, name, false)
    }

    /// Bind an AI opponent. AI players prefer the right side.
    pub fn add_ai_player(&mut self, id: PlayerId, name: String) -> Result<(), ActionError> {
        self.insert_player(id, name, true)
    }

    fn insert_player(&mut self, id: PlayerId, name: String, is_ai: bool) -> Result<(), ActionError> {
        if self.player(id).is_some() {
            return Err(ActionError::AlreadyJoined);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(ActionError::MatchFull);
        }

        let preferred = if is_ai { Side::Right } else { Side::Left };
        let side = if self.players.iter().any(|p| p.side == preferred) {
            preferred.opposite()
        } else {
            preferred
        };

        let player = if is_ai {
            Player::new_ai(id, name, side)
        } else {
            Player::new(id, name, side)
        };
        self.players.push(player);

        info!(
            game_id = %self.id,
            player_id = %id,
            side = ?side,
            is_ai,
            player_count = self.players.len(),
            "Player joined match"
        );
        Ok(())
    }

    /// Unbind a player, returning their final state
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.id == id)?;
        let player = self.players.remove(idx);
        info!(game_id = %self.id, player_id = %id, "Player left match");
        Some(player)
    }

    /// Menu -> waiting, for a match holding its first player
    pub fn open_lobby(&mut self) -> Result<(), ActionError> {
        if self.phase != MatchPhase::Menu {
            return Err(ActionError::WrongPhase(self.phase));
        }
        self.phase = MatchPhase::Waiting;
        Ok(())
    }

    /// Menu/waiting -> race selection once both players are bound
    pub fn begin_race_selection(&mut self) -> Result<(), ActionError> {
        if !matches!(self.phase, MatchPhase::Menu | MatchPhase::Waiting) {
            return Err(ActionError::WrongPhase(self.phase));
        }
        if self.players.len() < MAX_PLAYERS {
            return Err(ActionError::NotEnoughPlayers);
        }
        self.phase = MatchPhase::RaceSelection;
        info!(game_id = %self.id, "Race selection started");
        Ok(())
    }

    /// Lock in a race. The building phase starts as soon as every player has one.
    pub fn set_player_race(&mut self, player_id: PlayerId, race: Race) -> Result<(), ActionError> {
        if self.phase != MatchPhase::RaceSelection {
            return Err(ActionError::WrongPhase(self.phase));
        }
        let player = self.player_mut(player_id).ok_or(ActionError::UnknownPlayer)?;
        if player.race.is_some() {
            return Err(ActionError::RaceAlreadySelected);
        }
        player.race = Some(race);
        debug!(game_id = %self.id, player_id = %player_id, race = ?race, "Race selected");

        if self.players.iter().all(|p| p.race.is_some()) {
            self.start_building_phase();
        }
        Ok(())
    }

    /// Reset the countdown and seed the AI's fixed starting layout
    pub fn start_building_phase(&mut self) {
        self.phase = MatchPhase::Building;
        self.time_until_combat = self.settings.building_phase_secs;
        self.countdown_timer = 0.0;
        self.seed_ai_buildings();
        info!(
            game_id = %self.id,
            time_until_combat = self.time_until_combat,
            "Building phase started"
        );
    }

    fn seed_ai_buildings(&mut self) {
        let Some(idx) = self.players.iter().position(|p| p.is_ai) else {
            return;
        };
        let Some(race) = self.players[idx].race else {
            return;
        };

        let side = self.players[idx].side;
        for ((x, z), building_type) in AI_LAYOUT.into_iter().zip(ai_starting_buildings(race)) {
            let id = self.next_id();
            let position = Position::new(side.mirror_x(x), GROUND_Y, z);
            self.players[idx].add_building(Building::new(id, building_type, position));
        }
    }

    /// Building -> combat, by player request or when the countdown runs out
    pub fn start_combat_phase(&mut self) -> Result<(), ActionError> {
        if self.phase != MatchPhase::Building {
            return Err(ActionError::WrongPhase(self.phase));
        }
        self.phase = MatchPhase::Combat;
        self.income_timer = 0.0;
        info!(game_id = %self.id, "Combat phase started");
        Ok(())
    }

    /// Validate and place a building, charging its cost.
    ///
    /// Every check runs before the first mutation, so a rejected placement
    /// leaves the match exactly as it was.
    pub fn place_building(
        &mut self,
        player_id: PlayerId,
        building_type: BuildingType,
        position: Position,
    ) -> Result<EntityId, ActionError> {
        if self.phase != MatchPhase::Building {
            return Err(ActionError::WrongPhase(self.phase));
        }
        let player = self.player(player_id).ok_or(ActionError::UnknownPlayer)?;
        let race = player.race.ok_or(ActionError::RaceNotSelected)?;

        let data = BuildingData::for_type(building_type);
        if data.race != race {
            return Err(ActionError::RaceMismatch);
        }
        if player.gold < data.cost {
            return Err(ActionError::InsufficientGold {
                needed: data.cost,
                available: player.gold,
            });
        }
        if !self.is_valid_building_placement(&position, player_id) {
            return Err(ActionError::InvalidPlacement);
        }

        // Buildings sit on the ground whatever height the client sent
        let position = Position::new(position.x, GROUND_Y, position.z);
        let game_id = self.id;
        let id = self.next_id();
        let player = self.player_mut(player_id).ok_or(ActionError::UnknownPlayer)?;
        if !player.deduct_gold(data.cost) {
            return Err(ActionError::InsufficientGold {
                needed: data.cost,
                available: player.gold,
            });
        }
        player.add_building(Building::new(id, building_type, position));

        debug!(
            game_id = %game_id,
            player_id = %player_id,
            building = ?building_type,
            gold = player.gold,
            "Building placed"
        );
        Ok(id)
    }

    /// Side-of-board and board-depth checks plus a shared exclusion zone
    /// around every building in the match, whoever owns it.
    pub fn is_valid_building_placement(&self, position: &Position, player_id: PlayerId) -> bool {
        let Some(player) = self.player(player_id) else {
            return false;
        };
        if !position.is_finite() {
            return false;
        }

        let (min_x, max_x) = player.side.build_zone();
        if position.x < min_x || position.x > max_x {
            return false;
        }
        if position.z.abs() > BOARD_HEIGHT / 2.0 {
            return false;
        }

        self.players
            .iter()
            .flat_map(|p| p.buildings.iter())
            .all(|b| CombatSystem::distance(&b.position, position) >= MIN_BUILDING_SPACING)
    }

    /// Set the ready flag. Combat starts early once everyone is ready.
    pub fn set_ready(&mut self, player_id: PlayerId, ready: bool) -> Result<(), ActionError> {
        if self.phase != MatchPhase::Building {
            return Err(ActionError::WrongPhase(self.phase));
        }
        let player = self.player_mut(player_id).ok_or(ActionError::UnknownPlayer)?;
        player.is_ready = ready;

        if self.players.len() == MAX_PLAYERS && self.players.iter().all(|p| p.is_ready) {
            self.start_combat_phase()?;
        }
        Ok(())
    }

    /// Advance the match by one server tick.
    ///
    /// During the building phase this only runs the countdown; during combat
    /// it runs [`Self::update`].
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        match self.phase {
            MatchPhase::Building => {
                self.countdown_timer += dt;
                while self.countdown_timer >= 1.0 && self.time_until_combat > 0 {
                    self.countdown_timer -= 1.0;
                    self.time_until_combat -= 1;
                    outcome.state_changed = true;
                }
                if self.time_until_combat == 0 && self.start_combat_phase().is_ok() {
                    outcome.phase_change = Some(MatchPhase::Combat);
                }
            }
            MatchPhase::Combat => {
                self.update(dt);
                outcome.state_changed = true;
                if self.is_game_over() {
                    outcome.phase_change = Some(MatchPhase::GameOver);
                }
            }
            _ => {}
        }

        outcome
    }

    /// One combat simulation step: income, production, units, victory.
    /// No-op outside the combat phase.
    pub fn update(&mut self, dt: f32) {
        if self.phase != MatchPhase::Combat {
            return;
        }

        self.pay_income(dt);
        self.produce_units(dt);

        if self.players.len() == MAX_PLAYERS {
            for owner in 0..MAX_PLAYERS {
                self.update_units(owner, dt);
            }
        }

        self.check_victory();
    }

    fn pay_income(&mut self, dt: f32) {
        self.income_timer += dt;
        while self.income_timer >= 1.0 {
            self.income_timer -= 1.0;
            for player in &mut self.players {
                let income = player.income;
                player.add_gold(income);
            }
        }
    }

    fn produce_units(&mut self, dt: f32) {
        for p in 0..self.players.len() {
            let forward = self.players[p].side.forward();
            for b in 0..self.players[p].buildings.len() {
                let building = &mut self.players[p].buildings[b];
                building.cooldown -= dt;
                if building.cooldown > 0.0 {
                    continue;
                }
                building.cooldown = building.max_cooldown;

                let produces = BuildingData::for_type(building.building_type).produces;
                if produces.is_empty() {
                    continue;
                }
                let unit_type = produces[self.rng.gen_range(0..produces.len())];
                let spawn = Position::new(
                    building.position.x + forward,
                    building.position.y,
                    building.position.z,
                );

                let id = self.next_id();
                self.players[p].add_unit(Unit::spawn(id, unit_type, spawn));
            }
        }
    }

    /// Move and resolve combat for every unit of `owner` against the other player
    fn update_units(&mut self, owner: usize, dt: f32) {
        let (first, second) = self.players.split_at_mut(1);
        let (me, enemy) = if owner == 0 {
            (&mut first[0], &mut second[0])
        } else {
            (&mut second[0], &mut first[0])
        };
        let side = me.side;
        let enemy_castle = enemy.castle_position();

        for unit in me.units.iter_mut() {
            unit.attack_cooldown -= dt;

            if !unit.attacking {
                PhysicsSystem::advance_unit(unit, side, dt);
            }

            match CombatSystem::closest_enemy_index(&unit.position, &enemy.units) {
                Some(target) => {
                    if !CombatSystem::in_range(unit, &enemy.units[target]) {
                        unit.attacking = false;
                        continue;
                    }
                    unit.attacking = true;
                    if CombatSystem::can_attack(unit.attack_cooldown) {
                        unit.attack_cooldown = CombatSystem::attack_cooldown();
                        let target_id = enemy.units[target].id;
                        if enemy.damage_unit(target_id, unit.damage) == Some(true) {
                            enemy.remove_unit(target_id);
                        }
                    }
                }
                None if CombatSystem::castle_in_range(unit, &enemy_castle) => {
                    unit.attacking = true;
                    if CombatSystem::can_attack(unit.attack_cooldown) {
                        unit.attack_cooldown = CombatSystem::attack_cooldown();
                        enemy.damage_castle(unit.damage);
                    }
                }
                None => unit.attacking = false,
            }
        }
    }

    /// Ends the match once a castle falls. The other player only wins if
    /// their own castle is still standing.
    pub fn check_victory(&mut self) {
        if self.phase != MatchPhase::Combat {
            return;
        }
        let Some(fallen) = self.players.iter().find(|p| p.castle_health <= 0) else {
            return;
        };
        let fallen_id = fallen.id;

        self.phase = MatchPhase::GameOver;
        self.winner = self
            .players
            .iter()
            .find(|p| p.id != fallen_id && p.castle_health > 0)
            .map(|p| p.id);

        info!(game_id = %self.id, winner = ?self.winner, "Match over");
    }

    /// A player leaving mid-combat loses their castle
    pub fn forfeit(&mut self, player_id: PlayerId) -> Result<(), ActionError> {
        if self.phase != MatchPhase::Combat {
            return Err(ActionError::WrongPhase(self.phase));
        }
        let player = self.player_mut(player_id).ok_or(ActionError::UnknownPlayer)?;
        player.castle_health = 0;
        self.check_victory();
        Ok(())
    }

    /// Regress to waiting after a player left, giving whoever stays a clean slate
    pub fn return_to_waiting(&mut self) {
        self.phase = MatchPhase::Waiting;
        self.time_until_combat = self.settings.building_phase_secs;
        self.winner = None;
        self.income_timer = 0.0;
        self.countdown_timer = 0.0;
        for player in &mut self.players {
            player.reset();
        }
        info!(game_id = %self.id, "Match returned to waiting");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::data::{UnitType, UNIT_MOVE_SPEED};
    use uuid::Uuid;

    fn two_player_match() -> (GameMatch, PlayerId, PlayerId) {
        let mut game = GameMatch::new(Uuid::new_v4(), 7, MatchSettings::default());
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        game.add_player(alice, "Alice".into()).unwrap();
        game.add_player(bob, "Bob".into()).unwrap();
        game.begin_race_selection().unwrap();
        (game, alice, bob)
    }

    fn building_match(a: Race, b: Race) -> (GameMatch, PlayerId, PlayerId) {
        let (mut game, alice, bob) = two_player_match();
        game.set_player_race(alice, a).unwrap();
        game.set_player_race(bob, b).unwrap();
        (game, alice, bob)
    }

    fn state_of(game: &GameMatch) -> String {
        serde_json::to_string(&game.snapshot()).unwrap()
    }

    #[test]
    fn sides_follow_join_order() {
        let (game, alice, bob) = two_player_match();
        assert_eq!(game.player(alice).unwrap().side, Side::Left);
        assert_eq!(game.player(bob).unwrap().side, Side::Right);
    }

    #[test]
    fn third_player_is_rejected() {
        let (mut game, _, _) = two_player_match();
        assert_eq!(
            game.add_player(Uuid::new_v4(), "Carol".into()),
            Err(ActionError::MatchFull)
        );
    }

    #[test]
    fn building_phase_starts_once_in_either_order() {
        for flip in [false, true] {
            let (mut game, alice, bob) = two_player_match();
            let (first, second) = if flip { (bob, alice) } else { (alice, bob) };

            game.set_player_race(first, Race::Human).unwrap();
            assert_eq!(game.phase, MatchPhase::RaceSelection);

            game.set_player_race(second, Race::Undead).unwrap();
            assert_eq!(game.phase, MatchPhase::Building);
            assert_eq!(game.time_until_combat, 120);

            assert_eq!(
                game.set_player_race(second, Race::Fire),
                Err(ActionError::WrongPhase(MatchPhase::Building))
            );
        }
    }

    #[test]
    fn placement_charges_cost_once() {
        let (mut game, alice, _) = building_match(Race::Human, Race::Undead);
        game.place_building(alice, BuildingType::HumanBarracks, Position::new(-6.0, 0.5, 3.0))
            .unwrap();

        let player = game.player(alice).unwrap();
        assert_eq!(player.gold, 350);
        assert_eq!(player.buildings.len(), 1);
        assert_eq!(player.buildings[0].building_type, BuildingType::HumanBarracks);
    }

    #[test]
    fn rejected_placements_leave_state_untouched() {
        let (mut game, alice, _) = building_match(Race::Human, Race::Undead);
        game.place_building(alice, BuildingType::HumanBarracks, Position::new(-6.0, 0.5, 3.0))
            .unwrap();
        let before = state_of(&game);

        let attempts = [
            (BuildingType::HumanBarracks, Position::new(-6.5, 0.5, 3.5), ActionError::InvalidPlacement),
            (BuildingType::HumanBarracks, Position::new(4.0, 0.5, 0.0), ActionError::InvalidPlacement),
            (BuildingType::HumanBarracks, Position::new(f32::NAN, 0.5, 0.0), ActionError::InvalidPlacement),
            (BuildingType::HumanBarracks, Position::new(-6.0, 500.0, 1e30), ActionError::InvalidPlacement),
            (BuildingType::HumanBarracks, Position::new(-9.0, 0.5, 10.5), ActionError::InvalidPlacement),
            (BuildingType::UndeadCrypt, Position::new(-2.0, 0.5, 0.0), ActionError::RaceMismatch),
        ];
        for (building_type, position, expected) in attempts {
            assert_eq!(game.place_building(alice, building_type, position), Err(expected));
            assert_eq!(state_of(&game), before);
        }

        game.player_mut(alice).unwrap().gold = 100;
        let before = state_of(&game);
        assert_eq!(
            game.place_building(alice, BuildingType::HumanBarracks, Position::new(-2.0, 0.5, 0.0)),
            Err(ActionError::InsufficientGold { needed: 150, available: 100 })
        );
        assert_eq!(state_of(&game), before);

        game.start_combat_phase().unwrap();
        let before = state_of(&game);
        assert_eq!(
            game.place_building(alice, BuildingType::HumanMarket, Position::new(-2.0, 0.5, 0.0)),
            Err(ActionError::WrongPhase(MatchPhase::Combat))
        );
        assert_eq!(state_of(&game), before);
    }

    #[test]
    fn placed_buildings_sit_on_the_ground() {
        let (mut game, alice, _) = building_match(Race::Human, Race::Undead);
        game.place_building(alice, BuildingType::HumanBarracks, Position::new(-6.0, 40.0, 10.0))
            .unwrap();
        let barracks = &game.player(alice).unwrap().buildings[0];
        assert_eq!(barracks.position, Position::new(-6.0, GROUND_Y, 10.0));
    }

    #[test]
    fn placement_before_race_is_rejected() {
        let (mut game, alice, _) = two_player_match();
        game.phase = MatchPhase::Building;
        assert_eq!(
            game.place_building(alice, BuildingType::HumanBarracks, Position::new(-6.0, 0.5, 0.0)),
            Err(ActionError::RaceNotSelected)
        );
    }

    #[test]
    fn exclusion_zone_is_shared_between_players() {
        let (mut game, alice, bob) = building_match(Race::Human, Race::Undead);
        game.place_building(bob, BuildingType::UndeadCrypt, Position::new(0.5, 0.5, 0.0))
            .unwrap();

        assert!(!game.is_valid_building_placement(&Position::new(-0.5, 0.5, 0.0), alice));
        assert!(game.is_valid_building_placement(&Position::new(-1.0, 0.5, 0.0), alice));
        assert!(!game.is_valid_building_placement(&Position::new(1.5, 0.5, 0.0), bob));
        assert!(!game.is_valid_building_placement(&Position::new(-1.0, 0.5, 0.0), bob));
        assert!(!game.is_valid_building_placement(&Position::new(-1.0, 0.5, 0.0), Uuid::new_v4()));
    }

    #[test]
    fn ai_gets_fixed_layout_on_its_side() {
        let mut game = GameMatch::new(Uuid::new_v4(), 1, MatchSettings::default());
        let human = Uuid::new_v4();
        let ai = Uuid::new_v4();
        game.add_player(human, "Alice".into()).unwrap();
        game.add_ai_player(ai, "AI Bot".into()).unwrap();
        game.begin_race_selection().unwrap();
        game.set_player_race(ai, Race::Nature).unwrap();
        game.set_player_race(human, Race::Human).unwrap();

        let bot = game.player(ai).unwrap();
        assert_eq!(bot.side, Side::Right);
        let types: Vec<_> = bot.buildings.iter().map(|b| b.building_type).collect();
        assert_eq!(
            types,
            vec![BuildingType::NatureGrove, BuildingType::NatureDen, BuildingType::NatureFarm]
        );
        assert_eq!(bot.buildings[0].position, Position::new(6.0, 0.5, 2.0));
        assert_eq!(bot.gold, 500);
        assert_eq!(bot.income, 18);
    }

    #[test]
    fn everyone_ready_starts_combat() {
        let (mut game, alice, bob) = building_match(Race::Human, Race::Fire);
        game.set_ready(alice, true).unwrap();
        assert_eq!(game.phase, MatchPhase::Building);
        game.set_ready(bob, true).unwrap();
        assert_eq!(game.phase, MatchPhase::Combat);
    }

    #[test]
    fn countdown_runs_into_combat() {
        let (mut game, _, _) = building_match(Race::Human, Race::Fire);
        let mut changes = Vec::new();
        for _ in 0..(120 * 4) {
            if let Some(phase) = game.tick(0.25).phase_change {
                changes.push(phase);
            }
        }
        assert_eq!(game.time_until_combat, 0);
        assert_eq!(changes, vec![MatchPhase::Combat]);
    }

    #[test]
    fn update_is_a_noop_outside_combat() {
        let (mut game, alice, _) = building_match(Race::Human, Race::Fire);
        game.place_building(alice, BuildingType::HumanBarracks, Position::new(-6.0, 0.5, 0.0))
            .unwrap();
        let before = state_of(&game);
        game.update(30.0);
        assert_eq!(state_of(&game), before);
    }

    #[test]
    fn income_is_paid_per_second() {
        let (mut game, alice, _) = building_match(Race::Human, Race::Fire);
        game.place_building(alice, BuildingType::HumanMarket, Position::new(-6.0, 0.5, 0.0))
            .unwrap();
        game.start_combat_phase().unwrap();

        game.update(0.5);
        assert_eq!(game.player(alice).unwrap().gold, 320);
        game.update(0.5);
        assert_eq!(game.player(alice).unwrap().gold, 335);
    }

    #[test]
    fn barracks_spawns_ahead_after_ten_seconds() {
        let (mut game, alice, _) = building_match(Race::Human, Race::Human);
        assert_eq!(game.time_until_combat, 120);
        game.place_building(alice, BuildingType::HumanBarracks, Position::new(-6.0, 0.5, 3.0))
            .unwrap();
        assert_eq!(game.player(alice).unwrap().gold, 350);

        while game.phase == MatchPhase::Building {
            game.tick(1.0);
        }
        assert_eq!(game.phase, MatchPhase::Combat);

        for _ in 0..19 {
            game.update(0.5);
        }
        assert!(game.player(alice).unwrap().units.is_empty());

        game.update(0.5);
        let units = &game.player(alice).unwrap().units;
        assert_eq!(units.len(), 1);
        assert!(matches!(
            units[0].unit_type,
            UnitType::HumanSwordsman | UnitType::HumanKnight
        ));
        // spawned one step ahead of the barracks, then walked for 0.5s
        assert_eq!(units[0].position.x, -6.0 + 1.0 + UNIT_MOVE_SPEED * 0.5);
        assert_eq!(units[0].position.z, 3.0 - 0.5);
    }

    #[test]
    fn lethal_hit_removes_target_the_same_tick() {
        let (mut game, alice, bob) = building_match(Race::Human, Race::Undead);
        game.start_combat_phase().unwrap();

        let mut knight = Unit::spawn(100, UnitType::HumanKnight, Position::new(0.0, 0.5, 0.0));
        knight.attacking = true;
        game.player_mut(alice).unwrap().add_unit(knight);
        let mut zombie = Unit::spawn(200, UnitType::UndeadZombie, Position::new(0.5, 0.5, 0.0));
        zombie.health = 1;
        zombie.attacking = true;
        game.player_mut(bob).unwrap().add_unit(zombie);

        game.update(0.1);

        assert!(game.player(bob).unwrap().units.is_empty());
        let knight = &game.player(alice).unwrap().units[0];
        assert_eq!(knight.health, knight.max_health);
        assert_eq!(knight.attack_cooldown, 1.0);
    }

    #[test]
    fn shared_target_dies_once_and_is_not_hit_again() {
        let (mut game, alice, bob) = building_match(Race::Human, Race::Undead);
        game.start_combat_phase().unwrap();

        for (id, z) in [(100, 0.0), (101, 0.3)] {
            let mut knight = Unit::spawn(id, UnitType::HumanKnight, Position::new(0.0, 0.5, z));
            knight.attacking = true;
            game.player_mut(alice).unwrap().add_unit(knight);
        }
        let mut zombie = Unit::spawn(200, UnitType::UndeadZombie, Position::new(0.5, 0.5, 0.0));
        zombie.health = 1;
        zombie.attacking = true;
        game.player_mut(bob).unwrap().add_unit(zombie);

        game.update(0.01);

        assert!(game.player(bob).unwrap().units.is_empty());
        let knights = &game.player(alice).unwrap().units;
        assert_eq!(knights[0].attack_cooldown, 1.0);
        assert!(knights[1].attack_cooldown < 0.0);
        assert!(!knights[1].attacking);
    }

    #[test]
    fn out_of_range_enemy_blocks_castle_attack() {
        let (mut game, alice, bob) = building_match(Race::Fire, Race::Undead);
        game.start_combat_phase().unwrap();

        game.player_mut(alice)
            .unwrap()
            .add_unit(Unit::spawn(1, UnitType::FireImp, Position::new(11.0, 0.5, 0.0)));
        game.player_mut(bob)
            .unwrap()
            .add_unit(Unit::spawn(2, UnitType::UndeadZombie, Position::new(-11.0, 0.5, 8.0)));

        game.update(0.01);
        let imp = &game.player(alice).unwrap().units[0];
        assert!(!imp.attacking);
        assert_eq!(game.player(bob).unwrap().castle_health, 1000);
    }

    #[test]
    fn castle_takes_exactly_unit_damage_per_attack() {
        let (mut game, alice, bob) = building_match(Race::Fire, Race::Undead);
        game.start_combat_phase().unwrap();
        game.player_mut(alice)
            .unwrap()
            .add_unit(Unit::spawn(1, UnitType::FireElemental, Position::new(2.0, 0.5, 0.0)));
        let damage = game.player(alice).unwrap().units[0].damage;

        let mut attacks = 0;
        let mut last = game.player(bob).unwrap().castle_health;
        for _ in 0..400 {
            game.update(0.1);
            let now = game.player(bob).unwrap().castle_health;
            assert!(now <= last);
            if now < last {
                assert_eq!(last - now, damage);
                attacks += 1;
            }
            last = now;
        }
        assert!(attacks > 0);
        let elemental = &game.player(alice).unwrap().units[0];
        assert!(CombatSystem::castle_in_range(elemental, &Side::Right.castle_position()));
    }

    #[test]
    fn double_knockout_has_no_winner() {
        let (mut game, alice, bob) = building_match(Race::Fire, Race::Undead);
        game.start_combat_phase().unwrap();
        game.player_mut(alice).unwrap().castle_health = 0;
        game.player_mut(bob).unwrap().castle_health = 5;
        game.player_mut(alice)
            .unwrap()
            .add_unit(Unit::spawn(1, UnitType::FireImp, Position::new(11.5, 0.5, 0.0)));

        game.update(0.01);

        assert!(game.player(bob).unwrap().castle_health <= 0);
        assert!(game.is_game_over());
        assert_eq!(game.winner, None);
    }

    #[test]
    fn single_knockout_crowns_the_survivor_once() {
        let (mut game, alice, bob) = building_match(Race::Fire, Race::Undead);
        game.start_combat_phase().unwrap();
        game.player_mut(bob).unwrap().castle_health = 0;
        game.update(0.1);
        assert_eq!(game.winner, Some(alice));

        game.player_mut(alice).unwrap().castle_health = 0;
        game.check_victory();
        assert_eq!(game.winner, Some(alice));
    }

    #[test]
    fn forfeit_hands_victory_to_opponent() {
        let (mut game, alice, bob) = building_match(Race::Human, Race::Undead);
        assert!(game.forfeit(alice).is_err());
        game.start_combat_phase().unwrap();
        game.forfeit(alice).unwrap();
        assert_eq!(game.phase, MatchPhase::GameOver);
        assert_eq!(game.winner, Some(bob));
    }

    #[test]
    fn returning_to_waiting_resets_the_stayer() {
        let (mut game, alice, bob) = building_match(Race::Human, Race::Undead);
        game.place_building(alice, BuildingType::HumanBarracks, Position::new(-6.0, 0.5, 0.0))
            .unwrap();
        game.remove_player(bob);
        game.return_to_waiting();

        assert_eq!(game.phase, MatchPhase::Waiting);
        let alice = game.player(alice).unwrap();
        assert_eq!(alice.gold, 500);
        assert!(alice.race.is_none());
        assert!(alice.buildings.is_empty());
    }
}
