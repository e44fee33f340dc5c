//! Combat math - distances, attack ranges, target selection
//!
//! Everything here is pure and works without a match, so the simulation and
//! the tests share the exact same rules.

use crate::game::data::{UnitCategory, ATTACK_COOLDOWN};
use crate::game::player::{Position, Unit};

/// Combat rules shared by every match
pub struct CombatSystem;

impl CombatSystem {
    /// Distance on the ground plane (y is ignored)
    pub fn distance(a: &Position, b: &Position) -> f32 {
        let dx = a.x - b.x;
        let dz = a.z - b.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Unit-vs-unit attack range
    pub fn attack_range(category: UnitCategory) -> f32 {
        match category {
            UnitCategory::Melee => 0.8,
            UnitCategory::Ranged => 4.0,
            UnitCategory::Siege => 6.0,
            UnitCategory::Flying => 1.0,
        }
    }

    /// Unit-vs-castle attack range. Wider than [`Self::attack_range`] since
    /// castles are large targets.
    pub fn castle_attack_range(category: UnitCategory) -> f32 {
        match category {
            UnitCategory::Melee => 1.2,
            UnitCategory::Ranged => 6.0,
            UnitCategory::Siege => 8.0,
            UnitCategory::Flying => 1.5,
        }
    }

    pub fn in_range(attacker: &Unit, target: &Unit) -> bool {
        Self::distance(&attacker.position, &target.position)
            <= Self::attack_range(attacker.unit_type.category())
    }

    pub fn castle_in_range(attacker: &Unit, castle: &Position) -> bool {
        Self::distance(&attacker.position, castle)
            <= Self::castle_attack_range(attacker.unit_type.category())
    }

    /// Index of the enemy closest to `from`.
    ///
    /// Strict `<` keeps the earliest candidate on ties.
    pub fn closest_enemy_index(from: &Position, enemies: &[Unit]) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, enemy) in enemies.iter().enumerate() {
            let dist = Self::distance(from, &enemy.position);
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((idx, dist)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Attack is ready once the cooldown is spent (it may be negative)
    pub fn can_attack(attack_cooldown: f32) -> bool {
        attack_cooldown <= 0.0
    }

    /// Cooldown to set after an attack
    pub fn attack_cooldown() -> f32 {
        ATTACK_COOLDOWN
    }

    /// Apply damage to health, returns (new_health, is_dead)
    pub fn apply_damage(current_health: i32, damage: i32) -> (i32, bool) {
        let new_health = current_health - damage;
        (new_health, new_health <= 0)
    }
}
