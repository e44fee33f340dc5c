//! Lane movement

use crate::game::data::{LANE_CENTER_TOLERANCE, UNIT_MOVE_SPEED};
use crate::game::player::{Side, Unit};

/// Movement rules for units walking the lane
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Advance a unit toward the enemy castle for one tick.
    ///
    /// Units of `side` walk along x in `side.forward()` direction at
    /// [`UNIT_MOVE_SPEED`] and drift back onto the lane centerline (z = 0) at
    /// half that speed. They never walk past the enemy castle.
    pub fn advance_unit(unit: &mut Unit, side: Side, dt: f32) {
        let step = UNIT_MOVE_SPEED * dt;

        let target_x = side.opposite().castle_position().x;
        let next_x = unit.position.x + side.forward() * step;
        unit.position.x = match side {
            Side::Left => next_x.min(target_x),
            Side::Right => next_x.max(target_x),
        };

        unit.position.z = Self::recenter(unit.position.z, step * 0.5);
    }

    /// Move `z` toward 0 by at most `step`, stopping once inside the lane tolerance
    pub fn recenter(z: f32, step: f32) -> f32 {
        if z.abs() <= LANE_CENTER_TOLERANCE {
            return z;
        }
        z - z.signum() * step.min(z.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::data::UnitType;
    use crate::game::player::Position;

    fn unit(x: f32, z: f32) -> Unit {
        Unit::spawn(1, UnitType::HumanSwordsman, Position::new(x, 0.5, z))
    }

    #[test]
    fn left_units_walk_right_and_recenter() {
        let mut u = unit(-5.0, 2.0);
        PhysicsSystem::advance_unit(&mut u, Side::Left, 0.5);
        assert_eq!(u.position.x, -4.0);
        assert_eq!(u.position.z, 1.5);
        assert_eq!(u.position.y, 0.5);
    }

    #[test]
    fn right_units_walk_left() {
        let mut u = unit(5.0, -2.0);
        PhysicsSystem::advance_unit(&mut u, Side::Right, 0.5);
        assert_eq!(u.position.x, 4.0);
        assert_eq!(u.position.z, -1.5);
    }

    #[test]
    fn recentering_does_not_overshoot() {
        assert_eq!(PhysicsSystem::recenter(0.3, 1.0), 0.0);
        assert_eq!(PhysicsSystem::recenter(-0.05, 1.0), -0.05);
    }

    #[test]
    fn units_stop_at_enemy_castle() {
        let mut u = unit(11.5, 0.0);
        PhysicsSystem::advance_unit(&mut u, Side::Left, 1.0);
        assert_eq!(u.position.x, 12.0);

        let mut u = unit(-11.9, 0.0);
        PhysicsSystem::advance_unit(&mut u, Side::Right, 1.0);
        assert_eq!(u.position.x, -12.0);
    }
}
