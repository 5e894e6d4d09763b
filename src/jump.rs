//! Jump resolution.

use bevy::prelude::*;

use crate::config::LocomotionConfig;
use crate::state::LocomotionState;

/// Speed needed to reach `height` against gravity of magnitude `gravity`.
#[inline]
pub fn jump_speed(gravity: f32, height: f32) -> f32 {
    (2.0 * gravity * height).max(0.0).sqrt()
}

/// Try to jump, returning the new velocity.
///
/// The launch direction comes from the ground normal, then from a steep
/// wall (which refunds the air jumps), then from the current contact normal
/// if air jumps remain. Returns `None` when none applies; the request is
/// dropped.
///
/// The jump tops velocity off along the launch direction instead of adding
/// to it, and is weakened while submerged.
pub fn jump(state: &mut LocomotionState, config: &LocomotionConfig, velocity: Vec3) -> Option<Vec3> {
    let direction = if state.on_ground() {
        state.contact_normal
    } else if state.on_steep() {
        state.jump_phase = 0;
        state.steep_normal
    } else if config.max_air_jumps > 0 && state.jump_phase <= config.max_air_jumps {
        if state.jump_phase == 0 {
            state.jump_phase = 1;
        }
        state.contact_normal
    } else {
        return None;
    };

    state.steps_since_last_jump = 0;
    state.jump_phase += 1;

    let mut speed = jump_speed(state.gravity.length(), config.jump_height);
    if state.in_water() {
        speed *= (1.0 - state.submergence / config.swim_threshold).max(0.0);
    }

    let direction = (direction + state.up_axis).normalize_or_zero();
    let aligned_speed = velocity.dot(direction);
    if aligned_speed > 0.0 {
        speed = (speed - aligned_speed).max(0.0);
    }

    Some(velocity + direction * speed)
}
