//! Velocity adjustment and gravity integration.
//!
//! These functions turn the resolved state of a step into a new velocity:
//! [`adjust_velocity`] steers toward the player's desired velocity within the
//! mode's acceleration budget, and [`apply_gravity`] adds the step's gravity
//! the way the current mode requires.

use bevy::prelude::*;

use crate::config::LocomotionConfig;
use crate::state::LocomotionState;
use crate::water::buoyancy_scale;

/// Share of the climb acceleration used to press the character into a wall.
pub const CLIMB_GRIP_FACTOR: f32 = 0.9;

/// Speed squared below which a grounded character counts as resting.
pub const REST_SPEED_SQUARED: f32 = 0.01;

/// Unit `direction` with its component along `normal` removed.
///
/// Returns zero when `direction` is parallel to `normal`.
#[inline]
pub fn project_direction_on_plane(direction: Vec3, normal: Vec3) -> Vec3 {
    (direction - normal * direction.dot(normal)).normalize_or_zero()
}

#[inline]
fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Acceleration budget and movement basis for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementFrame {
    /// Largest velocity change per second.
    pub acceleration: f32,
    /// Target speed at full input.
    pub speed: f32,
    /// Axis driven by input x, on the contact plane.
    pub x_axis: Vec3,
    /// Axis driven by input z, on the contact plane.
    pub z_axis: Vec3,
}

/// Select acceleration, speed and basis for the current mode.
///
/// Climbing moves along the wall (sideways and along the up axis). In water
/// the ground or air values blend toward the swim values as the character
/// sinks. Holding climb on the ground slows the character to climb speed.
pub fn movement_frame(state: &LocomotionState, config: &LocomotionConfig) -> MovementFrame {
    let (acceleration, speed, x_axis, z_axis) = if state.climbing() {
        (
            config.max_climb_acceleration,
            config.max_climb_speed,
            state.up_axis.cross(state.contact_normal),
            state.up_axis,
        )
    } else if state.in_water() {
        let swim_factor = (state.submergence / config.swim_threshold).min(1.0);
        let base_acceleration = if state.on_ground() {
            config.max_acceleration
        } else {
            config.max_air_acceleration
        };
        (
            lerp(base_acceleration, config.max_swim_acceleration, swim_factor),
            lerp(config.max_speed, config.max_swim_speed, swim_factor),
            state.right_axis,
            state.forward_axis,
        )
    } else {
        let acceleration = if state.on_ground() {
            config.max_acceleration
        } else {
            config.max_air_acceleration
        };
        let speed = if state.on_ground() && state.desires_climbing {
            config.max_climb_speed
        } else {
            config.max_speed
        };
        (acceleration, speed, state.right_axis, state.forward_axis)
    };

    MovementFrame {
        acceleration,
        speed,
        x_axis: project_direction_on_plane(x_axis, state.contact_normal),
        z_axis: project_direction_on_plane(z_axis, state.contact_normal),
    }
}

/// Velocity change toward the desired velocity, in basis coordinates.
///
/// `input` is the player input (x = right, y = up, z = forward). The y
/// component only counts while swimming. Velocities are measured relative to
/// the connected body, and the result is clamped to `acceleration * dt`.
pub fn velocity_adjustment(
    frame: &MovementFrame,
    state: &LocomotionState,
    config: &LocomotionConfig,
    input: Vec3,
    velocity: Vec3,
    dt: f32,
) -> Vec3 {
    let relative = velocity - state.connection.velocity;
    let vertical = if state.swimming(config.swim_threshold) {
        input.y * frame.speed - relative.dot(state.up_axis)
    } else {
        0.0
    };

    Vec3::new(
        input.x * frame.speed - relative.dot(frame.x_axis),
        vertical,
        input.z * frame.speed - relative.dot(frame.z_axis),
    )
    .clamp_length_max(frame.acceleration * dt.max(0.0))
}

/// Steer `velocity` toward the player's desired velocity.
pub fn adjust_velocity(
    state: &LocomotionState,
    config: &LocomotionConfig,
    input: Vec3,
    velocity: Vec3,
    dt: f32,
) -> Vec3 {
    let frame = movement_frame(state, config);
    let adjustment = velocity_adjustment(&frame, state, config, input, velocity, dt);

    let mut velocity = velocity + frame.x_axis * adjustment.x + frame.z_axis * adjustment.z;
    if state.swimming(config.swim_threshold) {
        velocity += state.up_axis * adjustment.y;
    }
    velocity
}

/// Add the step's gravity to `velocity`.
///
/// A climbing character is pressed into the wall instead of pulled down. In
/// water gravity is reduced by buoyancy. A resting grounded character only
/// feels gravity along the contact normal, so it does not creep down
/// slopes.
pub fn apply_gravity(
    state: &LocomotionState,
    config: &LocomotionConfig,
    velocity: Vec3,
    dt: f32,
) -> Vec3 {
    let gravity = state.gravity;
    let normal = state.contact_normal;
    let grip = config.max_climb_acceleration * CLIMB_GRIP_FACTOR;

    if state.climbing() {
        velocity - normal * (grip * dt)
    } else if state.in_water() {
        velocity + gravity * (buoyancy_scale(config.buoyancy, state.submergence) * dt)
    } else if state.on_ground() && velocity.length_squared() < REST_SPEED_SQUARED {
        velocity + normal * (gravity.dot(normal) * dt)
    } else if state.on_ground() && state.desires_climbing {
        velocity + (gravity - normal * grip) * dt
    } else {
        velocity + gravity * dt
    }
}
