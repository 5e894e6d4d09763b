//! One fixed step of a gravity-driven character.
//!
//! [`step_character`] runs the whole per-step pipeline for one character in
//! a fixed order: gravity sample, submergence, contact classification, mode
//! resolution, water drag, velocity adjustment, jump, gravity integration,
//! and finally clearing the per-step state. It returns the velocity to write
//! back to the rigid body.

use bevy::prelude::*;

use crate::collision::ContactSample;
use crate::config::LocomotionConfig;
use crate::field::GravityField;
use crate::intent::MovementIntent;
use crate::jump::jump;
use crate::locomotion::{CharacterBody, LocomotionEnvironment};
use crate::movement::{adjust_velocity, apply_gravity};
use crate::state::LocomotionState;
use crate::water::{WaterOverlap, water_drag_factor};

/// Everything the physics engine reports about a character for one step.
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
    pub body: CharacterBody,
    /// Contacts of the character during the last physics step.
    pub contacts: &'a [ContactSample],
    /// Water volume the character overlaps, if any.
    pub water: Option<WaterOverlap>,
    pub dt: f32,
}

/// Run one fixed step and return the character's new velocity.
///
/// The pending jump request of `intent` is consumed. Jump and climb intents
/// are ignored while swimming.
pub fn step_character(
    state: &mut LocomotionState,
    config: &LocomotionConfig,
    intent: &mut MovementIntent,
    field: &GravityField,
    input: StepInput<'_>,
    env: &impl LocomotionEnvironment,
) -> Vec3 {
    let StepInput {
        body,
        contacts,
        water,
        dt,
    } = input;

    state.sample_gravity(field, body.position);
    state.update_axes(intent.input_space);
    state.evaluate_submergence(body.position, water, config, env);

    let swimming = state.swimming(config.swim_threshold);
    let jump_requested = intent.take_jump_request() && !swimming;
    state.desires_climbing = intent.climb && !swimming;

    state.evaluate_contacts(contacts, config);

    let mut velocity = body.velocity;
    state.update_state(&mut velocity, &body, config, env, dt);

    if state.in_water() {
        velocity *= water_drag_factor(config.water_drag, state.submergence, dt);
    }

    velocity = adjust_velocity(
        state,
        config,
        intent.player_input(state.swimming(config.swim_threshold)),
        velocity,
        dt,
    );

    if jump_requested {
        match jump(state, config, velocity) {
            Some(launched) => velocity = launched,
            None => debug!("jump request dropped: no ground, wall or air jump available"),
        }
    }

    velocity = apply_gravity(state, config, velocity, dt);

    state.clear_state();
    velocity
}
