//! Locomotion state machine.
//!
//! Resolves which mode a character is in for the current step, snaps it to
//! the ground across small gaps, and tracks the velocity of the body it is
//! connected to. The physics engine is reached through
//! [`LocomotionEnvironment`], so the state machine can be driven without an
//! ECS world.
//!
//! The two probes a step may cast are described by [`ground_probe_ray`] and
//! [`water_probe_ray`]. The ECS systems request both before the step so the
//! physics backend can cast them ahead of time.

use bevy::prelude::*;

use crate::backend::RaycastRequest;
use crate::collision::{CollisionData, ContactSample};
use crate::config::LocomotionConfig;
use crate::field::GravityField;
use crate::intent::InputSpace;
use crate::movement::project_direction_on_plane;
use crate::state::LocomotionState;
use crate::water::{WaterOverlap, submergence_from_probe};

/// Pose and mass of a rigid body the character may connect to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyInfo {
    pub position: Vec3,
    pub rotation: Quat,
    pub mass: f32,
    pub kinematic: bool,
}

impl BodyInfo {
    /// Local point to world space.
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// World point to local space.
    #[inline]
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }
}

/// Physics queries the state machine needs during a step.
pub trait LocomotionEnvironment {
    /// Result of the ground snap probe, skipping the character itself.
    fn ground_probe(&self, ray: &RaycastRequest) -> Option<CollisionData>;

    /// Result of the submergence probe against water sensors.
    fn water_probe(&self, ray: &RaycastRequest) -> Option<CollisionData>;

    /// Pose and mass of `body`, if it is a rigid body.
    fn body_info(&self, body: Entity) -> Option<BodyInfo>;
}

/// The character's own rigid body for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
}

impl CharacterBody {
    pub fn new(position: Vec3, velocity: Vec3, mass: f32) -> Self {
        Self {
            position,
            velocity,
            mass,
        }
    }
}

/// Downward probe used to snap a character back onto the ground.
pub fn ground_probe_ray(position: Vec3, up: Vec3, config: &LocomotionConfig) -> RaycastRequest {
    RaycastRequest::new(position, -up, config.probe_distance).with_mask(config.probe_mask)
}

/// Downward probe from `offset` above `position` measuring how deep a body
/// is in water. It reaches one unit past `range` so a fully submerged body
/// still finds the surface when it is just out of range.
pub fn water_probe_ray(position: Vec3, up: Vec3, offset: f32, range: f32, mask: u32) -> RaycastRequest {
    RaycastRequest::new(position + up * offset, -up, range + 1.0)
        .with_mask(mask)
        .including_sensors()
}

impl LocomotionState {
    /// Sample the gravity field at the character.
    ///
    /// Where the summed gravity is zero the previous up axis is held.
    pub fn sample_gravity(&mut self, field: &GravityField, position: Vec3) {
        let sample = field.sample(position, self.up_axis);
        if sample.degenerate && !self.gravity_degenerate {
            warn!(
                "net gravity is zero at {position}, holding up axis {}",
                self.up_axis
            );
        } else if !sample.degenerate && self.gravity_degenerate {
            debug!("net gravity restored at {position}");
        }
        self.gravity_degenerate = sample.degenerate;
        self.gravity = sample.gravity;
        self.up_axis = sample.up;
    }

    /// Flatten the input frame onto the plane perpendicular to the up axis.
    pub fn update_axes(&mut self, input_space: Option<InputSpace>) {
        let space = input_space.unwrap_or_default();
        self.right_axis = project_direction_on_plane(space.right, self.up_axis);
        self.forward_axis = project_direction_on_plane(space.forward, self.up_axis);
    }

    /// Measure how deep the character is in water.
    ///
    /// Without an overlapping water volume submergence is zero.
    pub fn evaluate_submergence(
        &mut self,
        position: Vec3,
        water: Option<WaterOverlap>,
        config: &LocomotionConfig,
        env: &impl LocomotionEnvironment,
    ) {
        self.submergence = 0.0;

        let Some(water) = water else {
            return;
        };

        let ray = water_probe_ray(
            position,
            self.up_axis,
            config.submergence_offset,
            config.submergence_range,
            config.water_mask,
        );
        let hit = env.water_probe(&ray);
        self.submergence = submergence_from_probe(
            hit.map(|hit| hit.distance),
            config.submergence_range,
        );

        if self.swimming(config.swim_threshold) {
            self.contacts.connected_body = water.body;
        }
    }

    /// Classify the step's contacts. Contacts are ignored while swimming.
    pub fn evaluate_contacts(&mut self, contacts: &[ContactSample], config: &LocomotionConfig) {
        if self.swimming(config.swim_threshold) {
            return;
        }
        let up = self.up_axis;
        let desires_climbing = self.desires_climbing;
        self.contacts
            .evaluate_all(contacts, up, config, desires_climbing);
    }

    /// Resolve the mode of this step.
    ///
    /// Returns whether the character is supported (climbing, swimming,
    /// grounded, snapped or standing on steep contacts). May rewrite
    /// `velocity` when snapping to the ground.
    pub fn update_state(
        &mut self,
        velocity: &mut Vec3,
        body: &CharacterBody,
        config: &LocomotionConfig,
        env: &impl LocomotionEnvironment,
        dt: f32,
    ) -> bool {
        self.steps_since_last_grounded = self.steps_since_last_grounded.saturating_add(1);
        self.steps_since_last_jump = self.steps_since_last_jump.saturating_add(1);

        self.contact_normal = self.contacts.ground_normal;
        self.steep_normal = self.contacts.steep_normal;
        self.climb_normal = self.contacts.climb_normal;

        let supported = self.check_climbing(config)
            || self.check_swimming(config)
            || self.on_ground()
            || self.snap_to_ground(velocity, body.position, config, env)
            || self.check_steep_contacts(config);

        if supported {
            self.steps_since_last_grounded = 0;
            if self.steps_since_last_jump > 1 {
                self.jump_phase = 0;
            }
            if self.contacts.ground_count > 1 {
                self.contact_normal = self
                    .contact_normal
                    .try_normalize()
                    .unwrap_or(self.up_axis);
            }
        } else {
            self.contact_normal = self.up_axis;
        }

        if let Some(connected) = self.contacts.connected_body {
            match env.body_info(connected) {
                Some(info) if info.kinematic || info.mass >= body.mass => {
                    self.update_connection_state(connected, &info, body.position, dt);
                }
                _ => {}
            }
        }

        self.mode = self.current_mode(config.swim_threshold);
        supported
    }

    fn check_climbing(&mut self, config: &LocomotionConfig) -> bool {
        if !self.climbing() {
            return false;
        }

        if self.contacts.climb_count > 1 {
            match self.climb_normal.try_normalize() {
                Some(normal) if self.up_axis.dot(normal) < config.min_ground_dot() => {
                    self.climb_normal = normal;
                }
                // Floor-like or cancelled out (a narrow gap): keep the latest wall.
                _ => self.climb_normal = self.contacts.latest_climb_normal,
            }
        }

        self.contacts.ground_count = 1;
        self.contact_normal = self.climb_normal;
        true
    }

    fn check_swimming(&mut self, config: &LocomotionConfig) -> bool {
        if !self.swimming(config.swim_threshold) {
            return false;
        }

        self.contacts.ground_count = 0;
        self.contact_normal = self.up_axis;
        true
    }

    /// Keep the character on the ground across a small gap or crest.
    ///
    /// Only runs one step after losing ground, more than two steps after a
    /// jump, and below the snap speed limit. A downward probe must hit a
    /// surface that counts as ground for its layer.
    pub fn snap_to_ground(
        &mut self,
        velocity: &mut Vec3,
        position: Vec3,
        config: &LocomotionConfig,
        env: &impl LocomotionEnvironment,
    ) -> bool {
        if self.steps_since_last_grounded > 1 || self.steps_since_last_jump <= 2 {
            return false;
        }

        let speed = velocity.length();
        if speed > config.max_snap_speed {
            return false;
        }

        let ray = ground_probe_ray(position, self.up_axis, config);
        let Some(hit) = env.ground_probe(&ray) else {
            return false;
        };

        if self.up_axis.dot(hit.normal) < config.min_dot_for(hit.layers) {
            return false;
        }

        self.contacts.ground_count = 1;
        self.contact_normal = hit.normal;

        let dot = velocity.dot(hit.normal);
        if dot > 0.0 {
            *velocity = (*velocity - hit.normal * dot).normalize_or_zero() * speed;
        }

        self.contacts.connected_body = hit.body;
        true
    }

    fn check_steep_contacts(&mut self, config: &LocomotionConfig) -> bool {
        if self.contacts.steep_count > 1 {
            self.steep_normal = self.steep_normal.normalize_or_zero();
            if self.up_axis.dot(self.steep_normal) >= config.min_ground_dot() {
                self.contacts.ground_count = 1;
                self.contact_normal = self.steep_normal;
                return true;
            }
        }
        false
    }

    fn update_connection_state(
        &mut self,
        body: Entity,
        info: &BodyInfo,
        position: Vec3,
        dt: f32,
    ) {
        if self.connection.previous_body == Some(body) && dt > 0.0 {
            let movement =
                info.transform_point(self.connection.local_position) - self.connection.world_position;
            self.connection.velocity = movement / dt;
        }

        self.connection.world_position = position;
        self.connection.local_position = info.inverse_transform_point(position);
    }

    /// Finish the step: keep this step's normals for display and clear the
    /// per-step buckets.
    pub fn clear_state(&mut self) {
        self.last_contact_normal = self.contact_normal;
        self.last_steep_normal = self.steep_normal;
        self.connection.previous_body = self.contacts.connected_body;
        self.connection.last_velocity = self.connection.velocity;

        self.contacts.clear();
        self.contact_normal = Vec3::ZERO;
        self.steep_normal = Vec3::ZERO;
        self.climb_normal = Vec3::ZERO;
        self.connection.velocity = Vec3::ZERO;
    }
}


#[cfg(test)]
mod tests {
    use super::test_env::FlatEnvironment;
    use super::*;
    use crate::gravity::GravitySource;

    const DT: f32 = 1.0 / 60.0;

    fn earth() -> GravityField {
        let mut field = GravityField::new();
        field.register(Entity::from_raw(100), GravitySource::Uniform(Vec3::new(0.0, -9.81, 0.0)));
        field
    }

    fn body() -> CharacterBody {
        CharacterBody::new(Vec3::new(0.0, 0.5, 0.0), Vec3::ZERO, 1.0)
    }

    /// State that was grounded on the previous step and jumped long ago.
    fn snappable() -> LocomotionState {
        let mut state = LocomotionState::new();
        state.steps_since_last_grounded = 0;
        state.steps_since_last_jump = 10;
        state
    }

    fn ground_env() -> FlatEnvironment {
        FlatEnvironment {
            ground: Some((0.0, Vec3::Y, None)),
            ..default()
        }
    }

    #[test]
    fn probe_rays_point_against_up() {
        let config = LocomotionConfig::default().with_snap(100.0, 1.5);
        let ground = ground_probe_ray(Vec3::ZERO, Vec3::X, &config);
        assert_eq!(ground.direction, Vec3::NEG_X);
        assert_eq!(ground.max_distance, 1.5);
        assert!(!ground.include_sensors);

        let water = water_probe_ray(Vec3::ZERO, Vec3::Y, 0.5, 1.0, 0b100);
        assert_eq!(water.origin, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(water.max_distance, 2.0);
        assert_eq!(water.mask, 0b100);
        assert!(water.include_sensors);
    }

    #[test]
    fn zero_gravity_holds_previous_up_axis() {
        let mut state = LocomotionState::new();
        state.sample_gravity(&earth(), Vec3::ZERO);
        assert_eq!(state.up_axis(), Vec3::Y);

        let mut tilted = GravityField::new();
        tilted.register(Entity::from_raw(1), GravitySource::Uniform(Vec3::new(-9.81, 0.0, 0.0)));
        state.sample_gravity(&tilted, Vec3::ZERO);
        assert_eq!(state.up_axis(), Vec3::X);

        state.sample_gravity(&GravityField::new(), Vec3::ZERO);
        assert_eq!(state.up_axis(), Vec3::X);
        assert!(state.gravity_degenerate);
    }

    #[test]
    fn axes_are_projected_off_up() {
        let mut state = LocomotionState::new();
        state.up_axis = Vec3::new(0.0, 1.0, 1.0).normalize();
        state.update_axes(None);

        assert!(state.forward_axis.dot(state.up_axis).abs() < 1e-6);
        assert!((state.forward_axis.length() - 1.0).abs() < 1e-6);
        assert_eq!(state.right_axis, Vec3::X);
    }

    #[test]
    fn ground_contact_resolves_grounded() {
        let mut state = LocomotionState::new();
        let config = LocomotionConfig::default();
        state.evaluate_contacts(&[ContactSample::new(Vec3::Y, 1, None)], &config);

        let mut velocity = Vec3::ZERO;
        let supported = state.update_state(&mut velocity, &body(), &config, &FlatEnvironment::default(), DT);

        assert!(supported);
        assert_eq!(state.steps_since_last_grounded(), 0);
        assert_eq!(state.contact_normal, Vec3::Y);
        assert_eq!(state.mode(), crate::state::LocomotionMode::Grounded);
    }

    #[test]
    fn no_contacts_is_airborne_with_up_normal() {
        let mut state = LocomotionState::new();
        let config = LocomotionConfig::default();
        let mut velocity = Vec3::new(0.0, -5.0, 0.0);
        let supported = state.update_state(&mut velocity, &body(), &config, &FlatEnvironment::default(), DT);

        assert!(!supported);
        assert_eq!(state.contact_normal, state.up_axis());
        assert_eq!(state.mode(), crate::state::LocomotionMode::Airborne);
    }

    #[test]
    fn snap_succeeds_when_all_conditions_hold() {
        let mut state = snappable();
        let config = LocomotionConfig::default();
        let mut velocity = Vec3::new(3.0, 2.0, 0.0);

        assert!(state.snap_to_ground(&mut velocity, Vec3::new(0.0, 0.5, 0.0), &config, &ground_env()));
        assert!(state.on_ground());
        // Moving away from the surface: the normal component is removed, speed is kept.
        assert!(velocity.y.abs() < 1e-5);
        assert!((velocity.length() - Vec3::new(3.0, 2.0, 0.0).length()).abs() < 1e-4);
    }

    #[test]
    fn snap_refused_when_grounded_too_long_ago() {
        let mut state = snappable();
        state.steps_since_last_grounded = 2;
        let mut velocity = Vec3::X;
        assert!(!state.snap_to_ground(&mut velocity, Vec3::new(0.0, 0.5, 0.0), &LocomotionConfig::default(), &ground_env()));
        assert!(!state.on_ground());
    }

    #[test]
    fn snap_refused_right_after_jump() {
        let mut state = snappable();
        state.steps_since_last_jump = 2;
        let mut velocity = Vec3::X;
        assert!(!state.snap_to_ground(&mut velocity, Vec3::new(0.0, 0.5, 0.0), &LocomotionConfig::default(), &ground_env()));
    }

    #[test]
    fn snap_refused_above_speed_cap() {
        let mut state = snappable();
        let config = LocomotionConfig::default().with_snap(5.0, 1.0);
        let mut velocity = Vec3::new(6.0, 0.0, 0.0);
        assert!(!state.snap_to_ground(&mut velocity, Vec3::new(0.0, 0.5, 0.0), &config, &ground_env()));
        assert_eq!(velocity, Vec3::new(6.0, 0.0, 0.0));
    }

    #[test]
    fn snap_refused_without_ground_in_reach() {
        let mut state = snappable();
        let mut velocity = Vec3::X;
        assert!(!state.snap_to_ground(&mut velocity, Vec3::new(0.0, 3.0, 0.0), &LocomotionConfig::default(), &ground_env()));
    }

    #[test]
    fn snap_refused_on_steep_hit() {
        let mut state = snappable();
        let env = FlatEnvironment {
            ground: Some((0.0, Quat::from_rotation_z(1.0) * Vec3::Y, None)),
            ..default()
        };
        let mut velocity = Vec3::X;
        assert!(!state.snap_to_ground(&mut velocity, Vec3::new(0.0, 0.5, 0.0), &LocomotionConfig::default(), &env));
    }

    #[test]
    fn prevent_snap_blocks_next_steps() {
        let mut state = snappable();
        state.prevent_snap_to_ground();
        let config = LocomotionConfig::default();
        let mut velocity = Vec3::new(0.0, 8.0, 0.0);
        let supported = state.update_state(&mut velocity, &body(), &config, &ground_env(), DT);

        assert!(!supported);
        assert_eq!(velocity, Vec3::new(0.0, 8.0, 0.0));
    }

    #[test]
    fn steep_pair_forming_a_valley_counts_as_ground() {
        let mut state = LocomotionState::new();
        let config = LocomotionConfig::default();
        let left = Quat::from_rotation_z(0.8) * Vec3::Y;
        let right = Quat::from_rotation_z(-0.8) * Vec3::Y;
        state.evaluate_contacts(
            &[ContactSample::new(left, 1, None), ContactSample::new(right, 1, None)],
            &config,
        );
        assert_eq!(state.contacts.steep_count, 2);

        let mut velocity = Vec3::ZERO;
        assert!(state.update_state(&mut velocity, &body(), &config, &FlatEnvironment::default(), DT));
        assert!(state.on_ground());
        assert!((state.contact_normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn single_steep_contact_is_not_ground() {
        let mut state = LocomotionState::new();
        let config = LocomotionConfig::default();
        state.evaluate_contacts(&[ContactSample::new(Vec3::X, 1, None)], &config);

        let mut velocity = Vec3::ZERO;
        assert!(!state.update_state(&mut velocity, &body(), &config, &FlatEnvironment::default(), DT));
        assert_eq!(state.mode(), crate::state::LocomotionMode::Steep);
    }

    #[test]
    fn climbing_takes_precedence_and_uses_wall_normal() {
        let mut state = LocomotionState::new();
        state.steps_since_last_jump = 10;
        state.desires_climbing = true;
        let config = LocomotionConfig::default();
        state.evaluate_contacts(
            &[ContactSample::new(Vec3::X, 1, None), ContactSample::new(Vec3::Y, 1, None)],
            &config,
        );

        let mut velocity = Vec3::ZERO;
        assert!(state.update_state(&mut velocity, &body(), &config, &FlatEnvironment::default(), DT));
        assert_eq!(state.mode(), crate::state::LocomotionMode::Climbing);
        assert_eq!(state.contact_normal, Vec3::X);
    }

    #[test]
    fn floor_like_climb_average_falls_back_to_latest_wall() {
        let mut state = LocomotionState::new();
        state.steps_since_last_jump = 10;
        state.desires_climbing = true;
        let config = LocomotionConfig::default();
        // Two opposite steep walls average to straight up.
        let a = Quat::from_rotation_z(1.2) * Vec3::Y;
        let b = Quat::from_rotation_z(-1.2) * Vec3::Y;
        state.evaluate_contacts(&[ContactSample::new(a, 1, None), ContactSample::new(b, 1, None)], &config);
        assert_eq!(state.contacts.climb_count, 2);

        let mut velocity = Vec3::ZERO;
        state.update_state(&mut velocity, &body(), &config, &FlatEnvironment::default(), DT);
        assert!((state.contact_normal - b).length() < 1e-6);
    }

    #[test]
    fn swimming_clears_ground_and_ignores_contacts() {
        let mut state = LocomotionState::new();
        let config = LocomotionConfig::default();
        let env = FlatEnvironment {
            water_surface: Some(3.0),
            ..default()
        };
        let water_body = Entity::from_raw(7);
        let position = Vec3::new(0.0, 0.5, 0.0);
        state.evaluate_submergence(position, Some(WaterOverlap::new(Some(water_body))), &config, &env);
        assert_eq!(state.submergence(), 1.0);

        state.evaluate_contacts(&[ContactSample::new(Vec3::Y, 1, None)], &config);
        assert_eq!(state.contacts.ground_count, 0);

        let mut velocity = Vec3::ZERO;
        assert!(state.update_state(&mut velocity, &body(), &config, &env, DT));
        assert_eq!(state.mode(), crate::state::LocomotionMode::Swimming);
        assert_eq!(state.contact_normal, state.up_axis());
        assert_eq!(state.contacts.connected_body, Some(water_body));
    }

    #[test]
    fn partial_submergence_from_probe() {
        let mut state = LocomotionState::new();
        let config = LocomotionConfig::default();
        let env = FlatEnvironment {
            water_surface: Some(0.75),
            ..default()
        };
        // Probe starts at 1.0 and hits the surface 0.25 below.
        state.evaluate_submergence(Vec3::new(0.0, 0.5, 0.0), Some(WaterOverlap::default()), &config, &env);
        assert!((state.submergence() - 0.75).abs() < 1e-5);

        state.evaluate_submergence(Vec3::new(0.0, 0.5, 0.0), None, &config, &env);
        assert_eq!(state.submergence(), 0.0);
    }

    #[test]
    fn landing_resets_air_jumps_after_grace_step() {
        let config = LocomotionConfig::default();
        let ground = [ContactSample::new(Vec3::Y, 1, None)];

        let mut state = LocomotionState::new();
        state.jump_phase = 2;
        state.steps_since_last_jump = 0;
        state.evaluate_contacts(&ground, &config);
        let mut velocity = Vec3::ZERO;
        state.update_state(&mut velocity, &body(), &config, &FlatEnvironment::default(), DT);
        // One step after the jump: still inside the grace window.
        assert_eq!(state.jump_phase(), 2);

        state.clear_state();
        state.evaluate_contacts(&ground, &config);
        state.update_state(&mut velocity, &body(), &config, &FlatEnvironment::default(), DT);
        assert_eq!(state.jump_phase(), 0);
    }

    #[test]
    fn platform_velocity_tracked_across_steps() {
        let config = LocomotionConfig::default();
        let platform = Entity::from_raw(9);
        let ground = [ContactSample::new(Vec3::Y, 1, Some(platform))];
        let mut env = FlatEnvironment::default();
        env.bodies.insert(
            platform,
            BodyInfo {
                position: Vec3::ZERO,
                rotation: Quat::IDENTITY,
                mass: 1.0,
                kinematic: true,
            },
        );

        let mut state = LocomotionState::new();
        let mut velocity = Vec3::ZERO;
        state.evaluate_contacts(&ground, &config);
        state.update_state(&mut velocity, &body(), &config, &env, DT);
        // First step on the platform: no history yet.
        assert_eq!(state.connection.velocity, Vec3::ZERO);
        state.clear_state();
        assert_eq!(state.connected_body(), Some(platform));

        env.bodies.get_mut(&platform).unwrap().position = Vec3::new(0.1, 0.0, 0.0);
        state.evaluate_contacts(&ground, &config);
        state.update_state(&mut velocity, &body(), &config, &env, DT);
        assert!((state.connection.velocity - Vec3::new(6.0, 0.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn light_dynamic_body_is_not_tracked() {
        let config = LocomotionConfig::default();
        let crate_body = Entity::from_raw(4);
        let ground = [ContactSample::new(Vec3::Y, 1, Some(crate_body))];
        let mut env = FlatEnvironment::default();
        env.bodies.insert(
            crate_body,
            BodyInfo {
                position: Vec3::ZERO,
                rotation: Quat::IDENTITY,
                mass: 0.1,
                kinematic: false,
            },
        );

        let mut state = LocomotionState::new();
        let mut velocity = Vec3::ZERO;
        for step in 0..2 {
            env.bodies.get_mut(&crate_body).unwrap().position.x = step as f32;
            state.evaluate_contacts(&ground, &config);
            state.update_state(&mut velocity, &body(), &config, &env, DT);
            assert_eq!(state.connection.velocity, Vec3::ZERO);
            state.clear_state();
        }
    }

    #[test]
    fn clear_state_snapshots_normals() {
        let mut state = LocomotionState::new();
        let config = LocomotionConfig::default();
        state.evaluate_contacts(&[ContactSample::new(Vec3::Y, 1, None), ContactSample::new(Vec3::X, 1, None)], &config);
        let mut velocity = Vec3::ZERO;
        state.update_state(&mut velocity, &body(), &config, &FlatEnvironment::default(), DT);
        state.clear_state();

        assert_eq!(state.last_contact_normal(), Vec3::Y);
        assert_eq!(state.last_steep_normal(), Vec3::X);
        assert_eq!(state.contacts.ground_count, 0);
        assert_eq!(state.contact_normal, Vec3::ZERO);
    }
}
