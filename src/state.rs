//! Locomotion state and state marker components.
//!
//! [`LocomotionState`] is the per-character record the controller carries
//! from one fixed step to the next. The marker components mirror its derived
//! mode for visual consumers; they are added and removed by the controller
//! systems after each step.

use bevy::prelude::*;

use crate::contacts::ContactAccumulator;

/// Marker component indicating the character is grounded.
///
/// Added when the step resolved a ground contact (direct, snapped, or a
/// promoted steep contact). Removed when the character becomes airborne.
///
/// This is a marker component - it has no data, just indicates state.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use msg_gravity_controller::prelude::*;
///
/// // Grounded is a marker component - just use it in queries
/// fn check_grounded(grounded: Option<&Grounded>) -> bool {
///     grounded.is_some()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
///
/// Mutually exclusive with every other mode marker.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating the character only touches surfaces too steep
/// to stand on.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct OnSteep {
    /// Averaged normal of the steep contacts.
    pub normal: Vec3,
}

impl Default for OnSteep {
    fn default() -> Self {
        Self { normal: Vec3::X }
    }
}

/// Marker component indicating the character is clinging to a climbable wall.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Climbing;

/// Marker component indicating the character is swimming.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Swimming;

/// Movement mode derived from the contact counters of a step.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocomotionMode {
    Grounded,
    Steep,
    Climbing,
    Swimming,
    #[default]
    Airborne,
}

/// Attachment to the body the character stands on, clings to or swims in.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct Connection {
    /// Body connected during the previous step.
    pub previous_body: Option<Entity>,
    /// Attach point in world space, recorded last step.
    pub world_position: Vec3,
    /// Attach point in the connected body's local space.
    pub local_position: Vec3,
    /// Velocity of the attach point this step.
    pub velocity: Vec3,
    /// Velocity of the attach point during the previous step.
    pub last_velocity: Vec3,
}

/// Per-character locomotion state.
///
/// Counters, normals and the connection persist between steps. The contact
/// buckets in [`contacts`](Self::contacts) only live for the step that fills
/// them.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct LocomotionState {
    /// Contact buckets of the current step.
    pub(crate) contacts: ContactAccumulator,
    /// Summed gravity at the character this step.
    pub(crate) gravity: Vec3,
    /// Unit up axis this step.
    pub(crate) up_axis: Vec3,
    /// Planar movement axes (input right / forward projected off the up axis).
    pub(crate) right_axis: Vec3,
    pub(crate) forward_axis: Vec3,
    /// Resolved normal of the movement plane.
    pub(crate) contact_normal: Vec3,
    pub(crate) steep_normal: Vec3,
    pub(crate) climb_normal: Vec3,
    pub(crate) last_contact_normal: Vec3,
    pub(crate) last_steep_normal: Vec3,
    pub(crate) desires_climbing: bool,
    pub(crate) jump_phase: u32,
    pub(crate) steps_since_last_grounded: u32,
    /// Negative while ground snapping is suppressed.
    pub(crate) steps_since_last_jump: i32,
    pub(crate) submergence: f32,
    pub(crate) connection: Connection,
    /// Whether the last step had to fall back to the previous up axis.
    pub(crate) gravity_degenerate: bool,
    /// Mode snapshot taken before the step's buckets were cleared.
    pub(crate) mode: LocomotionMode,
}

impl Default for LocomotionState {
    fn default() -> Self {
        Self {
            contacts: ContactAccumulator::default(),
            gravity: Vec3::ZERO,
            up_axis: Vec3::Y,
            right_axis: Vec3::X,
            forward_axis: Vec3::NEG_Z,
            contact_normal: Vec3::Y,
            steep_normal: Vec3::ZERO,
            climb_normal: Vec3::ZERO,
            last_contact_normal: Vec3::Y,
            last_steep_normal: Vec3::ZERO,
            desires_climbing: false,
            jump_phase: 0,
            steps_since_last_grounded: 0,
            steps_since_last_jump: 0,
            submergence: 0.0,
            connection: Connection::default(),
            gravity_degenerate: false,
            mode: LocomotionMode::Airborne,
        }
    }
}

impl LocomotionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the current step has a ground contact.
    #[inline]
    pub fn on_ground(&self) -> bool {
        self.contacts.on_ground()
    }

    /// Whether the current step has a steep contact.
    #[inline]
    pub fn on_steep(&self) -> bool {
        self.contacts.on_steep()
    }

    /// Whether the character clings to a climbable surface.
    ///
    /// Climbing is suppressed for two steps after a jump so the character can
    /// jump away from a wall.
    #[inline]
    pub fn climbing(&self) -> bool {
        self.contacts.climb_count > 0 && self.steps_since_last_jump > 2
    }

    /// Whether the character touches water at all.
    #[inline]
    pub fn in_water(&self) -> bool {
        self.submergence > 0.0
    }

    /// Whether the character is deep enough in water to swim.
    #[inline]
    pub fn swimming(&self, swim_threshold: f32) -> bool {
        self.submergence >= swim_threshold
    }

    /// Mode derived from the live counters of the step in progress.
    pub(crate) fn current_mode(&self, swim_threshold: f32) -> LocomotionMode {
        if self.climbing() {
            LocomotionMode::Climbing
        } else if self.swimming(swim_threshold) {
            LocomotionMode::Swimming
        } else if self.on_ground() {
            LocomotionMode::Grounded
        } else if self.on_steep() {
            LocomotionMode::Steep
        } else {
            LocomotionMode::Airborne
        }
    }

    /// Mode resolved by the most recent step.
    pub fn mode(&self) -> LocomotionMode {
        self.mode
    }

    /// Up axis used by the most recent step.
    pub fn up_axis(&self) -> Vec3 {
        self.up_axis
    }

    /// Gravity sampled by the most recent step.
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Contact normal of the most recent step (the up axis when airborne).
    pub fn last_contact_normal(&self) -> Vec3 {
        self.last_contact_normal
    }

    /// Steep normal of the most recent step (zero when there was none).
    pub fn last_steep_normal(&self) -> Vec3 {
        self.last_steep_normal
    }

    /// Submergence in [0, 1] measured by the most recent step.
    pub fn submergence(&self) -> f32 {
        self.submergence
    }

    /// Air jumps consumed since the character last stood on something.
    pub fn jump_phase(&self) -> u32 {
        self.jump_phase
    }

    pub fn steps_since_last_grounded(&self) -> u32 {
        self.steps_since_last_grounded
    }

    pub fn steps_since_last_jump(&self) -> i32 {
        self.steps_since_last_jump
    }

    /// Body the character was connected to during the most recent step.
    pub fn connected_body(&self) -> Option<Entity> {
        self.connection.previous_body
    }

    /// Velocity of the connected body's attach point during the most recent step.
    pub fn connection_velocity(&self) -> Vec3 {
        self.connection.last_velocity
    }

    /// Suppress ground snapping for the next steps.
    ///
    /// Call this after imparting an external velocity change (a launch pad,
    /// an explosion) so the next step does not glue the character back onto
    /// the ground.
    pub fn prevent_snap_to_ground(&mut self) {
        self.steps_since_last_jump = -1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_airborne_with_world_up() {
        let state = LocomotionState::new();
        assert_eq!(state.mode(), LocomotionMode::Airborne);
        assert_eq!(state.up_axis(), Vec3::Y);
        assert_eq!(state.last_contact_normal(), Vec3::Y);
        assert!(!state.in_water());
    }

    #[test]
    fn climbing_waits_after_jump() {
        let mut state = LocomotionState::new();
        state.contacts.climb_count = 1;

        state.steps_since_last_jump = 2;
        assert!(!state.climbing());

        state.steps_since_last_jump = 3;
        assert!(state.climbing());
    }

    #[test]
    fn mode_precedence() {
        let mut state = LocomotionState::new();
        state.steps_since_last_jump = 10;
        state.contacts.ground_count = 1;
        state.contacts.steep_count = 1;
        assert_eq!(state.current_mode(0.5), LocomotionMode::Grounded);

        state.submergence = 0.6;
        assert_eq!(state.current_mode(0.5), LocomotionMode::Swimming);

        state.contacts.climb_count = 1;
        assert_eq!(state.current_mode(0.5), LocomotionMode::Climbing);

        let mut steep = LocomotionState::new();
        steep.contacts.steep_count = 2;
        assert_eq!(steep.current_mode(0.5), LocomotionMode::Steep);
    }

    #[test]
    fn water_thresholds() {
        let mut state = LocomotionState::new();
        state.submergence = 0.3;
        assert!(state.in_water());
        assert!(!state.swimming(0.5));
        state.submergence = 0.5;
        assert!(state.swimming(0.5));
    }

    #[test]
    fn prevent_snap_sets_sentinel() {
        let mut state = LocomotionState::new();
        state.steps_since_last_jump = 12;
        state.prevent_snap_to_ground();
        assert_eq!(state.steps_since_last_jump(), -1);
    }
}
