//! Controller configuration components.
//!
//! This module defines the tunables of the locomotion controller: speeds and
//! accelerations per movement mode, jump parameters, slope limits, ground
//! snapping, water behavior and the collision layers each feature reacts to.

use bevy::prelude::*;

use crate::collision::in_mask;

/// Configuration parameters for the locomotion controller.
///
/// Angle limits are stored in degrees and converted to dot-product thresholds
/// on access, so editing an angle at runtime takes effect on the next step.
///
/// Layer masks are collision-group membership bits: a collider belongs to a
/// layer set when any of its membership bits is in the mask.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct LocomotionConfig {
    // === Speed Settings ===
    /// Maximum speed when walking or in the air (units/second).
    pub max_speed: f32,
    /// Maximum speed when climbing, or when holding climb on the ground.
    pub max_climb_speed: f32,
    /// Maximum speed when fully swimming.
    pub max_swim_speed: f32,

    // === Acceleration Settings ===
    /// Acceleration while on the ground (units/second^2).
    pub max_acceleration: f32,
    /// Acceleration while airborne.
    pub max_air_acceleration: f32,
    /// Acceleration while climbing. Also sets how hard the character presses into walls.
    pub max_climb_acceleration: f32,
    /// Acceleration while fully swimming.
    pub max_swim_acceleration: f32,

    // === Jump Settings ===
    /// Height reached by a jump under the local gravity.
    pub jump_height: f32,
    /// Number of extra jumps allowed while airborne.
    pub max_air_jumps: u32,

    // === Slope Settings ===
    /// Steepest slope that counts as ground (degrees).
    pub max_ground_angle: f32,
    /// Steepest slope that counts as ground on stairs layers (degrees).
    pub max_stairs_angle: f32,
    /// Steepest overhang that can still be climbed (degrees, 90..=180).
    pub max_climb_angle: f32,

    // === Snap Settings ===
    /// Speed above which the character is allowed to leave the ground.
    pub max_snap_speed: f32,
    /// Length of the downward ground-snap probe.
    pub probe_distance: f32,

    // === Water Settings ===
    /// Height above the body center where the submergence probe starts.
    pub submergence_offset: f32,
    /// Probe depth over which submergence goes from 0 to 1.
    pub submergence_range: f32,
    /// Fraction of gravity cancelled per unit of submergence.
    pub buoyancy: f32,
    /// Velocity drag per second at full submergence.
    pub water_drag: f32,
    /// Submergence at which the character starts swimming.
    pub swim_threshold: f32,

    // === Layer Settings ===
    /// Layers hit by the ground-snap probe.
    pub probe_mask: u32,
    /// Layers treated as stairs (use `max_stairs_angle`).
    pub stairs_mask: u32,
    /// Layers that can be climbed.
    pub climb_mask: u32,
    /// Layers that are water volumes.
    pub water_mask: u32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            // Speed settings
            max_speed: 10.0,
            max_climb_speed: 4.0,
            max_swim_speed: 5.0,

            // Acceleration settings
            max_acceleration: 10.0,
            max_air_acceleration: 1.0,
            max_climb_acceleration: 40.0,
            max_swim_acceleration: 5.0,

            // Jump settings
            jump_height: 2.0,
            max_air_jumps: 0,

            // Slope settings
            max_ground_angle: 25.0,
            max_stairs_angle: 50.0,
            max_climb_angle: 140.0,

            // Snap settings
            max_snap_speed: 100.0,
            probe_distance: 1.0,

            // Water settings
            submergence_offset: 0.5,
            submergence_range: 1.0,
            buoyancy: 1.0,
            water_drag: 1.0,
            swim_threshold: 0.5,

            // Layer settings
            probe_mask: u32::MAX,
            stairs_mask: 0,
            climb_mask: u32::MAX,
            water_mask: 0,
        }
    }
}

impl LocomotionConfig {
    /// Minimum `dot(up, normal)` for ground.
    #[inline]
    pub fn min_ground_dot(&self) -> f32 {
        self.max_ground_angle.to_radians().cos()
    }

    /// Minimum `dot(up, normal)` for ground on stairs layers.
    #[inline]
    pub fn min_stairs_dot(&self) -> f32 {
        self.max_stairs_angle.to_radians().cos()
    }

    /// Minimum `dot(up, normal)` for a climbable surface.
    #[inline]
    pub fn min_climb_dot(&self) -> f32 {
        self.max_climb_angle.to_radians().cos()
    }

    /// Ground threshold for a collider on `layers`.
    #[inline]
    pub fn min_dot_for(&self, layers: u32) -> f32 {
        if in_mask(layers, self.stairs_mask) {
            self.min_stairs_dot()
        } else {
            self.min_ground_dot()
        }
    }

    /// Whether a collider on `layers` can be climbed.
    #[inline]
    pub fn is_climbable(&self, layers: u32) -> bool {
        in_mask(layers, self.climb_mask)
    }

    /// Builder: set max speeds (walk/air, climb, swim).
    pub fn with_speeds(mut self, max_speed: f32, climb_speed: f32, swim_speed: f32) -> Self {
        self.max_speed = max_speed;
        self.max_climb_speed = climb_speed;
        self.max_swim_speed = swim_speed;
        self
    }

    /// Builder: set accelerations (ground, air, climb, swim).
    pub fn with_accelerations(mut self, ground: f32, air: f32, climb: f32, swim: f32) -> Self {
        self.max_acceleration = ground;
        self.max_air_acceleration = air;
        self.max_climb_acceleration = climb;
        self.max_swim_acceleration = swim;
        self
    }

    /// Builder: set jump height and air jump budget.
    pub fn with_jump(mut self, height: f32, air_jumps: u32) -> Self {
        self.jump_height = height.max(0.0);
        self.max_air_jumps = air_jumps;
        self
    }

    /// Builder: set slope limits in degrees (ground, stairs, climb).
    pub fn with_angles(mut self, ground: f32, stairs: f32, climb: f32) -> Self {
        self.max_ground_angle = ground.clamp(0.0, 90.0);
        self.max_stairs_angle = stairs.clamp(0.0, 90.0);
        self.max_climb_angle = climb.clamp(90.0, 180.0);
        self
    }

    /// Builder: set ground snapping.
    pub fn with_snap(mut self, max_snap_speed: f32, probe_distance: f32) -> Self {
        self.max_snap_speed = max_snap_speed.max(0.0);
        self.probe_distance = probe_distance.max(0.0);
        self
    }

    /// Builder: set water behavior.
    pub fn with_water(
        mut self,
        submergence_offset: f32,
        submergence_range: f32,
        buoyancy: f32,
        water_drag: f32,
        swim_threshold: f32,
    ) -> Self {
        self.submergence_offset = submergence_offset;
        self.submergence_range = submergence_range.max(0.1);
        self.buoyancy = buoyancy.max(0.0);
        self.water_drag = water_drag.max(0.0);
        self.swim_threshold = swim_threshold.clamp(0.01, 1.0);
        self
    }

    /// Builder: set layer masks (probe, stairs, climb, water).
    pub fn with_layers(mut self, probe: u32, stairs: u32, climb: u32, water: u32) -> Self {
        self.probe_mask = probe;
        self.stairs_mask = stairs;
        self.climb_mask = climb;
        self.water_mask = water;
        self
    }
}
