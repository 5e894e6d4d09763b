//! Acceleration zones and gravity-driven rigid bodies.
//!
//! [`AccelerationZone`] is a launch pad: a sensor that pushes overlapping
//! bodies along its local up axis. [`GravityBody`] makes an ordinary dynamic
//! body fall in the [`GravityField`](crate::field::GravityField) and float in
//! water. Both only hold the per-body math here; the systems in
//! [`systems`](crate::systems) apply it through the physics backend.

use bevy::prelude::*;

use crate::water::{submergence_from_probe, water_drag_factor};

/// Squared speed under which a gravity body counts as resting.
pub const REST_SPEED_SQUARED: f32 = 0.0001;

/// Seconds a gravity body must rest before gravity stops being applied.
pub const FLOAT_TO_SLEEP_DELAY: f32 = 1.0;

#[inline]
fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Sensor that accelerates overlapping bodies along its local up axis.
///
/// The physics backend fills [`overlapping`](Self::overlapping) every fixed
/// step with the rigid bodies touching the zone's sensor collider.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use msg_gravity_controller::prelude::*;
///
/// // A pad that launches anything on it to 12 units/s within a few steps.
/// let pad = AccelerationZone::new(200.0, 12.0);
/// assert_eq!(pad.speed(), 12.0);
/// ```
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct AccelerationZone {
    acceleration: f32,
    speed: f32,
    /// Rigid bodies overlapping the zone this step.
    pub overlapping: Vec<Entity>,
}

impl AccelerationZone {
    /// Zone reaching `speed` at `acceleration` (units/s²).
    ///
    /// An acceleration of zero sets the speed instantly. Negative values are
    /// clamped to zero.
    pub fn new(acceleration: f32, speed: f32) -> Self {
        Self {
            acceleration: acceleration.max(0.0),
            speed: speed.max(0.0),
            overlapping: Vec::new(),
        }
    }

    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_acceleration(&mut self, acceleration: f32) {
        self.acceleration = acceleration.max(0.0);
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    /// New velocity of a body inside a zone rotated by `rotation`.
    ///
    /// Only the component along the zone's up axis changes. Returns `None`
    /// when the body already moves at least as fast as the zone's speed.
    pub fn accelerate(&self, rotation: Quat, velocity: Vec3, dt: f32) -> Option<Vec3> {
        let mut local = rotation.inverse() * velocity;
        if local.y >= self.speed {
            return None;
        }

        local.y = if self.acceleration > 0.0 {
            move_towards(local.y, self.speed, self.acceleration * dt)
        } else {
            self.speed
        };
        Some(rotation * local)
    }
}

/// Velocity changes a [`GravityBody`] receives in one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityBodyForces {
    /// Factor applied to linear and angular velocity (1 outside water).
    pub drag: f32,
    /// Buoyancy acceleration and the local point it acts at.
    pub buoyancy: Option<(Vec3, Vec3)>,
    /// Gravity acceleration acting at the center of mass.
    pub gravity: Vec3,
}

/// A dynamic rigid body driven by the gravity field instead of the physics
/// engine's global gravity.
///
/// With water settings the body floats: it is slowed by water drag and pushed
/// up by buoyancy in proportion to its submergence. With
/// [`float_to_sleep`](Self::float_to_sleep) the body stops receiving gravity
/// once it has rested for a second, so the physics engine can put it to sleep.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct GravityBody {
    pub float_to_sleep: bool,
    /// Height above the body's center where the submergence probe starts.
    pub submergence_offset: f32,
    submergence_range: f32,
    buoyancy: f32,
    /// Local point where buoyancy acts.
    pub buoyancy_offset: Vec3,
    water_drag: f32,
    /// Collision-group bits of water volumes.
    pub water_mask: u32,
    pub(crate) float_delay: f32,
    pub(crate) submergence: f32,
}

impl Default for GravityBody {
    fn default() -> Self {
        Self {
            float_to_sleep: false,
            submergence_offset: 0.5,
            submergence_range: 1.0,
            buoyancy: 1.0,
            buoyancy_offset: Vec3::ZERO,
            water_drag: 1.0,
            water_mask: 0,
            float_delay: 0.0,
            submergence: 0.0,
        }
    }
}

impl GravityBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: stop applying gravity to bodies that came to rest.
    pub fn with_float_to_sleep(mut self, float_to_sleep: bool) -> Self {
        self.float_to_sleep = float_to_sleep;
        self
    }

    /// Builder: set water behavior.
    pub fn with_water(
        mut self,
        water_mask: u32,
        submergence_offset: f32,
        submergence_range: f32,
        buoyancy: f32,
        water_drag: f32,
    ) -> Self {
        self.water_mask = water_mask;
        self.submergence_offset = submergence_offset;
        self.set_submergence_range(submergence_range);
        self.set_buoyancy(buoyancy);
        self.set_water_drag(water_drag);
        self
    }

    /// Builder: set the local point buoyancy acts at.
    pub fn with_buoyancy_offset(mut self, offset: Vec3) -> Self {
        self.buoyancy_offset = offset;
        self
    }

    pub fn submergence_range(&self) -> f32 {
        self.submergence_range
    }

    pub fn set_submergence_range(&mut self, range: f32) {
        self.submergence_range = range.max(0.1);
    }

    pub fn buoyancy(&self) -> f32 {
        self.buoyancy
    }

    pub fn set_buoyancy(&mut self, buoyancy: f32) {
        self.buoyancy = buoyancy.max(0.0);
    }

    pub fn water_drag(&self) -> f32 {
        self.water_drag
    }

    pub fn set_water_drag(&mut self, water_drag: f32) {
        self.water_drag = water_drag.clamp(0.0, 10.0);
    }

    /// Submergence measured by the last step.
    pub fn submergence(&self) -> f32 {
        self.submergence
    }

    /// Record the water probe of this step. `None` means the body does not
    /// overlap water; otherwise `hit_distance` is the probe result.
    pub fn evaluate_submergence(&mut self, water_probe: Option<Option<f32>>) {
        self.submergence = match water_probe {
            Some(hit_distance) => submergence_from_probe(hit_distance, self.submergence_range),
            None => 0.0,
        };
    }

    /// Advance the float-to-sleep policy. Returns whether gravity applies.
    pub fn should_apply(&mut self, sleeping: bool, velocity: Vec3, dt: f32) -> bool {
        if !self.float_to_sleep {
            return true;
        }
        if sleeping {
            self.float_delay = 0.0;
            return false;
        }
        if velocity.length_squared() < REST_SPEED_SQUARED {
            self.float_delay += dt;
            self.float_delay < FLOAT_TO_SLEEP_DELAY
        } else {
            self.float_delay = 0.0;
            true
        }
    }

    /// Velocity changes for this step under `gravity`.
    pub fn forces(&self, gravity: Vec3, dt: f32) -> GravityBodyForces {
        if self.submergence <= 0.0 {
            return GravityBodyForces {
                drag: 1.0,
                buoyancy: None,
                gravity,
            };
        }

        GravityBodyForces {
            drag: water_drag_factor(self.water_drag, self.submergence, dt),
            buoyancy: Some((
                gravity * -(self.buoyancy * self.submergence),
                self.buoyancy_offset,
            )),
            gravity,
        }
    }
}
