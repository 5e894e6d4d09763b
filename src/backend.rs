//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to work with the gravity controller. This allows easy swapping
//! between physics engines (Rapier3D, custom, etc.).
//!
//! Queries that need the physics engine's spatial structures (ray casts,
//! contact and overlap enumeration) are not part of the trait. The backend's
//! plugin runs them in [`GravityControllerSet::Sensors`](crate::GravityControllerSet::Sensors)
//! and stores the results in [`PhysicsSensors`] components, which the core
//! systems read afterwards.

use bevy::prelude::*;

use crate::collision::{CollisionData, ContactSample};
use crate::water::WaterOverlap;

/// Trait for physics backend implementations.
///
/// Implement this trait to integrate a physics engine with the gravity
/// controller. The backend handles body state access (pose, velocity, mass)
/// and force application.
///
/// # Example
///
/// For an example implementation, see the `rapier` module's `Rapier3dBackend`
/// which implements this trait for Bevy Rapier3D.
///
/// ```rust
/// use bevy::prelude::*;
/// use msg_gravity_controller::prelude::*;
///
/// // The trait is implemented by physics backends like Rapier3dBackend
/// #[cfg(feature = "rapier3d")]
/// fn example_usage() {
///     // Access backend methods statically
///     // In practice, these are called by the controller systems
/// }
/// ```
pub trait CharacterPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend (including its sensor systems).
    fn plugin() -> impl Plugin;

    /// Get the current linear velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec3;

    /// Set the linear velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3);

    /// Get the current angular velocity of an entity.
    fn get_angular_velocity(world: &World, entity: Entity) -> Vec3;

    /// Set the angular velocity of an entity.
    fn set_angular_velocity(world: &mut World, entity: Entity, angular_velocity: Vec3);

    /// Get the current position of an entity.
    fn get_position(world: &World, entity: Entity) -> Vec3;

    /// Get the current rotation of an entity.
    fn get_rotation(world: &World, entity: Entity) -> Quat;

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32;

    /// Apply an acceleration at a world-space point over the next physics step.
    ///
    /// The default changes linear velocity directly and ignores the point.
    fn apply_acceleration_at_point(
        world: &mut World,
        entity: Entity,
        acceleration: Vec3,
        _point: Vec3,
    ) {
        let dt = Self::get_fixed_timestep(world);
        let velocity = Self::get_velocity(world, entity);
        Self::set_velocity(world, entity, velocity + acceleration * dt);
    }

    /// Whether the entity is a simulated rigid body (dynamic or kinematic).
    ///
    /// Static colliders are not rigid bodies: the character never connects to them.
    fn is_rigid_body(world: &World, entity: Entity) -> bool;

    /// Whether the entity is a kinematic rigid body.
    fn is_kinematic(_world: &World, _entity: Entity) -> bool {
        false
    }

    /// Whether the physics engine put the body to sleep.
    fn is_sleeping(_world: &World, _entity: Entity) -> bool {
        false
    }

    /// Get the mass of an entity.
    fn get_mass(_world: &World, _entity: Entity) -> f32 {
        // Default implementation returns 1.0
        1.0
    }
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}

/// Helper struct for building raycasts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastRequest {
    /// Origin point of the ray.
    pub origin: Vec3,
    /// Direction of the ray (normalized).
    pub direction: Vec3,
    /// Maximum distance to cast.
    pub max_distance: f32,
    /// Collision-group membership bits a collider must have to be hit.
    pub mask: u32,
    /// Whether sensor colliders can be hit.
    pub include_sensors: bool,
}

impl RaycastRequest {
    /// Create a new raycast request hitting solid colliders on any layer.
    pub fn new(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_distance,
            mask: u32::MAX,
            include_sensors: false,
        }
    }

    /// Only hit colliders on `mask`.
    pub fn with_mask(mut self, mask: u32) -> Self {
        self.mask = mask;
        self
    }

    /// Hit sensor colliders too.
    pub fn including_sensors(mut self) -> Self {
        self.include_sensors = true;
        self
    }

    /// Point along the ray at `distance`.
    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Per-step physics readings for a character or gravity body.
///
/// The core systems fill in the requested rays during
/// [`Preparation`](crate::GravityControllerSet::Preparation); the backend casts
/// them and enumerates contacts and water overlaps during
/// [`Sensors`](crate::GravityControllerSet::Sensors).
#[derive(Component, Debug, Clone, Default)]
pub struct PhysicsSensors {
    /// Ground snap probe to cast this step.
    pub ground_ray: Option<RaycastRequest>,
    /// Submergence probe to cast this step (only while overlapping water).
    pub water_ray: Option<RaycastRequest>,
    /// Result of `ground_ray`.
    pub ground_hit: Option<CollisionData>,
    /// Result of `water_ray`.
    pub water_hit: Option<CollisionData>,
    /// Active contacts of the body, normals pointing toward the body.
    pub contacts: Vec<ContactSample>,
    /// Water volume the body overlaps, if any.
    pub water: Option<WaterOverlap>,
}

impl PhysicsSensors {
    /// Drop the readings of the previous step, keeping the requests.
    pub fn clear_readings(&mut self) {
        self.ground_hit = None;
        self.water_hit = None;
        self.contacts.clear();
        self.water = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raycast_request_normalizes_direction() {
        let request = RaycastRequest::new(Vec3::ZERO, Vec3::new(0.0, -3.0, 0.0), 2.0);
        assert_eq!(request.direction, Vec3::NEG_Y);
        assert_eq!(request.mask, u32::MAX);
        assert!(!request.include_sensors);
        assert_eq!(request.point_at(2.0), Vec3::new(0.0, -2.0, 0.0));
    }

    #[test]
    fn raycast_request_builders() {
        let request = RaycastRequest::new(Vec3::ONE, Vec3::X, 1.0)
            .with_mask(0b10)
            .including_sensors();
        assert_eq!(request.mask, 0b10);
        assert!(request.include_sensors);
    }

    #[test]
    fn clearing_readings_keeps_requests() {
        let mut sensors = PhysicsSensors {
            ground_ray: Some(RaycastRequest::new(Vec3::ZERO, Vec3::NEG_Y, 1.0)),
            ground_hit: Some(CollisionData::default()),
            contacts: vec![ContactSample::new(Vec3::Y, 1, None)],
            water: Some(WaterOverlap::default()),
            ..default()
        };
        sensors.clear_readings();

        assert!(sensors.ground_ray.is_some());
        assert!(sensors.ground_hit.is_none());
        assert!(sensors.contacts.is_empty());
        assert!(sensors.water.is_none());
    }
}
