//! Collision data structures.
//!
//! These structures carry the results of physics queries (raycasts) and the
//! per-step contact list handed to the controller by the physics backend.

use bevy::prelude::*;

/// Information about a raycast hit.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionData {
    /// Distance to the hit point.
    pub distance: f32,
    /// Normal of the surface at hit point.
    pub normal: Vec3,
    /// World position of the hit point.
    pub point: Vec3,
    /// Collision-group membership bits of the collider that was hit.
    pub layers: u32,
    /// Rigid body the hit collider is attached to (if any).
    pub body: Option<Entity>,
}

impl CollisionData {
    /// Create a collision result.
    pub fn new(distance: f32, normal: Vec3, point: Vec3, layers: u32, body: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            layers,
            body,
        }
    }
}

/// One contact between the character and another collider during a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactSample {
    /// Contact normal, pointing from the other collider toward the character.
    pub normal: Vec3,
    /// Collision-group membership bits of the other collider.
    pub layers: u32,
    /// Rigid body the other collider is attached to (if any).
    pub body: Option<Entity>,
}

impl ContactSample {
    pub fn new(normal: Vec3, layers: u32, body: Option<Entity>) -> Self {
        Self {
            normal,
            layers,
            body,
        }
    }
}

/// Whether any bit of `layers` is set in `mask`.
#[inline]
pub fn in_mask(layers: u32, mask: u32) -> bool {
    layers & mask != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_data_new() {
        let hit = CollisionData::new(5.0, Vec3::Y, Vec3::new(10.0, 0.0, 0.0), 0b10, None);

        assert_eq!(hit.distance, 5.0);
        assert_eq!(hit.normal, Vec3::Y);
        assert_eq!(hit.point, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(hit.layers, 0b10);
    }

    #[test]
    fn contact_with_body() {
        let body = Entity::from_raw(42);
        let contact = ContactSample::new(Vec3::X, 1, Some(body));

        assert_eq!(contact.body, Some(body));
    }

    #[test]
    fn mask_membership() {
        assert!(in_mask(0b0100, 0b0110));
        assert!(!in_mask(0b0100, 0b0011));
        assert!(in_mask(0b0001, u32::MAX));
        assert!(!in_mask(0b0001, 0));
    }
}
