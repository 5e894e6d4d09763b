//! Gravity source shapes.
//!
//! Each source computes the gravity it contributes at a world-space point.
//! The set of shapes is closed: [`GravitySource`] dispatches over the
//! variants with a single `match`, and the [`GravityField`](crate::field::GravityField)
//! sums their contributions.

use bevy::prelude::*;

/// Placement of a gravity zone in world space.
///
/// Zones are evaluated in their local frame: the query point is moved into
/// the frame, the contribution is computed there, and the result is rotated
/// back to world space.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ZoneFrame {
    /// World-space origin of the zone.
    pub origin: Vec3,
    /// World-space rotation of the zone.
    pub rotation: Quat,
}

impl Default for ZoneFrame {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl ZoneFrame {
    /// Create a frame from an origin and a rotation.
    pub fn new(origin: Vec3, rotation: Quat) -> Self {
        Self {
            origin,
            rotation: rotation.normalize(),
        }
    }

    /// Create an unrotated frame at `origin`.
    pub fn at(origin: Vec3) -> Self {
        Self::new(origin, Quat::IDENTITY)
    }

    /// Create a frame from an entity's global transform (scale is ignored).
    pub fn from_global_transform(transform: &GlobalTransform) -> Self {
        let (_, rotation, translation) = transform.to_scale_rotation_translation();
        Self::new(translation, rotation)
    }

    /// Transform a world-space point into the frame.
    #[inline]
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.origin)
    }

    /// Rotate a frame-local direction into world space.
    #[inline]
    pub fn to_world_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation * direction
    }

    /// The frame's local +Y axis in world space.
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

/// `1 / (falloff - distance)`, or 0 when the band is empty.
///
/// With an empty band the falloff is a step: a point past `distance` is also
/// past `falloff`, so the factor is never read.
#[inline]
fn falloff_factor(distance: f32, falloff: f32) -> f32 {
    let band = falloff - distance;
    if band > 0.0 { 1.0 / band } else { 0.0 }
}

/// Box-shaped gravity zone.
///
/// Outside the box, gravity pulls toward the nearest face, edge or corner,
/// fading out between `outer_distance` and `outer_falloff_distance`. Inside the
/// box, only the axis of the nearest face contributes: full strength up to
/// `inner_distance` from that face, fading out by `inner_falloff_distance`.
/// A positive local coordinate on that axis yields a negative component and
/// vice versa.
///
/// Parameters are sanitized on every change so that
/// `0 <= inner_distance <= inner_falloff_distance <= min(half_extents)` and
/// `outer_distance <= outer_falloff_distance` always hold.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct GravityBox {
    frame: ZoneFrame,
    gravity: f32,
    half_extents: Vec3,
    inner_distance: f32,
    inner_falloff_distance: f32,
    outer_distance: f32,
    outer_falloff_distance: f32,
    inner_falloff_factor: f32,
    outer_falloff_factor: f32,
}

impl Default for GravityBox {
    fn default() -> Self {
        Self::new(9.81, Vec3::ONE)
    }
}

impl GravityBox {
    /// Create a box zone with the given gravity magnitude and half extents.
    ///
    /// All inner and outer distances start at zero.
    pub fn new(gravity: f32, half_extents: Vec3) -> Self {
        let mut zone = Self {
            frame: ZoneFrame::default(),
            gravity,
            half_extents,
            inner_distance: 0.0,
            inner_falloff_distance: 0.0,
            outer_distance: 0.0,
            outer_falloff_distance: 0.0,
            inner_falloff_factor: 0.0,
            outer_falloff_factor: 0.0,
        };
        zone.sanitize();
        zone
    }

    /// Builder: set the inner shell distances.
    pub fn with_inner(mut self, distance: f32, falloff_distance: f32) -> Self {
        self.set_inner(distance, falloff_distance);
        self
    }

    /// Builder: set the outer shell distances.
    pub fn with_outer(mut self, distance: f32, falloff_distance: f32) -> Self {
        self.set_outer(distance, falloff_distance);
        self
    }

    /// Builder: place the zone.
    pub fn with_frame(mut self, frame: ZoneFrame) -> Self {
        self.frame = frame;
        self
    }

    /// Set the inner shell distances, clamped to the box.
    pub fn set_inner(&mut self, distance: f32, falloff_distance: f32) {
        self.inner_distance = distance;
        self.inner_falloff_distance = falloff_distance;
        self.sanitize();
    }

    /// Set the outer shell distances.
    pub fn set_outer(&mut self, distance: f32, falloff_distance: f32) {
        self.outer_distance = distance;
        self.outer_falloff_distance = falloff_distance;
        self.sanitize();
    }

    /// Set the half extents. Inner distances are re-clamped to fit.
    pub fn set_half_extents(&mut self, half_extents: Vec3) {
        self.half_extents = half_extents;
        self.sanitize();
    }

    /// Set the gravity magnitude.
    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
    }

    /// Move the zone.
    pub fn set_frame(&mut self, frame: ZoneFrame) {
        self.frame = frame;
    }

    pub fn frame(&self) -> ZoneFrame {
        self.frame
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    pub fn inner_distance(&self) -> f32 {
        self.inner_distance
    }

    pub fn inner_falloff_distance(&self) -> f32 {
        self.inner_falloff_distance
    }

    pub fn outer_distance(&self) -> f32 {
        self.outer_distance
    }

    pub fn outer_falloff_distance(&self) -> f32 {
        self.outer_falloff_distance
    }

    fn sanitize(&mut self) {
        self.half_extents = self.half_extents.max(Vec3::ZERO);
        let max_inner = self.half_extents.min_element();

        self.inner_distance = self.inner_distance.clamp(0.0, max_inner);
        self.inner_falloff_distance = self
            .inner_falloff_distance
            .min(max_inner)
            .max(self.inner_distance);

        self.outer_distance = self.outer_distance.max(0.0);
        self.outer_falloff_distance = self.outer_falloff_distance.max(self.outer_distance);

        self.inner_falloff_factor = falloff_factor(self.inner_distance, self.inner_falloff_distance);
        self.outer_falloff_factor = falloff_factor(self.outer_distance, self.outer_falloff_distance);
    }

    /// Gravity contributed at a world-space point.
    pub fn compute_gravity(&self, point: Vec3) -> Vec3 {
        let local = self.frame.to_local(point);
        let extents = self.half_extents;

        let mut vector = Vec3::ZERO;
        let mut outside = 0;

        for axis in 0..3 {
            if local[axis] > extents[axis] {
                vector[axis] = extents[axis] - local[axis];
                outside += 1;
            } else if local[axis] < -extents[axis] {
                vector[axis] = -extents[axis] - local[axis];
                outside += 1;
            }
        }

        if outside > 0 {
            // One axis outside: distance to a face. Several: to an edge or corner.
            let distance = if outside == 1 {
                (vector.x + vector.y + vector.z).abs()
            } else {
                vector.length()
            };

            if distance > self.outer_falloff_distance {
                return Vec3::ZERO;
            }

            let mut g = self.gravity / distance;
            if distance > self.outer_distance {
                g *= 1.0 - (distance - self.outer_distance) * self.outer_falloff_factor;
            }

            return self.frame.to_world_direction(vector * g);
        }

        let margins = extents - local.abs();
        let axis = nearest_face_axis(margins);

        let mut vector = Vec3::ZERO;
        vector[axis] = self.inner_component(local[axis], margins[axis]);
        self.frame.to_world_direction(vector)
    }

    fn inner_component(&self, coordinate: f32, margin: f32) -> f32 {
        if margin > self.inner_falloff_distance {
            return 0.0;
        }

        let mut g = self.gravity;
        if margin > self.inner_distance {
            g *= 1.0 - (margin - self.inner_distance) * self.inner_falloff_factor;
        }

        if coordinate > 0.0 { -g } else { g }
    }
}

/// Index of the axis with the smallest margin. Ties go to x, then y, then z.
#[inline]
fn nearest_face_axis(margins: Vec3) -> usize {
    if margins.x <= margins.y && margins.x <= margins.z {
        0
    } else if margins.y <= margins.z {
        1
    } else {
        2
    }
}

/// Half-space gravity zone.
///
/// Full gravity along `-up` at or below the plane, fading linearly to zero
/// at `range` above it, and nothing beyond.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct GravityPlane {
    frame: ZoneFrame,
    gravity: f32,
    range: f32,
}

impl Default for GravityPlane {
    fn default() -> Self {
        Self::new(9.81, 1.0)
    }
}

impl GravityPlane {
    /// Create a plane zone. Negative ranges are clamped to zero.
    pub fn new(gravity: f32, range: f32) -> Self {
        Self {
            frame: ZoneFrame::default(),
            gravity,
            range: range.max(0.0),
        }
    }

    /// Builder: place the plane. The frame's +Y is the plane's up.
    pub fn with_frame(mut self, frame: ZoneFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn set_frame(&mut self, frame: ZoneFrame) {
        self.frame = frame;
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
    }

    pub fn set_range(&mut self, range: f32) {
        self.range = range.max(0.0);
    }

    pub fn frame(&self) -> ZoneFrame {
        self.frame
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn range(&self) -> f32 {
        self.range
    }

    /// Gravity contributed at a world-space point.
    pub fn compute_gravity(&self, point: Vec3) -> Vec3 {
        let up = self.frame.up();
        let distance = up.dot(point - self.frame.origin);

        if distance > self.range {
            return Vec3::ZERO;
        }

        let mut g = -self.gravity;
        if distance > 0.0 {
            g *= 1.0 - distance / self.range;
        }

        up * g
    }
}

/// A gravity source of any supported shape.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub enum GravitySource {
    /// Constant acceleration everywhere (e.g. `Vec3::new(0.0, -9.81, 0.0)`).
    Uniform(Vec3),
    /// Box zone.
    Box(GravityBox),
    /// Plane zone.
    Plane(GravityPlane),
}

impl Default for GravitySource {
    fn default() -> Self {
        Self::Uniform(Vec3::new(0.0, -9.81, 0.0))
    }
}

impl From<GravityBox> for GravitySource {
    fn from(zone: GravityBox) -> Self {
        Self::Box(zone)
    }
}

impl From<GravityPlane> for GravitySource {
    fn from(zone: GravityPlane) -> Self {
        Self::Plane(zone)
    }
}

impl GravitySource {
    /// Gravity contributed at a world-space point.
    #[inline]
    pub fn compute_gravity(&self, point: Vec3) -> Vec3 {
        match self {
            Self::Uniform(acceleration) => *acceleration,
            Self::Box(zone) => zone.compute_gravity(point),
            Self::Plane(zone) => zone.compute_gravity(point),
        }
    }

    /// Move the source. Uniform sources have no placement and ignore this.
    pub fn set_frame(&mut self, frame: ZoneFrame) {
        match self {
            Self::Uniform(_) => {}
            Self::Box(zone) => zone.set_frame(frame),
            Self::Plane(zone) => zone.set_frame(frame),
        }
    }
}

/// Component that makes an entity a gravity source.
///
/// The source's frame follows the entity's [`GlobalTransform`]; the plugin
/// keeps the [`GravityField`](crate::field::GravityField) in sync as zones are
/// spawned, changed, moved and despawned.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct GravityZone {
    pub source: GravitySource,
}

impl GravityZone {
    pub fn new(source: impl Into<GravitySource>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn uniform(acceleration: Vec3) -> Self {
        Self::new(GravitySource::Uniform(acceleration))
    }
}
