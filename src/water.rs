//! Water helpers shared by characters and gravity bodies.

use bevy::prelude::*;

/// A water volume overlapping a body this step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WaterOverlap {
    /// Rigid body the water collider is attached to (if any).
    pub body: Option<Entity>,
}

impl WaterOverlap {
    pub fn new(body: Option<Entity>) -> Self {
        Self { body }
    }
}

/// Submergence from a downward probe that started `range` above the deepest
/// point of interest.
///
/// A hit at distance `d` gives `1 - d / range`; no hit means the probe
/// started below the surface, i.e. fully submerged. The result is in [0, 1].
pub fn submergence_from_probe(hit_distance: Option<f32>, range: f32) -> f32 {
    match hit_distance {
        Some(distance) if range > 0.0 => (1.0 - distance / range).clamp(0.0, 1.0),
        Some(_) => 0.0,
        None => 1.0,
    }
}

/// Velocity scale applied by water drag over one step, in [0, 1].
pub fn water_drag_factor(water_drag: f32, submergence: f32, dt: f32) -> f32 {
    (1.0 - water_drag * submergence * dt).clamp(0.0, 1.0)
}

/// Fraction of gravity left after buoyancy.
///
/// Negative values mean the body floats upward.
#[inline]
pub fn buoyancy_scale(buoyancy: f32, submergence: f32) -> f32 {
    1.0 - buoyancy * submergence
}
