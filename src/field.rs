//! Gravity field registry.
//!
//! The [`GravityField`] resource holds every active gravity source and sums
//! their contributions at a point. It is explicit, injectable state: the
//! plugin inserts it and keeps it in sync with [`GravityZone`](crate::gravity::GravityZone)
//! entities, and anything that simulates physics reads it.

use bevy::prelude::*;

use crate::error::{GravityFieldError, GravityFieldResult};
use crate::gravity::{GravitySource, ZoneFrame};

/// Aggregated gravity and the matching up axis at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravitySample {
    /// Summed gravity acceleration.
    pub gravity: Vec3,
    /// Unit vector opposite `gravity`, or the fallback when gravity is zero.
    pub up: Vec3,
    /// Whether `up` came from the fallback because gravity was zero.
    pub degenerate: bool,
}

/// Registry of gravity sources, keyed by the entity that owns each source.
///
/// Registration order has no effect on queries.
#[derive(Resource, Debug, Clone, Default)]
pub struct GravityField {
    sources: Vec<(Entity, GravitySource)>,
}

impl GravityField {
    /// Create an empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no source is registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Whether a source is registered under `key`.
    pub fn contains(&self, key: Entity) -> bool {
        self.sources.iter().any(|(k, _)| *k == key)
    }

    /// Get the source registered under `key`.
    pub fn get(&self, key: Entity) -> Option<&GravitySource> {
        self.sources.iter().find(|(k, _)| *k == key).map(|(_, s)| s)
    }

    /// Add a source. Fails if `key` is already registered.
    pub fn try_register(&mut self, key: Entity, source: GravitySource) -> GravityFieldResult<()> {
        if self.contains(key) {
            return Err(GravityFieldError::AlreadyRegistered(key));
        }
        self.sources.push((key, source));
        Ok(())
    }

    /// Remove a source. Fails if `key` is not registered.
    pub fn try_unregister(&mut self, key: Entity) -> GravityFieldResult<GravitySource> {
        let index = self
            .sources
            .iter()
            .position(|(k, _)| *k == key)
            .ok_or(GravityFieldError::NotRegistered(key))?;
        Ok(self.sources.swap_remove(index).1)
    }

    /// Add a source.
    ///
    /// Registering a key twice is a programmer error: it panics in debug
    /// builds and is logged and ignored in release builds.
    pub fn register(&mut self, key: Entity, source: GravitySource) {
        match self.try_register(key, source) {
            Ok(()) => debug!("registered gravity source {key}"),
            Err(err) => report_misuse(err),
        }
    }

    /// Remove a source.
    ///
    /// Removing an absent key is a programmer error: it panics in debug
    /// builds and is logged and ignored in release builds.
    pub fn unregister(&mut self, key: Entity) {
        match self.try_unregister(key) {
            Ok(_) => debug!("unregistered gravity source {key}"),
            Err(err) => report_misuse(err),
        }
    }

    /// Replace the parameters of a registered source.
    pub fn update(&mut self, key: Entity, source: GravitySource) -> GravityFieldResult<()> {
        let slot = self
            .sources
            .iter_mut()
            .find(|(k, _)| *k == key)
            .ok_or(GravityFieldError::NotRegistered(key))?;
        slot.1 = source;
        Ok(())
    }

    /// Move a registered source.
    pub fn set_frame(&mut self, key: Entity, frame: ZoneFrame) -> GravityFieldResult<()> {
        let slot = self
            .sources
            .iter_mut()
            .find(|(k, _)| *k == key)
            .ok_or(GravityFieldError::NotRegistered(key))?;
        slot.1.set_frame(frame);
        Ok(())
    }

    /// Remove every source.
    pub fn clear(&mut self) {
        self.sources.clear();
    }

    /// Sum of every source's contribution at `point`.
    pub fn gravity_at(&self, point: Vec3) -> Vec3 {
        self.sources
            .iter()
            .fold(Vec3::ZERO, |sum, (_, source)| sum + source.compute_gravity(point))
    }

    /// Unit up axis at `point`, or `None` where the summed gravity is zero.
    pub fn up_axis_at(&self, point: Vec3) -> Option<Vec3> {
        (-self.gravity_at(point)).try_normalize()
    }

    /// Gravity and up axis at `point`, holding `fallback_up` where gravity is zero.
    pub fn sample(&self, point: Vec3, fallback_up: Vec3) -> GravitySample {
        let gravity = self.gravity_at(point);
        match (-gravity).try_normalize() {
            Some(up) => GravitySample {
                gravity,
                up,
                degenerate: false,
            },
            None => GravitySample {
                gravity,
                up: fallback_up,
                degenerate: true,
            },
        }
    }
}

#[track_caller]
fn report_misuse(err: GravityFieldError) {
    debug_assert!(false, "{err}");
    warn!("ignoring gravity field misuse: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::{GravityBox, GravityPlane};

    fn key(index: u32) -> Entity {
        Entity::from_raw(index)
    }

    fn sources() -> Vec<GravitySource> {
        vec![
            GravitySource::Uniform(Vec3::new(0.0, -9.81, 0.0)),
            GravityPlane::new(5.0, 10.0)
                .with_frame(ZoneFrame::new(Vec3::ZERO, Quat::from_rotation_x(0.7)))
                .into(),
            GravityBox::new(7.0, Vec3::splat(2.0))
                .with_outer(3.0, 6.0)
                .with_frame(ZoneFrame::at(Vec3::new(4.0, 1.0, -2.0)))
                .into(),
        ]
    }

    #[test]
    fn empty_field_has_no_gravity() {
        let field = GravityField::new();
        assert!(field.is_empty());
        assert_eq!(field.gravity_at(Vec3::ONE), Vec3::ZERO);
        assert_eq!(field.up_axis_at(Vec3::ONE), None);
    }

    #[test]
    fn register_and_unregister() {
        let mut field = GravityField::new();
        field.register(key(1), GravitySource::default());
        assert!(field.contains(key(1)));
        assert_eq!(field.len(), 1);

        field.unregister(key(1));
        assert!(field.is_empty());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut field = GravityField::new();
        field.try_register(key(1), GravitySource::default()).unwrap();
        assert_eq!(
            field.try_register(key(1), GravitySource::default()),
            Err(GravityFieldError::AlreadyRegistered(key(1)))
        );
        assert_eq!(field.len(), 1);
    }

    #[test]
    fn unregistering_absent_source_is_rejected() {
        let mut field = GravityField::new();
        assert_eq!(
            field.try_unregister(key(3)),
            Err(GravityFieldError::NotRegistered(key(3)))
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already registered")]
    fn duplicate_register_panics_in_debug() {
        let mut field = GravityField::new();
        field.register(key(1), GravitySource::default());
        field.register(key(1), GravitySource::default());
    }

    #[test]
    fn summation_is_order_independent() {
        let all = sources();
        let orders = [[0, 1, 2], [2, 1, 0], [1, 2, 0], [1, 0, 2]];
        let points = [
            Vec3::ZERO,
            Vec3::new(4.0, 4.5, -2.0),
            Vec3::new(-3.0, 2.0, 7.0),
            Vec3::new(8.5, 1.0, -2.0),
        ];

        let mut reference = GravityField::new();
        for (i, source) in all.iter().enumerate() {
            reference.register(key(i as u32), *source);
        }

        for order in orders {
            let mut field = GravityField::new();
            for i in order {
                field.register(key(i as u32), all[i]);
            }
            for p in points {
                let diff = (field.gravity_at(p) - reference.gravity_at(p)).length();
                assert!(diff < 1e-4, "order {order:?} at {p:?} differs by {diff}");
            }
        }
    }

    #[test]
    fn up_axis_is_unit_length() {
        let mut field = GravityField::new();
        for (i, source) in sources().into_iter().enumerate() {
            field.register(key(i as u32), source);
        }

        for p in [Vec3::ZERO, Vec3::new(4.0, 4.5, -2.0), Vec3::new(-1.0, 3.0, 2.0)] {
            let up = field.up_axis_at(p).expect("nonzero gravity");
            assert!((up.length() - 1.0).abs() < 1e-5);
            assert!(up.dot(-field.gravity_at(p)) > 0.0);
        }
    }

    #[test]
    fn sample_holds_fallback_when_gravity_cancels() {
        let mut field = GravityField::new();
        field.register(key(1), GravitySource::Uniform(Vec3::new(0.0, -9.81, 0.0)));
        field.register(key(2), GravitySource::Uniform(Vec3::new(0.0, 9.81, 0.0)));

        let fallback = Vec3::new(0.0, 0.0, 1.0);
        let sample = field.sample(Vec3::ZERO, fallback);
        assert!(sample.degenerate);
        assert_eq!(sample.up, fallback);
        assert_eq!(sample.gravity, Vec3::ZERO);
        assert!(!sample.up.is_nan());
    }

    #[test]
    fn update_and_move_sources() {
        let mut field = GravityField::new();
        field.register(key(1), GravityPlane::new(9.81, 1.0).into());

        field
            .set_frame(key(1), ZoneFrame::at(Vec3::new(0.0, 5.0, 0.0)))
            .unwrap();
        assert!(field.gravity_at(Vec3::new(0.0, 4.0, 0.0)).length() > 9.0);
        assert_eq!(field.gravity_at(Vec3::new(0.0, 7.0, 0.0)), Vec3::ZERO);

        field
            .update(key(1), GravitySource::Uniform(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        assert_eq!(field.gravity_at(Vec3::ZERO), Vec3::new(1.0, 0.0, 0.0));

        assert!(field.update(key(9), GravitySource::default()).is_err());
    }
}
