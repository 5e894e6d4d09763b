//! Per-step contact accumulation.
//!
//! The physics backend hands the controller every contact of the current
//! step. Each contact is classified against the up axis into the ground,
//! steep and climb buckets. The buckets only live for one step: they are
//! filled before mode resolution and cleared after it.

use bevy::prelude::*;

use crate::collision::ContactSample;
use crate::config::LocomotionConfig;

/// `dot(up, normal)` above which a non-ground contact still counts as steep.
///
/// Anything below this faces downward (a ceiling) and is ignored.
pub const STEEP_MIN_UP_DOT: f32 = -0.01;

/// Contact buckets for one step.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactAccumulator {
    /// Sum of ground contact normals.
    pub ground_normal: Vec3,
    pub ground_count: u32,
    /// Sum of steep contact normals.
    pub steep_normal: Vec3,
    pub steep_count: u32,
    /// Sum of climbable contact normals.
    pub climb_normal: Vec3,
    pub climb_count: u32,
    /// Normal of the most recent climbable contact.
    pub latest_climb_normal: Vec3,
    /// Body the character is touching this step, if any.
    pub connected_body: Option<Entity>,
}

impl ContactAccumulator {
    /// Classify one contact and add it to the matching buckets.
    ///
    /// A contact is ground when `dot(up, normal)` reaches the slope threshold
    /// for its layer. Otherwise it may be steep (not facing down) and, if the
    /// character wants to climb a climbable layer within the climb angle, a
    /// climb contact too.
    pub fn evaluate(
        &mut self,
        contact: &ContactSample,
        up: Vec3,
        config: &LocomotionConfig,
        desires_climbing: bool,
    ) {
        let normal = contact.normal;
        let up_dot = up.dot(normal);

        if up_dot >= config.min_dot_for(contact.layers) {
            self.ground_count += 1;
            self.ground_normal += normal;
            self.connected_body = contact.body;
            return;
        }

        if up_dot > STEEP_MIN_UP_DOT {
            self.steep_count += 1;
            self.steep_normal += normal;
            if self.ground_count == 0 {
                self.connected_body = contact.body;
            }
        }

        if desires_climbing
            && up_dot >= config.min_climb_dot()
            && config.is_climbable(contact.layers)
        {
            self.climb_count += 1;
            self.climb_normal += normal;
            self.latest_climb_normal = normal;
            self.connected_body = contact.body;
        }
    }

    /// Classify every contact of a step.
    pub fn evaluate_all<'a>(
        &mut self,
        contacts: impl IntoIterator<Item = &'a ContactSample>,
        up: Vec3,
        config: &LocomotionConfig,
        desires_climbing: bool,
    ) {
        for contact in contacts {
            self.evaluate(contact, up, config, desires_climbing);
        }
    }

    #[inline]
    pub fn on_ground(&self) -> bool {
        self.ground_count > 0
    }

    #[inline]
    pub fn on_steep(&self) -> bool {
        self.steep_count > 0
    }

    /// Reset every bucket for the next step.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
