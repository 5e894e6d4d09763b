//! # `msg_gravity_controller`
//!
//! A 3D rolling-sphere character controller for Bevy that walks, climbs and
//! swims under a gravity field made of many sources.
//!
//! This crate provides:
//! - A [`GravityField`](field::GravityField) resource summing uniform, box and plane gravity zones
//! - Arbitrary up axes: characters walk on walls and ceilings wherever gravity points
//! - Contact classification into ground, steep and climbable buckets with stairs support
//! - Ground snapping, moving-platform tracking, air jumps and wall jumps
//! - Water: submergence, drag, buoyancy and swimming
//! - Launch pads ([`AccelerationZone`](zones::AccelerationZone)) and gravity-driven props
//!   ([`GravityBody`](zones::GravityBody))
//! - A physics backend abstraction (Rapier3D included)
//!
//! ## Architecture
//!
//! Every fixed step runs the [`GravityControllerSet`] phases in order:
//! 1. Gravity zones are synced into the field and each body requests its probes
//! 2. The physics backend casts the probes and collects contacts and overlaps
//! 3. Acceleration zones push the bodies overlapping them
//! 4. Each character runs one atomic locomotion step
//! 5. Gravity bodies receive gravity and buoyancy
//! 6. Mode marker components are synced for visual consumers
//!
//! The algorithms behind step 4 are plain functions over plain data (see
//! [`controller::step_character`]) and do not need an ECS world.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use msg_gravity_controller::prelude::*;
//!
//! // Create controller components for a character
//! let state = LocomotionState::new();
//! let config = LocomotionConfig::default().with_jump(2.0, 1);
//! let mut intent = MovementIntent::default();
//! intent.set_movement(Vec2::new(0.0, 1.0));
//!
//! // Gravity comes from zones
//! let earth = GravityZone::uniform(Vec3::new(0.0, -9.81, 0.0));
//!
//! // These can be spawned with a physics bundle from the backend
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod collision;
pub mod config;
pub mod contacts;
pub mod controller;
pub mod error;
pub mod field;
pub mod gravity;
pub mod intent;
pub mod jump;
pub mod locomotion;
pub mod movement;
pub mod state;
pub mod systems;
pub mod water;
pub mod zones;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::{CharacterPhysicsBackend, PhysicsSensors};
    pub use crate::config::LocomotionConfig;
    pub use crate::error::GravityFieldError;
    pub use crate::field::GravityField;
    pub use crate::gravity::{GravityBox, GravityPlane, GravitySource, GravityZone, ZoneFrame};
    pub use crate::intent::{InputSpace, MovementIntent};
    pub use crate::state::{
        Airborne, Climbing, Grounded, LocomotionMode, LocomotionState, OnSteep, Swimming,
    };
    pub use crate::zones::{AccelerationZone, GravityBody};
    pub use crate::{GravityControllerPlugin, GravityControllerSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dCharacterBundle, Rapier3dGravityBodyBundle};
}

/// Phases of a fixed step, run in declaration order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GravityControllerSet {
    /// Sync gravity zones and request this step's probes.
    Preparation,
    /// Backend-specific collision queries.
    Sensors,
    /// Acceleration zones change overlapping bodies' velocities.
    Zones,
    /// One locomotion step per character.
    Locomotion,
    /// Gravity and buoyancy for gravity bodies.
    Integration,
    /// Mode marker sync.
    Cleanup,
}

/// Main plugin for the gravity controller.
///
/// This plugin is generic over a physics backend `B` which provides the actual
/// physics operations (body access, raycasting, contacts).
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier3dBackend`)
///
/// # Examples
///
/// With Rapier3D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use msg_gravity_controller::prelude::*;
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(GravityControllerPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct GravityControllerPlugin<B: backend::CharacterPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::CharacterPhysicsBackend> Default for GravityControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::CharacterPhysicsBackend> Plugin for GravityControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::LocomotionConfig>();
        app.register_type::<gravity::GravityZone>();
        app.register_type::<intent::MovementIntent>();
        app.register_type::<state::LocomotionState>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::OnSteep>();
        app.register_type::<state::Climbing>();
        app.register_type::<state::Swimming>();
        app.register_type::<zones::AccelerationZone>();
        app.register_type::<zones::GravityBody>();

        app.init_resource::<field::GravityField>();

        app.configure_sets(
            FixedUpdate,
            (
                GravityControllerSet::Preparation,
                GravityControllerSet::Sensors,
                GravityControllerSet::Zones,
                GravityControllerSet::Locomotion,
                GravityControllerSet::Integration,
                GravityControllerSet::Cleanup,
            )
                .chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            (
                systems::sync_gravity_zones,
                systems::request_character_probes::<B>,
                systems::request_body_probes::<B>,
            )
                .chain()
                .in_set(GravityControllerSet::Preparation),
        );
        app.add_systems(
            FixedUpdate,
            systems::apply_acceleration_zones::<B>.in_set(GravityControllerSet::Zones),
        );
        app.add_systems(
            FixedUpdate,
            systems::step_characters::<B>.in_set(GravityControllerSet::Locomotion),
        );
        app.add_systems(
            FixedUpdate,
            systems::apply_gravity_bodies::<B>.in_set(GravityControllerSet::Integration),
        );
        app.add_systems(
            FixedUpdate,
            systems::sync_state_markers.in_set(GravityControllerSet::Cleanup),
        );

        // Zone removals are also picked up in frames without a fixed step.
        app.add_systems(
            PostUpdate,
            systems::sync_gravity_zones.after(bevy::transform::TransformSystem::TransformPropagate),
        );
    }
}
