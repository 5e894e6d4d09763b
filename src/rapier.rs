//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature.

use bevy::prelude::*;
use bevy_rapier3d::geometry::Group;
use bevy_rapier3d::prelude::*;

use crate::backend::{CharacterPhysicsBackend, PhysicsSensors, RaycastRequest};
use crate::collision::{CollisionData, ContactSample, in_mask};
use crate::water::WaterOverlap;
use crate::zones::AccelerationZone;

/// Rapier3D physics backend for the gravity controller.
///
/// This backend uses `bevy_rapier3d` for body access and velocity
/// manipulation. Collision queries (raycasts, contacts and sensor overlaps)
/// are handled by dedicated Rapier systems that receive `RapierContext` as a
/// system parameter.
///
/// Characters and gravity bodies should carry `GravityScale(0.0)`: gravity
/// comes from the [`GravityField`](crate::field::GravityField), not Rapier.
pub struct Rapier3dBackend;

impl CharacterPhysicsBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn get_angular_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.angvel)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_angular_velocity(world: &mut World, entity: Entity, angular_velocity: Vec3) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.angvel = angular_velocity;
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation)
            .or_else(|| {
                world
                    .get::<GlobalTransform>(entity)
                    .map(|t| t.translation())
            })
            .unwrap_or(Vec3::ZERO)
    }

    fn get_rotation(world: &World, entity: Entity) -> Quat {
        world
            .get::<Transform>(entity)
            .map(|t| t.rotation)
            .or_else(|| {
                world
                    .get::<GlobalTransform>(entity)
                    .map(|t| t.to_scale_rotation_translation().1)
            })
            .unwrap_or(Quat::IDENTITY)
    }

    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }

    fn apply_acceleration_at_point(
        world: &mut World,
        entity: Entity,
        acceleration: Vec3,
        point: Vec3,
    ) {
        let dt = Self::get_fixed_timestep(world);
        let mass = Self::get_mass(world, entity);
        let center_of_mass = world
            .get::<ReadMassProperties>(entity)
            .map(|props| props.local_center_of_mass)
            .unwrap_or(Vec3::ZERO);
        let center_of_mass =
            Self::get_position(world, entity) + Self::get_rotation(world, entity) * center_of_mass;

        let impulse = acceleration * mass * dt;
        if let Some(mut ext_impulse) = world.get_mut::<ExternalImpulse>(entity) {
            ext_impulse.impulse += impulse;
            ext_impulse.torque_impulse += (point - center_of_mass).cross(impulse);
        } else if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            // Fallback: apply as velocity change if no ExternalImpulse component
            vel.linvel += acceleration * dt;
        }
    }

    fn is_rigid_body(world: &World, entity: Entity) -> bool {
        world
            .get::<RigidBody>(entity)
            .is_some_and(|body| !matches!(body, RigidBody::Fixed))
    }

    fn is_kinematic(world: &World, entity: Entity) -> bool {
        world.get::<RigidBody>(entity).is_some_and(|body| {
            matches!(
                body,
                RigidBody::KinematicPositionBased | RigidBody::KinematicVelocityBased
            )
        })
    }

    fn is_sleeping(world: &World, entity: Entity) -> bool {
        world
            .get::<Sleeping>(entity)
            .is_some_and(|sleeping| sleeping.sleeping)
    }

    fn get_mass(world: &World, entity: Entity) -> f32 {
        // Rapier fills ReadMassProperties after the collider's first step.
        world
            .get::<ReadMassProperties>(entity)
            .map(|props| props.mass)
            .filter(|&mass| mass > 0.0 && mass.is_finite())
            .unwrap_or(1.0)
    }
}

/// Plugin that sets up Rapier3D-specific systems for the gravity controller.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        use crate::GravityControllerSet;

        // Sensors: probes and contacts for bodies, overlaps for zones.
        app.add_systems(
            FixedUpdate,
            (rapier_body_sensors, rapier_zone_overlaps).in_set(GravityControllerSet::Sensors),
        );
    }
}

/// Collider data the sensor systems need about the other side of a query.
type ColliderInfo<'a> = (
    Option<&'a CollisionGroups>,
    Option<&'a RigidBody>,
    Option<&'a ChildOf>,
    Has<Sensor>,
);

/// Collision-group memberships of a collider. Colliders without groups are on
/// every layer.
fn collider_layers(q_colliders: &Query<ColliderInfo>, collider: Entity) -> u32 {
    q_colliders
        .get(collider)
        .ok()
        .and_then(|(groups, ..)| groups)
        .map(|groups| groups.memberships.bits())
        .unwrap_or(u32::MAX)
}

/// Non-fixed rigid body a collider belongs to: the collider itself or its parent.
fn collider_body(q_colliders: &Query<ColliderInfo>, collider: Entity) -> Option<Entity> {
    let is_body = |entity: Entity| {
        q_colliders
            .get(entity)
            .ok()
            .and_then(|(_, body, ..)| body)
            .is_some_and(|body| !matches!(body, RigidBody::Fixed))
    };

    if is_body(collider) {
        return Some(collider);
    }
    let parent = q_colliders
        .get(collider)
        .ok()
        .and_then(|(_, _, child_of, _)| child_of)
        .map(|child_of| child_of.parent())?;
    is_body(parent).then_some(parent)
}

fn is_sensor(q_colliders: &Query<ColliderInfo>, collider: Entity) -> bool {
    q_colliders
        .get(collider)
        .is_ok_and(|(_, _, _, sensor)| sensor)
}

/// Perform a raycast using RapierContext.
fn rapier_raycast(
    context: &RapierContext,
    q_colliders: &Query<ColliderInfo>,
    request: &RaycastRequest,
    exclude_entity: Entity,
) -> Option<CollisionData> {
    // Create filter to exclude the casting entity
    let mut filter = QueryFilter::default()
        .exclude_rigid_body(exclude_entity)
        .exclude_collider(exclude_entity)
        .groups(CollisionGroups::new(
            Group::ALL,
            Group::from_bits_truncate(request.mask),
        ));
    if !request.include_sensors {
        filter = filter.exclude_sensors();
    }

    // A ray starting inside a collider reports a hit at distance zero.
    context
        .cast_ray_and_get_normal(
            request.origin,
            request.direction,
            request.max_distance,
            true,
            filter,
        )
        .map(|(hit_entity, hit)| {
            CollisionData::new(
                hit.time_of_impact,
                hit.normal,
                hit.point,
                collider_layers(q_colliders, hit_entity),
                collider_body(q_colliders, hit_entity),
            )
        })
}

/// Rapier-specific sensor system for characters and gravity bodies.
///
/// Collects the body's contacts (normals pointing toward the body), finds an
/// overlapping water sensor, and casts the rays requested for this step. The
/// water probe is only cast while the body overlaps water.
fn rapier_body_sensors(
    rapier_context: ReadRapierContext,
    mut q_sensors: Query<(Entity, &mut PhysicsSensors)>,
    q_colliders: Query<ColliderInfo>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, mut sensors) in &mut q_sensors {
        sensors.clear_readings();

        let mut contacts = Vec::new();
        for pair in context.contact_pairs_with(entity) {
            if !pair.has_any_active_contact() {
                continue;
            }
            // Manifold normals point from the first collider to the second.
            let (other, flip) = if pair.collider1() == Some(entity) {
                (pair.collider2(), true)
            } else {
                (pair.collider1(), false)
            };
            let Some(other) = other else {
                continue;
            };
            let layers = collider_layers(&q_colliders, other);
            let body = collider_body(&q_colliders, other);

            for manifold in pair.manifolds() {
                let normal = if flip {
                    -manifold.normal()
                } else {
                    manifold.normal()
                };
                for _ in 0..manifold.num_points() {
                    contacts.push(ContactSample::new(normal, layers, body));
                }
            }
        }
        sensors.contacts = contacts;

        if let Some(water_ray) = sensors.water_ray {
            let water = context
                .intersection_pairs_with(entity)
                .filter(|&(_, _, intersecting)| intersecting)
                .map(|(a, b, _)| if a == entity { b } else { a })
                .find(|&other| {
                    is_sensor(&q_colliders, other)
                        && in_mask(collider_layers(&q_colliders, other), water_ray.mask)
                });

            if let Some(water) = water {
                sensors.water = Some(WaterOverlap::new(collider_body(&q_colliders, water)));
                sensors.water_hit = rapier_raycast(&context, &q_colliders, &water_ray, entity);
            }
        }

        if let Some(ground_ray) = sensors.ground_ray {
            sensors.ground_hit = rapier_raycast(&context, &q_colliders, &ground_ray, entity);
        }
    }
}

/// Rapier-specific overlap system for acceleration zones.
///
/// Records every non-fixed rigid body whose collider intersects the zone.
fn rapier_zone_overlaps(
    rapier_context: ReadRapierContext,
    mut q_zones: Query<(Entity, &mut AccelerationZone)>,
    q_colliders: Query<ColliderInfo>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (zone_entity, mut zone) in &mut q_zones {
        zone.overlapping.clear();

        for (a, b, intersecting) in context.intersection_pairs_with(zone_entity) {
            if !intersecting {
                continue;
            }
            let other = if a == zone_entity { b } else { a };
            if let Some(body) = collider_body(&q_colliders, other) {
                if !zone.overlapping.contains(&body) {
                    zone.overlapping.push(body);
                }
            }
        }
    }
}

/// Bundle containing all physics components required for a gravity-driven character
/// using Rapier3D.
///
/// This bundle includes the rigid body, velocity tracking, the impulse
/// accumulator, axis locking and mass properties needed for the gravity
/// controller to function with Rapier3D physics, plus the
/// [`PhysicsSensors`] the backend fills every fixed step.
///
/// # Usage
///
/// Use this bundle when spawning a character entity to ensure all required
/// physics components are present. The bundle provides sensible defaults but can be
/// customized using the builder methods.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use msg_gravity_controller::prelude::*;
/// use msg_gravity_controller::rapier::Rapier3dCharacterBundle;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 2.0, 0.0),
///         // Controller components
///         LocomotionState::new(),
///         LocomotionConfig::default().with_jump(2.0, 1),
///         MovementIntent::default(),
///         // Physics bundle
///         Rapier3dCharacterBundle::new(),
///         // The character is a sphere
///         Collider::ball(0.5),
///     ));
/// }
/// ```
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::Dynamic`]
/// - `velocity`: Zero velocity
/// - `external_impulse`: Zero impulse (used for buoyancy applied off-center)
/// - `locked_axes`: [`LockedAxes::ROTATION_LOCKED`]
/// - `damping`: None, the controller handles deceleration
/// - `gravity_scale`: 0.0, gravity comes from the gravity field
/// - `mass_properties`: Default (computed by Rapier from collider)
#[derive(Bundle)]
pub struct Rapier3dCharacterBundle {
    /// The rigid body type. Should typically be [`RigidBody::Dynamic`] for characters.
    pub rigid_body: RigidBody,
    /// Current linear and angular velocity. Updated by Rapier each physics step.
    pub velocity: Velocity,
    /// Accumulated impulses applied this frame.
    pub external_impulse: ExternalImpulse,
    /// Which axes are locked.
    pub locked_axes: LockedAxes,
    /// Damping coefficients for velocity reduction.
    pub damping: Damping,
    /// Scale of Rapier's own gravity, zero so only the gravity field applies.
    pub gravity_scale: GravityScale,
    /// Computed mass properties. Rapier updates this based on the entity's collider.
    pub mass_properties: ReadMassProperties,
    /// Probe results and contacts, filled by the backend.
    pub sensors: PhysicsSensors,
}

impl Default for Rapier3dCharacterBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier3dCharacterBundle {
    /// Create a new character bundle with rotation locked.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            external_impulse: ExternalImpulse::default(),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            damping: Damping {
                linear_damping: 0.0,
                angular_damping: 0.0,
            },
            gravity_scale: GravityScale(0.0),
            // Rapier will update this based on collider after first physics step
            mass_properties: ReadMassProperties::default(),
            sensors: PhysicsSensors::default(),
        }
    }

    /// Create a character bundle whose sphere is free to roll.
    ///
    /// Rolling does not change how the controller moves the character, but
    /// contacts with moving bodies can spin it.
    pub fn rolling() -> Self {
        Self {
            locked_axes: LockedAxes::empty(),
            ..Self::new()
        }
    }

    /// Set the rigid body type for the character.
    ///
    /// # Example
    ///
    /// ```ignore
    /// // A character moved only by the controller's velocity writes
    /// let bundle = Rapier3dCharacterBundle::new()
    ///     .with_body(RigidBody::KinematicVelocityBased);
    /// ```
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Set the damping coefficients for velocity reduction.
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.damping = Damping {
            linear_damping: linear,
            angular_damping: angular,
        };
        self
    }

    /// Set which axes should be locked for the rigid body.
    pub fn with_locked_axes(mut self, axes: LockedAxes) -> Self {
        self.locked_axes = axes;
        self
    }
}

/// Bundle of physics components for a [`GravityBody`](crate::zones::GravityBody)
/// using Rapier3D.
///
/// Unlike characters, gravity bodies rotate freely and may sleep.
#[derive(Bundle)]
pub struct Rapier3dGravityBodyBundle {
    pub rigid_body: RigidBody,
    pub velocity: Velocity,
    pub external_impulse: ExternalImpulse,
    pub gravity_scale: GravityScale,
    pub sleeping: Sleeping,
    pub mass_properties: ReadMassProperties,
    pub sensors: PhysicsSensors,
}

impl Default for Rapier3dGravityBodyBundle {
    fn default() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            external_impulse: ExternalImpulse::default(),
            gravity_scale: GravityScale(0.0),
            sleeping: Sleeping::default(),
            mass_properties: ReadMassProperties::default(),
            sensors: PhysicsSensors::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    fn create_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
        app.insert_resource(Time::<Fixed>::from_hz(60.0));
        app
    }

    #[test]
    fn rapier_backend_get_position() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((Transform::from_xyz(1.0, 2.0, 3.0), RigidBody::Dynamic))
            .id();

        app.update();

        let pos = Rapier3dBackend::get_position(app.world(), entity);
        assert!((pos - Vec3::new(1.0, 2.0, 3.0)).length() < 0.01);
        assert!(Rapier3dBackend::is_rigid_body(app.world(), entity));
        assert!(!Rapier3dBackend::is_kinematic(app.world(), entity));
    }

    #[test]
    fn rapier_backend_velocity() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                RigidBody::Dynamic,
                GravityScale(0.0),
                Velocity::linear(Vec3::new(5.0, 3.0, 0.0)),
            ))
            .id();

        app.update();

        let vel = Rapier3dBackend::get_velocity(app.world(), entity);
        assert!((vel - Vec3::new(5.0, 3.0, 0.0)).length() < 0.01);

        Rapier3dBackend::set_velocity(app.world_mut(), entity, Vec3::new(0.0, 0.0, 10.0));

        let vel = Rapier3dBackend::get_velocity(app.world(), entity);
        assert!((vel - Vec3::new(0.0, 0.0, 10.0)).length() < 0.01);
    }

    #[test]
    fn fixed_and_kinematic_bodies() {
        let mut app = create_test_app();

        let ground = app
            .world_mut()
            .spawn((Transform::default(), RigidBody::Fixed))
            .id();
        let platform = app
            .world_mut()
            .spawn((Transform::default(), RigidBody::KinematicPositionBased))
            .id();

        assert!(!Rapier3dBackend::is_rigid_body(app.world(), ground));
        assert!(Rapier3dBackend::is_rigid_body(app.world(), platform));
        assert!(Rapier3dBackend::is_kinematic(app.world(), platform));
    }

    #[test]
    fn rapier_character_bundle_creates_valid_entity() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                Rapier3dCharacterBundle::new(),
                Collider::ball(0.5),
            ))
            .id();

        app.update();

        assert!(app.world().get::<RigidBody>(entity).is_some());
        assert!(app.world().get::<Velocity>(entity).is_some());
        assert!(app.world().get::<PhysicsSensors>(entity).is_some());
        assert_eq!(app.world().get::<GravityScale>(entity).map(|g| g.0), Some(0.0));
        assert_eq!(
            app.world().get::<LockedAxes>(entity).copied(),
            Some(LockedAxes::ROTATION_LOCKED)
        );
    }

    #[test]
    fn sensors_find_floor_below_character() {
        let mut app = create_test_app();
        app.add_plugins(TransformPlugin);
        app.add_plugins(GravityControllerPlugin::<Rapier3dBackend>::default());
        app.finish();
        app.cleanup();

        app.world_mut()
            .spawn(GravityZone::uniform(Vec3::new(0.0, -9.81, 0.0)));
        let floor_transform = Transform::from_xyz(0.0, -0.5, 0.0);
        app.world_mut().spawn((
            floor_transform,
            GlobalTransform::from(floor_transform),
            RigidBody::Fixed,
            Collider::cuboid(10.0, 0.5, 10.0),
        ));
        let character_transform = Transform::from_xyz(0.0, 0.6, 0.0);
        let character = app
            .world_mut()
            .spawn((
                character_transform,
                GlobalTransform::from(character_transform),
                LocomotionState::new(),
                LocomotionConfig::default(),
                MovementIntent::default(),
                Rapier3dCharacterBundle::new(),
                Collider::ball(0.5),
            ))
            .id();

        // Let Rapier create the colliders and build its query pipeline.
        for _ in 0..3 {
            app.update();
        }
        app.world_mut().run_schedule(FixedUpdate);

        let sensors = app.world().get::<PhysicsSensors>(character).unwrap();
        let hit = sensors.ground_hit.expect("floor below the character");
        println!("PROOF: ground probe hit at distance {} normal {}", hit.distance, hit.normal);
        assert!(hit.normal.dot(Vec3::Y) > 0.99);
        assert!(hit.body.is_none(), "fixed floor is not a connectable body");
    }
}
