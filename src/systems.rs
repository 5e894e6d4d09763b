//! Core controller systems.
//!
//! These systems drive the gravity field, the characters and the gravity
//! bodies. They are generic over the physics backend to allow different
//! physics engines to be used.

use std::marker::PhantomData;

use bevy::prelude::*;

use crate::backend::{CharacterPhysicsBackend, PhysicsSensors, RaycastRequest};
use crate::collision::CollisionData;
use crate::config::LocomotionConfig;
use crate::controller::{StepInput, step_character};
use crate::field::GravityField;
use crate::gravity::{GravitySource, GravityZone, ZoneFrame};
use crate::intent::MovementIntent;
use crate::locomotion::{BodyInfo, CharacterBody, LocomotionEnvironment, ground_probe_ray, water_probe_ray};
use crate::state::{Airborne, Climbing, Grounded, LocomotionMode, LocomotionState, OnSteep, Swimming};
use crate::zones::{AccelerationZone, GravityBody};

/// [`LocomotionEnvironment`] backed by the probes the backend cast this step.
///
/// The rays were requested during preparation with the same position and up
/// axis the step uses, so the cached hits stand in for casting them again.
pub struct SensorEnvironment<'w, B> {
    world: &'w World,
    sensors: &'w PhysicsSensors,
    _backend: PhantomData<B>,
}

impl<'w, B: CharacterPhysicsBackend> SensorEnvironment<'w, B> {
    pub fn new(world: &'w World, sensors: &'w PhysicsSensors) -> Self {
        Self {
            world,
            sensors,
            _backend: PhantomData,
        }
    }
}

impl<B: CharacterPhysicsBackend> LocomotionEnvironment for SensorEnvironment<'_, B> {
    fn ground_probe(&self, _ray: &RaycastRequest) -> Option<CollisionData> {
        self.sensors.ground_hit
    }

    fn water_probe(&self, _ray: &RaycastRequest) -> Option<CollisionData> {
        self.sensors.water_hit
    }

    fn body_info(&self, body: Entity) -> Option<BodyInfo> {
        if !B::is_rigid_body(self.world, body) {
            return None;
        }
        Some(BodyInfo {
            position: B::get_position(self.world, body),
            rotation: B::get_rotation(self.world, body),
            mass: B::get_mass(self.world, body),
            kinematic: B::is_kinematic(self.world, body),
        })
    }
}

/// Source of a zone placed at the entity's global transform.
fn placed_source(zone: &GravityZone, transform: Option<&GlobalTransform>) -> GravitySource {
    let mut source = zone.source;
    if let Some(transform) = transform {
        source.set_frame(ZoneFrame::from_global_transform(transform));
    }
    source
}

/// Keep the [`GravityField`] in sync with [`GravityZone`] entities.
///
/// New zones are registered and removed or despawned zones are unregistered.
/// Changed or moved zones are updated in place. Runs before every fixed step
/// and once per frame after transform propagation, so removals are seen even
/// in frames without a fixed step.
pub fn sync_gravity_zones(
    mut field: ResMut<GravityField>,
    mut removed: RemovedComponents<GravityZone>,
    q_zones: Query<(Entity, Ref<GravityZone>, Option<Ref<GlobalTransform>>)>,
) {
    for entity in removed.read() {
        // Re-inserted zones are registered again below.
        if field.contains(entity) {
            field.unregister(entity);
        }
    }

    for (entity, zone, transform) in &q_zones {
        let source = placed_source(&zone, transform.as_deref());
        if !field.contains(entity) {
            field.register(entity, source);
            continue;
        }

        let moved = transform.as_ref().is_some_and(|t| t.is_changed());
        if zone.is_changed() || moved {
            if let Err(err) = field.update(entity, source) {
                warn!("failed to update gravity zone: {err}");
            }
        }
    }
}

/// Request this step's ground and water probes for every character.
///
/// The up axis is the one the step will use: the field's up at the
/// character's position, or the previous up axis where gravity cancels out.
pub fn request_character_probes<B: CharacterPhysicsBackend>(world: &mut World) {
    let characters: Vec<(Entity, LocomotionConfig, Vec3)> = world
        .query_filtered::<(Entity, &LocomotionConfig, &LocomotionState), With<PhysicsSensors>>()
        .iter(world)
        .map(|(e, config, state)| (e, *config, state.up_axis()))
        .collect();

    for (entity, config, previous_up) in characters {
        let position = B::get_position(world, entity);
        let up = world
            .get_resource::<GravityField>()
            .map(|field| field.sample(position, previous_up).up)
            .unwrap_or(previous_up);

        if let Some(mut sensors) = world.get_mut::<PhysicsSensors>(entity) {
            sensors.ground_ray = Some(ground_probe_ray(position, up, &config));
            sensors.water_ray = Some(water_probe_ray(
                position,
                up,
                config.submergence_offset,
                config.submergence_range,
                config.water_mask,
            ));
        }
    }
}

/// Request this step's water probe for every gravity body.
pub fn request_body_probes<B: CharacterPhysicsBackend>(world: &mut World) {
    let bodies: Vec<(Entity, GravityBody)> = world
        .query_filtered::<(Entity, &GravityBody), With<PhysicsSensors>>()
        .iter(world)
        .map(|(e, body)| (e, *body))
        .collect();

    for (entity, body) in bodies {
        let position = B::get_position(world, entity);
        let up = world
            .get_resource::<GravityField>()
            .and_then(|field| field.up_axis_at(position))
            .unwrap_or(Vec3::Y);

        if let Some(mut sensors) = world.get_mut::<PhysicsSensors>(entity) {
            sensors.ground_ray = None;
            sensors.water_ray = Some(water_probe_ray(
                position,
                up,
                body.submergence_offset,
                body.submergence_range(),
                body.water_mask,
            ));
        }
    }
}

/// Push bodies overlapping an [`AccelerationZone`] along the zone's up axis.
///
/// Launched characters do not snap back to the ground on their next step.
pub fn apply_acceleration_zones<B: CharacterPhysicsBackend>(world: &mut World) {
    let zones: Vec<(AccelerationZone, Quat)> = world
        .query::<(&AccelerationZone, Option<&GlobalTransform>)>()
        .iter(world)
        .filter(|(zone, _)| !zone.overlapping.is_empty())
        .map(|(zone, transform)| {
            let rotation = transform
                .map(|t| t.to_scale_rotation_translation().1)
                .unwrap_or(Quat::IDENTITY);
            (zone.clone(), rotation)
        })
        .collect();

    let dt = B::get_fixed_timestep(world);

    for (zone, rotation) in zones {
        for &body in &zone.overlapping {
            let velocity = B::get_velocity(world, body);
            let Some(velocity) = zone.accelerate(rotation, velocity, dt) else {
                continue;
            };
            B::set_velocity(world, body, velocity);

            if let Some(mut state) = world.get_mut::<LocomotionState>(body) {
                state.prevent_snap_to_ground();
            }
        }
    }
}

/// Run one locomotion step for every character.
///
/// Reads the sensor readings of this step, resolves the character's mode,
/// adjusts its velocity, jumps and integrates gravity, then writes the new
/// velocity back through the backend. The pending jump request is consumed.
pub fn step_characters<B: CharacterPhysicsBackend>(world: &mut World) {
    let characters: Vec<(
        Entity,
        LocomotionState,
        LocomotionConfig,
        MovementIntent,
        PhysicsSensors,
    )> = world
        .query::<(
            Entity,
            &LocomotionState,
            &LocomotionConfig,
            Option<&MovementIntent>,
            &PhysicsSensors,
        )>()
        .iter(world)
        .map(|(e, state, config, intent, sensors)| {
            (
                e,
                state.clone(),
                *config,
                intent.cloned().unwrap_or_default(),
                sensors.clone(),
            )
        })
        .collect();

    let dt = B::get_fixed_timestep(world);

    for (entity, mut state, config, mut intent, sensors) in characters {
        let velocity = {
            let world_ref: &World = world;
            let Some(field) = world_ref.get_resource::<GravityField>() else {
                warn!("GravityField resource is missing, skipping character steps");
                return;
            };
            let body = CharacterBody::new(
                B::get_position(world_ref, entity),
                B::get_velocity(world_ref, entity),
                B::get_mass(world_ref, entity),
            );
            let input = StepInput {
                body,
                contacts: &sensors.contacts,
                water: sensors.water,
                dt,
            };
            let env = SensorEnvironment::<B>::new(world_ref, &sensors);
            step_character(&mut state, &config, &mut intent, field, input, &env)
        };

        B::set_velocity(world, entity, velocity);

        if let Some(mut stored) = world.get_mut::<LocomotionState>(entity) {
            *stored = state;
        }
        if let Some(mut stored) = world.get_mut::<MovementIntent>(entity) {
            *stored = intent;
        }
    }
}

/// Apply field gravity, water drag and buoyancy to every [`GravityBody`].
pub fn apply_gravity_bodies<B: CharacterPhysicsBackend>(world: &mut World) {
    let bodies: Vec<(Entity, GravityBody, Option<Option<f32>>)> = world
        .query::<(Entity, &GravityBody, Option<&PhysicsSensors>)>()
        .iter(world)
        .map(|(e, body, sensors)| {
            let probe = sensors
                .filter(|s| s.water.is_some())
                .map(|s| s.water_hit.map(|hit| hit.distance));
            (e, *body, probe)
        })
        .collect();

    let dt = B::get_fixed_timestep(world);

    for (entity, mut body, water_probe) in bodies {
        let velocity = B::get_velocity(world, entity);
        let sleeping = B::is_sleeping(world, entity);

        if body.should_apply(sleeping, velocity, dt) {
            // Water is not sampled for sleeping bodies.
            body.evaluate_submergence(if sleeping { None } else { water_probe });

            let position = B::get_position(world, entity);
            let gravity = world
                .get_resource::<GravityField>()
                .map(|field| field.gravity_at(position))
                .unwrap_or(Vec3::ZERO);
            let forces = body.forces(gravity, dt);

            let mut velocity = velocity;
            if forces.drag < 1.0 {
                velocity *= forces.drag;
                let angular_velocity = B::get_angular_velocity(world, entity) * forces.drag;
                B::set_angular_velocity(world, entity, angular_velocity);
            }
            B::set_velocity(world, entity, velocity + forces.gravity * dt);

            if let Some((acceleration, offset)) = forces.buoyancy {
                let point = position + B::get_rotation(world, entity) * offset;
                B::apply_acceleration_at_point(world, entity, acceleration, point);
            }
        }

        if let Some(mut stored) = world.get_mut::<GravityBody>(entity) {
            *stored = body;
        }
    }
}

/// Sync state marker components with the mode resolved by the last step.
pub fn sync_state_markers(
    mut commands: Commands,
    q_characters: Query<(
        Entity,
        &LocomotionState,
        Has<Grounded>,
        Has<Airborne>,
        Option<&OnSteep>,
        Has<Climbing>,
        Has<Swimming>,
    )>,
) {
    for (entity, state, has_grounded, has_airborne, on_steep, has_climbing, has_swimming) in
        &q_characters
    {
        let mode = state.mode();
        let mut entity_commands = commands.entity(entity);

        let grounded = mode == LocomotionMode::Grounded;
        if grounded && !has_grounded {
            entity_commands.insert(Grounded);
        } else if !grounded && has_grounded {
            entity_commands.remove::<Grounded>();
        }

        let airborne = mode == LocomotionMode::Airborne;
        if airborne && !has_airborne {
            entity_commands.insert(Airborne);
        } else if !airborne && has_airborne {
            entity_commands.remove::<Airborne>();
        }

        // Steep carries the normal, so it is refreshed when the normal changes.
        if mode == LocomotionMode::Steep {
            let normal = state.last_steep_normal();
            if on_steep.is_none_or(|marker| marker.normal != normal) {
                entity_commands.insert(OnSteep { normal });
            }
        } else if on_steep.is_some() {
            entity_commands.remove::<OnSteep>();
        }

        let climbing = mode == LocomotionMode::Climbing;
        if climbing && !has_climbing {
            entity_commands.insert(Climbing);
        } else if !climbing && has_climbing {
            entity_commands.remove::<Climbing>();
        }

        let swimming = mode == LocomotionMode::Swimming;
        if swimming && !has_swimming {
            entity_commands.insert(Swimming);
        } else if !swimming && has_swimming {
            entity_commands.remove::<Swimming>();
        }
    }
}
