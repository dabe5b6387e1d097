//! Façade over the rapier2d pipeline.
//!
//! Everything above this module talks in glam vectors and opaque
//! [`BodyHandle`]s. [`PhysicsWorld::step`] is the only place simulated time
//! advances; forces added between two steps are consumed by the next step
//! and then cleared, so a force applied once acts for exactly one tick.

mod particles;

pub use particles::ParticleConfig;

use glam::Vec2;
use particles::ParticleSystem;
use rapier2d::prelude::*;

pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, -9.8);

const GROUND_HALF_HEIGHT: f32 = 1.0;
const DEFAULT_FRICTION: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Static,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Cuboid { half_width: f32, half_height: f32 },
    Ball { radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixture {
    pub shape: ColliderShape,
    pub density: f32,
    pub friction: f32,
}

impl Fixture {
    pub fn new(shape: ColliderShape, density: f32) -> Self {
        Self {
            shape,
            density,
            friction: DEFAULT_FRICTION,
        }
    }
}

/// Snapshot of the quantities the force fields read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
    pub is_dynamic: bool,
}

pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    particles: ParticleSystem,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec2, particle_config: ParticleConfig) -> Self {
        Self {
            gravity: vector![gravity.x, gravity.y],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            particles: ParticleSystem::new(particle_config),
        }
    }

    pub fn create_body(&mut self, position: Vec2, kind: BodyKind) -> BodyHandle {
        let builder = match kind {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let body = builder.translation(vector![position.x, position.y]).build();
        BodyHandle(self.rigid_body_set.insert(body))
    }

    /// Body with a single fixture, the common case for placed objects.
    pub fn create_body_with_fixture(&mut self, position: Vec2, kind: BodyKind, fixture: Fixture) -> BodyHandle {
        let handle = self.create_body(position, kind);
        self.attach_fixture(handle, fixture);
        handle
    }

    pub fn attach_fixture(&mut self, handle: BodyHandle, fixture: Fixture) {
        let builder = match fixture.shape {
            ColliderShape::Cuboid { half_width, half_height } => ColliderBuilder::cuboid(half_width, half_height),
            ColliderShape::Ball { radius } => ColliderBuilder::ball(radius),
        };
        let collider = builder.density(fixture.density).friction(fixture.friction).build();
        self.collider_set
            .insert_with_parent(collider, handle.0, &mut self.rigid_body_set);
    }

    /// Zero-thickness static edge between two world points.
    pub fn attach_edge(&mut self, handle: BodyHandle, from: Vec2, to: Vec2) {
        let collider = ColliderBuilder::segment(point![from.x, from.y], point![to.x, to.y])
            .density(0.0)
            .friction(DEFAULT_FRICTION)
            .build();
        self.collider_set
            .insert_with_parent(collider, handle.0, &mut self.rigid_body_set);
    }

    /// Static floor just below the visible world rectangle.
    pub fn create_ground(&mut self, world_width: f32, world_height: f32) -> BodyHandle {
        let position = Vec2::new(0.0, -world_height / 2.0 - GROUND_HALF_HEIGHT);
        let fixture = Fixture::new(
            ColliderShape::Cuboid {
                half_width: world_width,
                half_height: GROUND_HALF_HEIGHT,
            },
            0.0,
        );
        self.create_body_with_fixture(position, BodyKind::Static, fixture)
    }

    pub fn destroy_body(&mut self, handle: BodyHandle) {
        let removed = self.rigid_body_set.remove(
            handle.0,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
        if removed.is_none() {
            log::debug!("destroy_body on unknown handle {:?}", handle);
        }
    }

    pub fn step(&mut self, dt: f32, velocity_iterations: usize, position_iterations: usize) {
        self.integration_parameters.dt = dt;
        self.integration_parameters.max_velocity_iterations = velocity_iterations;
        self.integration_parameters.max_stabilization_iterations = position_iterations;

        let physics_hooks = ();
        let event_handler = ();
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &physics_hooks,
            &event_handler,
        );

        for (_, body) in self.rigid_body_set.iter_mut() {
            body.reset_forces(false);
        }
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.rigid_body_set.contains(handle.0)
    }

    pub fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.rigid_body_set.get(handle.0).map(|body| {
            let translation = body.translation();
            Vec2::new(translation.x, translation.y)
        })
    }

    pub fn angle(&self, handle: BodyHandle) -> Option<f32> {
        self.rigid_body_set.get(handle.0).map(|body| body.rotation().angle())
    }

    pub fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.rigid_body_set.get(handle.0).map(|body| {
            let linvel = body.linvel();
            Vec2::new(linvel.x, linvel.y)
        })
    }

    pub fn mass(&self, handle: BodyHandle) -> Option<f32> {
        self.rigid_body_set.get(handle.0).map(|body| body.mass())
    }

    pub fn body_state(&self, handle: BodyHandle) -> Option<BodyState> {
        self.rigid_body_set.get(handle.0).map(|body| BodyState {
            position: Vec2::new(body.translation().x, body.translation().y),
            velocity: Vec2::new(body.linvel().x, body.linvel().y),
            mass: body.mass(),
            is_dynamic: body.is_dynamic(),
        })
    }

    /// Force at the center of mass, consumed by the next [`step`](Self::step).
    pub fn apply_force(&mut self, handle: BodyHandle, force: Vec2) {
        match self.rigid_body_set.get_mut(handle.0) {
            Some(body) => body.add_force(vector![force.x, force.y], true),
            None => log::debug!("apply_force on unknown handle {:?}", handle),
        }
    }

    pub fn gravity(&self) -> Vec2 {
        Vec2::new(self.gravity.x, self.gravity.y)
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = vector![gravity.x, gravity.y];
    }

    pub fn collider_count(&self, handle: BodyHandle) -> usize {
        self.rigid_body_set
            .get(handle.0)
            .map_or(0, |body| body.colliders().len())
    }

    /// Every body in the world, particles included.
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn create_particle_group(&mut self, center: Vec2) -> crate::error::Result<usize> {
        self.particles
            .create_group(center, &mut self.rigid_body_set, &mut self.collider_set)
    }

    pub fn particle_positions(&self) -> Vec<Vec2> {
        self.particles.positions(&self.rigid_body_set)
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn set_max_particles(&mut self, max_particles: usize) {
        self.particles.set_max_particles(max_particles);
    }

    pub fn clear_particles(&mut self) {
        for handle in self.particles.drain() {
            self.destroy_body(BodyHandle(handle));
        }
    }
}
