//! Fluid-like particle groups.
//!
//! rapier has no particle solver, so each particle is a small damped ball.
//! The system tracks its own handles and enforces the particle cap before
//! anything is inserted into the body set.

use crate::error::{Result, SandboxError};
use glam::Vec2;
use rapier2d::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleConfig {
    pub radius: f32,
    pub damping: f32,
    pub max_particles: usize,
    /// Half extent of the square a single placement fills.
    pub group_half_extent: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            radius: 0.05,
            damping: 0.2,
            max_particles: 5000,
            group_half_extent: 0.5,
        }
    }
}

pub(crate) struct ParticleSystem {
    config: ParticleConfig,
    handles: Vec<RigidBodyHandle>,
}

impl ParticleSystem {
    pub(crate) fn new(config: ParticleConfig) -> Self {
        Self {
            config,
            handles: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    pub(crate) fn set_max_particles(&mut self, max_particles: usize) {
        self.config.max_particles = max_particles;
    }

    /// Fills a square around `center` with particles, clamped to the
    /// remaining capacity. Returns how many were created.
    pub(crate) fn create_group(
        &mut self,
        center: Vec2,
        bodies: &mut RigidBodySet,
        colliders: &mut ColliderSet,
    ) -> Result<usize> {
        let remaining = self.config.max_particles.saturating_sub(self.handles.len());
        if remaining == 0 {
            return Err(SandboxError::ParticleCapacity {
                max_particles: self.config.max_particles,
            });
        }

        let layout = grid_positions(center, self.config.group_half_extent, self.config.radius);
        if layout.len() > remaining {
            log::warn!(
                "Particle group clamped from {} to {} particles (cap {})",
                layout.len(),
                remaining,
                self.config.max_particles
            );
        }

        let mut created = 0;
        for position in layout.into_iter().take(remaining) {
            let body = RigidBodyBuilder::dynamic()
                .translation(vector![position.x, position.y])
                .linear_damping(self.config.damping)
                .build();
            let handle = bodies.insert(body);
            let collider = ColliderBuilder::ball(self.config.radius)
                .density(1.0)
                .friction(0.0)
                .build();
            colliders.insert_with_parent(collider, handle, bodies);
            self.handles.push(handle);
            created += 1;
        }

        Ok(created)
    }

    pub(crate) fn positions(&self, bodies: &RigidBodySet) -> Vec<Vec2> {
        self.handles
            .iter()
            .filter_map(|handle| bodies.get(*handle))
            .map(|body| Vec2::new(body.translation().x, body.translation().y))
            .collect()
    }

    pub(crate) fn drain(&mut self) -> Vec<RigidBodyHandle> {
        std::mem::take(&mut self.handles)
    }
}

/// Particle centers on a square grid, one diameter apart.
fn grid_positions(center: Vec2, half_extent: f32, radius: f32) -> Vec<Vec2> {
    let spacing = radius * 2.0;
    let per_side = ((half_extent * 2.0) / spacing + 1e-4).floor().max(1.0) as usize;
    let origin = center - Vec2::splat(half_extent) + Vec2::splat(radius);

    let mut positions = Vec::with_capacity(per_side * per_side);
    for row in 0..per_side {
        for col in 0..per_side {
            positions.push(origin + Vec2::new(col as f32 * spacing, row as f32 * spacing));
        }
    }
    positions
}
