//! Live simulation objects.
//!
//! Each [`SimulationObject`] pairs a physics body with the GPU geometry that
//! draws it. Both are created by [`ObjectRegistry::spawn`] and destroyed by
//! [`ObjectRegistry::clear`]; nothing else creates or frees either half, so
//! a live body always has live geometry and vice versa.

use crate::error::{Result, SandboxError};
use crate::resources::{GeometryHandle, RenderResources, TextureId};
use crate::shape::{Blueprint, ShapeKind};
use crate::world::{BodyHandle, BodyKind, PhysicsWorld};
use glam::{Vec2, Vec3};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationObject {
    pub id: ObjectId,
    pub body: BodyHandle,
    pub shape: ShapeKind,
    pub size: f32,
    pub color: Vec3,
    pub texture: Option<TextureId>,
    pub orbit_angular_speed: Option<f32>,
    pub geometry: GeometryHandle,
    pub vertex_count: u32,
    is_circle: bool,
}

impl SimulationObject {
    pub fn is_circle(&self) -> bool {
        self.is_circle
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub shape: ShapeKind,
    pub position: Vec2,
    pub size: f32,
    pub color: Vec3,
    pub kind: BodyKind,
    pub texture: Option<PathBuf>,
    pub orbit_angular_speed: Option<f32>,
}

impl SpawnRequest {
    pub fn new(shape: ShapeKind, position: Vec2, size: f32, color: Vec3) -> Self {
        Self {
            shape,
            position,
            size,
            color,
            kind: BodyKind::Dynamic,
            texture: None,
            orbit_angular_speed: None,
        }
    }

    pub fn fixed(mut self) -> Self {
        self.kind = BodyKind::Static;
        self
    }

    pub fn with_texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.texture = Some(path.into());
        self
    }

    pub fn with_orbit_angular_speed(mut self, angular_speed: f32) -> Self {
        self.orbit_angular_speed = Some(angular_speed);
        self
    }
}

#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: Vec<SimulationObject>,
    next_id: u64,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<R: RenderResources>(
        &mut self,
        world: &mut PhysicsWorld,
        resources: &mut R,
        request: SpawnRequest,
    ) -> Result<ObjectId> {
        if !(request.size.is_finite() && request.size > 0.0) {
            return Err(SandboxError::Geometry(format!("invalid object size {}", request.size)));
        }
        let blueprint = match request.shape.blueprint(request.size) {
            Blueprint::Rigid(blueprint) => blueprint,
            Blueprint::Fluid => {
                return Err(SandboxError::Geometry(
                    "particle groups are owned by the world, not the registry".to_string(),
                ))
            }
        };

        // Geometry first: if the upload fails no body has been created yet.
        let geometry = resources.create_geometry(request.shape.label(), &blueprint.vertices)?;
        let body = world.create_body_with_fixture(request.position, request.kind, blueprint.fixture);

        let texture = request.texture.as_deref().and_then(|path| match resources.load_texture(path) {
            Ok(texture) => Some(texture),
            Err(err) => {
                log::warn!("{}; drawing with flat color instead", err);
                None
            }
        });

        self.next_id += 1;
        let id = ObjectId(self.next_id);
        self.objects.push(SimulationObject {
            id,
            body,
            shape: request.shape,
            size: request.size,
            color: request.color,
            texture,
            orbit_angular_speed: request.orbit_angular_speed,
            geometry,
            vertex_count: blueprint.vertex_count(),
            is_circle: blueprint.is_circle,
        });

        log::debug!(
            "Spawned {} {:?} at ({:.2}, {:.2})",
            request.shape.label(),
            id,
            request.position.x,
            request.position.y
        );
        Ok(id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SimulationObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimulationObject> {
        self.objects.iter()
    }

    pub fn for_each<F: FnMut(&SimulationObject)>(&self, visitor: F) {
        self.objects.iter().for_each(visitor);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Destroys every body, buffer and texture, then empties the registry.
    pub fn clear<R: RenderResources>(&mut self, world: &mut PhysicsWorld, resources: &mut R) {
        let count = self.objects.len();
        for object in self.objects.drain(..) {
            world.destroy_body(object.body);
            resources.destroy_geometry(object.geometry);
            if let Some(texture) = object.texture {
                resources.release_texture(texture);
            }
        }
        if count > 0 {
            log::debug!("Cleared {} objects", count);
        }
    }

    /// True when every object's body and geometry are both live.
    pub fn is_consistent<R: RenderResources>(&self, world: &PhysicsWorld, resources: &R) -> bool {
        self.objects
            .iter()
            .all(|object| world.contains(object.body) && resources.is_geometry_live(object.geometry))
    }
}
