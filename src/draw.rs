//! Per-frame draw lists.
//!
//! [`build_frame`] reads the simulation once and produces a [`FrameData`]
//! snapshot; the renderer only ever sees the snapshot. Particles and stroke
//! segments are expanded into quads here because wgpu has no point size or
//! line width.

use crate::camera::Camera2D;
use crate::resources::{GeometryHandle, RenderResources, TextureId};
use crate::simulation::Simulation;
use glam::{Mat4, Vec2, Vec3};

pub const PARTICLE_PIXEL_SIZE: f32 = 5.0;
pub const STROKE_PIXEL_WIDTH: f32 = 4.0;
pub const PARTICLE_COLOR: Vec3 = Vec3::new(0.0, 0.0, 1.0);
pub const STROKE_COLOR: Vec3 = Vec3::new(1.0, 1.0, 1.0);

const QUAD_FLOATS: usize = 6 * 4;

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDraw {
    pub geometry: GeometryHandle,
    pub vertex_count: u32,
    pub model: Mat4,
    pub color: Vec3,
    pub texture: Option<TextureId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameData {
    pub view_projection: Mat4,
    pub objects: Vec<ObjectDraw>,
    /// World-space `[x, y, u, v]` triangles, one quad per particle.
    pub particle_vertices: Vec<f32>,
    /// World-space `[x, y, u, v]` triangles, one quad per stroke segment.
    pub stroke_vertices: Vec<f32>,
}

impl FrameData {
    pub fn particle_vertex_count(&self) -> u32 {
        (self.particle_vertices.len() / 4) as u32
    }

    pub fn stroke_vertex_count(&self) -> u32 {
        (self.stroke_vertices.len() / 4) as u32
    }
}

/// Snapshot of everything visible, projected through `camera`.
pub fn build_frame<R: RenderResources>(simulation: &Simulation<R>, camera: &Camera2D) -> FrameData {
    let world = simulation.world();

    let objects = simulation
        .registry()
        .iter()
        .filter_map(|object| {
            let position = world.position(object.body)?;
            let angle = world.angle(object.body)?;
            Some(ObjectDraw {
                geometry: object.geometry,
                vertex_count: object.vertex_count,
                model: model_matrix(position, angle),
                color: object.color,
                texture: object.texture,
            })
        })
        .collect();

    let particle_half = camera.pixel_size() * PARTICLE_PIXEL_SIZE / 2.0;
    let positions = world.particle_positions();
    let mut particle_vertices = Vec::with_capacity(positions.len() * QUAD_FLOATS);
    for position in positions {
        particle_vertices.extend_from_slice(&point_quad(position, particle_half));
    }

    let stroke_half_width = camera.pixel_size() * STROKE_PIXEL_WIDTH / 2.0;
    let mut stroke_vertices = Vec::new();
    for polyline in simulation.brush().polylines() {
        for segment in polyline.windows(2) {
            if let Some(quad) = segment_quad(segment[0], segment[1], stroke_half_width) {
                stroke_vertices.extend_from_slice(&quad);
            }
        }
    }

    FrameData {
        view_projection: camera.view_projection_matrix(),
        objects,
        particle_vertices,
        stroke_vertices,
    }
}

pub fn model_matrix(position: Vec2, angle: f32) -> Mat4 {
    Mat4::from_translation(position.extend(0.0)) * Mat4::from_rotation_z(angle)
}

/// Axis-aligned square centered on `center`.
pub fn point_quad(center: Vec2, half: f32) -> [f32; QUAD_FLOATS] {
    let (x0, y0) = (center.x - half, center.y - half);
    let (x1, y1) = (center.x + half, center.y + half);
    [
        x0, y0, 0.0, 0.0, //
        x1, y0, 1.0, 0.0, //
        x1, y1, 1.0, 1.0, //
        x0, y0, 0.0, 0.0, //
        x1, y1, 1.0, 1.0, //
        x0, y1, 0.0, 1.0,
    ]
}

/// Rectangle of half width `half_width` around the segment `a`-`b`.
/// `None` for a zero-length segment.
pub fn segment_quad(a: Vec2, b: Vec2, half_width: f32) -> Option<[f32; QUAD_FLOATS]> {
    let direction = (b - a).try_normalize()?;
    let offset = direction.perp() * half_width;
    let (p0, p1, p2, p3) = (a - offset, b - offset, b + offset, a + offset);
    Some([
        p0.x, p0.y, 0.0, 0.0, //
        p1.x, p1.y, 1.0, 0.0, //
        p2.x, p2.y, 1.0, 1.0, //
        p0.x, p0.y, 0.0, 0.0, //
        p2.x, p2.y, 1.0, 1.0, //
        p3.x, p3.y, 0.0, 1.0,
    ])
}
