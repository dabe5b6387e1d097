//! Shape kinds and the descriptors they expand into.
//!
//! A placed object is described once by [`ShapeKind::blueprint`]: the fixture
//! the physics body gets and the vertices its GPU buffer is filled with.
//! Vertices are `[x, y, u, v]` in body-local coordinates, laid out as a
//! triangle list.

use crate::world::{ColliderShape, Fixture};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

pub const FLOATS_PER_VERTEX: usize = 4;
pub const CIRCLE_SEGMENTS: usize = 24;
pub const BOX_VERTEX_COUNT: usize = 6;
pub const CIRCLE_VERTEX_COUNT: usize = CIRCLE_SEGMENTS * 3;

const OBJECT_DENSITY: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Box,
    Circle,
    FluidGroup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RigidBlueprint {
    pub fixture: Fixture,
    pub vertices: Vec<f32>,
    pub is_circle: bool,
}

impl RigidBlueprint {
    pub fn vertex_count(&self) -> u32 {
        (self.vertices.len() / FLOATS_PER_VERTEX) as u32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Blueprint {
    Rigid(RigidBlueprint),
    /// Particles carry no fixture or geometry of their own.
    Fluid,
}

impl ShapeKind {
    /// `size` is the half extent of a box or the radius of a circle.
    pub fn blueprint(self, size: f32) -> Blueprint {
        match self {
            ShapeKind::Box => Blueprint::Rigid(RigidBlueprint {
                fixture: Fixture::new(
                    ColliderShape::Cuboid {
                        half_width: size,
                        half_height: size,
                    },
                    OBJECT_DENSITY,
                ),
                vertices: box_vertices(size),
                is_circle: false,
            }),
            ShapeKind::Circle => Blueprint::Rigid(RigidBlueprint {
                fixture: Fixture::new(ColliderShape::Ball { radius: size }, OBJECT_DENSITY),
                vertices: circle_vertices(size, CIRCLE_SEGMENTS),
                is_circle: true,
            }),
            ShapeKind::FluidGroup => Blueprint::Fluid,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Circle => "circle",
            ShapeKind::FluidGroup => "water",
        }
    }
}

pub fn box_vertices(half_size: f32) -> Vec<f32> {
    let h = half_size;
    vec![
        -h, -h, 0.0, 0.0, //
        h, -h, 1.0, 0.0, //
        h, h, 1.0, 1.0, //
        -h, -h, 0.0, 0.0, //
        h, h, 1.0, 1.0, //
        -h, h, 0.0, 1.0,
    ]
}

/// Fan around the center, unrolled into one triangle per segment.
pub fn circle_vertices(radius: f32, segments: usize) -> Vec<f32> {
    let rim: Vec<(f32, f32)> = (0..=segments)
        .map(|i| i as f32 / segments as f32 * TAU)
        .map(|angle| (angle.cos(), angle.sin()))
        .collect();

    let mut vertices = Vec::with_capacity(segments * 3 * FLOATS_PER_VERTEX);
    for pair in rim.windows(2) {
        let (c0, s0) = pair[0];
        let (c1, s1) = pair[1];
        vertices.extend_from_slice(&[0.0, 0.0, 0.5, 0.5]);
        vertices.extend_from_slice(&[radius * c0, radius * s0, 0.5 + c0 * 0.5, 0.5 + s0 * 0.5]);
        vertices.extend_from_slice(&[radius * c1, radius * s1, 0.5 + c1 * 0.5, 0.5 + s1 * 0.5]);
    }
    vertices
}
