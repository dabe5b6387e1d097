//! Freehand collision strokes.
//!
//! A drag in brush mode becomes a polyline of static edges on one body per
//! stroke. Points closer than the minimum spacing to the last recorded point
//! are dropped, so slow drags do not produce degenerate edges.

use crate::world::{BodyHandle, BodyKind, PhysicsWorld};
use glam::Vec2;

pub const MIN_POINT_SPACING: f32 = 0.1;

/// A committed stroke. Never modified after commit.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushStroke {
    points: Vec<Vec2>,
    body: BodyHandle,
}

impl BrushStroke {
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }
}

#[derive(Debug)]
pub struct BrushStrokeBuilder {
    current: Option<BrushStroke>,
    history: Vec<BrushStroke>,
    min_spacing: f32,
}

impl Default for BrushStrokeBuilder {
    fn default() -> Self {
        Self::new(MIN_POINT_SPACING)
    }
}

impl BrushStrokeBuilder {
    pub fn new(min_spacing: f32) -> Self {
        Self {
            current: None,
            history: Vec::new(),
            min_spacing,
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    /// Starts a stroke on a fresh static body. An open stroke is committed
    /// first.
    pub fn begin(&mut self, world: &mut PhysicsWorld, point: Vec2) {
        self.commit();
        let body = world.create_body(Vec2::ZERO, BodyKind::Static);
        self.current = Some(BrushStroke {
            points: vec![point],
            body,
        });
    }

    /// Records `point` and adds an edge from the previous point, unless it is
    /// within the minimum spacing. Returns whether the point was recorded.
    pub fn extend(&mut self, world: &mut PhysicsWorld, point: Vec2) -> bool {
        let Some(stroke) = self.current.as_mut() else {
            return false;
        };
        let Some(&last) = stroke.points.last() else {
            return false;
        };
        if last.distance(point) < self.min_spacing {
            return false;
        }

        stroke.points.push(point);
        world.attach_edge(stroke.body, last, point);
        true
    }

    /// Moves the open stroke into history. Its body stays in the world.
    pub fn commit(&mut self) -> bool {
        match self.current.take() {
            Some(stroke) => {
                log::debug!("Committed stroke with {} points", stroke.points.len());
                self.history.push(stroke);
                true
            }
            None => false,
        }
    }

    pub fn current_points(&self) -> Option<&[Vec2]> {
        self.current.as_ref().map(BrushStroke::points)
    }

    pub fn history(&self) -> &[BrushStroke] {
        &self.history
    }

    /// Every stroke's points, committed strokes first.
    pub fn polylines(&self) -> impl Iterator<Item = &[Vec2]> {
        self.history
            .iter()
            .chain(self.current.iter())
            .map(BrushStroke::points)
    }

    /// Destroys every stroke body, open or committed.
    pub fn clear(&mut self, world: &mut PhysicsWorld) {
        if let Some(stroke) = self.current.take() {
            world.destroy_body(stroke.body);
        }
        for stroke in self.history.drain(..) {
            world.destroy_body(stroke.body);
        }
    }
}
