//! Declarative scene descriptions.
//!
//! Scenes are JSON files parsed and validated in full before anything in the
//! running simulation is touched. The solar-system preset is expressed as a
//! scene too, so presets and files go through the same apply path.

use crate::error::{Result, SandboxError};
use crate::registry::SpawnRequest;
use crate::shape::ShapeKind;
use crate::world::DEFAULT_GRAVITY;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_OBJECT_SIZE: f32 = 0.3;
pub const DEFAULT_OBJECT_COLOR: [f32; 3] = [0.2, 0.2, 0.8];

const SUN_RADIUS: f32 = 0.25;
const SUN_COLOR: [f32; 3] = [1.0, 1.0, 0.0];
const PLANET_RADIUS: f32 = 0.1;
const FIRST_ORBIT_RADIUS: f32 = 1.5;
const ORBIT_RADIUS_STEP: f32 = 0.5;
const PLANET_ANGULAR_SPEEDS: [f32; 7] = [0.4345, 0.17, 0.1047, 0.0557, 0.00883, 0.00355, 0.001247];
const PLANET_TEXTURES: [&str; 7] = [
    "venus.png",
    "earth.png",
    "mars.png",
    "jupiter.png",
    "saturn.png",
    "uranus.png",
    "neptune.png",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default = "default_gravity")]
    pub gravity: [f32; 2],
    #[serde(default = "default_ground")]
    pub ground: bool,
    #[serde(default)]
    pub orbit_center: Option<[f32; 2]>,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub shape: ShapeKind,
    pub position: [f32; 2],
    #[serde(default = "default_size")]
    pub size: f32,
    #[serde(default = "default_color")]
    pub color: [f32; 3],
    #[serde(default, rename = "static")]
    pub fixed: bool,
    /// Relative paths are resolved against the scene file's directory.
    #[serde(default)]
    pub texture: Option<PathBuf>,
    #[serde(default)]
    pub orbit_angular_speed: Option<f32>,
}

fn default_gravity() -> [f32; 2] {
    DEFAULT_GRAVITY.to_array()
}

fn default_ground() -> bool {
    true
}

fn default_size() -> f32 {
    DEFAULT_OBJECT_SIZE
}

fn default_color() -> [f32; 3] {
    DEFAULT_OBJECT_COLOR
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            ground: true,
            orbit_center: None,
            objects: Vec::new(),
        }
    }
}

impl SceneDescription {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SandboxError::SceneIo {
            path: path.to_path_buf(),
            source,
        })?;
        let mut scene: SceneDescription = serde_json::from_str(&text).map_err(|source| SandboxError::SceneParse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(base) = path.parent() {
            scene.resolve_textures(base);
        }
        scene.validate()?;
        Ok(scene)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.gravity.iter().all(|g| g.is_finite()) {
            return Err(SandboxError::InvalidScene("gravity must be finite".to_string()));
        }
        if let Some(center) = self.orbit_center {
            if !center.iter().all(|c| c.is_finite()) {
                return Err(SandboxError::InvalidScene("orbit center must be finite".to_string()));
            }
        }
        for (index, object) in self.objects.iter().enumerate() {
            object
                .validate()
                .map_err(|reason| SandboxError::InvalidScene(format!("object {}: {}", index, reason)))?;
        }
        Ok(())
    }

    pub fn gravity_vector(&self) -> Vec2 {
        Vec2::from_array(self.gravity)
    }

    pub fn orbit_center_point(&self) -> Option<Vec2> {
        self.orbit_center.map(Vec2::from_array)
    }

    fn resolve_textures(&mut self, base: &Path) {
        for object in &mut self.objects {
            if let Some(texture) = object.texture.as_mut() {
                if texture.is_relative() {
                    *texture = base.join(&*texture);
                }
            }
        }
    }

    /// A static textured sun at the origin and seven orbiting planets.
    pub fn solar_system(texture_dir: &Path) -> Self {
        let mut objects = vec![SceneObject {
            shape: ShapeKind::Circle,
            position: [0.0, 0.0],
            size: SUN_RADIUS,
            color: SUN_COLOR,
            fixed: true,
            texture: Some(texture_dir.join("sun.png")),
            orbit_angular_speed: None,
        }];

        let planet_count = PLANET_ANGULAR_SPEEDS.len();
        for (i, (&angular_speed, texture)) in PLANET_ANGULAR_SPEEDS.iter().zip(PLANET_TEXTURES).enumerate() {
            let hue = i as f32 / planet_count as f32;
            objects.push(SceneObject {
                shape: ShapeKind::Circle,
                position: [FIRST_ORBIT_RADIUS + i as f32 * ORBIT_RADIUS_STEP, 0.0],
                size: PLANET_RADIUS,
                color: [hue, 0.5, 1.0 - hue],
                fixed: false,
                texture: Some(texture_dir.join(texture)),
                orbit_angular_speed: Some(angular_speed),
            });
        }

        Self {
            gravity: [0.0, 0.0],
            ground: false,
            orbit_center: Some([0.0, 0.0]),
            objects,
        }
    }
}

impl SceneObject {
    fn validate(&self) -> std::result::Result<(), String> {
        if !self.position.iter().all(|p| p.is_finite()) {
            return Err("position must be finite".to_string());
        }
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(format!("size must be positive, got {}", self.size));
        }
        if !self.color.iter().all(|c| (0.0..=1.0).contains(c)) {
            return Err("color components must lie in [0, 1]".to_string());
        }
        if let Some(speed) = self.orbit_angular_speed {
            if !speed.is_finite() {
                return Err("orbit angular speed must be finite".to_string());
            }
        }
        Ok(())
    }

    pub fn position_vector(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    /// Registry request for rigid shapes; `None` for particle groups.
    pub fn spawn_request(&self) -> Option<SpawnRequest> {
        if self.shape == ShapeKind::FluidGroup {
            return None;
        }
        let mut request = SpawnRequest::new(
            self.shape,
            self.position_vector(),
            self.size,
            Vec3::from_array(self.color),
        );
        if self.fixed {
            request = request.fixed();
        }
        if let Some(texture) = &self.texture {
            request = request.with_texture(texture.clone());
        }
        if let Some(speed) = self.orbit_angular_speed {
            request = request.with_orbit_angular_speed(speed);
        }
        Some(request)
    }
}
