//! User-tunable parameters.
//!
//! Loaded from an optional TOML file and adjusted at runtime through the
//! key bindings. Every consumer goes through [`Settings::validated`], so an
//! out-of-range value in a file or from a key press never reaches the
//! simulation.

use crate::error::{Result, SandboxError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MIN_EXPLOSION_STRENGTH: f32 = 25.0;
pub const MAX_EXPLOSION_STRENGTH: f32 = 200.0;
pub const MIN_ORBIT_SPEED: f32 = 1.0;
pub const MAX_ORBIT_SPEED: f32 = 25.0;
const MIN_WORLD_WIDTH: f32 = 1.0;
const MIN_NEAR_PLANE: f32 = 0.01;
const MIN_PLANE_GAP: f32 = 0.1;
const MIN_TICK_RATE_HZ: u32 = 10;
const MAX_TICK_RATE_HZ: u32 = 240;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub explosion_strength: f32,
    pub orbit_speed: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub world_width: f32,
    pub texture_dir: PathBuf,
    pub tick_rate_hz: u32,
    pub velocity_iterations: usize,
    pub position_iterations: usize,
    pub max_particles: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            explosion_strength: MIN_EXPLOSION_STRENGTH,
            orbit_speed: 5.0,
            near_plane: 0.1,
            far_plane: 10.0,
            world_width: 10.0,
            texture_dir: PathBuf::from("resources/planets"),
            tick_rate_hz: 60,
            velocity_iterations: 6,
            position_iterations: 2,
            max_particles: 5000,
        }
    }
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SandboxError::SettingsIo {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = toml::from_str(&text).map_err(|source| SandboxError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Loaded settings from {}", path.display());
        Ok(settings.validated())
    }

    /// Copy with every field clamped into its usable range.
    pub fn validated(&self) -> Self {
        let near_plane = finite_or(self.near_plane, 0.1).max(MIN_NEAR_PLANE);
        let far_plane = finite_or(self.far_plane, 10.0).max(near_plane + MIN_PLANE_GAP);

        Self {
            explosion_strength: finite_or(self.explosion_strength, MIN_EXPLOSION_STRENGTH)
                .clamp(MIN_EXPLOSION_STRENGTH, MAX_EXPLOSION_STRENGTH),
            orbit_speed: finite_or(self.orbit_speed, 5.0).clamp(MIN_ORBIT_SPEED, MAX_ORBIT_SPEED),
            near_plane,
            far_plane,
            world_width: finite_or(self.world_width, 10.0).max(MIN_WORLD_WIDTH),
            texture_dir: self.texture_dir.clone(),
            tick_rate_hz: self.tick_rate_hz.clamp(MIN_TICK_RATE_HZ, MAX_TICK_RATE_HZ),
            velocity_iterations: self.velocity_iterations.max(1),
            position_iterations: self.position_iterations.max(1),
            max_particles: self.max_particles,
        }
    }

    pub fn timestep(&self) -> f32 {
        1.0 / self.tick_rate_hz as f32
    }

    /// Multiplier applied to every orbiting body's desired tangential speed.
    /// Continuous in `orbit_speed`, so fractional speeds change the scale too.
    pub fn orbit_speed_scale(&self) -> f32 {
        0.8 + self.orbit_speed / 5.0
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
