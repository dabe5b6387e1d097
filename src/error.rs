use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SandboxError>;

/// Recoverable failures of the simulation core.
///
/// None of these abort the sandbox: callers log them and keep the
/// previous valid state.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("particle system is full ({max_particles} particles)")]
    ParticleCapacity { max_particles: usize },

    #[error("failed to read scene file {path}: {source}")]
    SceneIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scene file {path}: {source}")]
    SceneParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid scene: {0}")]
    InvalidScene(String),

    #[error("failed to load texture {path}: {reason}")]
    Texture { path: PathBuf, reason: String },

    #[error("failed to read settings file {path}: {source}")]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("geometry upload failed: {0}")]
    Geometry(String),
}
