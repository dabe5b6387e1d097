pub mod brush;
pub mod camera;
pub mod capture;
pub mod controls;
pub mod draw;
pub mod error;
pub mod forces;
pub mod gpu;
pub mod modes;
pub mod registry;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod settings;
pub mod shape;
pub mod simulation;
pub mod world;

pub use error::{Result, SandboxError};
pub use renderer::Renderer;
pub use simulation::{Command, Simulation};
