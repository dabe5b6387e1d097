//! Render-side resources owned by simulation objects.
//!
//! The registry only sees opaque handles; whether they name wgpu buffers or
//! plain bookkeeping entries depends on the [`RenderResources`] backend.
//! [`CpuResources`] is the headless backend used by `--simulate`, the
//! benchmark and the test suite.

use crate::error::{Result, SandboxError};
use crate::shape::FLOATS_PER_VERTEX;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryHandle(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub(crate) u64);

pub trait RenderResources {
    /// Uploads a flat `[x, y, u, v]` vertex array.
    fn create_geometry(&mut self, label: &str, vertices: &[f32]) -> Result<GeometryHandle>;

    fn destroy_geometry(&mut self, handle: GeometryHandle);

    fn is_geometry_live(&self, handle: GeometryHandle) -> bool;

    fn live_geometry_count(&self) -> usize;

    fn load_texture(&mut self, path: &Path) -> Result<TextureId>;

    fn release_texture(&mut self, texture: TextureId);

    fn live_texture_count(&self) -> usize;
}

pub(crate) fn validate_vertices(vertices: &[f32]) -> Result<()> {
    if vertices.is_empty() {
        return Err(SandboxError::Geometry("empty vertex array".to_string()));
    }
    if vertices.len() % FLOATS_PER_VERTEX != 0 {
        return Err(SandboxError::Geometry(format!(
            "vertex array length {} is not a multiple of {}",
            vertices.len(),
            FLOATS_PER_VERTEX
        )));
    }
    if vertices.iter().any(|v| !v.is_finite()) {
        return Err(SandboxError::Geometry("non-finite vertex component".to_string()));
    }
    Ok(())
}

/// Rejects images the device cannot hold before anything is uploaded.
pub(crate) fn check_texture_size(path: &Path, width: u32, height: u32, max_dimension: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(SandboxError::Texture {
            path: path.to_path_buf(),
            reason: "image has no pixels".to_string(),
        });
    }
    if width > max_dimension || height > max_dimension {
        return Err(SandboxError::Texture {
            path: path.to_path_buf(),
            reason: format!(
                "{}x{} exceeds max texture size {}",
                width, height, max_dimension
            ),
        });
    }
    Ok(())
}

pub(crate) fn decode_texture(path: &Path) -> Result<image::RgbaImage> {
    let image = image::open(path).map_err(|err| SandboxError::Texture {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    Ok(image.to_rgba8())
}

#[derive(Debug, Default)]
pub struct CpuResources {
    next_id: u64,
    geometry: HashMap<GeometryHandle, usize>,
    textures: HashMap<TextureId, PathBuf>,
}

impl CpuResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertex count of a live buffer.
    pub fn vertex_count(&self, handle: GeometryHandle) -> Option<usize> {
        self.geometry.get(&handle).copied()
    }

    pub fn texture_path(&self, texture: TextureId) -> Option<&Path> {
        self.textures.get(&texture).map(PathBuf::as_path)
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderResources for CpuResources {
    fn create_geometry(&mut self, label: &str, vertices: &[f32]) -> Result<GeometryHandle> {
        validate_vertices(vertices)?;
        let handle = GeometryHandle(self.allocate());
        self.geometry.insert(handle, vertices.len() / FLOATS_PER_VERTEX);
        log::trace!("Created geometry {:?} ({})", handle, label);
        Ok(handle)
    }

    fn destroy_geometry(&mut self, handle: GeometryHandle) {
        if self.geometry.remove(&handle).is_none() {
            log::warn!("Geometry {:?} destroyed twice", handle);
        }
    }

    fn is_geometry_live(&self, handle: GeometryHandle) -> bool {
        self.geometry.contains_key(&handle)
    }

    fn live_geometry_count(&self) -> usize {
        self.geometry.len()
    }

    fn load_texture(&mut self, path: &Path) -> Result<TextureId> {
        decode_texture(path)?;
        let texture = TextureId(self.allocate());
        self.textures.insert(texture, path.to_path_buf());
        Ok(texture)
    }

    fn release_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }

    fn live_texture_count(&self) -> usize {
        self.textures.len()
    }
}
