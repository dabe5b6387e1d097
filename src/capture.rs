//! Frame readback helpers.

use anyhow::{Context, Result};
use std::path::Path;

/// Drops the alignment padding wgpu adds to every row of a texture copy.
pub fn strip_row_padding(data: &[u8], width: u32, height: u32, padded_bytes_per_row: u32) -> Vec<u8> {
    let unpadded_bytes_per_row = (width * 4) as usize;
    let mut frame_data = Vec::with_capacity(unpadded_bytes_per_row * height as usize);

    for y in 0..height as usize {
        let row_start = y * padded_bytes_per_row as usize;
        let row_end = row_start + unpadded_bytes_per_row;
        if let Some(row) = data.get(row_start..row_end) {
            frame_data.extend_from_slice(row);
        }
    }

    frame_data
}

pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    ((unpadded + align - 1) / align) * align
}

pub fn is_bgra(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
    )
}

pub fn bgra_to_rgba(bgra_data: &[u8]) -> Vec<u8> {
    let mut rgba_data = bgra_data.to_vec();
    for pixel in rgba_data.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }
    rgba_data
}

pub fn save_png(path: &Path, rgba: &[u8], width: u32, height: u32) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    image::save_buffer(path, rgba, width, height, image::ColorType::Rgba8)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
