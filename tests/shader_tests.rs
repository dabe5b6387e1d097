use std::fs;
use std::path::Path;

const SHADER_PATH: &str = "src/shaders/sandbox.wgsl";

fn shader_source() -> String {
    fs::read_to_string(Path::new(SHADER_PATH)).expect("Failed to read shader file")
}

#[test]
fn test_shader_file_exists() {
    assert!(Path::new(SHADER_PATH).exists(), "Shader file should exist at {}", SHADER_PATH);
}

#[test]
fn test_shader_entry_points() {
    let source = shader_source();
    assert!(source.contains("@vertex"), "Shader should contain vertex entry point");
    assert!(source.contains("@fragment"), "Shader should contain fragment entry point");
    assert!(source.contains("fn vs_main"), "Shader should have vs_main function");
    assert!(source.contains("fn fs_main"), "Shader should have fs_main function");
}

#[test]
fn test_shader_bind_groups_match_pipeline_layout() {
    let source = shader_source();
    assert!(source.contains("@group(0) @binding(0)"), "Globals at group 0");
    assert!(source.contains("@group(1) @binding(0)"), "Per-draw uniform at group 1");
    assert!(source.contains("@group(2) @binding(0)"), "Object texture at group 2");
    assert!(source.contains("@group(2) @binding(1)"), "Object sampler at group 2");
}

#[test]
fn test_vertex_layout_is_position_and_uv() {
    let source = shader_source();
    assert!(source.contains("@location(0) position: vec2<f32>"));
    assert!(source.contains("@location(1) uv: vec2<f32>"));
}

#[test]
fn test_texture_sampling_is_gated_by_flag() {
    let source = shader_source();
    assert!(source.contains("use_texture"));
    assert!(source.contains("textureSample(object_texture, object_sampler"));
}
