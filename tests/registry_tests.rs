use glam::{Vec2, Vec3};
use physics_sandbox::registry::{ObjectRegistry, SpawnRequest};
use physics_sandbox::resources::{CpuResources, RenderResources};
use physics_sandbox::shape::{ShapeKind, BOX_VERTEX_COUNT, CIRCLE_VERTEX_COUNT};
use physics_sandbox::world::{ParticleConfig, PhysicsWorld, DEFAULT_GRAVITY};
use tempfile::TempDir;

fn setup() -> (PhysicsWorld, CpuResources, ObjectRegistry) {
    (
        PhysicsWorld::new(DEFAULT_GRAVITY, ParticleConfig::default()),
        CpuResources::new(),
        ObjectRegistry::new(),
    )
}

fn blue() -> Vec3 {
    Vec3::new(0.2, 0.2, 0.8)
}

#[test]
fn test_spawn_creates_body_and_geometry_together() {
    let (mut world, mut resources, mut registry) = setup();

    let id = registry
        .spawn(&mut world, &mut resources, SpawnRequest::new(ShapeKind::Box, Vec2::new(1.0, 2.0), 0.3, blue()))
        .expect("spawn should succeed");

    let object = registry.get(id).expect("object should be registered");
    assert!(world.contains(object.body));
    assert!(resources.is_geometry_live(object.geometry));
    assert_eq!(object.vertex_count as usize, BOX_VERTEX_COUNT);
    assert!(!object.is_circle());
    assert_eq!(world.position(object.body), Some(Vec2::new(1.0, 2.0)));
    assert!(registry.is_consistent(&world, &resources));
}

#[test]
fn test_circle_objects_are_flagged() {
    let (mut world, mut resources, mut registry) = setup();
    let id = registry
        .spawn(&mut world, &mut resources, SpawnRequest::new(ShapeKind::Circle, Vec2::ZERO, 0.5, blue()))
        .unwrap();

    let object = registry.get(id).unwrap();
    assert!(object.is_circle());
    assert_eq!(object.vertex_count as usize, CIRCLE_VERTEX_COUNT);
    assert_eq!(resources.vertex_count(object.geometry), Some(CIRCLE_VERTEX_COUNT));
}

#[test]
fn test_clear_releases_every_body_and_buffer() {
    let (mut world, mut resources, mut registry) = setup();
    let mut geometries = Vec::new();
    for i in 0..5 {
        let shape = if i % 2 == 0 { ShapeKind::Box } else { ShapeKind::Circle };
        let request = SpawnRequest::new(shape, Vec2::new(i as f32, 0.0), 0.2, blue());
        let id = registry.spawn(&mut world, &mut resources, request).unwrap();
        geometries.push(registry.get(id).unwrap().geometry);
    }
    assert_eq!(registry.len(), 5);
    assert_eq!(world.body_count(), 5);

    registry.clear(&mut world, &mut resources);

    assert!(registry.is_empty());
    assert_eq!(world.body_count(), 0);
    assert_eq!(resources.live_geometry_count(), 0);
    for geometry in geometries {
        assert!(!resources.is_geometry_live(geometry), "No buffer may outlive clear()");
    }
}

#[test]
fn test_fluid_spawn_is_rejected_without_leaks() {
    let (mut world, mut resources, mut registry) = setup();
    let request = SpawnRequest::new(ShapeKind::FluidGroup, Vec2::ZERO, 0.3, blue());

    assert!(registry.spawn(&mut world, &mut resources, request).is_err());
    assert_eq!(world.body_count(), 0);
    assert_eq!(resources.live_geometry_count(), 0);
}

#[test]
fn test_invalid_size_is_rejected_without_leaks() {
    let (mut world, mut resources, mut registry) = setup();
    let request = SpawnRequest::new(ShapeKind::Box, Vec2::ZERO, 0.0, blue());

    assert!(registry.spawn(&mut world, &mut resources, request).is_err());
    assert_eq!(world.body_count(), 0);
    assert_eq!(resources.live_geometry_count(), 0);
}

#[test]
fn test_missing_texture_falls_back_to_color() {
    let (mut world, mut resources, mut registry) = setup();
    let request = SpawnRequest::new(ShapeKind::Circle, Vec2::ZERO, 0.25, blue()).with_texture("missing/sun.png");

    let id = registry.spawn(&mut world, &mut resources, request).expect("spawn must not fail on a bad texture");
    let object = registry.get(id).unwrap();
    assert_eq!(object.texture, None);
    assert_eq!(object.color, blue());
}

#[test]
fn test_textures_are_loaded_and_released() {
    let temp_dir = TempDir::new().unwrap();
    let texture_path = temp_dir.path().join("planet.png");
    image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 100, 50, 255]))
        .save(&texture_path)
        .unwrap();

    let (mut world, mut resources, mut registry) = setup();
    let request = SpawnRequest::new(ShapeKind::Circle, Vec2::ZERO, 0.1, blue()).with_texture(&texture_path);
    let id = registry.spawn(&mut world, &mut resources, request).unwrap();

    let texture = registry.get(id).unwrap().texture.expect("texture should load");
    assert_eq!(resources.texture_path(texture), Some(texture_path.as_path()));
    assert_eq!(resources.live_texture_count(), 1);

    registry.clear(&mut world, &mut resources);
    assert_eq!(resources.live_texture_count(), 0);
}

#[test]
fn test_for_each_visits_every_object() {
    let (mut world, mut resources, mut registry) = setup();
    for i in 0..3 {
        let request = SpawnRequest::new(ShapeKind::Box, Vec2::new(i as f32, 0.0), 0.2, blue());
        registry.spawn(&mut world, &mut resources, request).unwrap();
    }

    let mut visited = 0;
    registry.for_each(|_| visited += 1);
    assert_eq!(visited, 3);
}

#[test]
fn test_static_spawn_and_orbit_speed() {
    let (mut world, mut resources, mut registry) = setup();
    let request = SpawnRequest::new(ShapeKind::Circle, Vec2::new(2.0, 0.0), 0.1, blue())
        .fixed()
        .with_orbit_angular_speed(0.5);
    let id = registry.spawn(&mut world, &mut resources, request).unwrap();

    let object = registry.get(id).unwrap();
    assert_eq!(object.orbit_angular_speed, Some(0.5));
    assert!(!world.body_state(object.body).unwrap().is_dynamic);
}
