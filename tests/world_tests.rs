use approx::assert_relative_eq;
use glam::Vec2;
use physics_sandbox::error::SandboxError;
use physics_sandbox::world::{BodyKind, ColliderShape, Fixture, ParticleConfig, PhysicsWorld, DEFAULT_GRAVITY};

const DT: f32 = 1.0 / 60.0;

fn unit_box() -> Fixture {
    Fixture::new(
        ColliderShape::Cuboid {
            half_width: 0.3,
            half_height: 0.3,
        },
        1.0,
    )
}

fn world_with_gravity(gravity: Vec2) -> PhysicsWorld {
    PhysicsWorld::new(gravity, ParticleConfig::default())
}

#[test]
fn test_dynamic_body_falls() {
    let mut world = world_with_gravity(DEFAULT_GRAVITY);
    let body = world.create_body_with_fixture(Vec2::new(0.0, 5.0), BodyKind::Dynamic, unit_box());

    for _ in 0..60 {
        world.step(DT, 6, 2);
    }

    let position = world.position(body).expect("body should exist");
    assert!(position.y < 5.0, "Body should fall under gravity, y = {}", position.y);
    assert!(world.velocity(body).unwrap().y < 0.0);
}

#[test]
fn test_static_body_stays_put() {
    let mut world = world_with_gravity(DEFAULT_GRAVITY);
    let body = world.create_body_with_fixture(Vec2::new(1.0, 2.0), BodyKind::Static, unit_box());

    for _ in 0..30 {
        world.step(DT, 6, 2);
    }

    assert_eq!(world.position(body), Some(Vec2::new(1.0, 2.0)));
    assert!(!world.body_state(body).unwrap().is_dynamic);
}

#[test]
fn test_box_mass_from_density() {
    let mut world = world_with_gravity(Vec2::ZERO);
    let body = world.create_body_with_fixture(Vec2::ZERO, BodyKind::Dynamic, unit_box());
    assert_relative_eq!(world.mass(body).unwrap(), 0.36, epsilon = 1e-5);
}

#[test]
fn test_force_acts_for_one_step_only() {
    let mut world = world_with_gravity(Vec2::ZERO);
    let body = world.create_body_with_fixture(Vec2::ZERO, BodyKind::Dynamic, unit_box());

    world.apply_force(body, Vec2::new(10.0, 0.0));
    world.step(DT, 6, 2);
    let after_first = world.velocity(body).unwrap().x;
    assert!(after_first > 0.0, "Force should accelerate the body");

    world.step(DT, 6, 2);
    let after_second = world.velocity(body).unwrap().x;
    assert_relative_eq!(after_second, after_first, epsilon = 1e-5);
}

#[test]
fn test_destroyed_body_queries_return_none() {
    let mut world = world_with_gravity(DEFAULT_GRAVITY);
    let body = world.create_body_with_fixture(Vec2::ZERO, BodyKind::Dynamic, unit_box());
    world.destroy_body(body);

    assert!(!world.contains(body));
    assert_eq!(world.position(body), None);
    assert_eq!(world.velocity(body), None);
    assert_eq!(world.mass(body), None);

    // No-op rather than a fault.
    world.apply_force(body, Vec2::new(1.0, 1.0));
    world.step(DT, 6, 2);
    assert_eq!(world.body_count(), 0);
}

#[test]
fn test_ground_sits_below_visible_world() {
    let mut world = world_with_gravity(DEFAULT_GRAVITY);
    let ground = world.create_ground(10.0, 7.5);
    assert_eq!(world.position(ground), Some(Vec2::new(0.0, -4.75)));
}

#[test]
fn test_set_gravity() {
    let mut world = world_with_gravity(DEFAULT_GRAVITY);
    world.set_gravity(Vec2::ZERO);
    assert_eq!(world.gravity(), Vec2::ZERO);
}

#[test]
fn test_edges_attach_to_one_body() {
    let mut world = world_with_gravity(DEFAULT_GRAVITY);
    let body = world.create_body(Vec2::ZERO, BodyKind::Static);
    world.attach_edge(body, Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0));
    world.attach_edge(body, Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
    assert_eq!(world.collider_count(body), 2);
}

#[test]
fn test_particle_groups_are_clamped_to_capacity() {
    let config = ParticleConfig {
        max_particles: 150,
        ..ParticleConfig::default()
    };
    let mut world = PhysicsWorld::new(DEFAULT_GRAVITY, config);

    assert_eq!(world.create_particle_group(Vec2::new(-2.0, 0.0)).unwrap(), 100);
    assert_eq!(
        world.create_particle_group(Vec2::new(2.0, 0.0)).unwrap(),
        50,
        "Second group should be clamped to the remaining capacity"
    );
    assert_eq!(world.particle_count(), 150);

    let full = world.create_particle_group(Vec2::ZERO);
    assert!(matches!(full, Err(SandboxError::ParticleCapacity { max_particles: 150 })));
    assert_eq!(world.particle_count(), 150, "Rejected group must not add particles");
}

#[test]
fn test_clear_particles_removes_their_bodies() {
    let mut world = world_with_gravity(DEFAULT_GRAVITY);
    world.create_particle_group(Vec2::ZERO).unwrap();
    assert_eq!(world.body_count(), 100);

    world.clear_particles();
    assert_eq!(world.particle_count(), 0);
    assert_eq!(world.body_count(), 0);
    assert!(world.particle_positions().is_empty());
}
