use glam::{Vec2, Vec3};
use physics_sandbox::forces::FieldKind;
use physics_sandbox::modes::{InteractionMode, PointerRoute};
use physics_sandbox::resources::{CpuResources, RenderResources};
use physics_sandbox::settings::{Settings, MAX_EXPLOSION_STRENGTH};
use physics_sandbox::shape::ShapeKind;
use physics_sandbox::simulation::{MIN_SIZE, SIZE_STEP};
use physics_sandbox::world::DEFAULT_GRAVITY;
use physics_sandbox::{Command, SandboxError, Simulation};
use std::fs;
use tempfile::TempDir;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

fn sandbox() -> Simulation<CpuResources> {
    let settings = Settings {
        texture_dir: "does/not/exist".into(),
        ..Settings::default()
    };
    Simulation::new(settings, CpuResources::new(), WIDTH, HEIGHT)
}

/// Pixel coordinates of a world point for the default 800x600 view.
fn pixel(x: f32, y: f32) -> (f32, f32) {
    let scale = WIDTH as f32 / 10.0;
    (WIDTH as f32 / 2.0 + x * scale, HEIGHT as f32 / 2.0 - y * scale)
}

fn click(sim: &mut Simulation<CpuResources>, x: f32, y: f32) -> PointerRoute {
    let (px, py) = pixel(x, y);
    sim.pointer_down(px, py)
}

fn populate(sim: &mut Simulation<CpuResources>) {
    click(sim, -1.0, 1.0);
    sim.handle_command(Command::SelectShape(ShapeKind::Circle));
    click(sim, 1.0, 1.0);
    sim.handle_command(Command::SelectShape(ShapeKind::FluidGroup));
    click(sim, 0.0, 2.0);
    sim.handle_command(Command::ToggleBrush);
    click(sim, -2.0, -1.0);
    let (px, py) = pixel(2.0, -1.0);
    sim.pointer_move(px, py);
    sim.pointer_up();
}

#[test]
fn test_new_simulation_has_only_ground() {
    let sim = sandbox();
    assert!(sim.has_ground());
    assert_eq!(sim.world().body_count(), 1);
    assert!(sim.registry().is_empty());
    assert_eq!(sim.modes().mode(), InteractionMode::Idle);
    assert_eq!(sim.world().gravity(), DEFAULT_GRAVITY);
}

#[test]
fn test_click_places_selected_shape() {
    let mut sim = sandbox();
    match click(&mut sim, 1.0, 2.0) {
        PointerRoute::Place(point) => assert!(point.distance(Vec2::new(1.0, 2.0)) < 1e-4),
        other => panic!("Expected a placement, got {:?}", other),
    }
    sim.handle_command(Command::SelectShape(ShapeKind::Circle));
    click(&mut sim, -1.0, 2.0);

    let shapes: Vec<ShapeKind> = sim.registry().iter().map(|o| o.shape).collect();
    assert_eq!(shapes, vec![ShapeKind::Box, ShapeKind::Circle]);
    assert!(sim.registry().is_consistent(sim.world(), sim.resources()));
}

#[test]
fn test_water_placement_creates_particles() {
    let mut sim = sandbox();
    sim.handle_command(Command::SelectShape(ShapeKind::FluidGroup));
    click(&mut sim, 0.0, 0.0);

    assert_eq!(sim.world().particle_count(), 100);
    assert!(sim.registry().is_empty(), "Particles never enter the registry");
}

#[test]
fn test_placement_uses_tool_color_and_size() {
    let mut sim = sandbox();
    sim.handle_command(Command::SetColor(Vec3::new(1.0, 0.0, 0.0)));
    sim.handle_command(Command::GrowSize);
    click(&mut sim, 0.0, 0.0);

    let object = sim.registry().iter().next().unwrap();
    assert_eq!(object.color, Vec3::new(1.0, 0.0, 0.0));
    assert!((object.size - (0.3 + SIZE_STEP)).abs() < 1e-6);
}

#[test]
fn test_shrink_size_stops_at_minimum() {
    let mut sim = sandbox();
    for _ in 0..10 {
        sim.handle_command(Command::ShrinkSize);
    }
    assert_eq!(sim.tool().size, MIN_SIZE);
}

#[test]
fn test_full_reset_restores_pristine_state() {
    let mut sim = sandbox();
    populate(&mut sim);
    sim.handle_command(Command::EnterOrbitMode);
    click(&mut sim, 0.0, 0.0);
    for _ in 0..5 {
        sim.tick();
    }

    sim.handle_command(Command::FullReset);

    assert!(sim.registry().is_empty());
    assert_eq!(sim.world().particle_count(), 0);
    assert!(sim.brush().history().is_empty());
    assert!(sim.has_ground());
    assert_eq!(sim.world().body_count(), 1, "Only the ground survives");
    assert_eq!(sim.world().gravity(), DEFAULT_GRAVITY);
    assert_eq!(sim.modes().mode(), InteractionMode::Idle);
    assert!(!sim.modes().is_brush_enabled());
    assert!(sim.fields().targets().is_empty());
    assert_eq!(sim.resources().live_geometry_count(), 0);
}

#[test]
fn test_orbit_key_zeroes_gravity_and_click_removes_ground() {
    let mut sim = sandbox();
    sim.handle_command(Command::EnterOrbitMode);
    assert_eq!(sim.world().gravity(), Vec2::ZERO);
    assert!(sim.has_ground());

    let route = click(&mut sim, 3.0, 2.0);
    assert_eq!(route, PointerRoute::ActivateOrbit { center: Vec2::ZERO });
    assert!(!sim.has_ground());
    assert!(sim.modes().is_orbit_active());
    assert_eq!(sim.fields().target(FieldKind::Orbit).map(|t| t.point), Some(Vec2::ZERO));
}

#[test]
fn test_reset_fields_restores_gravity_and_ground() {
    let mut sim = sandbox();
    sim.handle_command(Command::EnterOrbitMode);
    click(&mut sim, 0.0, 0.0);
    sim.handle_command(Command::EnterGravityMode);
    click(&mut sim, 1.0, 1.0);

    sim.handle_command(Command::ResetFields);

    assert!(sim.has_ground());
    assert_eq!(sim.world().gravity(), DEFAULT_GRAVITY);
    assert!(sim.fields().targets().is_empty());
    assert_eq!(sim.modes().mode(), InteractionMode::Idle);
}

#[test]
fn test_explosion_fires_on_a_single_tick() {
    let mut sim = sandbox();
    click(&mut sim, 1.0, 0.0);
    sim.handle_command(Command::EnterExplosionMode);
    click(&mut sim, 0.0, 0.0);

    let first = sim.tick();
    let second = sim.tick();
    assert!(first.fields.explosion_fired);
    assert!(!second.fields.explosion_fired);
    assert_eq!(sim.modes().mode(), InteractionMode::Idle);
}

#[test]
fn test_explosion_click_cancels_gravity_well() {
    let mut sim = sandbox();
    sim.handle_command(Command::EnterGravityMode);
    click(&mut sim, 2.0, 2.0);
    assert!(sim.fields().target(FieldKind::Gravity).is_some());

    sim.handle_command(Command::EnterExplosionMode);
    click(&mut sim, 0.0, 0.0);
    assert!(sim.fields().target(FieldKind::Gravity).is_none());
}

#[test]
fn test_placed_object_does_not_orbit_without_own_speed() {
    let mut sim = sandbox();
    click(&mut sim, 2.0, 0.0);
    sim.handle_command(Command::EnterOrbitMode);
    click(&mut sim, 0.0, 0.0);

    for _ in 0..60 {
        sim.tick();
    }

    let object = sim.registry().iter().next().unwrap();
    assert_eq!(object.orbit_angular_speed, None);
    let position = sim.world().position(object.body).unwrap();
    let velocity = sim.world().velocity(object.body).unwrap();
    assert!(velocity.length() < 1e-3, "Body should stay at rest, v = {:?}", velocity);
    assert!(position.distance(Vec2::new(2.0, 0.0)) < 1e-2, "Body should not sweep around, p = {:?}", position);
}

#[test]
fn test_gravity_well_pulls_objects() {
    let mut sim = sandbox();
    click(&mut sim, -2.0, 0.0);
    sim.handle_command(Command::EnterGravityMode);
    click(&mut sim, 2.0, 0.0);

    for _ in 0..30 {
        sim.tick();
    }

    let object = sim.registry().iter().next().unwrap();
    let position = sim.world().position(object.body).unwrap();
    assert!(position.x > -2.0, "Body should move toward the well, x = {}", position.x);
}

#[test]
fn test_brush_draws_static_strokes() {
    let mut sim = sandbox();
    sim.handle_command(Command::ToggleBrush);
    click(&mut sim, -1.0, 0.0);
    let (px, py) = pixel(-1.02, 0.0);
    assert!(!sim.pointer_move(px, py), "Sub-spacing drag is ignored");
    let (px, py) = pixel(1.0, 0.0);
    assert!(sim.pointer_move(px, py));
    sim.pointer_up();

    assert_eq!(sim.brush().history().len(), 1);
    assert_eq!(sim.brush().history()[0].points().len(), 2);
    assert!(sim.registry().is_empty());
}

#[test]
fn test_brush_can_draw_while_orbiting() {
    let mut sim = sandbox();
    sim.handle_command(Command::EnterOrbitMode);
    click(&mut sim, 0.0, 0.0);
    sim.handle_command(Command::ToggleBrush);

    assert!(matches!(click(&mut sim, 1.0, 1.0), PointerRoute::BeginStroke(_)));
    assert!(sim.modes().is_orbit_active());
}

#[test]
fn test_toggling_brush_off_commits_open_stroke() {
    let mut sim = sandbox();
    sim.handle_command(Command::ToggleBrush);
    click(&mut sim, 0.0, 0.0);
    assert!(sim.brush().is_drawing());

    sim.handle_command(Command::ToggleBrush);
    assert!(!sim.brush().is_drawing());
    assert_eq!(sim.brush().history().len(), 1);
}

#[test]
fn test_solar_preset() {
    let mut sim = sandbox();
    click(&mut sim, 0.0, 0.0);
    sim.handle_command(Command::LoadSolarSystem);

    assert_eq!(sim.registry().len(), 8);
    assert!(!sim.has_ground());
    assert!(sim.modes().is_orbit_active());
    assert_eq!(sim.world().gravity(), Vec2::ZERO);
    assert_eq!(sim.tool().shape, ShapeKind::Circle);
    assert!((sim.tool().size - 0.1).abs() < 1e-6);
    assert!(sim.registry().iter().all(|o| o.texture.is_none()), "Missing textures fall back to color");
}

#[test]
fn test_solar_planets_start_orbiting() {
    let mut sim = sandbox();
    sim.handle_command(Command::LoadSolarSystem);
    for _ in 0..10 {
        sim.tick();
    }

    let moving = sim
        .registry()
        .iter()
        .filter(|o| sim.world().velocity(o.body).map_or(false, |v| v.length() > 0.0))
        .count();
    assert_eq!(moving, 7, "Every planet moves and the sun stays put");
}

#[test]
fn test_scene_file_replaces_state() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("scene.json");
    fs::write(
        &path,
        r#"{
            "gravity": [0.0, -5.0],
            "objects": [
                { "shape": "box", "position": [0.0, 1.0] },
                { "shape": "circle", "position": [1.0, 1.0], "size": 0.5, "static": true },
                { "shape": "fluid_group", "position": [-1.0, 1.0] }
            ]
        }"#,
    )
    .unwrap();

    let mut sim = sandbox();
    populate(&mut sim);
    let spawned = sim.on_scene_file_changed(&path).unwrap();

    assert_eq!(spawned, 3);
    assert_eq!(sim.registry().len(), 2);
    assert_eq!(sim.world().particle_count(), 100);
    assert!(sim.brush().history().is_empty());
    assert_eq!(sim.world().gravity(), Vec2::new(0.0, -5.0));
    assert_eq!(sim.scene_path(), Some(path.as_path()));

    assert_eq!(sim.reload_scene().unwrap(), 3);
    assert_eq!(sim.registry().len(), 2);
}

#[test]
fn test_bad_scene_file_keeps_current_state() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.json");
    fs::write(&path, "{ \"objects\": [ { \"shape\": \"triangle\" } ] }").unwrap();

    let mut sim = sandbox();
    click(&mut sim, 0.0, 0.0);

    let err = sim.on_scene_file_changed(&path).unwrap_err();
    assert!(matches!(err, SandboxError::SceneParse { .. }));
    assert_eq!(sim.registry().len(), 1);
    assert!(sim.scene_path().is_none());
}

#[test]
fn test_reload_without_scene_fails() {
    let mut sim = sandbox();
    assert!(matches!(sim.reload_scene(), Err(SandboxError::InvalidScene(_))));
}

#[test]
fn test_settings_changes_are_clamped() {
    let mut sim = sandbox();
    let settings = Settings {
        explosion_strength: 500.0,
        ..sim.settings().clone()
    };
    sim.on_settings_changed(settings);
    assert_eq!(sim.settings().explosion_strength, MAX_EXPLOSION_STRENGTH);

    sim.handle_command(Command::AdjustExplosionStrength(10.0));
    assert_eq!(sim.settings().explosion_strength, MAX_EXPLOSION_STRENGTH);
}

#[test]
fn test_world_width_change_moves_ground() {
    let mut sim = sandbox();
    let before = sim.world().position(sim.ground().unwrap()).unwrap();
    let settings = Settings {
        world_width: 20.0,
        ..sim.settings().clone()
    };
    sim.on_settings_changed(settings);

    let after = sim.world().position(sim.ground().unwrap()).unwrap();
    assert!(after.y < before.y);
    assert_eq!(sim.world().body_count(), 1);
}

#[test]
fn test_redraw_request_is_consumed() {
    let mut sim = sandbox();
    assert!(sim.take_redraw_request());
    assert!(!sim.take_redraw_request());
    sim.tick();
    assert!(sim.take_redraw_request());
}
