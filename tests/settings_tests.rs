use physics_sandbox::settings::{Settings, MAX_ORBIT_SPEED, MIN_EXPLOSION_STRENGTH};
use physics_sandbox::SandboxError;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_partial_file_keeps_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sandbox.toml");
    fs::write(&path, "explosion_strength = 80.0\ntick_rate_hz = 120\n").unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.explosion_strength, 80.0);
    assert_eq!(settings.tick_rate_hz, 120);
    assert_eq!(settings.orbit_speed, Settings::default().orbit_speed);
    assert!((settings.timestep() - 1.0 / 120.0).abs() < 1e-7);
}

#[test]
fn test_loaded_values_are_clamped() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sandbox.toml");
    fs::write(&path, "explosion_strength = 1.0\norbit_speed = 99.0\ntick_rate_hz = 0\n").unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.explosion_strength, MIN_EXPLOSION_STRENGTH);
    assert_eq!(settings.orbit_speed, MAX_ORBIT_SPEED);
    assert!(settings.tick_rate_hz > 0);
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = Settings::load(temp_dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, SandboxError::SettingsIo { .. }));
}

#[test]
fn test_bad_toml_is_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sandbox.toml");
    fs::write(&path, "explosion_strength = \"loud\"\n").unwrap();
    assert!(matches!(Settings::load(&path), Err(SandboxError::SettingsParse { .. })));
}

#[test]
fn test_non_finite_values_fall_back() {
    let settings = Settings {
        orbit_speed: f32::NAN,
        world_width: f32::INFINITY,
        ..Settings::default()
    }
    .validated();
    assert_eq!(settings.orbit_speed, 5.0);
    assert_eq!(settings.world_width, 10.0);
}

#[test]
fn test_orbit_scale_grows_with_speed() {
    let slow = Settings {
        orbit_speed: 1.0,
        ..Settings::default()
    };
    let fast = Settings {
        orbit_speed: 10.0,
        ..Settings::default()
    };
    assert!(fast.orbit_speed_scale() > slow.orbit_speed_scale());
    assert!((slow.orbit_speed_scale() - 1.0).abs() < 1e-6);
}

#[test]
fn test_orbit_scale_is_continuous() {
    let settings = Settings {
        orbit_speed: 7.5,
        ..Settings::default()
    };
    assert!((settings.orbit_speed_scale() - 2.3).abs() < 1e-6);
}
