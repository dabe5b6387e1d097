//! Key bindings.

use crate::shape::ShapeKind;
use crate::simulation::{Command, EXPLOSION_STRENGTH_STEP, ORBIT_SPEED_STEP};
use glam::Vec3;
use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Sim(Command),
    SaveImage,
    ReloadScene,
}

pub fn key_action(code: KeyCode) -> Option<KeyAction> {
    let command = match code {
        KeyCode::Digit1 => Command::SelectShape(ShapeKind::Box),
        KeyCode::Digit2 => Command::SelectShape(ShapeKind::Circle),
        KeyCode::KeyW => Command::SelectShape(ShapeKind::FluidGroup),
        KeyCode::Digit3 => Command::EnterGravityMode,
        KeyCode::Digit4 => Command::EnterExplosionMode,
        KeyCode::Digit5 => Command::EnterOrbitMode,
        KeyCode::Digit6 => Command::LoadSolarSystem,
        KeyCode::KeyE => Command::GrowSize,
        KeyCode::KeyQ => Command::ShrinkSize,
        KeyCode::KeyR => Command::SetColor(Vec3::new(1.0, 0.0, 0.0)),
        KeyCode::KeyG => Command::SetColor(Vec3::new(0.0, 1.0, 0.0)),
        KeyCode::KeyB => Command::SetColor(Vec3::new(0.0, 0.0, 1.0)),
        KeyCode::Escape => Command::ResetFields,
        KeyCode::Digit0 => Command::FullReset,
        KeyCode::KeyL => Command::ToggleBrush,
        KeyCode::BracketLeft => Command::AdjustExplosionStrength(-EXPLOSION_STRENGTH_STEP),
        KeyCode::BracketRight => Command::AdjustExplosionStrength(EXPLOSION_STRENGTH_STEP),
        KeyCode::Minus => Command::AdjustOrbitSpeed(-ORBIT_SPEED_STEP),
        KeyCode::Equal => Command::AdjustOrbitSpeed(ORBIT_SPEED_STEP),
        KeyCode::F5 => return Some(KeyAction::ReloadScene),
        KeyCode::F12 => return Some(KeyAction::SaveImage),
        _ => return None,
    };
    Some(KeyAction::Sim(command))
}
