//! Interaction mode state machine.
//!
//! Field modes are mutually exclusive: the machine holds exactly one
//! [`InteractionMode`], so entering one leaves every other. The brush is an
//! orthogonal toggle layered on top and survives field-mode changes.
//!
//! The machine decides *where* a pointer press goes; acting on that decision
//! (setting targets, spawning bodies, starting strokes) is left to the caller.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    SelectingGravityCenter,
    SelectingExplosionCenter,
    SelectingOrbitCenter,
    OrbitActive,
}

impl InteractionMode {
    pub fn is_selecting(self) -> bool {
        matches!(
            self,
            InteractionMode::SelectingGravityCenter
                | InteractionMode::SelectingExplosionCenter
                | InteractionMode::SelectingOrbitCenter
        )
    }
}

/// What a pointer press resolves to in the current mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerRoute {
    SetGravityTarget(Vec2),
    ScheduleExplosion(Vec2),
    ActivateOrbit { center: Vec2 },
    BeginStroke(Vec2),
    Place(Vec2),
}

/// Side effects a mode key asks the caller to perform immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEffect {
    None,
    ZeroGravity,
}

#[derive(Debug, Clone, Default)]
pub struct ModeMachine {
    mode: InteractionMode,
    brush_enabled: bool,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn is_brush_enabled(&self) -> bool {
        self.brush_enabled
    }

    pub fn is_orbit_active(&self) -> bool {
        self.mode == InteractionMode::OrbitActive
    }

    pub fn enter_gravity_selection(&mut self) -> ModeEffect {
        self.transition(InteractionMode::SelectingGravityCenter);
        ModeEffect::None
    }

    pub fn enter_explosion_selection(&mut self) -> ModeEffect {
        self.transition(InteractionMode::SelectingExplosionCenter);
        ModeEffect::None
    }

    pub fn enter_orbit_selection(&mut self) -> ModeEffect {
        self.transition(InteractionMode::SelectingOrbitCenter);
        ModeEffect::ZeroGravity
    }

    /// Orbit without the selection click, used by presets and scene files.
    pub fn activate_orbit(&mut self) {
        self.transition(InteractionMode::OrbitActive);
    }

    pub fn toggle_brush(&mut self) -> bool {
        self.brush_enabled = !self.brush_enabled;
        log::info!("Brush {}", if self.brush_enabled { "on" } else { "off" });
        self.brush_enabled
    }

    /// Back to idle; the brush toggle is left alone.
    pub fn reset(&mut self) {
        self.transition(InteractionMode::Idle);
    }

    /// Back to idle with the brush off.
    pub fn full_reset(&mut self) {
        self.transition(InteractionMode::Idle);
        self.brush_enabled = false;
    }

    /// Routes a press at world position `point`, consuming any selecting state.
    ///
    /// Selecting states win over the brush, so a field target can always be
    /// picked. Otherwise the brush, when on, takes the press; failing that it
    /// places an object.
    pub fn on_pointer_down(&mut self, point: Vec2) -> PointerRoute {
        match self.mode {
            InteractionMode::SelectingGravityCenter => {
                self.transition(InteractionMode::Idle);
                PointerRoute::SetGravityTarget(point)
            }
            InteractionMode::SelectingExplosionCenter => {
                self.transition(InteractionMode::Idle);
                PointerRoute::ScheduleExplosion(point)
            }
            InteractionMode::SelectingOrbitCenter => {
                self.transition(InteractionMode::OrbitActive);
                PointerRoute::ActivateOrbit { center: Vec2::ZERO }
            }
            InteractionMode::Idle | InteractionMode::OrbitActive => {
                if self.brush_enabled {
                    PointerRoute::BeginStroke(point)
                } else {
                    PointerRoute::Place(point)
                }
            }
        }
    }

    fn transition(&mut self, to: InteractionMode) {
        if self.mode != to {
            log::info!("Mode {:?} -> {:?}", self.mode, to);
            self.mode = to;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_is_consumed_by_a_click() {
        let mut modes = ModeMachine::new();
        modes.enter_gravity_selection();
        let route = modes.on_pointer_down(Vec2::new(1.0, 2.0));
        assert_eq!(route, PointerRoute::SetGravityTarget(Vec2::new(1.0, 2.0)));
        assert_eq!(modes.mode(), InteractionMode::Idle);
    }

    #[test]
    fn test_orbit_center_is_the_origin() {
        let mut modes = ModeMachine::new();
        assert_eq!(modes.enter_orbit_selection(), ModeEffect::ZeroGravity);
        let route = modes.on_pointer_down(Vec2::new(3.0, -1.0));
        assert_eq!(route, PointerRoute::ActivateOrbit { center: Vec2::ZERO });
        assert!(modes.is_orbit_active());
    }
}
