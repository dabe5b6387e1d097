//! Force fields layered on top of the physics step.
//!
//! Targets are stored one per field kind and overwritten, never queued. The
//! explosion is one-shot: [`ForceFieldEngine::apply`] takes it, so it acts on
//! exactly one tick however long the next trigger takes to arrive. Fields
//! act on dynamic registry bodies only; particles just follow global gravity.

use crate::registry::ObjectRegistry;
use crate::settings::Settings;
use crate::world::{BodyHandle, PhysicsWorld};
use glam::Vec2;

pub const GRAVITY_STRENGTH: f32 = 10.0;
pub const GRAVITY_FORCE_SCALE: f32 = 2.0;
pub const EXPLOSION_RADIUS_SQ: f32 = 10.0;
pub const ORBIT_GAIN: f32 = 10.0;
/// Squared distance below which a direction is considered undefined.
pub const MIN_DISTANCE_SQ: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Gravity,
    Explosion,
    Orbit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceFieldTarget {
    pub kind: FieldKind,
    pub point: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldTuning {
    pub explosion_strength: f32,
    pub orbit_speed_scale: f32,
}

impl FieldTuning {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            explosion_strength: settings.explosion_strength,
            orbit_speed_scale: settings.orbit_speed_scale(),
        }
    }
}

impl Default for FieldTuning {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Pull toward `target`, scaled by mass. Zero inside the epsilon disc.
pub fn gravity_force(position: Vec2, mass: f32, target: Vec2) -> Vec2 {
    let offset = target - position;
    let distance_sq = offset.length_squared();
    if distance_sq <= MIN_DISTANCE_SQ {
        return Vec2::ZERO;
    }
    let direction = offset / distance_sq.sqrt();
    direction * (GRAVITY_STRENGTH * mass) * GRAVITY_FORCE_SCALE
}

/// Push away from `center`, falling off with distance and cut off at the
/// blast radius.
pub fn explosion_force(position: Vec2, center: Vec2, strength: f32) -> Vec2 {
    let offset = position - center;
    let distance_sq = offset.length_squared();
    if distance_sq <= MIN_DISTANCE_SQ || distance_sq >= EXPLOSION_RADIUS_SQ {
        return Vec2::ZERO;
    }
    let distance = distance_sq.sqrt();
    (offset / distance) * (strength / distance)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitForces {
    pub tangential: Vec2,
    pub centripetal: Vec2,
    pub desired_speed: f32,
}

impl OrbitForces {
    pub fn total(&self) -> Vec2 {
        self.tangential + self.centripetal
    }
}

/// Velocity servo toward a circular orbit of angular speed
/// `angular_speed × speed_scale` about `center`.
pub fn orbit_forces(
    position: Vec2,
    velocity: Vec2,
    mass: f32,
    center: Vec2,
    angular_speed: f32,
    speed_scale: f32,
) -> Option<OrbitForces> {
    let offset = position - center;
    let distance_sq = offset.length_squared();
    if distance_sq <= MIN_DISTANCE_SQ {
        return None;
    }
    let distance = distance_sq.sqrt();
    let radial = offset / distance;
    let tangent = radial.perp();

    let desired_speed = speed_scale * angular_speed * distance;
    let speed_error = desired_speed - velocity.dot(tangent);

    Some(OrbitForces {
        tangential: tangent * (speed_error * ORBIT_GAIN * mass),
        centripetal: -radial * (desired_speed * desired_speed / distance * mass),
        desired_speed,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldReport {
    pub forces_applied: usize,
    pub explosion_fired: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ForceFieldEngine {
    gravity: Option<Vec2>,
    explosion: Option<Vec2>,
    orbit: Option<Vec2>,
}

impl ForceFieldEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_target(&mut self, kind: FieldKind, point: Vec2) {
        *self.slot(kind) = Some(point);
    }

    pub fn clear_target(&mut self, kind: FieldKind) {
        *self.slot(kind) = None;
    }

    pub fn target(&self, kind: FieldKind) -> Option<ForceFieldTarget> {
        let point = match kind {
            FieldKind::Gravity => self.gravity,
            FieldKind::Explosion => self.explosion,
            FieldKind::Orbit => self.orbit,
        };
        point.map(|point| ForceFieldTarget { kind, point })
    }

    pub fn targets(&self) -> Vec<ForceFieldTarget> {
        [FieldKind::Gravity, FieldKind::Explosion, FieldKind::Orbit]
            .into_iter()
            .filter_map(|kind| self.target(kind))
            .collect()
    }

    pub fn clear_all(&mut self) {
        self.gravity = None;
        self.explosion = None;
        self.orbit = None;
    }

    /// Applies every active field to the dynamic registry bodies and
    /// consumes the pending explosion.
    pub fn apply(&mut self, world: &mut PhysicsWorld, registry: &ObjectRegistry, tuning: &FieldTuning) -> FieldReport {
        let explosion = self.explosion.take();
        let mut report = FieldReport {
            forces_applied: 0,
            explosion_fired: explosion.is_some(),
        };
        if self.gravity.is_none() && explosion.is_none() && self.orbit.is_none() {
            return report;
        }

        let mut pending: Vec<(BodyHandle, Vec2)> = Vec::new();
        for object in registry.iter() {
            let Some(state) = world.body_state(object.body) else {
                continue;
            };
            if !state.is_dynamic {
                continue;
            }

            if let Some(target) = self.gravity {
                pending.push((object.body, gravity_force(state.position, state.mass, target)));
            }
            if let Some(center) = explosion {
                pending.push((
                    object.body,
                    explosion_force(state.position, center, tuning.explosion_strength),
                ));
            }
            if let Some(center) = self.orbit {
                // No angular speed of its own: the servo brakes it to rest.
                let angular_speed = object.orbit_angular_speed.unwrap_or(0.0);
                if let Some(forces) = orbit_forces(
                    state.position,
                    state.velocity,
                    state.mass,
                    center,
                    angular_speed,
                    tuning.orbit_speed_scale,
                ) {
                    pending.push((object.body, forces.total()));
                }
            }
        }

        for (body, force) in pending {
            if force != Vec2::ZERO {
                world.apply_force(body, force);
                report.forces_applied += 1;
            }
        }
        if report.explosion_fired {
            log::debug!("Explosion applied {} forces", report.forces_applied);
        }
        report
    }

    fn slot(&mut self, kind: FieldKind) -> &mut Option<Vec2> {
        match kind {
            FieldKind::Gravity => &mut self.gravity,
            FieldKind::Explosion => &mut self.explosion,
            FieldKind::Orbit => &mut self.orbit,
        }
    }
}
