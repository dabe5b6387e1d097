//! The sandbox controller.
//!
//! [`Simulation`] owns all mutable state: the physics world, the object
//! registry, the mode machine, force-field targets, brush strokes and the
//! placement tool. Input handlers mutate it synchronously; [`Simulation::tick`]
//! runs the fixed-step update in three ordered stages. It never touches the
//! window or the GPU directly, so it runs the same headless and on screen.

use crate::brush::BrushStrokeBuilder;
use crate::camera::Camera2D;
use crate::error::{Result, SandboxError};
use crate::forces::{FieldKind, FieldReport, FieldTuning, ForceFieldEngine};
use crate::modes::{ModeEffect, ModeMachine, PointerRoute};
use crate::registry::{ObjectRegistry, SpawnRequest};
use crate::resources::RenderResources;
use crate::scene::{SceneDescription, DEFAULT_OBJECT_COLOR, DEFAULT_OBJECT_SIZE};
use crate::settings::Settings;
use crate::shape::ShapeKind;
use crate::world::{BodyHandle, ParticleConfig, PhysicsWorld, DEFAULT_GRAVITY};
use glam::{Vec2, Vec3};
use std::path::{Path, PathBuf};

pub const SIZE_STEP: f32 = 0.1;
pub const MIN_SIZE: f32 = 0.1;
pub const EXPLOSION_STRENGTH_STEP: f32 = 5.0;
pub const ORBIT_SPEED_STEP: f32 = 1.0;
const SOLAR_PLACEMENT_SIZE: f32 = 0.1;

/// Discrete user commands, decoupled from any key layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SelectShape(ShapeKind),
    EnterGravityMode,
    EnterExplosionMode,
    EnterOrbitMode,
    LoadSolarSystem,
    GrowSize,
    ShrinkSize,
    SetColor(Vec3),
    ResetFields,
    FullReset,
    ToggleBrush,
    AdjustExplosionStrength(f32),
    AdjustOrbitSpeed(f32),
}

/// What the next placement click creates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementTool {
    pub shape: ShapeKind,
    pub size: f32,
    pub color: Vec3,
}

impl Default for PlacementTool {
    fn default() -> Self {
        Self {
            shape: ShapeKind::Box,
            size: DEFAULT_OBJECT_SIZE,
            color: Vec3::from_array(DEFAULT_OBJECT_COLOR),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub fields: FieldReport,
    pub redraw_requested: bool,
}

pub struct Simulation<R: RenderResources> {
    world: PhysicsWorld,
    registry: ObjectRegistry,
    modes: ModeMachine,
    fields: ForceFieldEngine,
    brush: BrushStrokeBuilder,
    camera: Camera2D,
    settings: Settings,
    tool: PlacementTool,
    resources: R,
    ground: Option<BodyHandle>,
    scene_path: Option<PathBuf>,
    redraw_requested: bool,
}

impl<R: RenderResources> Simulation<R> {
    pub fn new(settings: Settings, resources: R, screen_width: u32, screen_height: u32) -> Self {
        let settings = settings.validated();
        let particle_config = ParticleConfig {
            max_particles: settings.max_particles,
            ..ParticleConfig::default()
        };
        let mut camera = Camera2D::new(settings.world_width, screen_width, screen_height);
        camera.set_depth_range(settings.near_plane, settings.far_plane);

        let mut simulation = Self {
            world: PhysicsWorld::new(DEFAULT_GRAVITY, particle_config),
            registry: ObjectRegistry::new(),
            modes: ModeMachine::new(),
            fields: ForceFieldEngine::new(),
            brush: BrushStrokeBuilder::default(),
            camera,
            settings,
            tool: PlacementTool::default(),
            resources,
            ground: None,
            scene_path: None,
            redraw_requested: true,
        };
        simulation.ensure_ground();
        simulation
    }

    pub fn handle_command(&mut self, command: Command) {
        match command {
            Command::SelectShape(shape) => self.tool.shape = shape,
            Command::EnterGravityMode => {
                let effect = self.modes.enter_gravity_selection();
                self.apply_mode_effect(effect);
            }
            Command::EnterExplosionMode => {
                let effect = self.modes.enter_explosion_selection();
                self.apply_mode_effect(effect);
            }
            Command::EnterOrbitMode => {
                let effect = self.modes.enter_orbit_selection();
                self.apply_mode_effect(effect);
            }
            Command::LoadSolarSystem => self.load_solar_system(),
            Command::GrowSize => self.tool.size += SIZE_STEP,
            Command::ShrinkSize => self.tool.size = (self.tool.size - SIZE_STEP).max(MIN_SIZE),
            Command::SetColor(color) => self.tool.color = color,
            Command::ResetFields => self.reset_fields(),
            Command::FullReset => self.full_reset(),
            Command::ToggleBrush => {
                if !self.modes.toggle_brush() {
                    self.brush.commit();
                }
            }
            Command::AdjustExplosionStrength(delta) => {
                let mut settings = self.settings.clone();
                settings.explosion_strength += delta;
                self.on_settings_changed(settings);
            }
            Command::AdjustOrbitSpeed(delta) => {
                let mut settings = self.settings.clone();
                settings.orbit_speed += delta;
                self.on_settings_changed(settings);
            }
        }
        self.redraw_requested = true;
    }

    /// Press at pixel coordinates. Returns where the press was routed.
    pub fn pointer_down(&mut self, px: f32, py: f32) -> PointerRoute {
        let point = self.camera.screen_to_world(px, py);
        let route = self.modes.on_pointer_down(point);
        match route {
            PointerRoute::SetGravityTarget(target) => {
                self.fields.set_target(FieldKind::Gravity, target);
                log::info!("Gravity center set at ({:.2}, {:.2})", target.x, target.y);
            }
            PointerRoute::ScheduleExplosion(center) => {
                self.fields.set_target(FieldKind::Explosion, center);
                self.fields.clear_target(FieldKind::Gravity);
                log::info!("Explosion scheduled at ({:.2}, {:.2})", center.x, center.y);
            }
            PointerRoute::ActivateOrbit { center } => {
                self.fields.set_target(FieldKind::Orbit, center);
                self.fields.clear_target(FieldKind::Gravity);
                self.remove_ground();
                log::info!("Orbit mode active around ({:.2}, {:.2})", center.x, center.y);
            }
            PointerRoute::BeginStroke(start) => self.brush.begin(&mut self.world, start),
            PointerRoute::Place(position) => self.place(position),
        }
        self.redraw_requested = true;
        route
    }

    /// Drag at pixel coordinates. Returns whether a stroke point was added.
    pub fn pointer_move(&mut self, px: f32, py: f32) -> bool {
        if !self.modes.is_brush_enabled() || !self.brush.is_drawing() {
            return false;
        }
        let point = self.camera.screen_to_world(px, py);
        let added = self.brush.extend(&mut self.world, point);
        if added {
            self.redraw_requested = true;
        }
        added
    }

    pub fn pointer_up(&mut self) {
        if self.brush.commit() {
            self.redraw_requested = true;
        }
    }

    fn place(&mut self, position: Vec2) {
        let result = match self.tool.shape {
            ShapeKind::FluidGroup => self.world.create_particle_group(position).map(|_| ()),
            shape => {
                let request = SpawnRequest::new(shape, position, self.tool.size, self.tool.color);
                self.registry
                    .spawn(&mut self.world, &mut self.resources, request)
                    .map(|_| ())
            }
        };
        if let Err(err) = result {
            log::warn!("Placement at ({:.2}, {:.2}) failed: {}", position.x, position.y, err);
        }
    }

    fn apply_mode_effect(&mut self, effect: ModeEffect) {
        match effect {
            ModeEffect::None => {}
            ModeEffect::ZeroGravity => self.world.set_gravity(Vec2::ZERO),
        }
        // Leaving OrbitActive ends the orbit field with it.
        if !self.modes.is_orbit_active() {
            self.fields.clear_target(FieldKind::Orbit);
        }
    }

    pub fn tick(&mut self) -> TickReport {
        self.step_physics();
        let fields = self.apply_fields();
        self.request_redraw();
        TickReport {
            fields,
            redraw_requested: true,
        }
    }

    pub fn step_physics(&mut self) {
        self.world.step(
            self.settings.timestep(),
            self.settings.velocity_iterations,
            self.settings.position_iterations,
        );
    }

    pub fn apply_fields(&mut self) -> FieldReport {
        let tuning = FieldTuning::from_settings(&self.settings);
        self.fields.apply(&mut self.world, &self.registry, &tuning)
    }

    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Returns and clears the pending redraw flag.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Clears field targets and modes, restores downward gravity and the
    /// ground. Objects, particles and strokes are kept.
    pub fn reset_fields(&mut self) {
        self.fields.clear_all();
        self.modes.reset();
        self.world.set_gravity(DEFAULT_GRAVITY);
        self.ensure_ground();
        log::info!("Force fields reset");
    }

    /// Removes every object, particle and stroke and rebuilds the ground.
    pub fn full_reset(&mut self) {
        self.registry.clear(&mut self.world, &mut self.resources);
        self.world.clear_particles();
        self.brush.clear(&mut self.world);
        self.fields.clear_all();
        self.modes.full_reset();
        self.world.set_gravity(DEFAULT_GRAVITY);
        self.remove_ground();
        self.ensure_ground();
        self.redraw_requested = true;
        log::info!("World reset");
    }

    pub fn load_solar_system(&mut self) {
        let scene = SceneDescription::solar_system(&self.settings.texture_dir);
        self.registry.clear(&mut self.world, &mut self.resources);
        let spawned = self.apply_scene(&scene);
        self.tool.shape = ShapeKind::Circle;
        self.tool.size = SOLAR_PLACEMENT_SIZE;
        log::info!("Solar system loaded ({} bodies)", spawned);
    }

    /// Parses `path`, then replaces the current scene with it. On error the
    /// current scene is left untouched.
    pub fn on_scene_file_changed<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let scene = SceneDescription::load(path)?;
        self.full_reset();
        let spawned = self.apply_scene(&scene);
        self.scene_path = Some(path.to_path_buf());
        log::info!("Loaded scene {} ({} objects)", path.display(), spawned);
        Ok(spawned)
    }

    pub fn reload_scene(&mut self) -> Result<usize> {
        let path = self
            .scene_path
            .clone()
            .ok_or_else(|| SandboxError::InvalidScene("no scene file has been loaded".to_string()))?;
        self.on_scene_file_changed(path)
    }

    /// Applies a validated scene on top of the current state. Returns how
    /// many objects and particle groups were created.
    pub fn apply_scene(&mut self, scene: &SceneDescription) -> usize {
        self.world.set_gravity(scene.gravity_vector());
        if scene.ground {
            self.ensure_ground();
        } else {
            self.remove_ground();
        }

        self.fields.clear_all();
        match scene.orbit_center_point() {
            Some(center) => {
                self.modes.activate_orbit();
                self.fields.set_target(FieldKind::Orbit, center);
            }
            None => self.modes.reset(),
        }

        let mut spawned = 0;
        for object in &scene.objects {
            let result = match object.spawn_request() {
                Some(request) => self
                    .registry
                    .spawn(&mut self.world, &mut self.resources, request)
                    .map(|_| ()),
                None => self.world.create_particle_group(object.position_vector()).map(|_| ()),
            };
            match result {
                Ok(()) => spawned += 1,
                Err(err) => log::warn!("Skipped scene object: {}", err),
            }
        }
        self.redraw_requested = true;
        spawned
    }

    /// Applies new tunables. Out-of-range values are clamped.
    pub fn on_settings_changed(&mut self, settings: Settings) {
        let settings = settings.validated();
        self.camera.set_depth_range(settings.near_plane, settings.far_plane);
        self.world.set_max_particles(settings.max_particles);

        let width_changed = settings.world_width != self.settings.world_width;
        if width_changed {
            self.camera.set_world_width(settings.world_width);
        }
        log::info!(
            "Settings applied: explosion strength {}, orbit speed {}",
            settings.explosion_strength,
            settings.orbit_speed
        );
        self.settings = settings;
        if width_changed {
            self.rebuild_ground();
        }
        self.redraw_requested = true;
    }

    pub fn resize(&mut self, screen_width: u32, screen_height: u32) {
        if screen_width == 0 || screen_height == 0 {
            return;
        }
        self.camera.resize(screen_width, screen_height);
        self.rebuild_ground();
        self.redraw_requested = true;
    }

    fn ensure_ground(&mut self) {
        if self.ground.is_none() {
            let ground = self
                .world
                .create_ground(self.camera.world_width(), self.camera.world_height());
            self.ground = Some(ground);
        }
    }

    fn remove_ground(&mut self) {
        if let Some(ground) = self.ground.take() {
            self.world.destroy_body(ground);
        }
    }

    /// Moves an existing ground to the current world edges.
    fn rebuild_ground(&mut self) {
        if self.ground.is_some() {
            self.remove_ground();
            self.ensure_ground();
        }
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn modes(&self) -> &ModeMachine {
        &self.modes
    }

    pub fn fields(&self) -> &ForceFieldEngine {
        &self.fields
    }

    pub fn brush(&self) -> &BrushStrokeBuilder {
        &self.brush
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tool(&self) -> &PlacementTool {
        &self.tool
    }

    pub fn resources(&self) -> &R {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut R {
        &mut self.resources
    }

    pub fn ground(&self) -> Option<BodyHandle> {
        self.ground
    }

    pub fn has_ground(&self) -> bool {
        self.ground.is_some()
    }

    pub fn scene_path(&self) -> Option<&Path> {
        self.scene_path.as_deref()
    }
}
