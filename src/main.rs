//! Entry point for the physics sandbox.
//!
//! Three ways to run:
//! - interactive (default): a winit window, keyboard and mouse input, a
//!   fixed-rate simulation tick driven from the event loop
//! - `--save-frame`: headless GPU render of the scene after `--ticks` ticks
//! - `--simulate`: CPU only, no GPU or window, prints a summary
//!
//! # Controls
//! - `1`/`2`/`W`: place boxes, circles, water
//! - `3`/`4`/`5`: gravity center, explosion, orbit mode; `6`: solar system
//! - `E`/`Q`: grow/shrink, `R`/`G`/`B`: color
//! - `L`: brush, `Esc`: reset fields, `0`: reset everything
//! - `[`/`]`: explosion strength, `-`/`=`: orbit speed
//! - `F5`: reload scene file, `F12`: save image

use clap::{Parser, ValueEnum};
use physics_sandbox::{
    capture::save_png,
    controls::{key_action, KeyAction},
    draw::build_frame,
    gpu::{GpuContext, WgpuResources},
    renderer::{CAPTURE_HEIGHT, CAPTURE_WIDTH},
    resources::{CpuResources, RenderResources},
    settings::Settings,
    shape::ShapeKind,
    Command, Renderer, Simulation,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

const MAX_TICKS_PER_FRAME: u32 = 5;

#[derive(Parser, Debug)]
#[command(name = "sandbox")]
#[command(about = "Interactive 2D physics sandbox with force fields and freehand collision strokes")]
struct Args {
    /// TOML file with tunables (explosion strength, orbit speed, planes, ...)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// JSON scene file to load at startup (reload with F5)
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Built-in scene to load at startup
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Render a single frame to this PNG without opening a window
    #[arg(long)]
    save_frame: Option<PathBuf>,

    /// Ticks to simulate before --save-frame captures
    #[arg(long, default_value = "120")]
    ticks: u32,

    /// Run this many ticks on the CPU only and print a summary
    #[arg(long)]
    simulate: Option<u32>,

    /// Window width in pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value = "600")]
    height: u32,

    /// Where F12 writes images
    #[arg(long, default_value = "screenshots")]
    screenshot_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    Solar,
}

struct ApplicationState {
    cursor: PhysicalPosition<f64>,
    last_tick: Instant,
    tick_duration: Duration,
    screenshot_dir: PathBuf,
    screenshot_count: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let settings = load_settings(args.settings.as_deref());

    if let Some(ticks) = args.simulate {
        return run_simulation(settings, &args, ticks);
    }

    if let Some(output_path) = &args.save_frame {
        return run_headless(settings, &args, output_path);
    }

    run_interactive(settings, args)
}

fn load_settings(path: Option<&Path>) -> Settings {
    let Some(path) = path else {
        return Settings::default();
    };
    match Settings::load(path) {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("{}; using default settings", err);
            Settings::default()
        }
    }
}

fn prepare_scene<R: RenderResources>(simulation: &mut Simulation<R>, args: &Args) {
    if let Some(Preset::Solar) = args.preset {
        simulation.load_solar_system();
    }
    if let Some(scene) = &args.scene {
        if let Err(err) = simulation.on_scene_file_changed(scene) {
            log::error!("{}", err);
        }
    }
}

/// A few boxes and circles dropped through the normal input path.
fn populate_demo_scene<R: RenderResources>(simulation: &mut Simulation<R>, width: u32, height: u32) {
    let (w, h) = (width as f32, height as f32);
    let drops = [
        (ShapeKind::Box, 0.3, 0.2),
        (ShapeKind::Circle, 0.45, 0.1),
        (ShapeKind::Box, 0.55, 0.25),
        (ShapeKind::Circle, 0.7, 0.15),
    ];
    for (shape, fx, fy) in drops {
        simulation.handle_command(Command::SelectShape(shape));
        simulation.pointer_down(fx * w, fy * h);
        simulation.pointer_up();
    }
    simulation.handle_command(Command::SelectShape(ShapeKind::FluidGroup));
    simulation.pointer_down(0.5 * w, 0.4 * h);
    simulation.pointer_up();
}

fn run_simulation(settings: Settings, args: &Args, ticks: u32) -> anyhow::Result<()> {
    println!("Running {} ticks on the CPU", ticks);

    let mut simulation = Simulation::new(settings, CpuResources::new(), args.width, args.height);
    prepare_scene(&mut simulation, args);
    if args.scene.is_none() && args.preset.is_none() {
        populate_demo_scene(&mut simulation, args.width, args.height);
    }

    let started = Instant::now();
    for _ in 0..ticks {
        simulation.tick();
    }

    println!(
        "   {} objects, {} particles, {} bodies after {:.2?}",
        simulation.registry().len(),
        simulation.world().particle_count(),
        simulation.world().body_count(),
        started.elapsed()
    );
    Ok(())
}

fn run_headless(settings: Settings, args: &Args, output_path: &Path) -> anyhow::Result<()> {
    println!("Running in headless mode, saving frame to: {}", output_path.display());

    let gpu = pollster::block_on(GpuContext::new())?;
    let resources = WgpuResources::new(&gpu);
    let mut renderer = Renderer::new(None, &gpu, &resources, CAPTURE_WIDTH, CAPTURE_HEIGHT)?;
    let mut simulation = Simulation::new(settings, resources, args.width, args.height);

    prepare_scene(&mut simulation, args);
    if args.scene.is_none() && args.preset.is_none() {
        populate_demo_scene(&mut simulation, args.width, args.height);
    }
    for _ in 0..args.ticks {
        simulation.tick();
    }

    save_viewport_image(&gpu, &mut renderer, &simulation, output_path)?;
    println!("✅ Frame saved to {}", output_path.display());
    Ok(())
}

/// Renders the current state at the fixed capture resolution and writes a PNG.
fn save_viewport_image(
    gpu: &GpuContext,
    renderer: &mut Renderer,
    simulation: &Simulation<WgpuResources>,
    path: &Path,
) -> anyhow::Result<()> {
    let camera = simulation.camera().with_screen_size(CAPTURE_WIDTH, CAPTURE_HEIGHT);
    let frame = build_frame(simulation, &camera);
    let rgba = renderer.render_to_image(gpu, simulation.resources(), &frame, CAPTURE_WIDTH, CAPTURE_HEIGHT)?;
    save_png(path, &rgba, CAPTURE_WIDTH, CAPTURE_HEIGHT)?;
    log::info!("Saved viewport image to {}", path.display());
    Ok(())
}

fn run_interactive(settings: Settings, args: Args) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let window = Arc::new(create_window(&event_loop, args.width, args.height)?);

    let gpu = pollster::block_on(GpuContext::new())?;
    let resources = WgpuResources::new(&gpu);
    let size = window.inner_size();
    let mut renderer = Renderer::new(Some(window.clone()), &gpu, &resources, size.width, size.height)?;

    let mut simulation = Simulation::new(settings, resources, size.width, size.height);
    prepare_scene(&mut simulation, &args);

    let mut app_state = ApplicationState {
        cursor: PhysicalPosition::new(0.0, 0.0),
        last_tick: Instant::now(),
        tick_duration: Duration::from_secs_f32(simulation.settings().timestep()),
        screenshot_dir: args.screenshot_dir.clone(),
        screenshot_count: 0,
    };

    print_controls();

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::AboutToWait => {
                handle_tick(&mut app_state, &mut simulation, &window);
            }
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => {
                    renderer.resize(&gpu, physical_size);
                    simulation.resize(physical_size.width, physical_size.height);
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => {
                    handle_mouse_input(&app_state, &mut simulation, state);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    app_state.cursor = position;
                    simulation.pointer_move(position.x as f32, position.y as f32);
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(code),
                            state: ElementState::Pressed,
                            repeat: false,
                            ..
                        },
                    ..
                } => {
                    handle_key(code, &mut app_state, &mut simulation, &mut renderer, &gpu);
                }
                WindowEvent::RedrawRequested => {
                    handle_redraw(&simulation, &mut renderer, &gpu, &window, elwt);
                }
                _ => {}
            },
            _ => {}
        }
    })?;

    Ok(())
}

fn create_window(event_loop: &EventLoop<()>, width: u32, height: u32) -> anyhow::Result<Window> {
    let window = WindowBuilder::new()
        .with_title("Physics Sandbox")
        .with_inner_size(winit::dpi::PhysicalSize::new(width, height))
        .build(event_loop)?;
    Ok(window)
}

fn print_controls() {
    println!("Physics sandbox");
    println!("   1/2/W  box, circle, water      E/Q    grow, shrink");
    println!("   3/4/5  gravity, explosion, orbit  6  solar system");
    println!("   R/G/B  color   L  brush   Esc  reset fields   0  reset all");
    println!("   [ ]    explosion strength       - =    orbit speed");
    println!("   F5     reload scene             F12    save image");
}

/// Runs as many fixed-size ticks as wall time allows, then asks for a redraw.
fn handle_tick(state: &mut ApplicationState, simulation: &mut Simulation<WgpuResources>, window: &Window) {
    let mut ticks = 0;
    while is_time_for_next_tick(state) {
        simulation.tick();
        state.last_tick += state.tick_duration;
        ticks += 1;
        if ticks == MAX_TICKS_PER_FRAME {
            state.last_tick = Instant::now();
            break;
        }
    }

    if simulation.take_redraw_request() {
        window.request_redraw();
    }
}

fn is_time_for_next_tick(state: &ApplicationState) -> bool {
    state.last_tick.elapsed() >= state.tick_duration
}

fn handle_mouse_input(state: &ApplicationState, simulation: &mut Simulation<WgpuResources>, button_state: ElementState) {
    let (px, py) = (state.cursor.x as f32, state.cursor.y as f32);
    match button_state {
        ElementState::Pressed => {
            simulation.pointer_down(px, py);
        }
        ElementState::Released => simulation.pointer_up(),
    }
}

fn handle_key(
    code: KeyCode,
    state: &mut ApplicationState,
    simulation: &mut Simulation<WgpuResources>,
    renderer: &mut Renderer,
    gpu: &GpuContext,
) {
    match key_action(code) {
        Some(KeyAction::Sim(command)) => simulation.handle_command(command),
        Some(KeyAction::ReloadScene) => {
            if let Err(err) = simulation.reload_scene() {
                log::error!("Scene reload failed: {}", err);
            }
        }
        Some(KeyAction::SaveImage) => {
            state.screenshot_count += 1;
            let path = state
                .screenshot_dir
                .join(format!("sandbox_{:03}.png", state.screenshot_count));
            match save_viewport_image(gpu, renderer, simulation, &path) {
                Ok(()) => println!("Saved {}", path.display()),
                Err(err) => log::error!("Failed to save image: {:#}", err),
            }
        }
        None => {}
    }
}

fn handle_redraw(
    simulation: &Simulation<WgpuResources>,
    renderer: &mut Renderer,
    gpu: &GpuContext,
    window: &Window,
    elwt: &EventLoopWindowTarget<()>,
) {
    let frame = build_frame(simulation, simulation.camera());
    match renderer.render(gpu, simulation.resources(), &frame) {
        Ok(()) => {}
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            renderer.resize(gpu, window.inner_size());
        }
        Err(wgpu::SurfaceError::OutOfMemory) => {
            log::error!("Surface out of memory, exiting");
            elwt.exit();
        }
        Err(err) => log::warn!("Render error: {:?}", err),
    }
}
