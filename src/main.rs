use std::any::Any;
use std::env;
use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use glam::{Vec2, Vec3};
use log::{info, warn};
use pollster::block_on;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use winit::dpi::LogicalSize;
use winit::event::{
    ElementState, Event, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use starfield_runtime::{
    CameraParams, InputState, LandingStage, LightParams, Navigator, ObjectKind, PointerButton,
    Renderer, SceneManifest, WorldObject,
};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let manifest = match &options.scene_path {
        Some(path) => {
            let xml = fs::read_to_string(path)
                .with_context(|| format!("failed to read manifest {path}"))?;
            SceneManifest::from_xml(&xml)
                .with_context(|| format!("failed to parse manifest {path}"))?
        }
        None => SceneManifest::built_in(),
    };

    println!(
        "Loaded landing scene: {} links, {} stars",
        manifest.links.len(),
        manifest.starfield.count
    );
    for link in &manifest.links {
        println!(" - {} -> {}", link.name, link.url);
    }

    if options.summary_only {
        run_headless(&manifest, options.frames)
    } else {
        match run_interactive(&manifest) {
            Ok(()) => Ok(()),
            Err(err) => {
                if err.downcast_ref::<WindowInitError>().is_some() {
                    eprintln!(
                        "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
                    );
                    run_headless(&manifest, options.frames)
                } else {
                    Err(err)
                }
            }
        }
    }
}

/// Drives the stage without a window: fixed 16 ms frames plus a scripted
/// scroll sequence, then prints the final state.
fn run_headless(manifest: &SceneManifest, frames: u32) -> Result<()> {
    let mut stage = LandingStage::from_manifest(
        manifest,
        (1280, 720),
        0.0,
        SmallRng::seed_from_u64(0),
    );

    let frames = frames.max(1);
    for frame in 1..=frames {
        if frame == frames / 3 {
            stage.scrolled(-100.0);
        } else if frame == frames * 2 / 3 {
            stage.scrolled(-250.0);
        }
        stage.advance_frame(frame as f32 * 0.016);
    }

    println!("Simulated {frames} frames");
    println!("{}", stage.summary());
    Ok(())
}

fn run_interactive(manifest: &SceneManifest) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop =
        event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Starfield Landing")
            .with_inner_size(LogicalSize::new(1280.0, 720.0))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let renderer = block_on(Renderer::new(Arc::clone(&window)))?;
    let size = window.inner_size();
    let stage = LandingStage::from_manifest(
        manifest,
        (size.width, size.height),
        0.0,
        SmallRng::from_os_rng(),
    );

    let mut app = AppState {
        renderer,
        stage,
        input: InputState::new(),
        navigator: BrowserNavigator,
        started: Instant::now(),
        last_error: None,
    };

    let mut event_loop = event_loop;
    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        if let Err(err) = app.process_event(&event, control_flow) {
            app.last_error = Some(err);
            control_flow.set_exit();
        }
    });

    println!("{}", app.stage.summary());

    if let Some(err) = app.last_error {
        return Err(err);
    }
    Ok(())
}

struct AppState {
    renderer: Renderer,
    stage: LandingStage,
    input: InputState,
    navigator: BrowserNavigator,
    started: Instant,
    last_error: Option<anyhow::Error>,
}

impl AppState {
    fn process_event(&mut self, event: &Event<()>, control_flow: &mut ControlFlow) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        control_flow.set_exit();
                    }
                    WindowEvent::Resized(size) => {
                        self.renderer.resize(*size);
                        self.stage.resized(size.width, size.height);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.renderer.resize(**new_inner_size);
                        self.stage
                            .resized(new_inner_size.width, new_inner_size.height);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let pos = Vec2::new(position.x as f32, position.y as f32);
                        self.input.set_pointer_position(pos);
                        self.stage.pointer_moved(pos);
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        self.handle_mouse_button(*state, *button);
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let lines = match delta {
                            MouseScrollDelta::LineDelta(_, y) => *y,
                            MouseScrollDelta::PixelDelta(position) => position.y as f32 / 40.0,
                        };
                        let offset = self.input.apply_scroll_lines(lines);
                        self.stage.scrolled(offset);
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(window_id) if *window_id == self.renderer.window_id() => {
                let now = self.started.elapsed().as_secs_f32();
                self.stage.advance_frame(now);
                let objects = self.stage.snapshot();
                let camera = CameraParams {
                    view_proj: self.stage.camera().view_proj(),
                    position: self.stage.camera().position,
                };
                let light = light_from_snapshot(&objects);
                self.renderer.update_globals(&camera, &light);
                if let Err(err) = self.renderer.render(&objects) {
                    match err {
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                            let size = self.renderer.window().inner_size();
                            self.renderer.resize(size);
                        }
                        wgpu::SurfaceError::OutOfMemory => {
                            return Err(anyhow!("GPU is out of memory"));
                        }
                        wgpu::SurfaceError::Timeout => {
                            info!("Surface timeout; retrying next frame");
                        }
                    }
                }
            }
            Event::MainEventsCleared => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_mouse_button(&mut self, state: ElementState, button: WinitMouseButton) {
        let index = match button {
            WinitMouseButton::Left => 0,
            WinitMouseButton::Right => 1,
            WinitMouseButton::Middle => 2,
            WinitMouseButton::Other(value) => value,
        } as u8;
        let button = PointerButton::new(index);
        match state {
            ElementState::Pressed => {
                self.input.set_button_down(button);
                if button == PointerButton::PRIMARY {
                    self.stage
                        .pointer_clicked(self.input.pointer_position(), &self.navigator);
                }
            }
            ElementState::Released => self.input.set_button_up(button),
        }
    }
}

/// Opens link destinations in the system browser.
struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &str) {
        if let Err(err) = webbrowser::open(url) {
            warn!("failed to open {url}: {err}");
        }
    }
}

fn light_from_snapshot(objects: &[WorldObject]) -> LightParams {
    objects
        .iter()
        .find(|object| object.kind == ObjectKind::Light)
        .map(|light| LightParams {
            position: light.position,
            color: light.color,
            intensity: light.intensity.max(0.1),
        })
        .unwrap_or(LightParams {
            position: Vec3::new(3.0, 5.0, -3.0),
            color: Vec3::splat(1.0),
            intensity: 1.0,
        })
}

struct CliOptions {
    scene_path: Option<String>,
    frames: u32,
    summary_only: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut scene_path = None;
        let mut frames = 240;
        let mut summary_only = false;
        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--summary-only" => summary_only = true,
                "--frames" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--frames expects a number"))?;
                    frames = value
                        .parse::<u32>()
                        .map_err(|err| anyhow!("invalid --frames value: {err}"))?;
                }
                other if other.starts_with("--") => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Usage: starfield-runtime [scene.xml] [--frames N] [--summary-only]"
                    ));
                }
                other => {
                    if scene_path.replace(other.to_string()).is_some() {
                        return Err(anyhow!("only one scene manifest may be given"));
                    }
                }
            }
        }
        Ok(Self {
            scene_path,
            frames,
            summary_only,
        })
    }
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}
