//! Flappy entry point
//!
//! In the browser the game draws to `#canvas` through WebGPU. Natively there
//! is no window: the autopilot plays a session against the headless backend
//! and the run is summarized on exit.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{FocusEvent, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use flappy::platform::{FrameClock, InputState};
    use flappy::renderer::{RenderError, WgpuRenderer};
    use flappy::{Game, Settings, Tuning};

    #[derive(Debug, thiserror::Error)]
    enum StartError {
        #[error("{0}")]
        Render(#[from] RenderError),
        #[error("page is missing {0}")]
        Dom(&'static str),
    }

    /// Everything the browser callbacks share
    struct App {
        game: Option<Game<WgpuRenderer>>,
        canvas: HtmlCanvasElement,
        input: InputState,
        clock: Option<FrameClock>,
        start_time: f64,
        settings: Settings,
        fullscreen_requested: bool,
    }

    impl App {
        /// Fullscreen needs a user gesture, so it is requested on the first flap
        fn on_flap_gesture(&mut self) {
            if self.settings.fullscreen && !self.fullscreen_requested {
                self.fullscreen_requested = true;
                if let Err(e) = self.canvas.request_fullscreen() {
                    log::warn!("Fullscreen request failed: {:?}", e);
                }
            }
        }

        /// Run one frame; returns false once the loop should stop
        fn frame(&mut self, time_ms: f64) -> bool {
            let now = time_ms / 1000.0;
            let clock = self.clock.get_or_insert_with(|| FrameClock::new(now));
            let timing = clock.tick(now);
            if self.settings.show_fps {
                if let Some(report) = timing.fps {
                    log::info!("{}", report);
                }
            }

            let input = self.input.sample();
            if input.quit_requested {
                self.shutdown();
                return false;
            }

            let Some(game) = self.game.as_mut() else {
                return false;
            };
            let size = game.backend().size;
            let elapsed = (now - self.start_time) as f32;

            match game.frame(&input, timing.delta, size, elapsed) {
                Ok(_) => true,
                Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                    game.backend_mut().resize(size.0, size.1);
                    true
                }
                Err(RenderError::Surface(wgpu::SurfaceError::Timeout)) => {
                    log::warn!("Surface timeout, skipping frame");
                    true
                }
                Err(e) => {
                    log::error!("Render error: {}", e);
                    self.shutdown();
                    false
                }
            }
        }

        fn shutdown(&mut self) {
            if let Some(game) = self.game.take() {
                let score = game.state().score;
                drop(game.end());
                log::info!("Stopped (last score {})", score);
            }
            self.settings.save();
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {e}").into());
        }

        log::info!("Flappy starting...");

        if let Err(e) = start().await {
            log::error!("Startup failed: {}", e);
        }
    }

    async fn start() -> Result<(), StartError> {
        let window = web_sys::window().ok_or(StartError::Dom("window"))?;
        let document = window.document().ok_or(StartError::Dom("document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or(StartError::Dom("#canvas"))?
            .dyn_into()
            .map_err(|_| StartError::Dom("a <canvas> with id canvas"))?;

        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(RenderError::from)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(RenderError::from)?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let renderer =
            WgpuRenderer::new(surface, &adapter, width, height, settings.present_mode()).await?;

        let seed = js_sys::Date::now() as u64;
        let game = Game::start(renderer, seed, Tuning::default())?;

        let app = Rc::new(RefCell::new(App {
            game: Some(game),
            canvas: canvas.clone(),
            input: InputState::new(),
            clock: None,
            start_time: window.performance().map(|p| p.now() / 1000.0).unwrap_or(0.0),
            settings,
            fullscreen_requested: false,
        }));

        setup_input_handlers(&window, &canvas, app.clone());
        request_animation_frame(app);

        log::info!("Flappy running!");
        Ok(())
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        app: Rc<RefCell<App>>,
    ) {
        // Keyboard
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                let key = event.key();
                if a.input.key_down(&key) {
                    event.prevent_default();
                    if a.input.sample().flap_pressed {
                        a.on_flap_gesture();
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if app.borrow_mut().input.key_up(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse / touch / pen
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                a.input.pointer_down();
                a.on_flap_gesture();
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                app.borrow_mut().input.pointer_up();
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key-up never arrives once focus is gone
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: FocusEvent| {
                app.borrow_mut().input.blur();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        let keep_running = app.borrow_mut().frame(time);
        if keep_running {
            request_animation_frame(app);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::process::ExitCode;
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

    use clap::Parser;

    use flappy::platform::FrameClock;
    use flappy::renderer::{HeadlessBackend, RenderError};
    use flappy::sim::{GameEvent, autopilot_input};
    use flappy::tuning::TuningError;
    use flappy::{Game, Settings, Tuning};

    /// Simulated frame length when not pacing to real time
    const FRAME_SECONDS: f64 = 1.0 / 60.0;

    #[derive(Parser, Debug)]
    #[command(name = "flappy")]
    #[command(about = "Headless Flappy session driven by the autopilot")]
    struct Cli {
        /// Use the fullscreen surface size (1920x1080)
        #[arg(short, long)]
        fullscreen: bool,
        /// Pace frames to 60 Hz in real time
        #[arg(short, long)]
        vsync: bool,
        /// Pipe field seed (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,
        /// Number of frames to run
        #[arg(long, default_value_t = 3_600)]
        frames: u64,
        /// JSON file overriding the default game balance
        #[arg(long)]
        tuning: Option<PathBuf>,
    }

    #[derive(Debug, thiserror::Error)]
    enum RunError {
        #[error("tuning: {0}")]
        Tuning(#[from] TuningError),
        #[error("renderer: {0}")]
        Render(#[from] RenderError),
    }

    #[derive(Debug, Default)]
    struct Summary {
        frames: u64,
        flaps: u64,
        crashes: u64,
        best_score: u64,
    }

    fn time_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }

    fn session(cli: &Cli) -> Result<Summary, RunError> {
        let tuning = match &cli.tuning {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };
        tuning.validate()?;

        let settings = Settings {
            fullscreen: cli.fullscreen,
            vsync: cli.vsync,
            ..Default::default()
        };
        let seed = cli.seed.unwrap_or_else(time_seed);
        log::info!(
            "Seed {}, surface {:?}, present mode {:?}",
            seed,
            settings.surface_size(),
            settings.present_mode()
        );

        let mut game = Game::start(HeadlessBackend::new(), seed, tuning)?;
        let mut summary = Summary::default();

        let wall_start = Instant::now();
        let mut clock = FrameClock::new(0.0);
        let mut sim_time = 0.0;

        for frame in 0..cli.frames {
            let now = if settings.vsync {
                let target = Duration::from_secs_f64(frame as f64 * FRAME_SECONDS);
                if let Some(wait) = target.checked_sub(wall_start.elapsed()) {
                    std::thread::sleep(wait);
                }
                wall_start.elapsed().as_secs_f64()
            } else {
                sim_time += FRAME_SECONDS;
                sim_time
            };
            let timing = clock.tick(now);
            if settings.show_fps {
                if let Some(report) = timing.fps {
                    log::info!("{}", report);
                }
            }

            let input = autopilot_input(game.state());
            if input.quit_requested {
                break;
            }

            for event in game.frame(&input, timing.delta, settings.surface_size(), now as f32)? {
                match event {
                    GameEvent::Flapped => summary.flaps += 1,
                    GameEvent::Crashed { score } => {
                        summary.crashes += 1;
                        summary.best_score = summary.best_score.max(score);
                    }
                    GameEvent::Scored { score } => {
                        summary.best_score = summary.best_score.max(score);
                    }
                    GameEvent::Reset | GameEvent::Started => {}
                }
            }
        }

        let backend = game.end();
        summary.frames = backend.frames;
        Ok(summary)
    }

    pub fn run() -> ExitCode {
        env_logger::init();
        let cli = Cli::parse();
        log::info!("Flappy (native, headless) starting...");

        match session(&cli) {
            Ok(summary) => {
                println!("Session complete.");
                println!("  Frames:      {}", summary.frames);
                println!("  Flaps:       {}", summary.flaps);
                println!("  Crashes:     {}", summary.crashes);
                println!("  Best score:  {}", summary.best_score);
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("{}", e);
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
