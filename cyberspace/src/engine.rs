use std::time::{Duration, Instant};

use anyhow::Result;
use winit::{
    dpi::{PhysicalSize, Size},
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    audio::AudioSystem,
    input::InputState,
    math::Vec2,
    render::Renderer,
    scene::SceneContext,
};

/// Most simulated time a single frame may catch up on.
const MAX_FRAME_CATCH_UP: Duration = Duration::from_millis(250);

/// Configuration values for the engine window and runtime behavior.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Directory holding `sounds/`.
    pub asset_root: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "Lost in Cyberspace".into(),
            width: 1280,
            height: 720,
            vsync: true,
            asset_root: "assets".into(),
        }
    }
}

/// Opens the window and drives a [`Game`] with a fixed physics timestep.
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Window size in physical pixels. The window is not resizable.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    #[must_use]
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.config.vsync = vsync;
        self
    }

    #[must_use]
    pub fn with_asset_root(mut self, root: impl Into<String>) -> Self {
        self.config.asset_root = root.into();
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the provided game until the window is closed or the game requests exit.
    pub fn run<G: Game + 'static>(self, mut game: G) -> Result<()> {
        let config = self.config;

        let event_loop = EventLoop::new()?;
        let mut window_attributes = Window::default_attributes();
        window_attributes.title = config.title.clone();
        window_attributes.inner_size =
            Some(Size::Physical(PhysicalSize::new(config.width, config.height)));
        window_attributes.resizable = false;
        let window = event_loop.create_window(window_attributes)?;

        // The renderer borrows the window for the rest of the process.
        let window: &'static Window = Box::leak(Box::new(window));

        let mut ctx = EngineContext::new(window, &config)?;
        game.init(&mut ctx)?;
        log::info!("engine started: {}x{}", config.width, config.height);

        let mut last_frame = Instant::now();
        event_loop.run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => {
                ctx.handle_window_event(&event);

                match event {
                    WindowEvent::CloseRequested => {
                        elwt.exit();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if is_escape_pressed(&event) {
                            elwt.exit();
                        }
                    }
                    WindowEvent::Resized(new_size) => {
                        ctx.resize_renderer(new_size);
                    }
                    WindowEvent::RedrawRequested => {
                        if let Err(err) = game.draw(&mut ctx) {
                            log::error!("error during draw: {err:?}");
                            elwt.exit();
                            return;
                        }

                        if ctx.exit_requested {
                            elwt.exit();
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                let now = Instant::now();
                ctx.update_time(now - last_frame);
                last_frame = now;

                if let Err(err) = game.update(&mut ctx) {
                    log::error!("error during update: {err:?}");
                    elwt.exit();
                    return;
                }

                if ctx.exit_requested {
                    elwt.exit();
                    return;
                }

                ctx.window.request_redraw();
            }
            _ => {}
        })?;

        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn is_escape_pressed(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed
        && matches!(event.physical_key, PhysicalKey::Code(KeyCode::Escape))
}

/// Shared context provided to game code each frame.
pub struct EngineContext<'window> {
    window: &'window Window,
    delta_time: Duration,
    elapsed_time: Duration,
    fixed_delta_time: Duration,
    fixed_time_accumulator: Duration,
    exit_requested: bool,
    screen: Vec2,
    input: InputState,
    renderer: Renderer<'window>,
    audio: AudioSystem,
}

impl<'window> EngineContext<'window> {
    fn new(window: &'window Window, config: &EngineConfig) -> Result<Self> {
        let renderer = Renderer::new(window, config.vsync)?;
        // A missing audio device only makes the game silent.
        let audio = AudioSystem::new().with_game_sounds(&config.asset_root);

        Ok(Self {
            window,
            delta_time: Duration::ZERO,
            elapsed_time: Duration::ZERO,
            fixed_delta_time: Duration::from_secs_f64(1.0 / 60.0),
            fixed_time_accumulator: Duration::ZERO,
            exit_requested: false,
            screen: Vec2::new(config.width as f32, config.height as f32),
            input: InputState::new(),
            renderer,
            audio,
        })
    }

    fn update_time(&mut self, delta: Duration) {
        self.delta_time = delta;
        self.elapsed_time += delta;
        self.fixed_time_accumulator = (self.fixed_time_accumulator + delta).min(MAX_FRAME_CATCH_UP);
    }

    fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => self.input.handle_key(event),
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.handle_mouse_button(*button, *state)
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.handle_cursor_moved(position.x, position.y)
            }
            _ => {}
        }
    }

    fn resize_renderer(&mut self, new_size: PhysicalSize<u32>) {
        self.renderer.resize(new_size);
    }

    /// Duration between the current and previous frames.
    pub fn delta_time(&self) -> Duration {
        self.delta_time
    }

    /// Total time elapsed since the engine started running.
    pub fn elapsed_time(&self) -> Duration {
        self.elapsed_time
    }

    /// Fixed timestep duration (1/60 second).
    pub fn fixed_delta_time(&self) -> Duration {
        self.fixed_delta_time
    }

    /// Consumes one fixed step from the accumulator if enough time has built up.
    ///
    /// Call in a loop until it returns `false`.
    pub fn should_run_fixed_update(&mut self) -> bool {
        if self.fixed_time_accumulator >= self.fixed_delta_time {
            self.fixed_time_accumulator -= self.fixed_delta_time;
            true
        } else {
            false
        }
    }

    /// Borrows what a scene needs for one fixed step.
    pub fn scene_context(&mut self) -> SceneContext<'_> {
        SceneContext {
            input: &self.input,
            sounds: &mut self.audio,
            dt: self.fixed_delta_time.as_secs_f32(),
            screen: self.screen,
        }
    }

    /// Drops this frame's pressed/released flags once a step has seen them.
    pub fn consume_input(&mut self) {
        self.input.begin_frame();
    }

    pub fn window(&self) -> &Window {
        self.window
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Request that the engine exit after the current frame.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn renderer(&mut self) -> &mut Renderer<'window> {
        &mut self.renderer
    }

    pub fn audio(&mut self) -> &mut AudioSystem {
        &mut self.audio
    }
}

/// Trait implemented by user code to hook into the engine lifecycle.
pub trait Game {
    /// Called once after the window is created but before the first frame.
    fn init(&mut self, _ctx: &mut EngineContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Update game state. Called once per frame before drawing.
    fn update(&mut self, ctx: &mut EngineContext<'_>) -> Result<()>;

    /// Draw the current frame. Called after update when a redraw is requested.
    fn draw(&mut self, ctx: &mut EngineContext<'_>) -> Result<()>;
}
