//! Frame driver and application event loop.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and the [`GpuBackend`], then issues every
//!    manifest load on the async runtime
//! 2. each finished load comes back as a [`TableauEvent::Loaded`] user event
//!    and is placed into the scene graph on the event loop thread
//! 3. each `RedrawRequested` runs one [`FrameDriver::tick`] and requests the
//!    next redraw, so the loop is paced by the platform and never by a timer
//! 4. closing the window stops the driver and tears the scene down
//!
//! The driver never awaits a load: a tick draws whatever is in the scene
//! graph at that moment.

use std::{fmt::Debug, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    config::Config,
    context::Context,
    gpu::GpuBackend,
    params::{ParamEdit, Params},
    render::RenderBackend,
    resources::{
        FileMeshLoader,
        coordinator::{CompletionFuture, LoadCompletion},
    },
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Source of the time a tick is evaluated at.
pub trait Clock {
    /// Milliseconds since the session started.
    fn now_millis(&self) -> f64;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Advances camera, rendering and particles exactly once per tick.
#[derive(Debug)]
pub struct FrameDriver<C: Clock = SystemClock> {
    clock: C,
    running: bool,
    ticks: u64,
}

impl<C: Clock> FrameDriver<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            running: true,
            ticks: 0,
        }
    }

    /// Runs one tick: camera orbit, render, particle update.
    ///
    /// Returns `false` once the driver was stopped; the caller should then
    /// stop scheduling frames. A failing render is logged and the tick still
    /// completes.
    pub fn tick<B>(&mut self, ctx: &mut Context, backend: &mut B) -> bool
    where
        B: RenderBackend + ?Sized,
    {
        if !self.running {
            return false;
        }
        let now = self.clock.now_millis();

        ctx.camera
            .orbit(now, &ctx.params.spin, ctx.config.camera.height);

        if let Err(e) = backend.render(&ctx.frame()) {
            log::error!("Unable to render: {:#}", e);
        }

        ctx.particles.update(now, ctx.params.particles.speed);

        self.ticks += 1;
        true
    }

    /// Makes every later tick a no-op.
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Frame driver stopped after {} ticks", self.ticks);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Edit(ParamEdit),
    Reload,
}

/// Maps a pressed key to a parameter step relative to the current values.
pub fn key_action(key: KeyCode, params: &Params) -> Option<KeyAction> {
    let light = params.light;
    let spin = params.spin;
    let particles = params.particles;
    let step_light = |dx: f32, dy: f32, dz: f32| {
        ParamEdit::LightPosition(light.position + cgmath::Vector3::new(dx, dy, dz))
    };
    let edit = match key {
        KeyCode::ArrowRight => ParamEdit::SpinSpeed(spin.speed + 100.0),
        KeyCode::ArrowLeft => ParamEdit::SpinSpeed(spin.speed - 100.0),
        KeyCode::ArrowUp => ParamEdit::SpinDistance(spin.distance + 1.0),
        KeyCode::ArrowDown => ParamEdit::SpinDistance(spin.distance - 1.0),
        KeyCode::Equal | KeyCode::NumpadAdd => {
            ParamEdit::ParticleCount(particles.count.saturating_add(100))
        }
        KeyCode::Minus | KeyCode::NumpadSubtract => {
            ParamEdit::ParticleCount(particles.count.saturating_sub(100))
        }
        KeyCode::BracketRight => ParamEdit::ParticleSize(particles.size + 0.01),
        KeyCode::BracketLeft => ParamEdit::ParticleSize(particles.size - 0.01),
        KeyCode::Period => ParamEdit::ParticleSpeed(particles.speed + 0.25),
        KeyCode::Comma => ParamEdit::ParticleSpeed(particles.speed - 0.25),
        KeyCode::KeyI => ParamEdit::LightIntensity(light.intensity + 25.0),
        KeyCode::KeyK => ParamEdit::LightIntensity(light.intensity - 25.0),
        KeyCode::KeyU => ParamEdit::LightAngle(light.angle + 0.05),
        KeyCode::KeyJ => ParamEdit::LightAngle(light.angle - 0.05),
        KeyCode::KeyO => ParamEdit::LightPenumbra(light.penumbra + 0.05),
        KeyCode::KeyL => ParamEdit::LightPenumbra(light.penumbra - 0.05),
        KeyCode::KeyD => step_light(1.0, 0.0, 0.0),
        KeyCode::KeyA => step_light(-1.0, 0.0, 0.0),
        KeyCode::KeyE => step_light(0.0, 1.0, 0.0),
        KeyCode::KeyQ => step_light(0.0, -1.0, 0.0),
        KeyCode::KeyS => step_light(0.0, 0.0, 1.0),
        KeyCode::KeyW => step_light(0.0, 0.0, -1.0),
        KeyCode::KeyR => return Some(KeyAction::Reload),
        _ => return None,
    };
    Some(KeyAction::Edit(edit))
}

pub enum TableauEvent {
    /// The backend finished its async setup (web only, native setup blocks).
    #[cfg(target_arch = "wasm32")]
    Initialized(Box<GpuBackend>),
    Loaded(LoadCompletion),
}

impl Debug for TableauEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::Loaded(completion) => f
                .debug_struct("Loaded")
                .field("slot", &completion.slot)
                .field("epoch", &completion.epoch)
                .field("ok", &completion.result.is_ok())
                .finish(),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<TableauEvent>,
    ctx: Context,
    loader: FileMeshLoader,
    driver: FrameDriver<SystemClock>,
    backend: Option<GpuBackend>,
    window_requested: bool,
}

impl App {
    pub fn new(event_loop: &EventLoop<TableauEvent>, config: Config) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        let loader = FileMeshLoader::new(config.assets_root.clone());
        let ctx = Context::with_defaults(config, 1, 1)?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            ctx,
            loader,
            driver: FrameDriver::new(SystemClock::new()),
            backend: None,
            window_requested: false,
        })
    }

    /// Hands every future to the async runtime; completions come back as user events.
    fn spawn_loads(&self, requests: Vec<CompletionFuture>) {
        for request in requests {
            let proxy = self.proxy.clone();
            let fut = async move {
                let completion = request.await;
                if proxy.send_event(TableauEvent::Loaded(completion)).is_err() {
                    log::warn!("Event loop closed before a load completed");
                }
            };
            #[cfg(not(target_arch = "wasm32"))]
            self.async_runtime.spawn(fut);
            #[cfg(target_arch = "wasm32")]
            wasm_bindgen_futures::spawn_local(fut);
        }
    }

    fn on_backend_ready(&mut self, mut backend: GpuBackend) {
        let size = backend.window().inner_size();
        backend.resize(size.width, size.height);
        self.ctx.resize(size.width, size.height);
        backend.window().request_redraw();
        self.backend = Some(backend);

        self.spawn_loads(self.ctx.requests(&self.loader));
        log::info!("Issued {} asset loads", self.ctx.loads().len());
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.driver.stop();
        self.ctx.teardown();
        event_loop.exit();
    }
}

impl ApplicationHandler<TableauEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window_requested {
            return;
        }
        self.window_requested = true;

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("tableau");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(GpuBackend::new(window)) {
                Ok(backend) => self.on_backend_ready(backend),
                Err(e) => {
                    log::error!("App initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match GpuBackend::new(window).await {
                    Ok(backend) => {
                        if proxy
                            .send_event(TableauEvent::Initialized(Box::new(backend)))
                            .is_err()
                        {
                            log::error!("Event loop closed during initialization");
                        }
                    }
                    Err(e) => log::error!("App initialization failed: {:#}", e),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: TableauEvent) {
        match event {
            #[cfg(target_arch = "wasm32")]
            TableauEvent::Initialized(backend) => self.on_backend_ready(*backend),
            TableauEvent::Loaded(completion) => self.ctx.complete(completion),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                self.ctx.resize(size.width, size.height);
                backend.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if self.driver.tick(&mut self.ctx, backend) {
                    backend.window().request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                match key_action(code, &self.ctx.params) {
                    Some(KeyAction::Edit(edit)) => {
                        let change = self.ctx.apply(edit);
                        log::debug!("{:?} -> {:?}", edit, change);
                    }
                    Some(KeyAction::Reload) => {
                        let requests = self.ctx.reload(&self.loader);
                        self.spawn_loads(requests);
                    }
                    None => {}
                }
            }
            _ => {}
        }
    }
}

/// Opens a window and runs the default tableau until it is closed.
pub fn run(config: Config) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<TableauEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    run(Config::default()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
