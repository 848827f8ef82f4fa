// =============================================================================
// UNICRAFT - Vulkan backend bootstrap
// =============================================================================
//
// Opens a window and brings up the rendering backend against it:
//
// ┌─────────────────────────────────────────────────────────────────┐
// │  winit window (Surface Provider)                                │
// │    └── Backend                                                  │
// │          ├── Instance (+ validation layers, debug messenger)    │
// │          ├── Surface                                            │
// │          ├── Physical device -> Logical device + queues         │
// │          └── Swapchain + image views                            │
// └─────────────────────────────────────────────────────────────────┘
//
// No frames are drawn yet. The event loop only waits for close/Escape,
// then everything is released in reverse order.
//
// =============================================================================

use anyhow::{Context, Result};
use ash::vk;
use std::fs::File;
use std::sync::Arc;
use unicraft::backend::shader::ShaderPair;
use unicraft::{Backend, Config};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    let config = Config::load();

    init_logging(&config)?;
    log::info!("Starting unicraft");
    log::info!(
        "Window: {}x{} ({})",
        config.window.width,
        config.window.height,
        if config.window.resizable { "resizable" } else { "fixed size" }
    );

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).context("Event loop error")?;

    if let Some(err) = app.fatal.take() {
        return Err(err);
    }
    Ok(())
}

/// Initialize logging: config filter first, RUST_LOG on top, optional file pipe
fn init_logging(config: &Config) -> Result<()> {
    use env_logger::{Builder, Target};

    let mut builder = Builder::new();
    builder.parse_filters(&config.debug.log_level);
    if std::env::var_os("RUST_LOG").is_some() {
        builder.parse_env("RUST_LOG");
    }

    if let Some(path) = &config.debug.log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file: {:?}", path))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// IMPORTANT: Field order matters for Drop! Shader modules go before the
/// backend (they belong to its device), the backend before the window
/// (the surface borrows the native window).
struct App {
    shaders: Option<ShaderPair>,
    backend: Option<Backend>,
    window: Option<Arc<Window>>,
    config: Config,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            shaders: None,
            backend: None,
            window: None,
            config,
            fatal: None,
        }
    }

    fn init_backend(&mut self, window: &Window) -> Result<()> {
        let backend = Backend::new(window, self.config.swapchain_preferences())
            .context("Failed to initialize Vulkan backend")?;

        if let Some(swapchain) = backend.swapchain() {
            log::info!(
                "Swapchain ready: {} images, {:?}/{:?}, {:?}, {}x{}",
                swapchain.images.len(),
                swapchain.format,
                swapchain.color_space,
                swapchain.present_mode,
                swapchain.extent.width,
                swapchain.extent.height
            );
        }

        // ─────────────────────────────────────────────────────────────────────
        // Shaders are optional until the pipeline exists
        // ─────────────────────────────────────────────────────────────────────
        let shaders = &self.config.shaders;
        if shaders.vertex.exists() && shaders.fragment.exists() {
            let pair = ShaderPair::load(backend.device(), &shaders.vertex, &shaders.fragment)
                .context("Failed to load shaders")?;
            self.shaders = Some(pair);
        } else {
            log::warn!(
                "Shaders not found ({:?}, {:?}), compile them with glslc",
                shaders.vertex,
                shaders.fragment
            );
        }

        self.backend = Some(backend);
        Ok(())
    }

    fn rebuild_swapchain(&mut self, width: u32, height: u32) -> Result<()> {
        let Some(backend) = self.backend.as_mut() else {
            return Ok(());
        };
        if let Some(current) = backend.swapchain() {
            if current.extent.width == width && current.extent.height == height {
                return Ok(());
            }
        }

        backend
            .rebuild_swapchain(vk::Extent2D { width, height })
            .context("Failed to rebuild swapchain")
    }

    fn shutdown(&mut self) {
        self.shaders = None;
        if let Some(mut backend) = self.backend.take() {
            let order = backend.teardown();
            log::debug!("Release order: {:?}", order.released());
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{:#}", err);
        self.fatal = Some(err);
        event_loop.exit();
    }
}

// =============================================================================
// EVENT HANDLING
// =============================================================================

impl ApplicationHandler for App {
    /// Called when the application is ready to create windows.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = WindowAttributes::default()
            .with_title(&self.config.window.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ))
            .with_resizable(self.config.window.resizable);

        let window = match event_loop.create_window(window_attributes) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("Failed to create window"));
                return;
            }
        };

        if let Err(e) = self.init_backend(&window) {
            self.window = Some(window);
            self.fail(event_loop, e);
            return;
        }

        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            // ─────────────────────────────────────────────────────────────────
            // CLOSE REQUEST
            // ─────────────────────────────────────────────────────────────────
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down...");
                event_loop.exit();
            }

            // ─────────────────────────────────────────────────────────────────
            // WINDOW RESIZED (only reachable with resizable = true)
            // ─────────────────────────────────────────────────────────────────
            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    log::debug!("Window minimized, keeping current swapchain");
                    return;
                }
                if let Err(e) = self.rebuild_swapchain(size.width, size.height) {
                    self.fail(event_loop, e);
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // KEYBOARD INPUT
            // ─────────────────────────────────────────────────────────────────
            WindowEvent::KeyboardInput { event, .. } => {
                use winit::keyboard::{KeyCode, PhysicalKey};

                if event.state.is_pressed()
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                {
                    log::info!("ESC pressed, exiting...");
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

// =============================================================================
// CLEANUP
// =============================================================================

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}
