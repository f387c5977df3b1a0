// =============================================================================
// EMBERLIGHT - application entry point
// =============================================================================
//
// Opens a window and hands it to a render thread. The render thread owns the
// Vulkan renderer for its whole lifetime; the main thread only runs the
// event loop and asks the worker to stop on exit.
//
// =============================================================================

use anyhow::Result;
use emberlight::{Config, Diagnostics, LogDiagnostics, RenderThread, Renderer};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes},
};

fn main() -> Result<()> {
    let config = Config::load();

    init_logging(&config);
    log::info!("Starting {}", config.window.title);
    log::info!("Window: {}x{}", config.window.width, config.window.height);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}

/// RUST_LOG takes precedence over the configured level
fn init_logging(config: &Config) {
    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_default_env()
        .init();
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Field order matters for Drop: the render thread (and with it the surface)
/// must be gone before the window.
struct App {
    config: Config,
    diagnostics: Arc<dyn Diagnostics>,
    render_thread: Option<RenderThread>,
    window: Option<Arc<Window>>,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            config,
            diagnostics: Arc::new(LogDiagnostics),
            render_thread: None,
            window: None,
        }
    }

    fn start_renderer(&mut self, window: Arc<Window>) -> Result<()> {
        let config = self.config.clone();
        let diagnostics = self.diagnostics.clone();
        let render_window = window.clone();

        let thread = RenderThread::spawn("render", move || {
            Renderer::new(&*render_window, &config, diagnostics)
        })?;

        self.render_thread = Some(thread);
        self.window = Some(window);
        Ok(())
    }

    fn stop_renderer(&mut self) {
        if let Some(mut thread) = self.render_thread.take() {
            if let Err(e) = thread.shutdown() {
                log::error!("{:#}", e);
            }
        }
    }
}

// =============================================================================
// EVENT HANDLING
// =============================================================================

impl ApplicationHandler for App {
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
            .with_resizable(false);

        let window = match event_loop.create_window(window_attributes) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {:?}", e);
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.start_renderer(window) {
            log::error!("Failed to initialize Vulkan: {:#}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down...");
                self.stop_renderer();
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                use winit::keyboard::{KeyCode, PhysicalKey};

                if event.state.is_pressed()
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                {
                    log::info!("ESC pressed, exiting...");
                    self.stop_renderer();
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.stop_renderer();
    }
}
