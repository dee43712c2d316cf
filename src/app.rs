use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::Instant;
use crate::app_state::State;
use crate::config::Config;

struct App {
    config: Config,
    state: Option<State>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window_attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(self.config.window.width, self.config.window.height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => window,
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        #[cfg(target_arch = "wasm32")]
        attach_canvas(&window);

        match pollster::block_on(State::new(Arc::new(window), &self.config)) {
            Ok(state) => {
                state.window().request_redraw();
                self.state = Some(state);
            }
            Err(err) => {
                log::error!("{err:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };
        if window_id != state.window().id() {
            return;
        }
        if state.input(&event) {
            state.window().request_redraw();
            return;
        }
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(physical_size) => {
                log::info!("WindowEvent::Resized: {}x{}", physical_size.width, physical_size.height);
                state.resize(physical_size);
                state.window().request_redraw();
            }
            WindowEvent::RedrawRequested => {
                state.update();
                match state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        log::warn!("surface lost, reconfiguring");
                        state.resize(state.size);
                        state.window().request_redraw();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("out of GPU memory");
                        event_loop.exit();
                    }
                    Err(e) => log::warn!("{e:?}"),
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &mut self.state else {
            return;
        };
        if state.board.laser.is_animating() {
            state.window().request_redraw();
        }
        if state.board.tick_caret(Instant::now()) {
            state.window().request_redraw();
        }
        match state.board.next_caret_blink() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            state.board.laser.cancel();
        }
        log::info!("exiting");
    }
}

#[cfg(target_arch = "wasm32")]
fn attach_canvas(window: &Window) {
    use winit::dpi::PhysicalSize;
    use winit::platform::web::WindowExtWebSys;

    let Some(canvas) = window.canvas() else {
        log::error!("window has no canvas");
        return;
    };
    let Some(web_window) = web_sys::window() else {
        return;
    };
    let attached = web_window
        .document()
        .and_then(|doc| {
            let dst = doc
                .get_element_by_id("scribble")
                .or_else(|| doc.body().map(web_sys::Element::from))?;
            dst.append_child(&canvas).ok()
        })
        .is_some();
    if !attached {
        log::error!("couldn't append canvas to document");
    }

    let style = canvas.style();
    for (property, value) in [("width", "100vw"), ("height", "100vh"), ("display", "block")] {
        if style.set_property(property, value).is_err() {
            log::warn!("couldn't set canvas {property}");
        }
    }

    let ratio = web_window.device_pixel_ratio();
    let css_width = web_window.inner_width().ok().and_then(|w| w.as_f64());
    let css_height = web_window.inner_height().ok().and_then(|h| h.as_f64());
    if let (Some(w), Some(h)) = (css_width, css_height) {
        let size = PhysicalSize::new((w * ratio) as u32, (h * ratio) as u32);
        log::info!("canvas size {}x{} (DPR {ratio})", size.width, size.height);
        let _ = window.request_inner_size(size);
    }
}

pub fn run(config: Config) -> anyhow::Result<()> {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            console_log::init_with_level(log::Level::Info)?;
        } else {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("scribble=info"))
                .init();
        }
    }

    log::info!("starting {}", config.window.title);
    let event_loop = EventLoop::new()?;
    let mut app = App {
        config,
        state: None,
    };

    event_loop.run_app(&mut app)?;
    Ok(())
}
