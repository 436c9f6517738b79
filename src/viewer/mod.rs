//! Desktop window that plays the map widget.
//!
//! [`run`] opens a window showing a [`MapView`] and forwards every resize,
//! drag and scroll to a [`Controller`] as a viewport change, exactly as a
//! web map would report `resize`, `move` and `zoom`. Frames are paced by a
//! [`RedrawScheduler`] at the configured frame rate.
//!
//! Controls: drag with the left mouse button to pan, scroll to zoom, `Space`
//! to pause or resume the overlay, `Escape` to quit.

mod gpu;
mod map;
mod redraw;

pub use gpu::{MapStyle, Presenter, OVERLAY_SHADER};
pub use map::MapView;
pub use redraw::RedrawScheduler;

use std::sync::Arc;
use std::time::Instant;

use glam::DVec2;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::config::RendererConfig;
use crate::controller::Controller;
use crate::error::ViewerError;
use crate::grid::VectorGrid;

/// Open the viewer and block until the window closes.
pub fn run(grid: Arc<VectorGrid>, config: RendererConfig, map: MapView) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let scheduler = RedrawScheduler::new(config.frame_rate);
    let mut app = App {
        controller: Controller::new(grid, config, scheduler),
        map,
        window: None,
        presenter: None,
        drag_from: None,
        cursor: DVec2::ZERO,
        paused: false,
        error: None,
    };
    event_loop.run_app(&mut app)?;
    app.error.map_or(Ok(()), Err)
}

struct App {
    controller: Controller<RedrawScheduler>,
    map: MapView,
    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    drag_from: Option<DVec2>,
    cursor: DVec2,
    paused: bool,
    error: Option<ViewerError>,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window_attrs = Window::default_attributes()
            .with_title("windtrail")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let presenter = pollster::block_on(Presenter::new(window.clone(), MapStyle::default()))?;
        let size = window.inner_size();
        self.map.resize(size.width, size.height);
        self.window = Some(window);
        self.presenter = Some(presenter);
        self.map_changed();
        Ok(())
    }

    /// Report the map state to the controller, as a map `move`/`zoom` would.
    fn map_changed(&mut self) {
        if let Some(presenter) = &mut self.presenter {
            presenter.set_view(self.map.bounds());
        }
        if !self.paused {
            // Invalid snapshots are logged and skipped by the controller.
            let _ = self.controller.on_viewport_change(&self.map.snapshot());
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if self.paused {
            log::info!("overlay paused");
            self.controller.stop();
        } else {
            log::info!("overlay resumed");
        }
        self.map_changed();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(token) = self.controller.scheduler_mut().take_due(Instant::now()) {
            self.controller.on_frame(token);
        }
        let Some(presenter) = &mut self.presenter else {
            return;
        };
        presenter.upload(self.controller.canvas());
        match presenter.render() {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = winit::dpi::PhysicalSize {
                    width: presenter.config.width,
                    height: presenter.config.height,
                };
                presenter.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("viewer start-up failed: {}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.controller.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(presenter) = &mut self.presenter {
                    presenter.resize(physical_size);
                }
                self.map.resize(physical_size.width, physical_size.height);
                self.map_changed();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.drag_from = (state == ElementState::Pressed).then_some(self.cursor);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = DVec2::new(position.x, position.y);
                if let Some(from) = self.drag_from {
                    self.map.pan_pixels(self.cursor - from);
                    self.drag_from = Some(self.cursor);
                    self.map_changed();
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y as f64 * 0.5,
                    MouseScrollDelta::PixelDelta(pos) => pos.y * 0.01,
                };
                self.map.zoom_at(steps, self.cursor);
                self.map_changed();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match logical_key {
                Key::Named(NamedKey::Escape) => {
                    self.controller.stop();
                    event_loop.exit();
                }
                Key::Named(NamedKey::Space) => self.toggle_pause(),
                _ => {}
            },
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        match self.controller.scheduler().deadline() {
            Some(deadline) if deadline <= Instant::now() => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
                event_loop.set_control_flow(ControlFlow::Wait);
            }
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
