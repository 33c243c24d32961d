//! Application builder and event loop.
//!
//! [`Plexus`] is the entry point: pick the layers (background field, logo
//! field, trails, starfield), a theme, and whether the particle fields run
//! on the event-loop thread or on workers, then `run()`. Layer configs are
//! derived from the actual window size at startup and again whenever the
//! window resizes, matching how the effect sized itself to its viewport.
//!
//! Runtime keys: `T` toggles the theme (recolors in place and restarts the
//! reveal; simulation state is untouched), `R` restarts the fields from
//! scratch (fresh ramp-up).

use std::sync::Arc;
use std::time::Duration;

use glam::{Mat4, Vec2};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::{FieldConfig, FieldMode, StarfieldConfig, Theme, TrailConfig};
use crate::error::RunError;
use crate::field::{Field, Frame};
use crate::gpu::{GpuState, Layer};
use crate::input::PointerTracker;
use crate::reveal::RevealAnimation;
use crate::rotation::RotationController;
use crate::starfield::{StarInstance, Starfield};
use crate::time::FrameClock;
use crate::trail::TrailField;
use crate::worker::FieldWorker;

/// Worker step interval for off-thread fields.
const WORKER_TICK: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayerRequest {
    Background,
    Logo,
    Trails,
    Starfield,
}

/// Builder for a plexus application.
pub struct Plexus {
    title: String,
    width: u32,
    height: u32,
    theme: Theme,
    offthread: bool,
    requests: Vec<LayerRequest>,
}

impl Plexus {
    pub fn new() -> Self {
        Self {
            title: "plexus".into(),
            width: 1280,
            height: 720,
            theme: Theme::Dark,
            offthread: false,
            requests: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Add the viewport-sized background particle field.
    pub fn with_background_field(mut self) -> Self {
        self.requests.push(LayerRequest::Background);
        self
    }

    /// Add the dense logo particle field with pointer tilt and reveal.
    pub fn with_logo_field(mut self) -> Self {
        self.requests.push(LayerRequest::Logo);
        self
    }

    /// Add a trail field.
    pub fn with_trails(mut self) -> Self {
        self.requests.push(LayerRequest::Trails);
        self
    }

    /// Add the parallax starfield.
    pub fn with_starfield(mut self) -> Self {
        self.requests.push(LayerRequest::Starfield);
        self
    }

    /// Run particle fields on dedicated simulation threads instead of the
    /// event-loop thread.
    pub fn offthread(mut self) -> Self {
        self.offthread = true;
        self
    }

    /// Open the window and run until closed.
    pub fn run(self) -> Result<(), RunError> {
        let event_loop = EventLoop::new()?;
        let mut app = PlexusApp::new(self);
        event_loop.run_app(&mut app)?;
        match app.failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Plexus {
    fn default() -> Self {
        Self::new()
    }
}

/// A particle field running either locally or on a worker thread.
enum FieldDriver {
    Local(Field),
    Offthread {
        worker: FieldWorker,
        last_frame: Frame,
    },
}

enum LayerState {
    Particles { driver: FieldDriver, mode: FieldMode },
    Trails(TrailField),
    Stars(Starfield),
}

/// Geometry staged for one layer this frame, owned until the GPU borrows
/// it for the draw.
enum PreparedLayer {
    Field {
        frame: Frame,
        model: Mat4,
        opacity: f32,
    },
    Stars {
        size: Vec2,
        instances: Vec<StarInstance>,
        rgb: [f32; 3],
    },
}

struct PlexusApp {
    options: Plexus,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    layers: Vec<LayerState>,
    theme: Theme,
    pointer: PointerTracker,
    rotation: RotationController,
    reveal: RevealAnimation,
    clock: FrameClock,
    failure: Option<RunError>,
}

impl PlexusApp {
    fn new(options: Plexus) -> Self {
        let theme = options.theme;
        Self {
            options,
            window: None,
            gpu: None,
            layers: Vec::new(),
            theme,
            pointer: PointerTracker::new(),
            rotation: RotationController::new(),
            reveal: RevealAnimation::new(3),
            clock: FrameClock::new(),
            failure: None,
        }
    }

    /// Build (or rebuild) every requested layer from the current viewport.
    /// Replacing an off-thread driver drops its worker, which joins the old
    /// thread before the new one is created.
    fn build_layers(&mut self, width: f32, height: f32) -> Result<(), RunError> {
        let mut layers = Vec::with_capacity(self.options.requests.len());
        for request in &self.options.requests {
            let layer = match request {
                LayerRequest::Background => {
                    self.particle_layer(FieldConfig::background(width, height))?
                }
                LayerRequest::Logo => self.particle_layer(FieldConfig::logo(width))?,
                LayerRequest::Trails => {
                    let mut field = TrailField::new(TrailConfig::new(width, height))?;
                    field.set_theme(self.theme);
                    LayerState::Trails(field)
                }
                LayerRequest::Starfield => {
                    let mut sf = Starfield::new(StarfieldConfig::new(width));
                    sf.set_theme(self.theme);
                    LayerState::Stars(sf)
                }
            };
            layers.push(layer);
        }
        self.layers = layers;
        self.reveal.restart();
        self.clock.reset();
        Ok(())
    }

    fn particle_layer(&self, config: FieldConfig) -> Result<LayerState, RunError> {
        let mode = config.mode;
        let driver = if self.options.offthread {
            let worker = FieldWorker::spawn(config, WORKER_TICK)?;
            worker.set_theme(self.theme);
            FieldDriver::Offthread {
                worker,
                last_frame: Frame::default(),
            }
        } else {
            let mut field = Field::new(config)?;
            field.set_theme(self.theme);
            FieldDriver::Local(field)
        };
        Ok(LayerState::Particles { driver, mode })
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        for layer in &mut self.layers {
            match layer {
                LayerState::Particles { driver, .. } => match driver {
                    FieldDriver::Local(field) => field.set_theme(self.theme),
                    FieldDriver::Offthread { worker, .. } => worker.set_theme(self.theme),
                },
                LayerState::Trails(field) => field.set_theme(self.theme),
                LayerState::Stars(sf) => sf.set_theme(self.theme),
            }
        }
        self.reveal.restart();
    }

    fn restart(&mut self) {
        let w = self.pointer.window_width();
        let h = self.pointer.window_height();
        if let Err(e) = self.build_layers(w, h) {
            self.failure = Some(e);
        }
    }

    /// Step every layer and stage its geometry for the renderer.
    fn prepare_frame(&mut self, dt: f32) -> Vec<PreparedLayer> {
        self.rotation.step();
        self.reveal.step(dt);

        let viewport_pointer = self.pointer.viewport();
        let center_offset = self.pointer.center_offset().unwrap_or(Vec2::ZERO);

        let mut prepared = Vec::with_capacity(self.layers.len());
        for layer in &mut self.layers {
            match layer {
                LayerState::Particles { driver, mode } => {
                    let is_logo = *mode == FieldMode::Logo;
                    let frame = match driver {
                        FieldDriver::Local(field) => {
                            let pointer = if is_logo {
                                self.pointer.field_space(Vec2::new(
                                    field.config().width,
                                    field.config().height,
                                ))
                            } else {
                                viewport_pointer
                            };
                            field.set_pointer(pointer);
                            field.step(dt);
                            field.frame()
                        }
                        FieldDriver::Offthread { worker, last_frame } => {
                            let pointer = if is_logo {
                                self.pointer.field_space(last_frame.size.max(Vec2::ONE))
                            } else {
                                viewport_pointer
                            };
                            worker.set_pointer(pointer);
                            if let Some(frame) = worker.latest_frame() {
                                *last_frame = frame;
                            }
                            last_frame.clone()
                        }
                    };

                    let (model, opacity) = if is_logo {
                        let center = frame.size * 0.5;
                        let wave = self.reveal.wave(0);
                        let implode = Mat4::from_translation(center.extend(0.0))
                            * Mat4::from_scale(glam::Vec3::splat(wave.scale))
                            * Mat4::from_translation(-center.extend(0.0));
                        (self.rotation.matrix(center) * implode, wave.opacity)
                    } else {
                        (Mat4::IDENTITY, 1.0)
                    };
                    prepared.push(PreparedLayer::Field {
                        frame,
                        model,
                        opacity,
                    });
                }
                LayerState::Trails(field) => {
                    field.set_pointer(viewport_pointer);
                    field.step(dt);
                    prepared.push(PreparedLayer::Field {
                        frame: field.frame(),
                        model: Mat4::IDENTITY,
                        opacity: 1.0,
                    });
                }
                LayerState::Stars(sf) => {
                    sf.set_pointer_offset(center_offset);
                    sf.step();
                    prepared.push(PreparedLayer::Stars {
                        size: sf.size(),
                        instances: sf.instances(),
                        rgb: sf.theme().entity_rgb(FieldMode::Background),
                    });
                }
            }
        }
        prepared
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (_, dt) = self.clock.tick();
        let prepared = self.prepare_frame(dt);

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let layers: Vec<Layer<'_>> = prepared
            .iter()
            .map(|p| match p {
                PreparedLayer::Field {
                    frame,
                    model,
                    opacity,
                } => Layer::Field {
                    frame,
                    model: *model,
                    opacity: *opacity,
                },
                PreparedLayer::Stars {
                    size,
                    instances,
                    rgb,
                } => Layer::Stars {
                    size: *size,
                    instances: instances.as_slice(),
                    rgb: *rgb,
                },
            })
            .collect();

        match gpu.render(self.theme.clear_rgb(), &layers) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => gpu.resize(winit::dpi::PhysicalSize {
                width: gpu.config.width,
                height: gpu.config.height,
            }),
            Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
            Err(e) => eprintln!("Render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for PlexusApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.options.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.options.width,
                self.options.height,
            ));

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.failure = Some(RunError::EventLoop(winit::error::EventLoopError::Os(e)));
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.pointer.set_window_size(size.width, size.height);

        match pollster::block_on(GpuState::new(window.clone())) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                self.failure = Some(e.into());
                event_loop.exit();
                return;
            }
        }

        if let Err(e) = self.build_layers(size.width as f32, size.height as f32) {
            self.failure = Some(e);
            event_loop.exit();
            return;
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.pointer.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
                // The effect always re-seeded itself for a new viewport.
                if self.window.is_some() {
                    if let Err(e) = self.build_layers(
                        physical_size.width as f32,
                        physical_size.height as f32,
                    ) {
                        self.failure = Some(e);
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::CursorMoved { .. } => {
                if let Some(frac) = self.pointer.center_frac() {
                    self.rotation.pointer_moved(frac);
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.rotation.pointer_left();
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
            } => match code {
                KeyCode::KeyT => self.toggle_theme(),
                KeyCode::KeyR => self.restart(),
                KeyCode::Escape => event_loop.exit(),
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if self.failure.is_some() {
                    event_loop.exit();
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
