//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]: the window, GPU
//! context and scene are built on the first `resumed`, each redraw runs the
//! owed fixed-rate updates and renders one frame.

use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use globe_config::{Config, EarthConfig, StarfieldSettings};
use globe_earth::{
    EarthRenderer, EarthTextureError, Globe, GlobeSettings, icosphere, load_earth_textures,
};
use globe_render::{
    Camera, DepthBuffer, FrameEncoder, RenderContext, RenderContextError, RenderPassBuilder,
    SPACE_BLACK, ShaderLibrary, SurfaceError, SurfaceResize, SurfaceTracker, TextureManager,
    init_render_context_blocking,
};
use globe_space::{Starfield, StarfieldConfig, StarfieldRenderer};
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::frame_loop::FrameLoop;
use crate::mouse::MouseState;
use crate::orbit::OrbitControls;

/// Fatal errors while building the window and scene.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] RenderContextError),

    #[error("failed to load Earth textures: {0}")]
    Textures(#[from] EarthTextureError),
}

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attrs = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attrs
    }
}

/// Globe tunables from the `earth` config section.
pub fn globe_settings(earth: &EarthConfig) -> GlobeSettings {
    GlobeSettings {
        axial_tilt_degrees: earth.axial_tilt_degrees,
        spin_per_frame: earth.spin_per_frame,
        cloud_spin_per_frame: earth.cloud_spin_per_frame,
        cloud_opacity: earth.cloud_opacity.clamp(0.0, 1.0),
        sun_position: Vec3::from_array(earth.sun_position),
        sun_intensity: earth.sun_intensity,
    }
}

/// Generator parameters from the `starfield` config section.
///
/// The sampling cube's half-extent equals the shell radius.
pub fn starfield_config(settings: &StarfieldSettings) -> StarfieldConfig {
    StarfieldConfig {
        star_count: settings.star_count,
        radius: settings.radius,
        half_extent: settings.radius,
        point_size: settings.point_size,
        seed: settings.seed,
        ..StarfieldConfig::default()
    }
}

/// GPU resources that exist once the window does.
struct Scene {
    depth: DepthBuffer,
    stars: StarfieldRenderer,
    earth: EarthRenderer,
    // Owns the textures and shader modules the renderers were built from.
    _textures: TextureManager,
    _shaders: ShaderLibrary,
}

/// Application state: window, GPU context, scene and per-frame input.
pub struct AppState {
    pub config: Config,
    pub window: Option<Arc<Window>>,
    pub gpu: Option<RenderContext>,
    scene: Option<Scene>,
    /// Physical surface size and scale factor.
    pub surface: SurfaceTracker,
    pub frame_loop: FrameLoop,
    pub mouse: MouseState,
    pub orbit: OrbitControls,
    pub camera: Camera,
    pub globe: Globe,
    pub starfield: Starfield,
    fps_frames: u32,
    fps_since: Instant,
}

impl AppState {
    /// Build the CPU side of the scene. GPU resources wait for `resumed`.
    pub fn with_config(config: Config) -> Self {
        let surface = SurfaceTracker::new(config.window.width, config.window.height, 1.0);
        let camera = Camera::new(
            config.render.fov_y_degrees,
            surface.aspect_ratio(),
            config.render.near,
            config.render.far,
        );
        let orbit = OrbitControls::new(&config.controls);
        let globe = Globe::new(globe_settings(&config.earth));

        let starfield = globe_space::generate(&starfield_config(&config.starfield));
        info!(
            stars = starfield.len(),
            seed = ?config.starfield.seed,
            "Generated starfield"
        );

        let mut state = Self {
            config,
            window: None,
            gpu: None,
            scene: None,
            surface,
            frame_loop: FrameLoop::new(),
            mouse: MouseState::new(),
            orbit,
            camera,
            globe,
            starfield,
            fps_frames: 0,
            fps_since: Instant::now(),
        };
        state.orbit.apply(&mut state.camera);
        state
    }

    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Logical window size.
    pub fn logical_size(&self) -> (f64, f64) {
        let size = self.surface.size();
        let scale = self.surface.scale_factor();
        (size.width as f64 / scale, size.height as f64 / scale)
    }

    /// Whether the GPU scene has been built.
    pub fn is_initialized(&self) -> bool {
        self.scene.is_some()
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SetupError> {
        let window = Arc::new(event_loop.create_window(window_attributes_from_config(&self.config))?);

        let inner_size = window.inner_size();
        let scale_factor = window.scale_factor();
        self.surface = SurfaceTracker::new(inner_size.width, inner_size.height, scale_factor);
        self.camera.set_aspect_ratio(
            self.surface.size().width as f32,
            self.surface.size().height as f32,
        );
        info!(
            "Surface initialized: {}x{} (scale: {:.2})",
            inner_size.width, inner_size.height, scale_factor
        );

        let gpu = init_render_context_blocking(window.clone(), self.config.window.vsync)?;
        let scene = self.build_scene(&gpu)?;

        self.scene = Some(scene);
        self.gpu = Some(gpu);
        self.window = Some(window);
        Ok(())
    }

    fn build_scene(&self, gpu: &RenderContext) -> Result<Scene, SetupError> {
        let size = self.surface.size();
        let depth = DepthBuffer::new(&gpu.device, size.width, size.height);

        let mut textures = TextureManager::new(&gpu.device);
        let earth_textures = load_earth_textures(
            &gpu.device,
            &gpu.queue,
            &mut textures,
            &self.config.assets.texture_dir,
        )?;

        let mut shaders = ShaderLibrary::new();
        let sphere = icosphere(self.config.render.sphere_detail);
        let earth = EarthRenderer::new(
            &gpu.device,
            gpu.surface_format,
            &sphere,
            &earth_textures,
            textures.sampler(),
            &mut shaders,
        );
        let stars = StarfieldRenderer::new(&gpu.device, gpu.surface_format, &self.starfield);

        Ok(Scene {
            depth,
            stars,
            earth,
            _textures: textures,
            _shaders: shaders,
        })
    }

    /// Propagate a new physical size to the surface, depth buffer and camera.
    fn apply_resize(&mut self, resize: SurfaceResize) {
        let w = resize.physical.width;
        let h = resize.physical.height;

        self.camera.set_aspect_ratio(w as f32, h as f32);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(w, h);
            if let Some(scene) = &mut self.scene {
                scene.depth.resize(&gpu.device, w, h);
            }
        }
        info!(
            "Window resized to {}x{} (scale: {:.2})",
            w, h, resize.scale_factor
        );
    }

    /// Fold pending mouse input into the orbit, then run the owed fixed steps.
    fn update(&mut self) {
        self.orbit
            .handle_mouse(&self.mouse, self.surface.scale_factor() as f32);
        self.mouse.clear_transients();

        let frame_time = self.frame_loop.measure_frame_time();
        self.update_with(frame_time);
    }

    /// Run the fixed steps owed for `frame_time` seconds: globe spin,
    /// starfield drift, orbit damping. Returns the number of steps taken.
    fn update_with(&mut self, frame_time: f64) -> u32 {
        let star_spin = self.config.starfield.spin_per_frame;
        let globe = &mut self.globe;
        let starfield = &mut self.starfield;
        let orbit = &mut self.orbit;
        let steps = self.frame_loop.advance(frame_time, |_dt| {
            globe.tick();
            starfield.rotate_y(star_spin);
            orbit.update();
        });
        self.orbit.apply(&mut self.camera);
        steps
    }

    /// Render one frame: stars first, then the four globe layers, in one pass.
    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu), Some(scene)) = (&self.gpu, &self.scene) else {
            return;
        };

        let camera_uniform = self.camera.to_uniform();
        let size = self.surface.size();
        scene.stars.update(
            &gpu.queue,
            &camera_uniform,
            &self.starfield,
            (size.width, size.height),
        );
        scene.earth.update(&gpu.queue, &camera_uniform, &self.globe);

        let surface_texture = match gpu.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Timeout) => {
                warn!("Surface acquisition timed out, skipping frame");
                return;
            }
            Err(SurfaceError::Lost) => {
                warn!("Surface lost, skipping frame");
                return;
            }
            Err(e @ SurfaceError::OutOfMemory) => {
                error!("Fatal surface error: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut frame = FrameEncoder::new(&gpu.device, surface_texture);
        let builder = RenderPassBuilder::new()
            .clear_color(SPACE_BLACK)
            .depth(scene.depth.view.clone(), DepthBuffer::CLEAR_VALUE)
            .label("globe-scene-pass");
        {
            let mut pass = frame.begin_render_pass(&builder);
            scene.stars.render(&mut pass);
            scene.earth.render(&mut pass);
        }
        frame.submit(&gpu.queue);

        self.record_frame();
    }

    fn record_frame(&mut self) {
        let interval = self.config.debug.fps_log_interval;
        if interval == 0 {
            return;
        }
        self.fps_frames += 1;
        if self.fps_frames >= interval {
            let elapsed = self.fps_since.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                info!(
                    fps = format_args!("{:.1}", f64::from(self.fps_frames) / elapsed),
                    frames = self.frame_loop.frame_count(),
                    updates = self.frame_loop.update_count(),
                    "Frame rate"
                );
            }
            self.fps_frames = 0;
            self.fps_since = Instant::now();
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.initialize(event_loop) {
            error!("{e}");
            event_loop.exit();
            return;
        }
        self.frame_loop = FrameLoop::new();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(resize) = self
                    .surface
                    .handle_resize(new_size.width, new_size.height)
                {
                    self.apply_resize(resize);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    let inner = window.inner_size();
                    if let Some(resize) = self.surface.handle_scale_factor_changed(
                        scale_factor,
                        inner.width,
                        inner.height,
                    ) {
                        self.apply_resize(resize);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse.on_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.mouse.on_scroll(delta);
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse.on_cursor_left();
            }
            WindowEvent::RedrawRequested => {
                self.update();
                self.render(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Creates an event loop and runs the viewer until the window closes.
#[instrument(skip_all)]
pub fn run(config: Config) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::with_config(config);
    event_loop.run_app(&mut app)
}
