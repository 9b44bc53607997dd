//! Window surface size tracking.
//!
//! Normalizes Wayland zero-size windows and HiDPI scale changes into a single
//! stream of physical-size updates that the GPU surface, the depth buffer and
//! the camera aspect ratio can all follow.

/// Minimum surface dimension (prevents zero-size panics).
pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// Physical pixel dimensions of a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    /// Width over height. Never divides by zero because dimensions are clamped.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Produced when the physical surface size actually changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceResize {
    pub physical: PhysicalSize,
    pub scale_factor: f64,
}

/// Tracks the window's physical size and scale factor.
#[derive(Debug, Clone)]
pub struct SurfaceTracker {
    size: PhysicalSize,
    scale_factor: f64,
    /// False until the compositor has reported a non-zero size.
    configured: bool,
}

impl SurfaceTracker {
    /// Start tracking from the window's initial physical size.
    ///
    /// Zero dimensions (Wayland before the first configure) are clamped to 1
    /// and leave the tracker unconfigured.
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            size: clamp_size(width, height),
            scale_factor,
            configured: width > 0 && height > 0,
        }
    }

    /// Apply a `Resized` event. Returns `None` if nothing changed.
    pub fn handle_resize(&mut self, width: u32, height: u32) -> Option<SurfaceResize> {
        let size = clamp_size(width, height);
        let first_real_size = !self.configured && width > 0 && height > 0;
        if size == self.size && !first_real_size {
            return None;
        }
        self.size = size;
        self.configured |= width > 0 && height > 0;
        Some(SurfaceResize {
            physical: size,
            scale_factor: self.scale_factor,
        })
    }

    /// Apply a `ScaleFactorChanged` event with the window's new inner size.
    pub fn handle_scale_factor_changed(
        &mut self,
        scale_factor: f64,
        width: u32,
        height: u32,
    ) -> Option<SurfaceResize> {
        self.scale_factor = scale_factor;
        self.handle_resize(width, height)
    }

    pub fn size(&self) -> PhysicalSize {
        self.size
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.size.aspect_ratio()
    }

    /// Convert a physical-pixel distance to logical pixels.
    pub fn to_logical(&self, physical: f32) -> f32 {
        (physical as f64 / self.scale_factor) as f32
    }

    /// Whether the compositor has reported a real (non-zero) size yet.
    pub fn is_configured(&self) -> bool {
        self.configured
    }
}

fn clamp_size(width: u32, height: u32) -> PhysicalSize {
    PhysicalSize {
        width: width.max(MIN_SURFACE_DIMENSION),
        height: height.max(MIN_SURFACE_DIMENSION),
    }
}
