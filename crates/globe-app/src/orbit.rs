//! Orbit camera controls.
//!
//! The camera sits on a sphere around a fixed target and always looks at it.
//! Left-drag turns the sphere (azimuth about +Y, polar angle from +Y), the
//! wheel dollies in and out.

use glam::Vec3;
use globe_config::ControlsConfig;
use globe_render::Camera;

use crate::mouse::MouseState;

/// Closest the polar angle gets to either pole. Keeps `look_at` well-defined.
pub const POLAR_EPSILON: f32 = 1e-3;

/// Residual rotation below which damping stops.
const SETTLE_THRESHOLD: f32 = 1e-6;

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Vec3,
    /// Angle about +Y in radians. Zero puts the camera on +Z.
    pub azimuth: f32,
    /// Angle from +Y in radians, kept inside `(0, π)`.
    pub polar: f32,
    pub distance: f32,
    /// Radians per pixel of drag.
    pub rotate_speed: f32,
    /// Distance factor per scroll line; below 1 means scrolling up zooms in.
    pub zoom_speed: f32,
    /// Fraction of the pending rotation applied per update. 1.0 disables inertia.
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pending_azimuth: f32,
    pending_polar: f32,
}

impl OrbitControls {
    /// Controls looking at the origin from `+Z * start_distance`.
    pub fn new(config: &ControlsConfig) -> Self {
        let min_distance = config.min_distance.max(f32::EPSILON);
        let max_distance = config.max_distance.max(min_distance);
        Self {
            target: Vec3::ZERO,
            azimuth: 0.0,
            polar: std::f32::consts::FRAC_PI_2,
            distance: config.start_distance.clamp(min_distance, max_distance),
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            damping: config.damping.clamp(f32::EPSILON, 1.0),
            min_distance,
            max_distance,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
        }
    }

    /// Feed one frame of mouse input. Rotation is queued for [`update`](Self::update);
    /// zoom applies immediately.
    ///
    /// Mouse deltas arrive in physical pixels and are divided by `scale_factor`
    /// so drag speed is the same on HiDPI displays.
    pub fn handle_mouse(&mut self, mouse: &MouseState, scale_factor: f32) {
        if mouse.is_dragging() {
            let delta = mouse.delta() / scale_factor.max(f32::EPSILON);
            self.rotate(delta.x, delta.y);
        }
        let scroll = mouse.scroll();
        if scroll.abs() > f32::EPSILON {
            self.zoom(scroll);
        }
    }

    /// Queue a drag of `dx`, `dy` logical pixels. Dragging right swings the camera left,
    /// so the globe follows the cursor.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.pending_azimuth -= dx * self.rotate_speed;
        self.pending_polar -= dy * self.rotate_speed;
    }

    /// Dolly by `scroll` wheel lines.
    pub fn zoom(&mut self, scroll: f32) {
        self.distance =
            (self.distance * self.zoom_speed.powf(scroll)).clamp(self.min_distance, self.max_distance);
    }

    /// Apply queued rotation. With damping below 1 the remainder decays over
    /// the following updates.
    pub fn update(&mut self) {
        self.azimuth += self.pending_azimuth * self.damping;
        self.polar = (self.polar + self.pending_polar * self.damping)
            .clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON);

        let keep = 1.0 - self.damping;
        self.pending_azimuth *= keep;
        self.pending_polar *= keep;
        if self.pending_azimuth.abs() < SETTLE_THRESHOLD {
            self.pending_azimuth = 0.0;
        }
        if self.pending_polar.abs() < SETTLE_THRESHOLD {
            self.pending_polar = 0.0;
        }

        self.azimuth = self.azimuth.rem_euclid(std::f32::consts::TAU);
    }

    /// Whether rotation is still queued.
    pub fn is_moving(&self) -> bool {
        self.pending_azimuth != 0.0 || self.pending_polar != 0.0
    }

    /// Camera position for the current angles and distance.
    pub fn eye(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        self.target + self.distance * Vec3::new(sin_polar * sin_az, cos_polar, sin_polar * cos_az)
    }

    /// Place `camera` on the orbit, looking at the target.
    pub fn apply(&self, camera: &mut Camera) {
        camera.look_at(self.eye(), self.target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::{ElementState, MouseButton, MouseScrollDelta};

    fn controls() -> OrbitControls {
        OrbitControls::new(&ControlsConfig::default())
    }

    #[test]
    fn test_starts_on_positive_z() {
        let orbit = controls();
        let eye = orbit.eye();
        assert!((eye - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn test_apply_looks_at_target() {
        let orbit = controls();
        let mut camera = Camera::default();
        orbit.apply(&mut camera);
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-5);
        assert!((camera.position - orbit.eye()).length() < 1e-6);
    }

    #[test]
    fn test_drag_right_swings_camera_left() {
        let mut orbit = controls();
        orbit.rotate(100.0, 0.0);
        orbit.update();
        let eye = orbit.eye();
        assert!(eye.x < 0.0, "eye moved to {eye}");
        assert!((eye.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_polar_is_clamped_at_poles() {
        let mut orbit = controls();
        orbit.rotate(0.0, 1.0e6);
        orbit.update();
        assert!((orbit.polar - POLAR_EPSILON).abs() < 1e-6);
        orbit.rotate(0.0, -1.0e6);
        orbit.update();
        assert!((orbit.polar - (std::f32::consts::PI - POLAR_EPSILON)).abs() < 1e-6);

        let mut camera = Camera::default();
        orbit.apply(&mut camera);
        assert!(camera.rotation.is_normalized());
    }

    #[test]
    fn test_scroll_up_zooms_in() {
        let mut orbit = controls();
        orbit.zoom(1.0);
        assert!((orbit.distance - 5.0 * 0.95).abs() < 1e-5);
        orbit.zoom(-2.0);
        assert!(orbit.distance > 5.0);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut orbit = controls();
        orbit.zoom(1000.0);
        assert_eq!(orbit.distance, orbit.min_distance);
        orbit.zoom(-10_000.0);
        assert_eq!(orbit.distance, orbit.max_distance);
    }

    #[test]
    fn test_no_damping_applies_at_once() {
        let mut orbit = controls();
        orbit.rotate(10.0, 0.0);
        orbit.update();
        assert!(!orbit.is_moving());
        let after = orbit.azimuth;
        orbit.update();
        assert_eq!(orbit.azimuth, after);
    }

    #[test]
    fn test_damping_spreads_rotation_over_updates() {
        let mut orbit = OrbitControls::new(&ControlsConfig {
            damping: 0.25,
            ..Default::default()
        });
        orbit.rotate(-100.0, 0.0);
        orbit.update();
        let first = orbit.azimuth;
        assert!((first - 100.0 * 0.005 * 0.25).abs() < 1e-5);
        assert!(orbit.is_moving());
        for _ in 0..200 {
            orbit.update();
        }
        assert!(!orbit.is_moving());
        assert!((orbit.azimuth - 100.0 * 0.005).abs() < 1e-3);
    }

    #[test]
    fn test_drag_requires_left_button() {
        let mut orbit = controls();
        let mut mouse = MouseState::new();
        mouse.on_cursor_moved(0.0, 0.0);
        mouse.on_cursor_moved(50.0, 0.0);
        orbit.handle_mouse(&mouse, 1.0);
        orbit.update();
        assert_eq!(orbit.azimuth, 0.0);

        mouse.clear_transients();
        mouse.on_button(MouseButton::Left, ElementState::Pressed);
        mouse.on_cursor_moved(100.0, 0.0);
        mouse.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        orbit.handle_mouse(&mouse, 1.0);
        orbit.update();
        assert!(orbit.azimuth > 0.0);
        assert!(orbit.distance < 5.0);
    }

    #[test]
    fn test_hidpi_drag_matches_logical_distance() {
        let mut mouse = MouseState::new();
        mouse.on_button(MouseButton::Left, ElementState::Pressed);
        mouse.on_cursor_moved(0.0, 0.0);
        mouse.on_cursor_moved(0.0, -40.0);

        let mut hidpi = controls();
        hidpi.handle_mouse(&mouse, 2.0);
        hidpi.update();

        let mut reference = controls();
        reference.rotate(0.0, -20.0);
        reference.update();
        assert!((hidpi.polar - reference.polar).abs() < 1e-6);
    }

    #[test]
    fn test_start_distance_respects_limits() {
        let orbit = OrbitControls::new(&ControlsConfig {
            start_distance: 100.0,
            max_distance: 20.0,
            ..Default::default()
        });
        assert_eq!(orbit.distance, 20.0);
    }
}
