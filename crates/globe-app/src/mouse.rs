//! Frame-coherent mouse state.
//!
//! [`MouseState`] collects winit mouse events between two redraws; the orbit
//! controls read the accumulated drag and scroll once per frame, then
//! [`clear_transients`](MouseState::clear_transients) resets them.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of a touchpad scroll that count as one wheel line.
pub const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Debug, Clone, Default)]
pub struct MouseState {
    position: Option<Vec2>,
    delta: Vec2,
    /// Left button held; only the left button drags the orbit.
    dragging: bool,
    scroll: f32,
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a `CursorMoved` event (physical pixels).
    ///
    /// The first position after the cursor enters produces no delta.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        if let Some(previous) = self.position {
            self.delta += new_pos - previous;
        }
        self.position = Some(new_pos);
    }

    /// Process a `MouseInput` event. Buttons other than the left one are ignored.
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.dragging = state.is_pressed();
        }
    }

    /// Process a `MouseWheel` event. Positive means scrolling up (away from the user).
    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_x, y) => self.scroll += y,
            MouseScrollDelta::PixelDelta(pos) => self.scroll += (pos.y / PIXELS_PER_LINE) as f32,
        }
    }

    /// Forget the position so re-entering elsewhere does not register as a drag.
    /// A held button stays held; its release may arrive after the cursor returns.
    pub fn on_cursor_left(&mut self) {
        self.position = None;
    }

    /// Clears delta and scroll.
    pub fn clear_transients(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll = 0.0;
    }

    /// Movement since the last clear.
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Scroll lines accumulated since the last clear.
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_position_updates_on_move() {
        let mut ms = MouseState::new();
        assert_eq!(ms.position, None);
        ms.on_cursor_moved(100.0, 200.0);
        assert_eq!(ms.position, Some(Vec2::new(100.0, 200.0)));
    }

    #[test]
    fn test_first_move_has_no_delta() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(640.0, 360.0);
        assert_eq!(ms.delta(), Vec2::ZERO);
    }

    #[test]
    fn test_delta_accumulates_within_frame() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(100.0, 200.0);
        ms.clear_transients();
        ms.on_cursor_moved(105.0, 198.0);
        ms.on_cursor_moved(110.0, 195.0);
        let d = ms.delta();
        assert!((d.x - 10.0).abs() < f32::EPSILON);
        assert!((d.y + 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_leaving_the_window_breaks_the_drag() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(10.0, 10.0);
        ms.on_cursor_left();
        assert_eq!(ms.position, None);
        ms.on_cursor_moved(500.0, 500.0);
        assert_eq!(ms.delta(), Vec2::ZERO);
    }

    #[test]
    fn test_left_button_drag_tracked() {
        let mut ms = MouseState::new();
        ms.on_button(MouseButton::Left, ElementState::Pressed);
        assert!(ms.is_dragging());

        ms.clear_transients();
        ms.on_cursor_left();
        assert!(ms.is_dragging());

        ms.on_button(MouseButton::Left, ElementState::Released);
        assert!(!ms.is_dragging());
    }

    #[test]
    fn test_other_buttons_do_not_drag() {
        let mut ms = MouseState::new();
        for button in [MouseButton::Right, MouseButton::Middle, MouseButton::Back] {
            ms.on_button(button, ElementState::Pressed);
        }
        assert!(!ms.is_dragging());

        ms.on_button(MouseButton::Left, ElementState::Pressed);
        ms.on_button(MouseButton::Right, ElementState::Released);
        assert!(ms.is_dragging());
    }

    #[test]
    fn test_scroll_lines_and_pixels() {
        let mut ms = MouseState::new();
        ms.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        ms.on_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 20.0)));
        assert!((ms.scroll() - 1.5).abs() < f32::EPSILON);
        ms.clear_transients();
        assert_eq!(ms.scroll(), 0.0);
    }
}
