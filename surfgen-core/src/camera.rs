/// Accumulated whole-object rotation driven by drag and key deltas
use std::f32::consts::PI;

use crate::transform::{identity, rotate_x, rotate_y, Mat4};

/// Share of the angular velocity lost per frame once a drag ends.
pub const FRICTION: f32 = 0.15;
/// Velocity added by one key press, in radians per frame.
pub const KEY_SPEED: f32 = 0.05;

/// Direction of a keyboard nudge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyNudge {
    Up,
    Down,
    Left,
    Right,
}

/// Rotation angles (radians) plus the per-frame velocity that feeds them.
///
/// `theta` spins around Y, `phi` tilts around X. The presentation layer
/// reports drags and key presses; [`CameraState::update`] is called once per
/// frame before the scene root matrix is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub theta: f32,
    pub phi: f32,
    pub dx: f32,
    pub dy: f32,
    pub friction: f32,
    pub key_speed: f32,
    dragging: bool,
}

impl CameraState {
    pub fn new(friction: f32, key_speed: f32) -> Self {
        Self {
            theta: 0.0,
            phi: 0.0,
            dx: 0.0,
            dy: 0.0,
            friction,
            key_speed,
            dragging: false,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Feed a pointer movement of `(dx_px, dy_px)` over a surface of
    /// `width` x `height`. A full-width drag is one full turn.
    ///
    /// Ignored unless a drag is active.
    pub fn drag(&mut self, dx_px: f32, dy_px: f32, width: f32, height: f32) {
        if !self.dragging {
            return;
        }
        self.dx = dx_px * 2.0 * PI / width;
        self.dy = dy_px * 2.0 * PI / height;
        self.theta += self.dx;
        self.phi += self.dy;
    }

    pub fn nudge(&mut self, key: KeyNudge) {
        match key {
            KeyNudge::Up => self.dy -= self.key_speed,
            KeyNudge::Down => self.dy += self.key_speed,
            KeyNudge::Left => self.dx -= self.key_speed,
            KeyNudge::Right => self.dx += self.key_speed,
        }
    }

    /// Per-frame integration; velocity decays while no drag is active.
    pub fn update(&mut self) {
        if !self.dragging {
            self.dx *= 1.0 - self.friction;
            self.dy *= 1.0 - self.friction;
            self.theta += self.dx;
            self.phi += self.dy;
        }
    }

    /// Root matrix for the current angles: Y spin, then X tilt.
    pub fn rotation(&self) -> Mat4 {
        let mut m = identity();
        rotate_y(&mut m, self.theta);
        rotate_x(&mut m, self.phi);
        m
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(FRICTION, KEY_SPEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::rotated_y;

    #[test]
    fn test_camera_state_starts_still() {
        let mut state = CameraState::default();
        state.update();
        assert_eq!(state.theta, 0.0);
        assert_eq!(state.phi, 0.0);
        assert_eq!(state.rotation(), identity());
    }

    #[test]
    fn test_drag_converts_pixels_to_radians() {
        let mut state = CameraState::default();
        state.drag(100.0, 0.0, 400.0, 200.0);
        assert_eq!(state.theta, 0.0, "no drag in progress");

        state.begin_drag();
        state.drag(100.0, 50.0, 400.0, 200.0);
        assert!((state.theta - PI / 2.0).abs() < 1e-6);
        assert!((state.phi - PI / 2.0).abs() < 1e-6);

        // While dragging, update does not integrate the velocity again.
        state.update();
        assert!((state.theta - PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_friction_decays_velocity() {
        let mut state = CameraState::default();
        state.nudge(KeyNudge::Right);
        state.update();
        let expected_dx = KEY_SPEED * (1.0 - FRICTION);
        assert!((state.dx - expected_dx).abs() < 1e-7);
        assert!((state.theta - expected_dx).abs() < 1e-7);

        for _ in 0..200 {
            state.update();
        }
        assert!(state.dx.abs() < 1e-9);
        // Geometric series: total spin converges to dx0 * (1-f) / f
        let limit = KEY_SPEED * (1.0 - FRICTION) / FRICTION;
        assert!((state.theta - limit).abs() < 1e-4);
    }

    #[test]
    fn test_nudge_directions() {
        let mut state = CameraState::default();
        state.nudge(KeyNudge::Up);
        state.nudge(KeyNudge::Left);
        assert_eq!((state.dx, state.dy), (-KEY_SPEED, -KEY_SPEED));
        state.nudge(KeyNudge::Down);
        state.nudge(KeyNudge::Right);
        assert_eq!((state.dx, state.dy), (0.0, 0.0));
    }

    #[test]
    fn test_rotation_is_y_then_x() {
        let mut state = CameraState::default();
        state.theta = 0.8;
        assert_eq!(state.rotation(), rotated_y(&identity(), 0.8));
    }
}
