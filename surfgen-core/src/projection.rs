/// Perspective projection and viewer placement
use nalgebra::{Matrix4, Point3, Vector4};

use crate::transform::{deg_to_rad, translation, Mat4};

/// Perspective projection in the column-major layout used by
/// `clip = P * V * M * point`.
///
/// Cells: `[0] = 0.5 / tan(fov/2)`, `[5] = 0.5 * aspect / tan(fov/2)`,
/// `[10] = -(far + near) / (far - near)`, `[11] = -1`,
/// `[14] = -2 * far * near / (far - near)`, `[15] = 0`.
pub fn get_projection(fov_degrees: f32, aspect: f32, z_near: f32, z_far: f32) -> Mat4 {
    let tan = deg_to_rad(0.5 * fov_degrees).tan();
    let a = -(z_far + z_near) / (z_far - z_near);
    let b = (-2.0 * z_far * z_near) / (z_far - z_near);

    #[rustfmt::skip]
    let cells = [
        0.5 / tan, 0.0, 0.0, 0.0,
        0.0, 0.5 * aspect / tan, 0.0, 0.0,
        0.0, 0.0, a, -1.0,
        0.0, 0.0, b, 0.0,
    ];
    Matrix4::from_column_slice(&cells)
}

/// Viewer configuration: a perspective frustum looking down -Z from
/// `distance` units in front of the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub fov_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub distance: f32,
}

impl View {
    pub fn new(fov_degrees: f32, z_near: f32, z_far: f32, distance: f32) -> Self {
        Self {
            fov_degrees,
            z_near,
            z_far,
            distance,
        }
    }

    /// Identity pushed back along Z by `distance`.
    pub fn view_matrix(&self) -> Mat4 {
        translation(0.0, 0.0, -self.distance)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        get_projection(self.fov_degrees, aspect, self.z_near, self.z_far)
    }

    /// `P * V`, ready to be combined with a world matrix.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new(40.0, 1.0, 100.0, 12.0)
    }
}

/// Project a model-space point through `mvp` to screen space.
///
/// Returns `(x, y, ndc_depth)` with `y` growing downwards, or `None` when the
/// point sits behind the viewer or outside the near/far range.
pub fn project_to_screen(
    mvp: &Mat4,
    point: &Point3<f32>,
    width: u32,
    height: u32,
) -> Option<(f32, f32, f32)> {
    let clip = mvp * Vector4::new(point.x, point.y, point.z, 1.0);

    // Prevent division by near-zero depth values
    if clip.w < 1e-6 {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let ndc_z = clip.z / clip.w;
    if !(-1.0..=1.0).contains(&ndc_z) {
        return None;
    }

    let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

    Some((screen_x, screen_y, ndc_z))
}
