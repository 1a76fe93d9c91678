/// 4x4 transform utilities over column-major matrices
///
/// Every matrix is an `nalgebra::Matrix4<f32>`, whose storage is column-major,
/// so `as_slice()` is exactly the 16 floats a shader uniform expects. The cell
/// arithmetic below (`m[12]`, `m[5]`, ...) is written against that flat slice.
///
/// Mutators (`rotate_*`, `translate_*`, `scale_*`) compose into a caller-owned
/// matrix in place. Each has a pure counterpart (`rotated_*`, `translated`,
/// `scaled`) that returns a new matrix instead.
use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{Error, Result};

/// Column-major 4x4 transform.
pub type Mat4 = Matrix4<f32>;

/// Vectors shorter than this are left alone by [`normalize`].
pub const NORMALIZE_EPSILON: f32 = 1e-5;

pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// Normalize `v` in place; a vector of length at or below
/// [`NORMALIZE_EPSILON`] is left unchanged.
pub fn normalize(v: &mut Vector3<f32>) {
    let length = v.norm();
    if length > NORMALIZE_EPSILON {
        *v /= length;
    }
}

pub fn identity() -> Mat4 {
    Matrix4::identity()
}

pub fn set_identity(m: &mut Mat4) {
    m.fill_with_identity();
}

/// Flat-index product `r[i*4+j] = Σ a[i*4+k] * b[k*4+j]`.
///
/// On column-major storage this equals the algebraic product `b * a`, so
/// `multiply(local, parent)` applies `local` first and `parent` second.
pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
    let (a, b) = (a.as_slice(), b.as_slice());
    let mut out = [0.0f32; 16];
    for i in 0..4 {
        for j in 0..4 {
            out[i * 4 + j] = (0..4).map(|k| a[i * 4 + k] * b[k * 4 + j]).sum();
        }
    }
    Matrix4::from_column_slice(&out)
}

/// General inverse by cofactor expansion.
///
/// Returns `None` only when the determinant is exactly zero. Nearly singular
/// matrices still produce a (numerically unstable) result.
pub fn inverse(m: &Mat4) -> Option<Mat4> {
    let a = m.as_slice();
    let (a00, a01, a02, a03) = (a[0], a[1], a[2], a[3]);
    let (a10, a11, a12, a13) = (a[4], a[5], a[6], a[7]);
    let (a20, a21, a22, a23) = (a[8], a[9], a[10], a[11]);
    let (a30, a31, a32, a33) = (a[12], a[13], a[14], a[15]);

    let b00 = a00 * a11 - a01 * a10;
    let b01 = a00 * a12 - a02 * a10;
    let b02 = a00 * a13 - a03 * a10;
    let b03 = a01 * a12 - a02 * a11;
    let b04 = a01 * a13 - a03 * a11;
    let b05 = a02 * a13 - a03 * a12;
    let b06 = a20 * a31 - a21 * a30;
    let b07 = a20 * a32 - a22 * a30;
    let b08 = a20 * a33 - a23 * a30;
    let b09 = a21 * a32 - a22 * a31;
    let b10 = a21 * a33 - a23 * a31;
    let b11 = a22 * a33 - a23 * a32;

    let det = b00 * b11 - b01 * b10 + b02 * b09 + b03 * b08 - b04 * b07 + b05 * b06;
    if det == 0.0 {
        return None;
    }
    let inv_det = 1.0 / det;

    let out = [
        (a11 * b11 - a12 * b10 + a13 * b09) * inv_det,
        (a02 * b10 - a01 * b11 - a03 * b09) * inv_det,
        (a31 * b05 - a32 * b04 + a33 * b03) * inv_det,
        (a22 * b04 - a21 * b05 - a23 * b03) * inv_det,
        (a12 * b08 - a10 * b11 - a13 * b07) * inv_det,
        (a00 * b11 - a02 * b08 + a03 * b07) * inv_det,
        (a32 * b02 - a30 * b05 - a33 * b01) * inv_det,
        (a20 * b05 - a22 * b02 + a23 * b01) * inv_det,
        (a10 * b10 - a11 * b08 + a13 * b06) * inv_det,
        (a01 * b08 - a00 * b10 - a03 * b06) * inv_det,
        (a30 * b04 - a31 * b02 + a33 * b00) * inv_det,
        (a21 * b02 - a20 * b04 - a23 * b00) * inv_det,
        (a11 * b07 - a10 * b09 - a12 * b06) * inv_det,
        (a00 * b09 - a01 * b07 + a02 * b06) * inv_det,
        (a31 * b01 - a30 * b03 - a32 * b00) * inv_det,
        (a20 * b03 - a21 * b01 + a22 * b00) * inv_det,
    ];
    Some(Matrix4::from_column_slice(&out))
}

pub fn transpose(m: &Mat4) -> Mat4 {
    m.transpose()
}

/// Write the transpose of `a` into `out`.
pub fn transpose_into(out: &mut Mat4, a: &Mat4) {
    *out = a.transpose();
}

/// Aliased form of [`transpose_into`], `out` and `a` being the same matrix.
pub fn transpose_in_place(m: &mut Mat4) {
    m.transpose_mut();
}

/// Transpose of the inverse, used to carry normals through a world matrix.
pub fn normal_matrix(world: &Mat4) -> Result<Mat4> {
    inverse(world)
        .map(|inv| inv.transpose())
        .ok_or(Error::SingularMatrix)
}

/// Rotate rows `r` and `s` of the upper 3x3 block by `angle`.
/// The translation column is left untouched.
fn rotate_rows(m: &mut Mat4, r: usize, s: usize, angle: f32) {
    let (sin, cos) = angle.sin_cos();
    let cells = m.as_mut_slice();
    for col in 0..3 {
        let (vr, vs) = (cells[col * 4 + r], cells[col * 4 + s]);
        cells[col * 4 + r] = cos * vr - sin * vs;
        cells[col * 4 + s] = cos * vs + sin * vr;
    }
}

pub fn rotate_x(m: &mut Mat4, angle: f32) {
    rotate_rows(m, 1, 2, angle);
}

pub fn rotate_y(m: &mut Mat4, angle: f32) {
    // Ry puts +sin on the (0,2) cell, so it rotates row 2 into row 0.
    rotate_rows(m, 2, 0, angle);
}

pub fn rotate_z(m: &mut Mat4, angle: f32) {
    rotate_rows(m, 0, 1, angle);
}

pub fn translate_x(m: &mut Mat4, delta: f32) {
    m.as_mut_slice()[12] += delta;
}

pub fn translate_y(m: &mut Mat4, delta: f32) {
    m.as_mut_slice()[13] += delta;
}

pub fn translate_z(m: &mut Mat4, delta: f32) {
    m.as_mut_slice()[14] += delta;
}

pub fn scale_x(m: &mut Mat4, factor: f32) {
    m.as_mut_slice()[0] *= factor;
}

pub fn scale_y(m: &mut Mat4, factor: f32) {
    m.as_mut_slice()[5] *= factor;
}

pub fn scale_z(m: &mut Mat4, factor: f32) {
    m.as_mut_slice()[10] *= factor;
}

/// Overwrite the translation cells.
pub fn set_position(m: &mut Mat4, x: f32, y: f32, z: f32) {
    let cells = m.as_mut_slice();
    cells[12] = x;
    cells[13] = y;
    cells[14] = z;
}

pub fn rotated_x(m: &Mat4, angle: f32) -> Mat4 {
    let mut out = *m;
    rotate_x(&mut out, angle);
    out
}

pub fn rotated_y(m: &Mat4, angle: f32) -> Mat4 {
    let mut out = *m;
    rotate_y(&mut out, angle);
    out
}

pub fn rotated_z(m: &Mat4, angle: f32) -> Mat4 {
    let mut out = *m;
    rotate_z(&mut out, angle);
    out
}

pub fn translated(m: &Mat4, x: f32, y: f32, z: f32) -> Mat4 {
    let mut out = *m;
    translate_x(&mut out, x);
    translate_y(&mut out, y);
    translate_z(&mut out, z);
    out
}

pub fn scaled(m: &Mat4, sx: f32, sy: f32, sz: f32) -> Mat4 {
    let mut out = *m;
    scale_x(&mut out, sx);
    scale_y(&mut out, sy);
    scale_z(&mut out, sz);
    out
}

/// Identity moved to `(x, y, z)`.
pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
    translated(&identity(), x, y, z)
}

/// Apply `m` to a point, dividing by the resulting `w`.
pub fn transform_point(m: &Mat4, p: &Point3<f32>) -> Point3<f32> {
    m.transform_point(p)
}
