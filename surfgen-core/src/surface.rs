//! # Parametric Surfaces
//!
//! Closed-form surfaces evaluated over a regular `(stack, step)` parameter
//! grid. Every grid cell becomes the triangle pair `(p1, p2, p4)`,
//! `(p1, p4, p3)` where
//!
//! ```text
//! p1 = i * (steps + 1) + j    p2 = p1 + 1
//! p3 = p1 + steps + 1         p4 = p3 + 1
//! ```
//!
//! which winds counter-clockwise seen from outside for positive radii.

use std::f32::consts::PI;

use nalgebra::Vector3;
use tracing::debug;

use crate::error::{ensure, Result};
use crate::geometry::{Mesh, Topology, VertexLayout};
use crate::transform::normalize;

/// Triangle indices for a `rows` x `cols` cell grid of `(cols + 1)`-wide rows.
pub(crate) fn grid_indices(rows: u32, cols: u32) -> Vec<u32> {
    let mut indices = Vec::with_capacity(rows as usize * cols as usize * 6);
    for i in 0..rows {
        for j in 0..cols {
            let p1 = i * (cols + 1) + j;
            let p2 = p1 + 1;
            let p3 = p1 + cols + 1;
            let p4 = p3 + 1;
            indices.extend_from_slice(&[p1, p2, p4, p1, p4, p3]);
        }
    }
    indices
}

/// Reject grids with no cells or more vertices than `u32` indices can address.
pub(crate) fn check_grid(what: &str, rows: u32, cols: u32) -> Result<()> {
    ensure(rows >= 1 && cols >= 1, || {
        format!("{what} needs at least one cell per direction, got {rows}x{cols}")
    })?;
    let vertex_count = (rows as u64 + 1) * (cols as u64 + 1);
    ensure(vertex_count <= u32::MAX as u64, || {
        format!("{what} grid of {rows}x{cols} cells overflows u32 indices")
    })
}

fn check_finite(what: &str, values: &[f32]) -> Result<()> {
    ensure(values.iter().all(|v| v.is_finite()), || {
        format!("{what} parameters must be finite, got {values:?}")
    })
}

/// Attributes interleaved after each sphere vertex position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SphereAttributes {
    /// Normal equal to the normalized position
    #[default]
    Normal,
    /// Normal plus texture coordinates `(1 - j/steps, 1 - i/stacks)`
    NormalUv,
    /// One flat colour for the whole surface
    Color([f32; 3]),
    /// Colour derived from the position as `p / 2 + 0.5`
    PositionColor,
}

impl SphereAttributes {
    fn layout(self) -> VertexLayout {
        match self {
            SphereAttributes::Normal => VertexLayout::PositionNormal,
            SphereAttributes::NormalUv => VertexLayout::PositionNormalUv,
            SphereAttributes::Color(_) | SphereAttributes::PositionColor => {
                VertexLayout::PositionColor
            }
        }
    }
}

/// UV ellipsoid with position + normal vertices.
///
/// # Arguments
/// * `a`, `b`, `c` - Radii along X, Y and Z
/// * `stacks` - Latitude bands, pole to pole
/// * `steps` - Longitude segments around Y
///
/// The normal is the normalized position, which is only exact for a sphere.
/// Rings at the poles collapse to a point.
pub fn sphere(a: f32, b: f32, c: f32, stacks: u32, steps: u32) -> Result<Mesh> {
    sphere_with(a, b, c, stacks, steps, SphereAttributes::Normal)
}

/// [`sphere`] with a choice of per-vertex attributes.
pub fn sphere_with(
    a: f32,
    b: f32,
    c: f32,
    stacks: u32,
    steps: u32,
    attributes: SphereAttributes,
) -> Result<Mesh> {
    check_grid("sphere", stacks, steps)?;
    check_finite("sphere", &[a, b, c])?;

    let layout = attributes.layout();
    let vertex_count = (stacks as usize + 1) * (steps as usize + 1);
    let mut vertices = Vec::with_capacity(vertex_count * layout.stride());

    for i in 0..=stacks {
        for j in 0..=steps {
            let u = i as f32 / stacks as f32 * PI - PI / 2.0;
            let v = j as f32 / steps as f32 * 2.0 * PI - PI;

            let x = a * v.cos() * u.cos();
            let y = b * u.sin();
            let z = c * v.sin() * u.cos();
            vertices.extend_from_slice(&[x, y, z]);

            match attributes {
                SphereAttributes::Normal | SphereAttributes::NormalUv => {
                    let mut normal = Vector3::new(x, y, z);
                    normalize(&mut normal);
                    vertices.extend_from_slice(normal.as_slice());
                    if attributes == SphereAttributes::NormalUv {
                        let tex_u = 1.0 - j as f32 / steps as f32;
                        let tex_v = 1.0 - i as f32 / stacks as f32;
                        vertices.extend_from_slice(&[tex_u, tex_v]);
                    }
                }
                SphereAttributes::Color(rgb) => vertices.extend_from_slice(&rgb),
                SphereAttributes::PositionColor => {
                    vertices.extend_from_slice(&[x / 2.0 + 0.5, y / 2.0 + 0.5, z / 2.0 + 0.5])
                }
            }
        }
    }

    let indices = grid_indices(stacks, steps);
    debug!(
        vertices = vertex_count,
        indices = indices.len(),
        ?attributes,
        "generated sphere"
    );
    Mesh::new(vertices, indices, layout, Topology::Triangles)
}

/// Hyperboloid of one sheet around Z, position + colour vertices.
///
/// `u` spans `[-u_max, u_max]` along the axis and `v` spans `[0, 2π]`:
/// `(a cosh u cos v, b cosh u sin v, c sinh u)`. The colour is the position
/// scaled by the surface's extent into `[0, 1]`.
pub fn hyperboloid_one_sheet(
    a: f32,
    b: f32,
    c: f32,
    stacks: u32,
    steps: u32,
    u_max: f32,
) -> Result<Mesh> {
    check_grid("hyperboloid", stacks, steps)?;
    check_finite("hyperboloid", &[a, b, c, u_max])?;
    ensure(u_max > 0.0, || format!("hyperboloid u_max must be positive, got {u_max}"))?;
    ensure(a != 0.0 && b != 0.0 && c != 0.0, || {
        format!("hyperboloid radii must be non-zero, got ({a}, {b}, {c})")
    })?;

    let extent_x = a * u_max.cosh();
    let extent_y = b * u_max.cosh();
    let extent_z = c * u_max.sinh();

    let mut vertices = Vec::with_capacity((stacks as usize + 1) * (steps as usize + 1) * 6);
    for i in 0..=stacks {
        let u = -u_max + (i as f32 / stacks as f32) * (2.0 * u_max);
        for j in 0..=steps {
            let v = (j as f32 / steps as f32) * 2.0 * PI;

            let x = a * u.cosh() * v.cos();
            let y = b * u.cosh() * v.sin();
            let z = c * u.sinh();

            vertices.extend_from_slice(&[
                x,
                y,
                z,
                (x / extent_x) * 0.5 + 0.5,
                (y / extent_y) * 0.5 + 0.5,
                (z / extent_z) * 0.5 + 0.5,
            ]);
        }
    }

    let indices = grid_indices(stacks, steps);
    debug!(indices = indices.len(), "generated hyperboloid");
    Mesh::new(
        vertices,
        indices,
        VertexLayout::PositionColor,
        Topology::Triangles,
    )
}

/// Which way the saddle opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaddleOrientation {
    /// `y = x²/a² − z²/b²`
    #[default]
    RisingAlongX,
    /// `y = z²/b² − x²/a²`
    RisingAlongZ,
}

/// Hyperbolic paraboloid over a `width` x `depth` grid centred on the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyperbolicParaboloid {
    pub a: f32,
    pub b: f32,
    pub width: f32,
    pub depth: f32,
    pub segments_x: u32,
    pub segments_z: u32,
    /// Offset added to every position
    pub translate: Vector3<f32>,
    pub orientation: SaddleOrientation,
}

impl HyperbolicParaboloid {
    /// Position + colour mesh; vertex `(i, j)` is coloured
    /// `(j / segments_x, i / segments_z, 0.5)`.
    pub fn build(&self) -> Result<Mesh> {
        let (seg_x, seg_z) = (self.segments_x, self.segments_z);
        check_grid("hyperbolic paraboloid", seg_z, seg_x)?;
        check_finite(
            "hyperbolic paraboloid",
            &[self.a, self.b, self.width, self.depth],
        )?;
        ensure(self.a != 0.0 && self.b != 0.0, || {
            format!("saddle coefficients must be non-zero, got ({}, {})", self.a, self.b)
        })?;

        let (a2, b2) = (self.a * self.a, self.b * self.b);
        let mut vertices = Vec::with_capacity((seg_z as usize + 1) * (seg_x as usize + 1) * 6);
        for i in 0..=seg_z {
            for j in 0..=seg_x {
                let x = (j as f32 / seg_x as f32 - 0.5) * self.width;
                let z = (i as f32 / seg_z as f32 - 0.5) * self.depth;
                let y = match self.orientation {
                    SaddleOrientation::RisingAlongX => x * x / a2 - z * z / b2,
                    SaddleOrientation::RisingAlongZ => z * z / b2 - x * x / a2,
                };

                let t = self.translate;
                vertices.extend_from_slice(&[
                    x + t.x,
                    y + t.y,
                    z + t.z,
                    j as f32 / seg_x as f32,
                    i as f32 / seg_z as f32,
                    0.5,
                ]);
            }
        }

        let indices = grid_indices(seg_z, seg_x);
        debug!(indices = indices.len(), orientation = ?self.orientation, "generated saddle");
        Mesh::new(
            vertices,
            indices,
            VertexLayout::PositionColor,
            Topology::Triangles,
        )
    }
}

/// Saddle surface `y = x²/a² − z²/b²`, shifted by `translate`.
pub fn hyperbolic_paraboloid(
    a: f32,
    b: f32,
    width: f32,
    depth: f32,
    segments_x: u32,
    segments_z: u32,
    translate: Vector3<f32>,
) -> Result<Mesh> {
    HyperbolicParaboloid {
        a,
        b,
        width,
        depth,
        segments_x,
        segments_z,
        translate,
        orientation: SaddleOrientation::RisingAlongX,
    }
    .build()
}

/// Elliptic paraboloid fan, position + flat colour.
///
/// Vertex 0 is the apex at the origin, followed by `segments + 1` rim points
/// `(a cos θ, b sin θ, height · (x²/a² + y²/b²))`. Triangles are
/// `(0, i, i + 1)` for `i in 1..=segments`, then `(0, segments + 1, 1)`
/// closes the fan.
pub fn elliptic_paraboloid(
    a: f32,
    b: f32,
    height: f32,
    segments: u32,
    color: [f32; 3],
) -> Result<Mesh> {
    ensure(segments >= 1, || "elliptic paraboloid needs at least one segment".into())?;
    check_finite("elliptic paraboloid", &[a, b, height])?;
    ensure(a != 0.0 && b != 0.0, || {
        format!("elliptic paraboloid radii must be non-zero, got ({a}, {b})")
    })?;

    let mut vertices = Vec::with_capacity((segments as usize + 2) * 6);
    vertices.extend_from_slice(&[0.0, 0.0, 0.0]);
    vertices.extend_from_slice(&color);

    for i in 0..=segments {
        let theta = (i as f32 / segments as f32) * 2.0 * PI;
        let x = a * theta.cos();
        let y = b * theta.sin();
        let z = height * ((x * x) / (a * a) + (y * y) / (b * b));
        vertices.extend_from_slice(&[x, y, z]);
        vertices.extend_from_slice(&color);
    }

    let mut indices = Vec::with_capacity((segments as usize + 1) * 3);
    for i in 1..=segments {
        indices.extend_from_slice(&[0, i, i + 1]);
    }
    indices.extend_from_slice(&[0, segments + 1, 1]);

    debug!(segments, "generated elliptic paraboloid");
    Mesh::new(
        vertices,
        indices,
        VertexLayout::PositionColor,
        Topology::Triangles,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn assert_indices_in_range(mesh: &Mesh) {
        let count = mesh.vertex_count() as u32;
        assert!(mesh.indices().iter().all(|&i| i < count));
    }

    #[test]
    fn test_grid_indices_winding() {
        assert_eq!(grid_indices(1, 1), vec![0, 1, 3, 0, 3, 2]);
        assert_eq!(grid_indices(2, 3).len(), 36);
    }

    #[test]
    fn test_sphere_counts_and_radius() {
        let (stacks, steps) = (12, 16);
        let mesh = sphere(2.0, 2.0, 2.0, stacks, steps).unwrap();
        assert_eq!(mesh.vertex_count(), 13 * 17);
        assert_eq!(mesh.indices().len(), (stacks * steps * 6) as usize);
        assert_eq!(mesh.layout(), VertexLayout::PositionNormal);
        assert_indices_in_range(&mesh);

        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i);
            assert!((p.coords.norm() - 2.0).abs() < 1e-5);
            let n = mesh.normal(i).unwrap();
            assert!((n.norm() - 1.0).abs() < 1e-5);
            assert!((n - p.coords / 2.0).norm() < 1e-5);
        }
    }

    #[test]
    fn test_sphere_poles() {
        let mesh = sphere(1.0, 3.0, 1.0, 4, 4).unwrap();
        // First ring is the south pole, last ring the north pole
        assert!((mesh.position(0).y + 3.0).abs() < 1e-6);
        assert!((mesh.position(mesh.vertex_count() - 1).y - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_sphere_uv_layout() {
        let mesh = sphere_with(1.0, 1.0, 1.0, 2, 4, SphereAttributes::NormalUv).unwrap();
        assert_eq!(mesh.stride(), 8);
        assert_eq!(mesh.uv(0), Some([1.0, 1.0]));
        assert_eq!(mesh.uv(mesh.vertex_count() - 1), Some([0.0, 0.0]));
    }

    #[test]
    fn test_sphere_colour_layouts() {
        let flat = sphere_with(1.0, 1.0, 1.0, 3, 3, SphereAttributes::Color([0.2, 0.4, 0.6]))
            .unwrap();
        assert!((0..flat.vertex_count()).all(|i| flat.color(i) == Some([0.2, 0.4, 0.6])));

        let mapped = sphere_with(1.0, 1.0, 1.0, 2, 2, SphereAttributes::PositionColor).unwrap();
        let [_, g, _] = mapped.color(0).unwrap();
        // south pole: y = -1 maps to 0
        assert!(g.abs() < 1e-6);
    }

    #[test]
    fn test_sphere_rejects_empty_grid() {
        assert!(matches!(sphere(1.0, 1.0, 1.0, 0, 8), Err(Error::InvalidArgument(_))));
        assert!(sphere(f32::NAN, 1.0, 1.0, 4, 4).is_err());
    }

    #[test]
    fn test_hyperboloid_surface_equation() {
        let (a, b, c) = (0.5, 0.75, 1.0);
        let mesh = hyperboloid_one_sheet(a, b, c, 10, 12, 1.0).unwrap();
        assert_eq!(mesh.vertex_count(), 11 * 13);
        assert_indices_in_range(&mesh);
        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i);
            let lhs = (p.x / a).powi(2) + (p.y / b).powi(2) - (p.z / c).powi(2);
            assert!((lhs - 1.0).abs() < 1e-4, "vertex {i} off the surface: {lhs}");
            let [r, g, bl] = mesh.color(i).unwrap();
            for channel in [r, g, bl] {
                assert!((-1e-5..=1.0 + 1e-5).contains(&channel));
            }
        }
        // Bottom ring sits at z = -c sinh(u_max)
        assert!((mesh.position(0).z + c * 1.0f32.sinh()).abs() < 1e-5);
    }

    #[test]
    fn test_hyperboloid_rejects_zero_range() {
        assert!(hyperboloid_one_sheet(1.0, 1.0, 1.0, 4, 4, 0.0).is_err());
    }

    #[test]
    fn test_hyperbolic_paraboloid() {
        let shift = Vector3::new(2.0, 0.0, 0.0);
        let mesh = hyperbolic_paraboloid(1.0, 1.0, 2.0, 2.0, 4, 6, shift).unwrap();
        assert_eq!(mesh.vertex_count(), 7 * 5);
        assert_eq!(mesh.triangle_count(), 4 * 6 * 2);
        assert_indices_in_range(&mesh);

        // Corner (i=0, j=0): x = -1, z = -1, y = 1 - 1 = 0
        let corner = mesh.position(0);
        assert!((corner.x - 1.0).abs() < 1e-6);
        assert!(corner.y.abs() < 1e-6);
        assert!((corner.z + 1.0).abs() < 1e-6);
        assert_eq!(mesh.color(0), Some([0.0, 0.0, 0.5]));
        assert_eq!(mesh.color(mesh.vertex_count() - 1), Some([1.0, 1.0, 0.5]));

        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i);
            let (x, z) = (p.x - 2.0, p.z);
            assert!((p.y - (x * x - z * z)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_saddle_orientation_flips_sign() {
        let mut saddle = HyperbolicParaboloid {
            a: 1.0,
            b: 2.0,
            width: 2.0,
            depth: 2.0,
            segments_x: 2,
            segments_z: 2,
            translate: Vector3::zeros(),
            orientation: SaddleOrientation::RisingAlongX,
        };
        let rising_x = saddle.build().unwrap();
        saddle.orientation = SaddleOrientation::RisingAlongZ;
        let rising_z = saddle.build().unwrap();
        for i in 0..rising_x.vertex_count() {
            assert!((rising_x.position(i).y + rising_z.position(i).y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_elliptic_paraboloid_fan() {
        let segments = 8;
        let mesh = elliptic_paraboloid(0.3, 0.2, 0.5, segments, [1.0, 0.84, 0.0]).unwrap();
        assert_eq!(mesh.vertex_count(), segments as usize + 2);
        assert_eq!(mesh.triangle_count(), segments as usize + 1);
        assert_indices_in_range(&mesh);

        let tris: Vec<[u32; 3]> = mesh.triangles().collect();
        assert_eq!(tris[0], [0, 1, 2]);
        assert_eq!(tris[segments as usize], [0, segments + 1, 1]);

        assert_eq!(mesh.position(0), nalgebra::Point3::origin());
        // Every rim point lies on the ellipse, so z = height
        for i in 1..mesh.vertex_count() {
            assert!((mesh.position(i).z - 0.5).abs() < 1e-5);
        }
    }
}
