//! # Curves and Splines
//!
//! Sampled curves returned as flat coordinate sequences (`[x, y]*` or
//! `[x, y, z]*`) or wrapped into line-strip meshes for drawing.

use nalgebra::{Point2, Point3, Vector3};
use tracing::debug;

use crate::error::{ensure, Result};
use crate::geometry::{Mesh, VertexLayout};

/// Cubic Bézier through `control[0]` and `control[3]`, pulled by the two
/// inner handles.
///
/// Evaluates `(1-t)³P0 + 3(1-t)²tP1 + 3(1-t)t²P2 + t³P3` at
/// `t = i / num_segments` for `i in 0..=num_segments`, giving
/// `num_segments + 1` points as a flat `[x, y]*` sequence.
pub fn cubic_bezier(control: &[Point2<f32>; 4], num_segments: u32) -> Result<Vec<f32>> {
    ensure(num_segments >= 1, || "bezier needs at least one segment".into())?;

    let [p0, p1, p2, p3] = control;
    let mut points = Vec::with_capacity((num_segments as usize + 1) * 2);
    for i in 0..=num_segments {
        let t = i as f32 / num_segments as f32;
        let s = 1.0 - t;
        let c0 = s * s * s;
        let c1 = 3.0 * s * s * t;
        let c2 = 3.0 * s * t * t;
        let c3 = t * t * t;

        points.push(c0 * p0.x + c1 * p1.x + c2 * p2.x + c3 * p3.x);
        points.push(c0 * p0.y + c1 * p1.y + c2 * p2.y + c3 * p3.y);
    }
    Ok(points)
}

/// One Catmull-Rom sample: the point and the (unnormalized) derivative of
/// the span's cubic at that parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineSample {
    pub point: Point3<f32>,
    pub tangent: Vector3<f32>,
}

/// Sample a Catmull-Rom spline through `control`.
///
/// The first and last control points are duplicated so every real control
/// point has a neighbour on both sides. Each of the `n - 1` spans contributes
/// `segments_per_span + 1` samples; neighbouring spans both emit their shared
/// boundary point.
pub fn catmull_rom_samples(
    control: &[Point3<f32>],
    segments_per_span: u32,
) -> Result<Vec<SplineSample>> {
    ensure(control.len() >= 2, || {
        format!("catmull-rom needs at least 2 control points, got {}", control.len())
    })?;
    ensure(segments_per_span >= 1, || "catmull-rom needs at least one segment per span".into())?;

    let mut padded = Vec::with_capacity(control.len() + 2);
    padded.push(control[0]);
    padded.extend_from_slice(control);
    padded.push(control[control.len() - 1]);

    let spans = control.len() - 1;
    let mut samples = Vec::with_capacity(spans * (segments_per_span as usize + 1));
    for window in padded.windows(4) {
        let [p0, p1, p2, p3] = [window[0].coords, window[1].coords, window[2].coords, window[3].coords];

        // 0.5 * (2p1 + b t + c t² + d t³)
        let b = p2 - p0;
        let c = 2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3;
        let d = -p0 + 3.0 * p1 - 3.0 * p2 + p3;

        for j in 0..=segments_per_span {
            let t = j as f32 / segments_per_span as f32;
            let (t2, t3) = (t * t, t * t * t);
            let point = 0.5 * (2.0 * p1 + b * t + c * t2 + d * t3);
            let tangent = 0.5 * (b + 2.0 * c * t + 3.0 * d * t2);
            samples.push(SplineSample {
                point: Point3::from(point),
                tangent,
            });
        }
    }

    debug!(spans, samples = samples.len(), "sampled catmull-rom spline");
    Ok(samples)
}

/// Catmull-Rom samples as a flat `[x, y, z]*` sequence.
pub fn catmull_rom_spline(control: &[Point3<f32>], segments_per_span: u32) -> Result<Vec<f32>> {
    Ok(catmull_rom_samples(control, segments_per_span)?
        .iter()
        .flat_map(|s| [s.point.x, s.point.y, s.point.z])
        .collect())
}

/// Catmull-Rom spline as a line strip coloured by position (`p / 2 + 0.5`).
pub fn catmull_rom_line(control: &[Point3<f32>], segments_per_span: u32) -> Result<Mesh> {
    let vertices = catmull_rom_samples(control, segments_per_span)?
        .iter()
        .flat_map(|s| {
            let p = s.point;
            [p.x, p.y, p.z, p.x / 2.0 + 0.5, p.y / 2.0 + 0.5, p.z / 2.0 + 0.5]
        })
        .collect();
    Mesh::line_strip(vertices, VertexLayout::PositionColor)
}

/// Clamped knot vector of length `n + degree + 1`:
/// `degree + 1` zeros, then `1, 2, ...`, then `degree + 1` copies of
/// `n - degree`.
pub fn clamped_knot_vector(n: usize, degree: usize) -> Vec<f32> {
    (0..n + degree + 1)
        .map(|i| {
            if i < degree + 1 {
                0.0
            } else if i >= n {
                (n - degree) as f32
            } else {
                (i - degree) as f32
            }
        })
        .collect()
}

/// All basis values `N(i, degree)` at `t`, built bottom-up with the
/// Cox-de Boor recurrence. Terms whose knot span is empty contribute zero.
fn basis_functions(knots: &[f32], degree: usize, t: f32) -> Vec<f32> {
    let spans = knots.len() - 1;
    let mut n: Vec<f32> = (0..spans)
        .map(|i| {
            if knots[i] <= t && t < knots[i + 1] {
                1.0
            } else {
                0.0
            }
        })
        .collect();

    for j in 1..=degree {
        let next: Vec<f32> = (0..spans - j)
            .map(|i| {
                let den1 = knots[i + j] - knots[i];
                let den2 = knots[i + j + 1] - knots[i + 1];
                let term1 = if den1 != 0.0 {
                    (t - knots[i]) / den1 * n[i]
                } else {
                    0.0
                };
                let term2 = if den2 != 0.0 {
                    (knots[i + j + 1] - t) / den2 * n[i + 1]
                } else {
                    0.0
                };
                term1 + term2
            })
            .collect();
        n = next;
    }
    n
}

/// Clamped B-spline of the given degree, flat `[x, y]*` output.
///
/// Sample `k` of `sample_count` evaluates the curve at
/// `knot[degree] + k / sample_count * (knot[n] - knot[degree])`, so the
/// first sample is exactly `control[0]` and the parameter stops one step
/// short of the end knot.
pub fn b_spline(control: &[Point2<f32>], sample_count: u32, degree: usize) -> Result<Vec<f32>> {
    let n = control.len();
    ensure(degree >= 1, || "b-spline degree must be at least 1".into())?;
    ensure(n > degree, || {
        format!("degree {degree} b-spline needs more than {degree} control points, got {n}")
    })?;
    ensure(sample_count >= 1, || "b-spline needs at least one sample".into())?;

    let knots = clamped_knot_vector(n, degree);
    let (start, end) = (knots[degree], knots[n]);

    let mut points = Vec::with_capacity(sample_count as usize * 2);
    for k in 0..sample_count {
        let t = k as f32 / sample_count as f32 * (end - start) + start;
        let basis = basis_functions(&knots, degree, t);
        let (x, y) = control
            .iter()
            .zip(&basis)
            .fold((0.0, 0.0), |(x, y), (p, w)| (x + p.x * w, y + p.y * w));
        points.push(x);
        points.push(y);
    }

    debug!(n, degree, samples = sample_count, "sampled b-spline");
    Ok(points)
}

/// Flat `[x, y]*` curve as a single-colour 2D line strip.
pub fn polyline_mesh_2d(points: &[f32], color: [f32; 3]) -> Result<Mesh> {
    ensure(points.len() % 2 == 0, || {
        format!("2D polyline needs an even number of floats, got {}", points.len())
    })?;
    let vertices = points
        .chunks_exact(2)
        .flat_map(|p| [p[0], p[1], color[0], color[1], color[2]])
        .collect();
    Mesh::line_strip(vertices, VertexLayout::Position2Color)
}

/// Graph of `y = f(x)` for `x` in `[0, 1]`, mapped to clip space
/// (`2v - 1` on both axes) and drawn in yellow.
pub fn function_graph(f: impl Fn(f32) -> f32, num_points: u32) -> Result<Mesh> {
    ensure(num_points >= 1, || "function graph needs at least one step".into())?;
    let points: Vec<f32> = (0..=num_points)
        .flat_map(|i| {
            let x = i as f32 / num_points as f32;
            [x * 2.0 - 1.0, f(x) * 2.0 - 1.0]
        })
        .collect();
    polyline_mesh_2d(&points, [1.0, 1.0, 0.0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::geometry::Topology;

    const EPS: f32 = 1e-5;

    fn p2(x: f32, y: f32) -> Point2<f32> {
        Point2::new(x, y)
    }

    fn p3(x: f32, y: f32, z: f32) -> Point3<f32> {
        Point3::new(x, y, z)
    }

    #[test]
    fn test_bezier_endpoints() {
        let control = [p2(0.0, 0.0), p2(0.0, 1.0), p2(1.0, 1.0), p2(1.0, 0.0)];
        let points = cubic_bezier(&control, 2).unwrap();
        assert_eq!(points.len(), 6);
        assert_eq!(&points[0..2], &[0.0, 0.0]);
        assert_eq!(&points[4..6], &[1.0, 0.0]);
        // Symmetric handles put the midpoint at (0.5, 0.75)
        assert!((points[2] - 0.5).abs() < EPS);
        assert!((points[3] - 0.75).abs() < EPS);
    }

    #[test]
    fn test_bezier_rejects_zero_segments() {
        let control = [p2(0.0, 0.0); 4];
        assert!(matches!(cubic_bezier(&control, 0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_catmull_rom_interpolates_control_points() {
        let control = [p3(0.0, 0.0, 0.0), p3(1.0, 1.0, 0.0), p3(2.0, 0.0, 0.0)];
        let segments = 4;
        let samples = catmull_rom_samples(&control, segments).unwrap();
        let per_span = segments as usize + 1;
        assert_eq!(samples.len(), 2 * per_span);

        assert!((samples[0].point - control[0]).norm() < EPS);
        // Span boundary: end of span 0 and start of span 1 are both (1, 1, 0)
        assert!((samples[per_span - 1].point - control[1]).norm() < EPS);
        assert!((samples[per_span].point - control[1]).norm() < EPS);
        assert!((samples[2 * per_span - 1].point - control[2]).norm() < EPS);
    }

    #[test]
    fn test_catmull_rom_tangent_is_derivative() {
        let control = [
            p3(-4.0, 1.0, 0.0),
            p3(-2.0, -1.0, 0.0),
            p3(0.0, 1.5, 0.0),
            p3(2.0, -1.0, 0.5),
        ];
        let samples = catmull_rom_samples(&control, 200).unwrap();
        // Central difference inside span 1; dt = 1/200
        let (a, mid, b) = (samples[201 + 99], samples[201 + 100], samples[201 + 101]);
        let numeric = (b.point - a.point) / (2.0 / 200.0);
        assert!((numeric - mid.tangent).norm() < 1e-2);
    }

    #[test]
    fn test_catmull_rom_flat_and_line() {
        let control = [p3(0.0, 0.0, 0.0), p3(1.0, 0.0, 0.0)];
        let flat = catmull_rom_spline(&control, 3).unwrap();
        assert_eq!(flat.len(), 4 * 3);

        let line = catmull_rom_line(&control, 3).unwrap();
        assert_eq!(line.topology(), Topology::LineStrip);
        assert_eq!(line.vertex_count(), 4);
        assert_eq!(line.color(0), Some([0.5, 0.5, 0.5]));
    }

    #[test]
    fn test_catmull_rom_rejects_short_input() {
        assert!(catmull_rom_samples(&[p3(0.0, 0.0, 0.0)], 10).is_err());
        assert!(catmull_rom_samples(&[], 10).is_err());
        assert!(catmull_rom_samples(&[p3(0.0, 0.0, 0.0), p3(1.0, 0.0, 0.0)], 0).is_err());
    }

    #[test]
    fn test_knot_vector() {
        assert_eq!(clamped_knot_vector(5, 2), vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0]);
        assert_eq!(clamped_knot_vector(2, 1), vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_basis_partition_of_unity() {
        let knots = clamped_knot_vector(6, 3);
        for step in 0..30 {
            let t = step as f32 / 10.0;
            let sum: f32 = basis_functions(&knots, 3, t).iter().sum();
            assert!((sum - 1.0).abs() < EPS, "t = {t}: {sum}");
        }
    }

    #[test]
    fn test_b_spline_starts_on_first_control_point() {
        let control = [p2(-0.8, -0.5), p2(-0.4, 0.6), p2(0.2, -0.6), p2(0.7, 0.4), p2(0.9, -0.2)];
        let points = b_spline(&control, 100, 2).unwrap();
        assert_eq!(points.len(), 200);
        assert!((points[0] + 0.8).abs() < EPS);
        assert!((points[1] + 0.5).abs() < EPS);
    }

    #[test]
    fn test_b_spline_degree_one_is_polyline() {
        let control = [p2(0.0, 0.0), p2(1.0, 2.0), p2(2.0, 0.0)];
        let points = b_spline(&control, 4, 1).unwrap();
        // t = 0, 0.5, 1, 1.5
        let expected = [0.0, 0.0, 0.5, 1.0, 1.0, 2.0, 1.5, 1.0];
        for (got, want) in points.iter().zip(expected) {
            assert!((got - want).abs() < EPS);
        }
    }

    #[test]
    fn test_b_spline_preconditions() {
        let control = [p2(0.0, 0.0), p2(1.0, 1.0)];
        assert!(b_spline(&control, 10, 2).is_err());
        assert!(b_spline(&control, 10, 0).is_err());
        assert!(b_spline(&control, 0, 1).is_err());
    }

    #[test]
    fn test_function_graph() {
        let graph = function_graph(|x| x * x, 10).unwrap();
        assert_eq!(graph.vertex_count(), 11);
        assert_eq!(graph.layout(), VertexLayout::Position2Color);
        assert_eq!(graph.position(0), p3(-1.0, -1.0, 0.0));
        assert_eq!(graph.position(10), p3(1.0, 1.0, 0.0));
        let mid = graph.position(5);
        assert!((mid.y - (-0.5)).abs() < EPS);
        assert_eq!(graph.color(3), Some([1.0, 1.0, 0.0]));
    }

    #[test]
    fn test_polyline_rejects_odd_input() {
        assert!(polyline_mesh_2d(&[0.0, 1.0, 2.0], [1.0; 3]).is_err());
    }
}
