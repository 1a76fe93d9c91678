//! # Tube Sweep
//!
//! Sweeps a circle along a Catmull-Rom spline. Each spline sample gets a
//! frame (normal, binormal) perpendicular to its tangent, a ring of
//! `radial_segments + 1` points is placed in that plane, and consecutive
//! rings are stitched with the same grid triangulation as the surfaces.
//!
//! Two frame strategies are available. [`FrameStrategy::UpVector`] crosses
//! the tangent with a fixed up vector, switching to `+X` when the tangent
//! is nearly vertical. The switch is abrupt, so curves passing close to
//! vertical can show a visible twist. [`FrameStrategy::RotationMinimizing`]
//! propagates the first frame with the double reflection method instead.

use std::f32::consts::PI;

use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::curve::{catmull_rom_samples, SplineSample};
use crate::error::{ensure, Error, Result};
use crate::geometry::{Mesh, Topology, VertexLayout};
use crate::surface::{check_grid, grid_indices};

/// `|tangent.y|` above which the up vector becomes `+X`.
pub const UP_SWITCH_THRESHOLD: f32 = 0.999;

/// Tangents shorter than this cannot orient a ring.
const TANGENT_EPSILON: f32 = 1e-6;

/// Squared distance under which two samples count as the same point.
const COINCIDENT_EPSILON: f32 = 1e-8;

const UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);
const ALTERNATE_UP: Vector3<f32> = Vector3::new(1.0, 0.0, 0.0);

/// How ring orientation is chosen along the sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameStrategy {
    /// Cross the tangent with a fixed reference vector per sample.
    #[default]
    UpVector,
    /// Carry the first frame along the curve by double reflection.
    RotationMinimizing,
}

/// Orthonormal ring frame at one spline sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub point: Point3<f32>,
    pub tangent: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub binormal: Vector3<f32>,
}

fn unit_tangents(samples: &[SplineSample]) -> Result<Vec<Vector3<f32>>> {
    samples
        .iter()
        .enumerate()
        .map(|(index, s)| {
            let length = s.tangent.norm();
            if length < TANGENT_EPSILON {
                Err(Error::DegenerateTangent { index })
            } else {
                Ok(s.tangent / length)
            }
        })
        .collect()
}

fn reference_for(tangent: &Vector3<f32>) -> Vector3<f32> {
    if tangent.y.abs() > UP_SWITCH_THRESHOLD {
        ALTERNATE_UP
    } else {
        UP
    }
}

fn up_vector_normal(tangent: &Vector3<f32>) -> Vector3<f32> {
    tangent.cross(&reference_for(tangent)).normalize()
}

/// Ring frames for every sample, failing on the first zero tangent.
pub fn sweep_frames(samples: &[SplineSample], strategy: FrameStrategy) -> Result<Vec<Frame>> {
    let tangents = unit_tangents(samples)?;
    let mut frames = Vec::with_capacity(samples.len());

    match strategy {
        FrameStrategy::UpVector => {
            let mut previous_reference = None;
            for (i, (sample, tangent)) in samples.iter().zip(&tangents).enumerate() {
                let reference = reference_for(tangent);
                if previous_reference.is_some_and(|r| r != reference) {
                    debug!(sample = i, ?reference, "tube sweep switched reference vector");
                }
                previous_reference = Some(reference);

                let normal = up_vector_normal(tangent);
                frames.push(Frame {
                    point: sample.point,
                    tangent: *tangent,
                    normal,
                    binormal: tangent.cross(&normal),
                });
            }
        }
        FrameStrategy::RotationMinimizing => {
            let mut normal = up_vector_normal(&tangents[0]);
            frames.push(Frame {
                point: samples[0].point,
                tangent: tangents[0],
                normal,
                binormal: tangents[0].cross(&normal),
            });

            for i in 0..samples.len() - 1 {
                let (t0, t1) = (tangents[i], tangents[i + 1]);

                // Span boundaries repeat a sample; keep the frame there.
                let v1 = samples[i + 1].point - samples[i].point;
                let c1 = v1.dot(&v1);
                let r = if c1 < COINCIDENT_EPSILON {
                    normal
                } else {
                    // Reflect across the plane bisecting the two sample points
                    let r_l = normal - (2.0 / c1) * v1.dot(&normal) * v1;
                    let t_l = t0 - (2.0 / c1) * v1.dot(&t0) * v1;

                    // Second reflection lines the reflected tangent up with t1
                    let v2 = t1 - t_l;
                    let c2 = v2.dot(&v2);
                    if c2 > 0.0 {
                        r_l - (2.0 / c2) * v2.dot(&r_l) * v2
                    } else {
                        r_l
                    }
                };

                normal = (r - r.dot(&t1) * t1).normalize();
                frames.push(Frame {
                    point: samples[i + 1].point,
                    tangent: t1,
                    normal,
                    binormal: t1.cross(&normal),
                });
            }
        }
    }
    Ok(frames)
}

/// Tube of `radius` around the Catmull-Rom spline through `control`, using
/// the up-vector frame.
pub fn tube_from_spline(
    control: &[Point3<f32>],
    segments: u32,
    radius: f32,
    radial_segments: u32,
) -> Result<Mesh> {
    tube_from_spline_with(control, segments, radius, radial_segments, FrameStrategy::default())
}

/// Tube sweep with an explicit frame strategy.
///
/// Vertex layout is `PositionColor`; ring `i`, radial sample `j` is coloured
/// `(j / radial_segments, i / ring_count, 0.5)`.
pub fn tube_from_spline_with(
    control: &[Point3<f32>],
    segments: u32,
    radius: f32,
    radial_segments: u32,
    strategy: FrameStrategy,
) -> Result<Mesh> {
    ensure(radius.is_finite() && radius > 0.0, || {
        format!("tube radius must be positive, got {radius}")
    })?;
    ensure(radial_segments >= 1, || "tube needs at least one radial segment".into())?;

    let samples = catmull_rom_samples(control, segments)?;
    let frames = sweep_frames(&samples, strategy)?;

    let rings = frames.len();
    let rows = u32::try_from(rings - 1)
        .map_err(|_| Error::InvalidArgument(format!("{rings} tube rings overflow u32")))?;
    check_grid("tube", rows, radial_segments)?;

    let mut vertices =
        Vec::with_capacity(rings * (radial_segments as usize + 1) * VertexLayout::PositionColor.stride());
    for (i, frame) in frames.iter().enumerate() {
        for j in 0..=radial_segments {
            let theta = j as f32 / radial_segments as f32 * 2.0 * PI;
            let offset = radius * (theta.cos() * frame.normal + theta.sin() * frame.binormal);
            let p = frame.point + offset;
            vertices.extend_from_slice(&[
                p.x,
                p.y,
                p.z,
                j as f32 / radial_segments as f32,
                i as f32 / rings as f32,
                0.5,
            ]);
        }
    }

    let indices = grid_indices(rows, radial_segments);
    debug!(
        rings,
        vertices = vertices.len() / 6,
        indices = indices.len(),
        ?strategy,
        "generated tube"
    );
    Mesh::new(vertices, indices, VertexLayout::PositionColor, Topology::Triangles)
}
