/// Flat, interleaved mesh buffers as handed to the presentation layer
use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};

/// Per-vertex attribute layout of a [`Mesh`]'s interleaved float buffer.
///
/// The presentation layer's attribute pointers must match this exactly;
/// there is no schema embedded in the buffer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLayout {
    /// `x y z`
    Position,
    /// `x y z r g b`
    PositionColor,
    /// `x y z nx ny nz`
    PositionNormal,
    /// `x y z nx ny nz u v`
    PositionNormalUv,
    /// `x y r g b`, used by the flat 2D curve demos
    Position2Color,
}

impl VertexLayout {
    /// Floats per vertex.
    pub fn stride(self) -> usize {
        match self {
            VertexLayout::Position => 3,
            VertexLayout::PositionColor | VertexLayout::PositionNormal => 6,
            VertexLayout::PositionNormalUv => 8,
            VertexLayout::Position2Color => 5,
        }
    }

    pub fn position_components(self) -> usize {
        match self {
            VertexLayout::Position2Color => 2,
            _ => 3,
        }
    }

    pub fn color_offset(self) -> Option<usize> {
        match self {
            VertexLayout::PositionColor => Some(3),
            VertexLayout::Position2Color => Some(2),
            _ => None,
        }
    }

    pub fn normal_offset(self) -> Option<usize> {
        match self {
            VertexLayout::PositionNormal | VertexLayout::PositionNormalUv => Some(3),
            _ => None,
        }
    }

    pub fn uv_offset(self) -> Option<usize> {
        match self {
            VertexLayout::PositionNormalUv => Some(6),
            _ => None,
        }
    }
}

/// How the index buffer is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Indices grouped in triples
    Triangles,
    /// Indices consumed sequentially as a connected polyline
    LineStrip,
}

/// Immutable vertex/index buffer pair.
///
/// Invariants, checked by [`Mesh::new`]:
/// - `vertices.len()` is a multiple of the layout stride
/// - every index is below the vertex count
/// - triangle meshes carry a multiple of three indices
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<f32>,
    indices: Vec<u32>,
    layout: VertexLayout,
    topology: Topology,
}

impl Mesh {
    pub fn new(
        vertices: Vec<f32>,
        indices: Vec<u32>,
        layout: VertexLayout,
        topology: Topology,
    ) -> Result<Self> {
        let mesh = Self {
            vertices,
            indices,
            layout,
            topology,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Polyline through every vertex in order.
    pub fn line_strip(vertices: Vec<f32>, layout: VertexLayout) -> Result<Self> {
        let count = vertices.len() / layout.stride();
        let count = u32::try_from(count)
            .map_err(|_| Error::InvalidMesh(format!("{count} vertices overflow u32 indices")))?;
        Self::new(vertices, (0..count).collect(), layout, Topology::LineStrip)
    }

    pub fn validate(&self) -> Result<()> {
        let stride = self.layout.stride();
        if self.vertices.len() % stride != 0 {
            return Err(Error::InvalidMesh(format!(
                "{} floats is not a whole number of {:?} vertices",
                self.vertices.len(),
                self.layout
            )));
        }
        if self.topology == Topology::Triangles && self.indices.len() % 3 != 0 {
            return Err(Error::InvalidMesh(format!(
                "{} indices do not form whole triangles",
                self.indices.len()
            )));
        }
        let count = self.vertex_count();
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(Error::InvalidMesh(format!(
                "index {bad} out of range for {count} vertices"
            )));
        }
        Ok(())
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn stride(&self) -> usize {
        self.layout.stride()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.stride()
    }

    pub fn triangle_count(&self) -> usize {
        match self.topology {
            Topology::Triangles => self.indices.len() / 3,
            Topology::LineStrip => 0,
        }
    }

    pub fn into_parts(self) -> (Vec<f32>, Vec<u32>) {
        (self.vertices, self.indices)
    }

    fn vertex(&self, i: usize) -> &[f32] {
        let stride = self.stride();
        &self.vertices[i * stride..(i + 1) * stride]
    }

    /// Position of vertex `i`; 2D layouts report `z = 0`.
    pub fn position(&self, i: usize) -> Point3<f32> {
        let v = self.vertex(i);
        match self.layout.position_components() {
            2 => Point3::new(v[0], v[1], 0.0),
            _ => Point3::new(v[0], v[1], v[2]),
        }
    }

    pub fn color(&self, i: usize) -> Option<[f32; 3]> {
        let offset = self.layout.color_offset()?;
        let v = self.vertex(i);
        Some([v[offset], v[offset + 1], v[offset + 2]])
    }

    pub fn normal(&self, i: usize) -> Option<Vector3<f32>> {
        let offset = self.layout.normal_offset()?;
        let v = self.vertex(i);
        Some(Vector3::new(v[offset], v[offset + 1], v[offset + 2]))
    }

    pub fn uv(&self, i: usize) -> Option<[f32; 2]> {
        let offset = self.layout.uv_offset()?;
        let v = self.vertex(i);
        Some([v[offset], v[offset + 1]])
    }

    /// Index triples of a triangle mesh; empty for line strips.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        let triples: &[u32] = match self.topology {
            Topology::Triangles => self.indices.as_slice(),
            Topology::LineStrip => &[],
        };
        triples.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Unnormalized face normal from the winding of `tri`.
    pub fn face_normal(&self, tri: [u32; 3]) -> Vector3<f32> {
        let v0 = self.position(tri[0] as usize);
        let v1 = self.position(tri[1] as usize);
        let v2 = self.position(tri[2] as usize);
        (v1 - v0).cross(&(v2 - v0))
    }

    /// The coloured cube of the first exercise: 8 shared corners in
    /// `[-size/2, size/2]`, each coloured by its corner, 12 triangles.
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        #[rustfmt::skip]
        let corners: [[f32; 6]; 8] = [
            [-1.0, -1.0, -1.0, 0.0, 0.0, 0.0],
            [ 1.0, -1.0, -1.0, 1.0, 0.0, 0.0],
            [ 1.0,  1.0, -1.0, 1.0, 1.0, 0.0],
            [-1.0,  1.0, -1.0, 0.0, 1.0, 0.0],
            [-1.0, -1.0,  1.0, 0.0, 0.0, 1.0],
            [ 1.0, -1.0,  1.0, 1.0, 0.0, 1.0],
            [ 1.0,  1.0,  1.0, 1.0, 1.0, 1.0],
            [-1.0,  1.0,  1.0, 0.0, 1.0, 1.0],
        ];
        let vertices = corners
            .iter()
            .flat_map(|c| [c[0] * half, c[1] * half, c[2] * half, c[3], c[4], c[5]])
            .collect();

        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2,  0, 2, 3,
            4, 5, 6,  4, 6, 7,
            0, 3, 7,  0, 4, 7,
            1, 2, 6,  1, 5, 6,
            2, 3, 6,  3, 7, 6,
            0, 1, 5,  0, 4, 5,
        ];

        Self {
            vertices,
            indices,
            layout: VertexLayout::PositionColor,
            topology: Topology::Triangles,
        }
    }
}
