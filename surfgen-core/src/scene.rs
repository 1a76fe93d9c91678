//! # Scene Composition
//!
//! A flat arena of [`Part`]s under one root matrix. Each part's world
//! matrix is `multiply(local, root)`: the local placement is applied first,
//! then the whole-object rotation. The presentation layer walks
//! [`Scene::draw_list`] once per frame and resolves meshes, materials and
//! textures into its own resources.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::geometry::Mesh;
use crate::transform::{identity, multiply, normal_matrix, Mat4};

/// Name of an image the presentation layer loads and binds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureRef(pub String);

impl TextureRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Phong material properties
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    pub texture: Option<TextureRef>,
}

impl Material {
    pub const fn new(ambient: [f32; 3], diffuse: [f32; 3], specular: [f32; 3], shininess: f32) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            shininess,
            texture: None,
        }
    }

    /// Unlit colour, for meshes that carry their own vertex colours.
    pub const fn flat(color: [f32; 3]) -> Self {
        Self::new(color, color, [0.0; 3], 1.0)
    }

    pub fn with_texture(mut self, texture: TextureRef) -> Self {
        self.texture = Some(texture);
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::flat([1.0; 3])
    }
}

/// A named mesh placed in the scene
#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    mesh: Arc<Mesh>,
    material: Material,
    /// Placement relative to the scene root; mutable between frames.
    pub local: Mat4,
}

impl Part {
    pub fn new(name: impl Into<String>, mesh: Arc<Mesh>, material: Material, local: Mat4) -> Self {
        Self {
            name: name.into(),
            mesh,
            material,
            local,
        }
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// World matrix under `parent`.
    pub fn world(&self, parent: &Mat4) -> Mat4 {
        multiply(&self.local, parent)
    }
}

/// Index of a part inside its [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(usize);

impl PartId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Matrices for drawing one part this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub part: PartId,
    pub world: Mat4,
    /// Inverse-transpose of `world`, for normals.
    pub normal: Mat4,
}

/// Ordered parts plus the root matrix
#[derive(Debug, Clone)]
pub struct Scene {
    parts: Vec<Part>,
    root: Mat4,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            root: identity(),
        }
    }

    pub fn add_part(&mut self, part: Part) -> PartId {
        let id = PartId(self.parts.len());
        debug!(
            id = id.0,
            name = %part.name,
            vertices = part.mesh.vertex_count(),
            "added part"
        );
        self.parts.push(part);
        id
    }

    pub fn part(&self, id: PartId) -> Option<&Part> {
        self.parts.get(id.0)
    }

    pub fn part_mut(&mut self, id: PartId) -> Option<&mut Part> {
        self.parts.get_mut(id.0)
    }

    /// Replace a part's local matrix. Returns `false` for an unknown id.
    pub fn set_transform(&mut self, id: PartId, local: Mat4) -> bool {
        match self.parts.get_mut(id.0) {
            Some(part) => {
                part.local = local;
                true
            }
            None => false,
        }
    }

    pub fn find(&self, name: &str) -> Option<PartId> {
        self.parts.iter().position(|p| p.name == name).map(PartId)
    }

    pub fn parts(&self) -> impl Iterator<Item = (PartId, &Part)> {
        self.parts.iter().enumerate().map(|(i, p)| (PartId(i), p))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn root(&self) -> &Mat4 {
        &self.root
    }

    pub fn set_root(&mut self, root: Mat4) {
        self.root = root;
    }

    /// World and normal matrices for every part, in insertion order.
    ///
    /// Fails with `SingularMatrix` if any world matrix cannot be inverted.
    pub fn draw_list(&self) -> Result<Vec<DrawItem>> {
        self.parts()
            .map(|(id, part)| {
                let world = part.world(&self.root);
                Ok(DrawItem {
                    part: id,
                    world,
                    normal: normal_matrix(&world)?,
                })
            })
            .collect()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
