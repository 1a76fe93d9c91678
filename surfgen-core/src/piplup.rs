//! The Piplup penguin, assembled from ellipsoids.
//!
//! [`build`] is the lit model: normals, UVs and Phong materials, with the
//! head textured. [`build_with_paraboloid_beak`] is the earlier vertex
//! coloured version whose beak is two elliptic paraboloids.

use std::sync::Arc;

use crate::error::Result;
use crate::geometry::Mesh;
use crate::scene::{Material, Part, Scene, TextureRef};
use crate::surface::{elliptic_paraboloid, sphere_with, SphereAttributes};
use crate::transform::{deg_to_rad, identity, rotate_x, rotate_y, rotate_z, translation, Mat4};

/// Image the head part samples
pub const HEAD_TEXTURE: &str = "piplup_head_texture.png";

pub const BODY: Material = Material::new([0.3, 0.5, 0.8], [0.52, 0.80, 1.00], [0.7, 0.7, 0.8], 32.0);
pub const HEAD: Material = Material::new([0.1, 0.2, 0.4], [0.20, 0.38, 0.64], [0.5, 0.5, 0.6], 20.0);
pub const BEAK: Material = Material::new([0.6, 0.4, 0.0], [1.00, 0.84, 0.00], [0.9, 0.9, 0.7], 64.0);
pub const EYE_WHITE: Material = Material::new([0.7, 0.7, 0.7], [1.00, 1.00, 1.00], [1.0, 1.0, 1.0], 128.0);
pub const EYE_PUPIL: Material = Material::new([0.0, 0.0, 0.0], [0.1, 0.1, 0.1], [0.8, 0.8, 0.8], 128.0);
pub const FEET: Material = Material::new([0.6, 0.3, 0.0], [1.00, 0.65, 0.00], [0.8, 0.7, 0.5], 16.0);

/// Sphere resolution preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PiplupDetail {
    /// The resolutions the model was authored with.
    #[default]
    Full,
    /// At most 16 stacks and steps per part, for software rendering.
    Preview,
}

impl PiplupDetail {
    fn resolution(self, full: u32) -> u32 {
        match self {
            PiplupDetail::Full => full,
            PiplupDetail::Preview => full.min(16),
        }
    }
}

struct Builder {
    scene: Scene,
    detail: PiplupDetail,
    attributes: fn(&Material) -> SphereAttributes,
}

impl Builder {
    fn ellipsoid(&self, radii: [f32; 3], resolution: u32, material: &Material) -> Result<Arc<Mesh>> {
        let n = self.detail.resolution(resolution);
        let mesh = sphere_with(radii[0], radii[1], radii[2], n, n, (self.attributes)(material))?;
        Ok(Arc::new(mesh))
    }

    fn add(&mut self, name: &str, mesh: &Arc<Mesh>, material: &Material, local: Mat4) {
        self.scene
            .add_part(Part::new(name, Arc::clone(mesh), material.clone(), local));
    }
}

fn lit(_: &Material) -> SphereAttributes {
    SphereAttributes::NormalUv
}

fn vertex_colored(material: &Material) -> SphereAttributes {
    SphereAttributes::Color(material.diffuse)
}

/// Flipper placement: roll about Z, then pitch back 10 degrees.
fn flipper(x: f32, roll_degrees: f32) -> Mat4 {
    let mut m = translation(x, 0.3, -0.2);
    rotate_z(&mut m, deg_to_rad(roll_degrees));
    rotate_x(&mut m, deg_to_rad(-10.0));
    m
}

/// The lit Piplup: 12 parts, materials from the palette above.
pub fn build(detail: PiplupDetail) -> Result<Scene> {
    let mut b = Builder {
        scene: Scene::new(),
        detail,
        attributes: lit,
    };

    let head_material = HEAD.clone().with_texture(TextureRef::new(HEAD_TEXTURE));

    let body = b.ellipsoid([1.0, 1.2, 1.0], 100, &BODY)?;
    let head = b.ellipsoid([0.8, 0.8, 0.8], 20, &HEAD)?;
    let eye = b.ellipsoid([0.2, 0.2, 0.1], 50, &EYE_WHITE)?;
    let pupil = b.ellipsoid([0.1, 0.1, 0.1], 50, &EYE_PUPIL)?;
    let upper_beak = b.ellipsoid([0.2, 0.1, 0.4], 50, &BEAK)?;
    let lower_beak = b.ellipsoid([0.2, 0.1, 0.3], 50, &BEAK)?;
    let foot = b.ellipsoid([0.4, 0.15, 0.5], 50, &FEET)?;
    let flipper_mesh = b.ellipsoid([0.2, 0.7, 0.5], 15, &HEAD)?;

    b.add("body", &body, &BODY, identity());
    b.add("head", &head, &head_material, translation(0.0, 1.5, 0.0));
    b.add("eye_left", &eye, &EYE_WHITE, translation(-0.3, 1.6, 0.7));
    b.add("eye_right", &eye, &EYE_WHITE, translation(0.3, 1.6, 0.7));
    b.add("pupil_left", &pupil, &EYE_PUPIL, translation(-0.3, 1.6, 0.8));
    b.add("pupil_right", &pupil, &EYE_PUPIL, translation(0.3, 1.6, 0.8));
    b.add("beak_upper", &upper_beak, &BEAK, translation(0.0, 1.3, 0.8));
    b.add("beak_lower", &lower_beak, &BEAK, translation(0.0, 1.15, 0.7));
    b.add("foot_left", &foot, &FEET, translation(-0.5, -1.2, 0.2));
    b.add("foot_right", &foot, &FEET, translation(0.5, -1.2, 0.2));
    b.add("flipper_left", &flipper_mesh, &HEAD, flipper(-0.9, -20.0));
    b.add("flipper_right", &flipper_mesh, &HEAD, flipper(0.9, 20.0));

    Ok(b.scene)
}

/// The earlier vertex-coloured Piplup with paraboloid beak halves.
pub fn build_with_paraboloid_beak(detail: PiplupDetail) -> Result<Scene> {
    let mut b = Builder {
        scene: Scene::new(),
        detail,
        attributes: vertex_colored,
    };

    let [body_c, head_c, beak_c, eye_c, feet_c] =
        [&BODY, &HEAD, &BEAK, &EYE_WHITE, &FEET].map(|m| Material::flat(m.diffuse));
    let pupil_c = Material::flat([0.0; 3]);

    let body = b.ellipsoid([1.0, 1.2, 1.0], 20, &body_c)?;
    let head = b.ellipsoid([0.8, 0.8, 0.8], 20, &head_c)?;
    let eye = b.ellipsoid([0.2, 0.2, 0.1], 10, &eye_c)?;
    let pupil = b.ellipsoid([0.1, 0.1, 0.1], 10, &pupil_c)?;
    let foot = b.ellipsoid([0.4, 0.15, 0.5], 10, &feet_c)?;
    let flipper_mesh = b.ellipsoid([0.2, 0.7, 0.5], 15, &head_c)?;

    let beak_segments = detail.resolution(20);
    let upper_beak = Arc::new(elliptic_paraboloid(0.3, 0.2, 0.5, beak_segments, beak_c.diffuse)?);
    let lower_beak = Arc::new(elliptic_paraboloid(0.25, 0.15, 0.4, beak_segments, beak_c.diffuse)?);

    let mut upper_local = translation(0.0, 1.3, 1.2);
    rotate_x(&mut upper_local, deg_to_rad(-15.0));
    rotate_y(&mut upper_local, deg_to_rad(180.0));
    let mut lower_local = translation(0.0, 1.15, 0.7);
    rotate_x(&mut lower_local, deg_to_rad(5.0));

    b.add("body", &body, &body_c, identity());
    b.add("head", &head, &head_c, translation(0.0, 1.5, 0.0));
    b.add("eye_left", &eye, &eye_c, translation(-0.3, 1.6, 0.7));
    b.add("eye_right", &eye, &eye_c, translation(0.3, 1.6, 0.7));
    b.add("pupil_left", &pupil, &pupil_c, translation(-0.3, 1.6, 0.8));
    b.add("pupil_right", &pupil, &pupil_c, translation(0.3, 1.6, 0.8));
    b.add("beak_upper", &upper_beak, &beak_c, upper_local);
    b.add("beak_lower", &lower_beak, &beak_c, lower_local);
    b.add("foot_left", &foot, &feet_c, translation(-0.5, -1.2, 0.2));
    b.add("foot_right", &foot, &feet_c, translation(0.5, -1.2, 0.2));
    // Rolled outwards the other way round in this version
    b.add("flipper_left", &flipper_mesh, &head_c, flipper(-0.9, 20.0));
    b.add("flipper_right", &flipper_mesh, &head_c, flipper(0.9, -20.0));

    Ok(b.scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::VertexLayout;

    #[test]
    fn test_lit_piplup_parts() {
        let scene = build(PiplupDetail::Preview).unwrap();
        assert_eq!(scene.len(), 12);

        let head = scene.part(scene.find("head").unwrap()).unwrap();
        assert_eq!(head.material().texture, Some(TextureRef::new(HEAD_TEXTURE)));
        assert_eq!(head.mesh().layout(), VertexLayout::PositionNormalUv);
        assert_eq!(head.local.as_slice()[13], 1.5);

        let body = scene.part(scene.find("body").unwrap()).unwrap();
        assert_eq!(body.material(), &BODY);
        // Preview caps the 100x100 body at 16x16
        assert_eq!(body.mesh().vertex_count(), 17 * 17);
    }

    #[test]
    fn test_full_detail_resolutions() {
        let scene = build(PiplupDetail::Full).unwrap();
        let body = scene.part(scene.find("body").unwrap()).unwrap();
        assert_eq!(body.mesh().vertex_count(), 101 * 101);
        let flipper = scene.part(scene.find("flipper_left").unwrap()).unwrap();
        assert_eq!(flipper.mesh().vertex_count(), 16 * 16);
    }

    #[test]
    fn test_mirrored_parts_share_meshes() {
        let scene = build(PiplupDetail::Preview).unwrap();
        for (left, right) in [("eye_left", "eye_right"), ("foot_left", "foot_right")] {
            let l = scene.part(scene.find(left).unwrap()).unwrap();
            let r = scene.part(scene.find(right).unwrap()).unwrap();
            assert!(Arc::ptr_eq(l.mesh(), r.mesh()));
            assert_eq!(l.local.as_slice()[12], -r.local.as_slice()[12]);
        }
    }

    #[test]
    fn test_flippers_are_mirrored_rolls() {
        let scene = build(PiplupDetail::Preview).unwrap();
        let left = scene.part(scene.find("flipper_left").unwrap()).unwrap().local;
        let right = scene.part(scene.find("flipper_right").unwrap()).unwrap().local;
        // Mirroring across X flips the sign of the x row and column off-diagonals
        assert!((left[(0, 1)] + right[(0, 1)]).abs() < 1e-6);
        assert!((left[(1, 1)] - right[(1, 1)]).abs() < 1e-6);
        assert_eq!(left[(1, 3)], 0.3);
    }

    #[test]
    fn test_draw_list_is_complete() {
        let mut scene = build(PiplupDetail::Preview).unwrap();
        scene.set_root(translation(0.0, 0.0, -2.0));
        let items = scene.draw_list().unwrap();
        assert_eq!(items.len(), 12);
        for item in &items {
            let local = scene.part(item.part).unwrap().local;
            assert!((item.world.as_slice()[14] - (local.as_slice()[14] - 2.0)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_classic_piplup() {
        let scene = build_with_paraboloid_beak(PiplupDetail::Full).unwrap();
        assert_eq!(scene.len(), 12);

        let beak = scene.part(scene.find("beak_upper").unwrap()).unwrap();
        assert_eq!(beak.mesh().vertex_count(), 22);
        assert_eq!(beak.mesh().color(0), Some(BEAK.diffuse));

        let body = scene.part(scene.find("body").unwrap()).unwrap();
        assert_eq!(body.mesh().layout(), VertexLayout::PositionColor);
        assert_eq!(body.mesh().color(0), Some(BODY.diffuse));
        assert!(body.material().texture.is_none());
    }
}
