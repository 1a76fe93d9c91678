//! Ready-made scenes shared by the terminal and web front ends.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use nalgebra::{Point2, Point3, Vector3};

use crate::curve::{b_spline, catmull_rom_line, cubic_bezier, function_graph, polyline_mesh_2d};
use crate::error::{Error, Result};
use crate::geometry::Mesh;
use crate::piplup::{self, PiplupDetail};
use crate::scene::{Material, Part, Scene};
use crate::surface::{hyperbolic_paraboloid, hyperboloid_one_sheet, sphere_with, SphereAttributes};
use crate::transform::identity;
use crate::tube::tube_from_spline;

/// Control points of the wave the tube and spline demos follow.
pub const WAVE: [[f32; 3]; 5] = [
    [-4.0, 1.0, 0.0],
    [-2.0, -1.0, 0.0],
    [0.0, 1.5, 0.0],
    [2.0, -1.0, 0.0],
    [4.0, 1.0, 0.0],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoScene {
    /// Lit, textured Piplup
    Piplup,
    /// Vertex-coloured Piplup with paraboloid beak
    PiplupClassic,
    /// Sphere, hyperboloid and two saddles
    Surfaces,
    /// Tube swept along the wave, over a saddle
    Tube,
    /// The coloured cube
    Cube,
    /// Flat Bézier, B-spline and function graph in clip space
    Curves,
}

impl DemoScene {
    pub const ALL: [DemoScene; 6] = [
        DemoScene::Piplup,
        DemoScene::PiplupClassic,
        DemoScene::Surfaces,
        DemoScene::Tube,
        DemoScene::Cube,
        DemoScene::Curves,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DemoScene::Piplup => "piplup",
            DemoScene::PiplupClassic => "piplup-classic",
            DemoScene::Surfaces => "surfaces",
            DemoScene::Tube => "tube",
            DemoScene::Cube => "cube",
            DemoScene::Curves => "curves",
        }
    }

    /// Viewer distance the scene was composed for.
    pub fn view_distance(self) -> f32 {
        match self {
            DemoScene::Piplup | DemoScene::PiplupClassic => 12.0,
            DemoScene::Surfaces | DemoScene::Cube => 6.0,
            DemoScene::Tube => 8.0,
            DemoScene::Curves => 1.0,
        }
    }

    pub fn build(self, detail: PiplupDetail) -> Result<Scene> {
        match self {
            DemoScene::Piplup => piplup::build(detail),
            DemoScene::PiplupClassic => piplup::build_with_paraboloid_beak(detail),
            DemoScene::Surfaces => surfaces(),
            DemoScene::Tube => tube(),
            DemoScene::Cube => Ok(single("cube", Mesh::cube(2.0))),
            DemoScene::Curves => curves(),
        }
    }
}

impl fmt::Display for DemoScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DemoScene {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DemoScene::ALL
            .into_iter()
            .find(|scene| scene.name() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown scene '{s}'")))
    }
}

fn add(scene: &mut Scene, name: &str, mesh: Mesh) {
    scene.add_part(Part::new(name, Arc::new(mesh), Material::default(), identity()));
}

fn single(name: &str, mesh: Mesh) -> Scene {
    let mut scene = Scene::new();
    add(&mut scene, name, mesh);
    scene
}

fn wave() -> Vec<Point3<f32>> {
    WAVE.iter().map(|&p| Point3::from(p)).collect()
}

fn surfaces() -> Result<Scene> {
    let mut scene = Scene::new();
    add(
        &mut scene,
        "sphere",
        sphere_with(0.5, 0.5, 0.5, 100, 100, SphereAttributes::PositionColor)?,
    );
    add(&mut scene, "hyperboloid", hyperboloid_one_sheet(0.5, 0.5, 0.5, 100, 100, 1.0)?);
    add(
        &mut scene,
        "saddle_right",
        hyperbolic_paraboloid(1.0, 1.0, 2.0, 2.0, 40, 60, Vector3::new(2.0, 0.0, 0.0))?,
    );
    add(
        &mut scene,
        "saddle_left",
        hyperbolic_paraboloid(1.0, 1.0, 2.0, 2.0, 40, 60, Vector3::new(-2.0, 0.0, 0.0))?,
    );
    add(&mut scene, "spline", catmull_rom_line(&wave(), 100)?);
    Ok(scene)
}

fn tube() -> Result<Scene> {
    let mut scene = Scene::new();
    add(
        &mut scene,
        "sphere",
        sphere_with(0.5, 0.5, 0.5, 100, 100, SphereAttributes::PositionColor)?,
    );
    add(&mut scene, "tube", tube_from_spline(&wave(), 100, 0.2, 20)?);
    add(
        &mut scene,
        "saddle",
        hyperbolic_paraboloid(1.0, 1.0, 2.0, 2.0, 50, 50, Vector3::new(0.0, -2.0, 0.0))?,
    );
    Ok(scene)
}

fn curves() -> Result<Scene> {
    let bezier = cubic_bezier(
        &[
            Point2::new(-0.8, -0.8),
            Point2::new(-0.5, 0.8),
            Point2::new(0.5, 0.8),
            Point2::new(0.8, -0.8),
        ],
        100,
    )?;
    let spline = b_spline(
        &[
            Point2::new(-1.0, -1.0),
            Point2::new(-1.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, -1.0),
        ],
        100,
        2,
    )?;

    let mut scene = Scene::new();
    add(&mut scene, "bezier", polyline_mesh_2d(&bezier, [0.0, 1.0, 1.0])?);
    add(&mut scene, "b_spline", polyline_mesh_2d(&spline, [1.0, 0.0, 1.0])?);
    add(&mut scene, "graph", function_graph(|x| x * x, 100)?);
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for scene in DemoScene::ALL {
            assert_eq!(scene.name().parse::<DemoScene>(), Ok(scene));
        }
        assert!("teapot".parse::<DemoScene>().is_err());
    }

    #[test]
    fn test_every_demo_builds() {
        for demo in DemoScene::ALL {
            let scene = demo.build(PiplupDetail::Preview).unwrap();
            assert!(!scene.is_empty(), "{demo} is empty");
            assert_eq!(scene.draw_list().unwrap().len(), scene.len());
        }
    }
}
