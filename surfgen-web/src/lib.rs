/// surfgen Web - WASM bindings for the geometry core
///
/// Hands flat vertex/index buffers and column-major matrices to JavaScript,
/// which owns the WebGL context, shaders and textures.
use nalgebra::{Point2, Point3, Vector3};
use surfgen_core::scene::DrawItem;
use surfgen_core::surface::SphereAttributes;
use surfgen_core::tube::tube_from_spline_with;
use surfgen_core::{
    curve, get_projection, surface, CameraState, DemoScene, Error, FrameStrategy, KeyNudge, Mat4,
    Mesh, PiplupDetail, Scene, Topology, View,
};
use tracing::debug;
use wasm_bindgen::prelude::*;

fn to_js(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn matrix(m: &Mat4) -> Vec<f32> {
    m.as_slice().to_vec()
}

fn points2(flat: &[f32]) -> surfgen_core::Result<Vec<Point2<f32>>> {
    if flat.len() % 2 != 0 {
        return Err(Error::InvalidArgument(format!(
            "expected [x, y] pairs, got {} floats",
            flat.len()
        )));
    }
    Ok(flat.chunks_exact(2).map(|p| Point2::new(p[0], p[1])).collect())
}

fn points3(flat: &[f32]) -> surfgen_core::Result<Vec<Point3<f32>>> {
    if flat.len() % 3 != 0 {
        return Err(Error::InvalidArgument(format!(
            "expected [x, y, z] triples, got {} floats",
            flat.len()
        )));
    }
    Ok(flat
        .chunks_exact(3)
        .map(|p| Point3::new(p[0], p[1], p[2]))
        .collect())
}

/// Vertex and index buffers of one generated mesh
#[wasm_bindgen]
pub struct MeshBuffers {
    vertices: Vec<f32>,
    indices: Vec<u32>,
    stride: usize,
    line_strip: bool,
}

impl From<Mesh> for MeshBuffers {
    fn from(mesh: Mesh) -> Self {
        let stride = mesh.stride();
        let line_strip = mesh.topology() == Topology::LineStrip;
        let (vertices, indices) = mesh.into_parts();
        Self {
            vertices,
            indices,
            stride,
            line_strip,
        }
    }
}

#[wasm_bindgen]
impl MeshBuffers {
    pub fn vertices(&self) -> Vec<f32> {
        self.vertices.clone()
    }

    pub fn indices(&self) -> Vec<u32> {
        self.indices.clone()
    }

    /// Floats per vertex
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn is_line_strip(&self) -> bool {
        self.line_strip
    }
}

/// A demo scene plus the camera that spins it
#[wasm_bindgen]
pub struct WebScene {
    scene: Scene,
    camera: CameraState,
    view: View,
    draw: Vec<DrawItem>,
}

impl WebScene {
    pub fn build(demo: DemoScene, detail: PiplupDetail) -> surfgen_core::Result<Self> {
        let scene = demo.build(detail)?;
        let draw = scene.draw_list()?;
        debug!(scene = %demo, parts = scene.len(), "built web scene");
        Ok(Self {
            scene,
            camera: CameraState::default(),
            view: View::new(40.0, 1.0, 100.0, demo.view_distance()),
            draw,
        })
    }

    fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.draw
            .get(index)
            .and_then(|item| self.scene.part(item.part))
            .map(|part| part.mesh().as_ref())
    }

    fn step(&mut self) -> surfgen_core::Result<()> {
        self.camera.update();
        self.scene.set_root(self.camera.rotation());
        self.draw = self.scene.draw_list()?;
        Ok(())
    }
}

#[wasm_bindgen]
impl WebScene {
    /// `name` is one of the demo scene names, e.g. `"piplup"`.
    #[wasm_bindgen(constructor)]
    pub fn new(name: &str, full_detail: bool) -> Result<WebScene, JsValue> {
        let detail = if full_detail {
            PiplupDetail::Full
        } else {
            PiplupDetail::Preview
        };
        let demo: DemoScene = name.parse().map_err(to_js)?;
        Self::build(demo, detail).map_err(to_js)
    }

    pub fn part_count(&self) -> usize {
        self.draw.len()
    }

    pub fn part_name(&self, index: usize) -> Option<String> {
        let item = self.draw.get(index)?;
        self.scene.part(item.part).map(|part| part.name.clone())
    }

    pub fn vertices(&self, index: usize) -> Vec<f32> {
        self.mesh(index).map(|m| m.vertices().to_vec()).unwrap_or_default()
    }

    pub fn indices(&self, index: usize) -> Vec<u32> {
        self.mesh(index).map(|m| m.indices().to_vec()).unwrap_or_default()
    }

    pub fn stride(&self, index: usize) -> usize {
        self.mesh(index).map_or(0, Mesh::stride)
    }

    pub fn is_line_strip(&self, index: usize) -> bool {
        self.mesh(index)
            .is_some_and(|m| m.topology() == Topology::LineStrip)
    }

    /// `[ambient rgb, diffuse rgb, specular rgb, shininess]`
    pub fn material(&self, index: usize) -> Vec<f32> {
        let Some(part) = self.draw.get(index).and_then(|item| self.scene.part(item.part)) else {
            return Vec::new();
        };
        let m = part.material();
        let mut out = Vec::with_capacity(10);
        out.extend_from_slice(&m.ambient);
        out.extend_from_slice(&m.diffuse);
        out.extend_from_slice(&m.specular);
        out.push(m.shininess);
        out
    }

    /// Image name to bind for this part, if any.
    pub fn texture(&self, index: usize) -> Option<String> {
        let part = self.scene.part(self.draw.get(index)?.part)?;
        part.material().texture.as_ref().map(|t| t.name().to_owned())
    }

    pub fn world_matrix(&self, index: usize) -> Vec<f32> {
        self.draw.get(index).map(|d| matrix(&d.world)).unwrap_or_default()
    }

    pub fn normal_matrix(&self, index: usize) -> Vec<f32> {
        self.draw.get(index).map(|d| matrix(&d.normal)).unwrap_or_default()
    }

    pub fn projection(&self, aspect: f32) -> Vec<f32> {
        matrix(&self.view.projection_matrix(aspect))
    }

    pub fn view(&self) -> Vec<f32> {
        matrix(&self.view.view_matrix())
    }

    pub fn begin_drag(&mut self) {
        self.camera.begin_drag();
    }

    pub fn end_drag(&mut self) {
        self.camera.end_drag();
    }

    /// Pointer movement in pixels over a canvas of `width` x `height`.
    pub fn drag(&mut self, dx: f32, dy: f32, width: f32, height: f32) {
        self.camera.drag(dx, dy, width, height);
    }

    /// `"up"`, `"down"`, `"left"` or `"right"`; anything else is ignored.
    pub fn nudge(&mut self, direction: &str) {
        let key = match direction {
            "up" => KeyNudge::Up,
            "down" => KeyNudge::Down,
            "left" => KeyNudge::Left,
            "right" => KeyNudge::Right,
            _ => return,
        };
        self.camera.nudge(key);
    }

    /// Advance the camera and recompute every part's matrices.
    pub fn frame(&mut self) -> Result<(), JsValue> {
        self.step().map_err(to_js)
    }
}

#[wasm_bindgen]
pub fn projection(fov_degrees: f32, aspect: f32, z_near: f32, z_far: f32) -> Vec<f32> {
    matrix(&get_projection(fov_degrees, aspect, z_near, z_far))
}

/// Position + normal + UV ellipsoid
#[wasm_bindgen]
pub fn sphere(a: f32, b: f32, c: f32, stacks: u32, steps: u32) -> Result<MeshBuffers, JsValue> {
    surface::sphere_with(a, b, c, stacks, steps, SphereAttributes::NormalUv)
        .map(MeshBuffers::from)
        .map_err(to_js)
}

#[wasm_bindgen]
pub fn hyperboloid(
    a: f32,
    b: f32,
    c: f32,
    stacks: u32,
    steps: u32,
    u_max: f32,
) -> Result<MeshBuffers, JsValue> {
    surface::hyperboloid_one_sheet(a, b, c, stacks, steps, u_max)
        .map(MeshBuffers::from)
        .map_err(to_js)
}

#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn hyperbolic_paraboloid(
    a: f32,
    b: f32,
    width: f32,
    depth: f32,
    segments_x: u32,
    segments_z: u32,
    tx: f32,
    ty: f32,
    tz: f32,
) -> Result<MeshBuffers, JsValue> {
    surface::hyperbolic_paraboloid(
        a,
        b,
        width,
        depth,
        segments_x,
        segments_z,
        Vector3::new(tx, ty, tz),
    )
    .map(MeshBuffers::from)
    .map_err(to_js)
}

#[wasm_bindgen]
pub fn elliptic_paraboloid(
    a: f32,
    b: f32,
    height: f32,
    segments: u32,
    color: &[f32],
) -> Result<MeshBuffers, JsValue> {
    let color: [f32; 3] = color
        .try_into()
        .map_err(|_| to_js(Error::InvalidArgument("color must be [r, g, b]".into())))?;
    surface::elliptic_paraboloid(a, b, height, segments, color)
        .map(MeshBuffers::from)
        .map_err(to_js)
}

fn tube_buffers(
    control: &[f32],
    segments: u32,
    radius: f32,
    radial_segments: u32,
    rotation_minimizing: bool,
) -> surfgen_core::Result<MeshBuffers> {
    let strategy = if rotation_minimizing {
        FrameStrategy::RotationMinimizing
    } else {
        FrameStrategy::UpVector
    };
    let control = points3(control)?;
    tube_from_spline_with(&control, segments, radius, radial_segments, strategy)
        .map(MeshBuffers::from)
}

/// Tube around the Catmull-Rom spline through flat `[x, y, z]*` points.
#[wasm_bindgen]
pub fn tube(
    control: &[f32],
    segments: u32,
    radius: f32,
    radial_segments: u32,
    rotation_minimizing: bool,
) -> Result<MeshBuffers, JsValue> {
    tube_buffers(control, segments, radius, radial_segments, rotation_minimizing).map_err(to_js)
}

fn bezier_points(control: &[f32], segments: u32) -> surfgen_core::Result<Vec<f32>> {
    let points: [Point2<f32>; 4] = points2(control)?.try_into().map_err(|_| {
        Error::InvalidArgument(format!("bezier needs 4 control points, got {} floats", control.len()))
    })?;
    curve::cubic_bezier(&points, segments)
}

/// Flat `[x, y]*` samples; `control` holds the four points as 8 floats.
#[wasm_bindgen]
pub fn cubic_bezier(control: &[f32], segments: u32) -> Result<Vec<f32>, JsValue> {
    bezier_points(control, segments).map_err(to_js)
}

#[wasm_bindgen]
pub fn b_spline(control: &[f32], samples: u32, degree: usize) -> Result<Vec<f32>, JsValue> {
    points2(control)
        .and_then(|points| curve::b_spline(&points, samples, degree))
        .map_err(to_js)
}

#[wasm_bindgen]
pub fn catmull_rom(control: &[f32], segments_per_span: u32) -> Result<Vec<f32>, JsValue> {
    points3(control)
        .and_then(|points| curve::catmull_rom_spline(&points, segments_per_span))
        .map_err(to_js)
}
