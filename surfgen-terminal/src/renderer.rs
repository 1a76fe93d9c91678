/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix3, Point3, Vector3};
use std::io::Write;
use surfgen_core::projection::project_to_screen;
use surfgen_core::{DrawItem, Mat4, Material, Mesh, Scene, Topology, View};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Glyph for line strips
const LINE_CHAR: char = '*';

/// Light reaching faces turned away from the light
const AMBIENT: f32 = 0.2;

type ScreenPoint = (f32, f32, f32);

/// ASCII renderer that converts meshes to coloured terminal cells
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<[u8; 3]>,
    light_dir: Vector3<f32>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![[0; 3]; size],
            light_dir: Vector3::new(0.0, 0.5, 1.0).normalize(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self {
            light_dir: self.light_dir,
            ..Self::new(width, height)
        };
    }

    /// Zero-length directions are ignored.
    pub fn set_light_dir(&mut self, dir: [f32; 3]) {
        if let Some(dir) = Vector3::from(dir).try_normalize(1e-6) {
            self.light_dir = dir;
        }
    }

    /// Width/height ratio for the projection; terminal cells are about
    /// twice as tall as they are wide.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / (2.0 * self.height.max(1) as f32)
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill([0; 3]);
    }

    /// Glyph and colour of a cell, for inspection.
    pub fn cell(&self, x: usize, y: usize) -> Option<(char, [u8; 3])> {
        (x < self.width && y < self.height).then(|| {
            let idx = y * self.width + x;
            (self.char_buffer[idx], self.color_buffer[idx])
        })
    }

    /// Rasterize every part of `scene` as seen through `view`.
    pub fn render_scene(&mut self, scene: &Scene, view: &View) -> surfgen_core::Result<()> {
        let view_projection = view.view_projection(self.aspect());
        for item in scene.draw_list()? {
            if let Some(part) = scene.part(item.part) {
                self.render_part(part.mesh(), part.material(), &item, &view_projection);
            }
        }
        Ok(())
    }

    pub fn render_part(
        &mut self,
        mesh: &Mesh,
        material: &Material,
        item: &DrawItem,
        view_projection: &Mat4,
    ) {
        let mvp = view_projection * item.world;
        let flat = mesh.layout().position_components() == 2;
        let screen: Vec<Option<ScreenPoint>> = (0..mesh.vertex_count())
            .map(|i| {
                let p = mesh.position(i);
                if flat {
                    // 2D curves are authored in clip space
                    Some(self.clip_to_screen(&p))
                } else {
                    project_to_screen(&mvp, &p, self.width as u32, self.height as u32)
                }
            })
            .collect();

        match mesh.topology() {
            Topology::Triangles => {
                let normal_3x3: Matrix3<f32> = item.normal.fixed_view::<3, 3>(0, 0).into_owned();
                for tri in mesh.triangles() {
                    let corners = tri.map(|i| screen[i as usize]);
                    let [Some(v0), Some(v1), Some(v2)] = corners else {
                        continue; // Triangle is clipped
                    };

                    let normal = normal_3x3 * mesh.face_normal(tri);
                    let lambert = normal
                        .try_normalize(1e-12)
                        .map_or(0.0, |n| n.dot(&self.light_dir).abs());
                    let brightness = AMBIENT + (1.0 - AMBIENT) * lambert;

                    let base = triangle_color(mesh, tri, material);
                    let character = shade_char(brightness);
                    let color = to_rgb(base, brightness);
                    self.rasterize_triangle(&[v0, v1, v2], character, color);
                }
            }
            Topology::LineStrip => {
                for pair in mesh.indices().windows(2) {
                    let (a, b) = (pair[0] as usize, pair[1] as usize);
                    if let (Some(p0), Some(p1)) = (screen[a], screen[b]) {
                        let color = to_rgb(vertex_color(mesh, a, material), 1.0);
                        self.draw_line(p0, p1, color);
                    }
                }
            }
        }
    }

    fn clip_to_screen(&self, p: &Point3<f32>) -> ScreenPoint {
        (
            (p.x + 1.0) * 0.5 * self.width as f32,
            (1.0 - p.y) * 0.5 * self.height as f32,
            0.0,
        )
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, character: char, color: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = color;
        }
    }

    fn rasterize_triangle(&mut self, coords: &[ScreenPoint; 3], character: char, color: [u8; 3]) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x, y, depth, character, color);
                    }
                }
            }
        }
    }

    /// Bresenham line with linearly interpolated depth.
    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: [u8; 3]) {
        let (mut x, mut y) = (from.0.floor() as i32, from.1.floor() as i32);
        let (x1, y1) = (to.0.floor() as i32, to.1.floor() as i32);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let steps = dx.max(-dy).max(1) as f32;
        let mut err = dx + dy;
        let mut step = 0.0;

        loop {
            let depth = from.2 + (to.2 - from.2) * (step / steps);
            self.plot(x, y, depth, LINE_CHAR, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            step += 1.0;
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let [r, g, b] = self.color_buffer[idx];
                if current != Some([r, g, b]) {
                    writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                    current = Some([r, g, b]);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn shade_char(brightness: f32) -> char {
    let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
    // Never blank out a covered cell
    LUMINOSITY_RAMP[char_index.clamp(1, LUMINOSITY_RAMP.len() - 1)]
}

fn vertex_color(mesh: &Mesh, i: usize, material: &Material) -> [f32; 3] {
    mesh.color(i).unwrap_or(material.diffuse)
}

fn triangle_color(mesh: &Mesh, tri: [u32; 3], material: &Material) -> [f32; 3] {
    let mut sum = [0.0; 3];
    for i in tri {
        let c = vertex_color(mesh, i as usize, material);
        for k in 0..3 {
            sum[k] += c[k] / 3.0;
        }
    }
    sum
}

fn to_rgb(color: [f32; 3], brightness: f32) -> [u8; 3] {
    color.map(|c| ((c * brightness).clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use surfgen_core::curve::polyline_mesh_2d;
    use surfgen_core::transform::identity;
    use surfgen_core::{Part, VertexLayout};

    fn covered(renderer: &AsciiRenderer) -> usize {
        (0..renderer.height())
            .flat_map(|y| (0..renderer.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| renderer.cell(x, y).is_some_and(|(c, _)| c != ' '))
            .count()
    }

    fn scene_of(mesh: Mesh, material: Material) -> Scene {
        let mut scene = Scene::new();
        scene.add_part(Part::new("test", Arc::new(mesh), material, identity()));
        scene
    }

    #[test]
    fn test_cube_covers_centre() {
        let mut renderer = AsciiRenderer::new(80, 40);
        let scene = scene_of(Mesh::cube(2.0), Material::default());
        let view = View::new(40.0, 1.0, 100.0, 6.0);
        renderer.render_scene(&scene, &view).unwrap();

        let (c, color) = renderer.cell(40, 20).unwrap();
        assert_ne!(c, ' ');
        assert_ne!(color, [0, 0, 0]);
        assert_eq!(renderer.cell(0, 0), Some((' ', [0, 0, 0])));

        renderer.clear();
        assert_eq!(covered(&renderer), 0);
    }

    #[test]
    fn test_material_colour_without_vertex_colours() {
        let mesh = Mesh::new(
            vec![-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0],
            vec![0, 1, 2],
            VertexLayout::Position,
            Topology::Triangles,
        )
        .unwrap();
        let mut renderer = AsciiRenderer::new(40, 20);
        renderer.set_light_dir([0.0, 0.0, 1.0]);
        let scene = scene_of(mesh, Material::flat([1.0, 0.0, 0.0]));
        renderer
            .render_scene(&scene, &View::new(40.0, 1.0, 100.0, 2.0))
            .unwrap();

        // Facing the light: full brightness, pure red
        assert_eq!(renderer.cell(20, 10), Some(('@', [255, 0, 0])));
    }

    #[test]
    fn test_flat_polyline_is_drawn_in_clip_space() {
        let line = polyline_mesh_2d(&[-1.0, 0.0, 0.99, 0.0], [0.0, 1.0, 0.0]).unwrap();
        let mut renderer = AsciiRenderer::new(20, 10);
        let scene = scene_of(line, Material::default());
        renderer.render_scene(&scene, &View::default()).unwrap();

        // Horizontal line across row 5
        for x in 0..20 {
            assert_eq!(renderer.cell(x, 5), Some((LINE_CHAR, [0, 255, 0])));
        }
        assert_eq!(covered(&renderer), 20);
    }

    #[test]
    fn test_bresenham_diagonal() {
        let mut renderer = AsciiRenderer::new(10, 10);
        renderer.draw_line((0.0, 0.0, 0.0), (9.0, 9.0, 0.5), [255, 255, 255]);
        for i in 0..10 {
            assert_eq!(renderer.cell(i, i).map(|(c, _)| c), Some(LINE_CHAR));
        }
        assert_eq!(covered(&renderer), 10);
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let mut renderer = AsciiRenderer::new(10, 10);
        renderer.draw_line((0.0, 5.0, 0.5), (9.0, 5.0, 0.5), [255, 0, 0]);
        renderer.draw_line((0.0, 5.0, 0.9), (9.0, 5.0, 0.9), [0, 0, 255]);
        assert_eq!(renderer.cell(3, 5), Some((LINE_CHAR, [255, 0, 0])));
        renderer.draw_line((0.0, 5.0, 0.1), (9.0, 5.0, 0.1), [0, 255, 0]);
        assert_eq!(renderer.cell(3, 5), Some((LINE_CHAR, [0, 255, 0])));
    }

    #[test]
    fn test_draw_emits_every_row() {
        let mut renderer = AsciiRenderer::new(4, 3);
        renderer.draw_line((0.0, 1.0, 0.0), (3.0, 1.0, 0.0), [10, 20, 30]);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\r\n").count(), 2);
        assert!(text.contains("****"));
        assert!(text.contains("38;2;10;20;30"));
    }

    #[test]
    fn test_aspect_accounts_for_cell_shape() {
        let renderer = AsciiRenderer::new(80, 40);
        assert_eq!(renderer.aspect(), 1.0);
    }
}
