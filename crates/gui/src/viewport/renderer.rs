//! Painter-based rendering of the scene graph.
//!
//! Meshes are filled with flat lambert shading (depth-sorted triangles) and
//! outlined; curves and points are drawn as lines and dots.

use egui::{Color32, Pos2, Rect, Stroke, Ui};
use glam::Vec3;

use super::camera::ArcBallCamera;
use compute_gui_lib::state::Color;
use compute_gui_lib::viewport::mesh::MeshData;
use compute_gui_lib::viewport::scene::{Light, NodeKind, SceneGraph};

const BACKGROUND: Color32 = Color32::from_rgb(30, 30, 34);
const GRID_STEP: f32 = 5.0;
const GRID_RANGE: i32 = 10;
const AXIS_LENGTH: f32 = 5.0;

pub fn paint_viewport(ui: &Ui, rect: Rect, camera: &ArcBallCamera, scene: &SceneGraph) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, BACKGROUND);

    draw_grid(&painter, rect, camera);
    draw_axes(&painter, rect, camera);

    let lighting = Lighting::from_scene(scene);
    for node in scene.nodes() {
        let color = to_color32(node.color);
        match &node.kind {
            NodeKind::Light(_) => {}
            NodeKind::Mesh(mesh) => {
                fill_mesh(&painter, rect, camera, mesh, &lighting);
                draw_mesh_edges(&painter, rect, camera, mesh, Stroke::new(0.5, color.gamma_multiply(0.6)));
            }
            NodeKind::Polyline { points, closed } => {
                draw_polyline(&painter, rect, camera, points, *closed, Stroke::new(1.5, color));
            }
            NodeKind::Point(p) => {
                if let Some(pos) = camera.project(*p, rect) {
                    painter.circle_filled(pos, 3.0, color);
                }
            }
        }
    }
}

struct Lighting {
    /// Direction the light travels in
    direction: Vec3,
    directional: f32,
    ambient: f32,
}

impl Lighting {
    fn from_scene(scene: &SceneGraph) -> Self {
        let mut lighting = Self {
            direction: Vec3::new(-1.0, -1.0, -1.0).normalize(),
            directional: 0.0,
            ambient: 0.0,
        };
        for node in scene.nodes() {
            match node.kind {
                NodeKind::Light(Light::Directional { direction, intensity }) => {
                    lighting.direction = direction.normalize_or_zero();
                    lighting.directional += intensity;
                }
                NodeKind::Light(Light::Ambient { intensity }) => lighting.ambient += intensity,
                _ => {}
            }
        }
        lighting
    }

    /// Brightness factor in [0, 1] for a surface normal
    fn shade(&self, normal: Vec3) -> f32 {
        let diffuse = normal.dot(-self.direction).abs();
        let total = self.ambient + self.directional;
        if total <= 0.0 {
            return 1.0;
        }
        ((self.ambient * 0.3 + self.directional * diffuse) / total).clamp(0.15, 1.0)
    }
}

fn to_color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

fn fill_mesh(painter: &egui::Painter, rect: Rect, camera: &ArcBallCamera, mesh: &MeshData, lighting: &Lighting) {
    let eye = camera.eye_position();
    let projected: Vec<Option<Pos2>> = (0..mesh.vertex_count())
        .map(|i| camera.project(mesh.position(i), rect))
        .collect();

    // Far triangles first
    let mut triangles: Vec<(f32, [usize; 3])> = mesh
        .indices
        .chunks_exact(3)
        .map(|t| {
            let tri = [t[0] as usize, t[1] as usize, t[2] as usize];
            let centroid = (mesh.position(tri[0]) + mesh.position(tri[1]) + mesh.position(tri[2])) / 3.0;
            (centroid.distance_squared(eye), tri)
        })
        .collect();
    triangles.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut shape = egui::Mesh::default();
    for (_, tri) in triangles {
        let [Some(a), Some(b), Some(c)] = tri.map(|i| projected[i]) else {
            continue;
        };
        let normal = (mesh.normal(tri[0]) + mesh.normal(tri[1]) + mesh.normal(tri[2])).normalize_or_zero();
        let base = &mesh.vertices[tri[0] * 9 + 6..tri[0] * 9 + 9];
        let k = lighting.shade(normal);
        let color = Color32::from_rgb(
            (base[0] * k * 255.0) as u8,
            (base[1] * k * 255.0) as u8,
            (base[2] * k * 255.0) as u8,
        );
        let first = shape.vertices.len() as u32;
        shape.colored_vertex(a, color);
        shape.colored_vertex(b, color);
        shape.colored_vertex(c, color);
        shape.add_triangle(first, first + 1, first + 2);
    }
    if !shape.is_empty() {
        painter.add(egui::Shape::mesh(shape));
    }
}

fn draw_mesh_edges(painter: &egui::Painter, rect: Rect, camera: &ArcBallCamera, mesh: &MeshData, stroke: Stroke) {
    for (a, b) in mesh.edges() {
        draw_line_3d(painter, rect, camera, mesh.position(a as usize), mesh.position(b as usize), stroke);
    }
}

fn draw_polyline(
    painter: &egui::Painter,
    rect: Rect,
    camera: &ArcBallCamera,
    points: &[Vec3],
    closed: bool,
    stroke: Stroke,
) {
    for pair in points.windows(2) {
        draw_line_3d(painter, rect, camera, pair[0], pair[1], stroke);
    }
    if closed && points.len() > 2 {
        draw_line_3d(painter, rect, camera, points[points.len() - 1], points[0], stroke);
    }
}

fn draw_grid(painter: &egui::Painter, rect: Rect, camera: &ArcBallCamera) {
    let stroke = Stroke::new(0.5, Color32::from_rgba_premultiplied(60, 60, 60, 160));
    let extent = GRID_RANGE as f32 * GRID_STEP;
    for i in -GRID_RANGE..=GRID_RANGE {
        let f = i as f32 * GRID_STEP;
        draw_line_3d(painter, rect, camera, Vec3::new(f, -extent, 0.0), Vec3::new(f, extent, 0.0), stroke);
        draw_line_3d(painter, rect, camera, Vec3::new(-extent, f, 0.0), Vec3::new(extent, f, 0.0), stroke);
    }
}

fn draw_axes(painter: &egui::Painter, rect: Rect, camera: &ArcBallCamera) {
    let axes = [
        (Vec3::X, "X", Color32::from_rgb(220, 50, 50)),
        (Vec3::Y, "Y", Color32::from_rgb(50, 200, 50)),
        (Vec3::Z, "Z", Color32::from_rgb(50, 100, 220)),
    ];
    let Some(origin) = camera.project(Vec3::ZERO, rect) else {
        return;
    };
    for (axis, label, color) in axes {
        if let Some(end) = camera.project(axis * AXIS_LENGTH, rect) {
            painter.line_segment([origin, end], Stroke::new(1.5, color));
            painter.text(end, egui::Align2::LEFT_BOTTOM, label, egui::FontId::monospace(10.0), color);
        }
    }
}

fn draw_line_3d(painter: &egui::Painter, rect: Rect, camera: &ArcBallCamera, a: Vec3, b: Vec3, stroke: Stroke) {
    if let (Some(pa), Some(pb)) = (camera.project(a, rect), camera.project(b, rect)) {
        painter.line_segment([pa, pb], stroke);
    }
}
