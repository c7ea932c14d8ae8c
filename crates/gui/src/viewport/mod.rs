//! 3D viewport panel

mod camera;
mod renderer;

use egui::Ui;

use camera::ArcBallCamera;
use compute_gui_lib::viewport::scene::SceneGraph;

/// Orbit/zoom viewport painting the session's scene graph
pub struct ViewportPanel {
    camera: ArcBallCamera,
    /// Scene contents the camera was last framed on
    framed_generation: u64,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            camera: ArcBallCamera::new(),
            framed_generation: 0,
        }
    }

    pub fn reset_camera(&mut self) {
        self.camera = ArcBallCamera::new();
    }

    /// Frame the scene once per installed document
    pub fn frame_if_changed(&mut self, scene: &SceneGraph, generation: u64) {
        if generation == self.framed_generation {
            return;
        }
        self.framed_generation = generation;
        if let Some((min, max)) = scene.bounds() {
            self.camera.frame(min, max);
        }
    }

    pub fn show(&mut self, ui: &mut Ui, scene: &SceneGraph) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        if response.dragged_by(egui::PointerButton::Primary) || response.dragged_by(egui::PointerButton::Middle) {
            let delta = response.drag_delta();
            self.camera.rotate(delta.x * 0.4, delta.y * 0.4);
        }
        if response.double_clicked() {
            if let Some((min, max)) = scene.bounds() {
                self.camera.frame(min, max);
            }
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                self.camera.zoom(scroll * 0.01);
            }
        }

        if !ui.is_rect_visible(rect) {
            return;
        }
        renderer::paint_viewport(ui, rect, &self.camera, scene);
    }
}
