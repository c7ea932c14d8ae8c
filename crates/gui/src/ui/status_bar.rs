use egui::Ui;

use compute_gui_lib::state::Session;

/// Last outcome shown in the status bar
#[derive(Debug, Clone, Default)]
pub enum Status {
    #[default]
    Ready,
    Busy,
    Done(String),
    Failed(String),
}

pub fn show(ui: &mut Ui, session: &Session, status: &Status) {
    ui.horizontal(|ui| {
        let objects = session.document().map_or(0, |d| d.len());
        ui.weak(format!("Objects: {objects}"));

        ui.separator();

        match status {
            Status::Ready => {
                ui.weak("Ready");
            }
            Status::Busy => {
                ui.colored_label(egui::Color32::from_rgb(255, 200, 100), "Computing...");
            }
            Status::Done(message) => {
                ui.label(message);
            }
            Status::Failed(message) => {
                ui.colored_label(egui::Color32::from_rgb(230, 90, 90), message);
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(session.client().endpoint().as_str());
        });
    });
}
