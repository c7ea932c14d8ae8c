//! Main application module

mod keyboard;
mod styles;

use std::time::Duration;

use eframe::egui;
use shared::ParamValue;

use compute_gui_lib::error::EvaluationError;
use compute_gui_lib::presets::Preset;
use compute_gui_lib::slot::EvaluationSlot;
use compute_gui_lib::state::{Document, Session, DOCUMENT_EXTENSION};

use crate::ui::controls::{self, ControlActions};
use crate::ui::status_bar::{self, Status};
use crate::viewport::ViewportPanel;

/// Main application
pub struct ViewerApp {
    runtime: tokio::runtime::Runtime,
    session: Session,
    preset: &'static Preset,
    /// Current slider values, one per preset slider
    values: Vec<f64>,
    slot: EvaluationSlot<Result<Document, EvaluationError>>,
    status: Status,
    viewport: ViewportPanel,
}

impl ViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: tokio::runtime::Runtime,
        session: Session,
        preset: &'static Preset,
        startup_error: Option<String>,
    ) -> Self {
        styles::configure_styles(&cc.egui_ctx);

        let mut app = Self {
            runtime,
            session,
            preset,
            values: preset.sliders.iter().map(|s| s.default).collect(),
            slot: EvaluationSlot::new(),
            status: Status::Ready,
            viewport: ViewportPanel::new(),
        };

        match startup_error {
            Some(message) => app.status = Status::Failed(message),
            None if preset.evaluate_on_start => app.start_evaluation(),
            None => {}
        }
        app
    }

    fn params(&self) -> Vec<(String, ParamValue)> {
        self.preset
            .sliders
            .iter()
            .zip(&self.values)
            .map(|(spec, value)| spec.param(*value))
            .collect()
    }

    /// Submit a new evaluation, superseding any in flight.
    fn start_evaluation(&mut self) {
        match self.session.prepare(&self.params()) {
            Ok(job) => {
                let generation = self.slot.start(self.runtime.handle(), job.run());
                tracing::debug!(generation, "Started evaluation");
                self.status = Status::Busy;
            }
            Err(e) => {
                tracing::error!("Cannot start evaluation: {e}");
                self.status = Status::Failed(e.to_string());
            }
        }
    }

    fn poll_evaluation(&mut self, ctx: &egui::Context) {
        if let Some(result) = self.slot.poll() {
            match result {
                Ok(document) => {
                    let objects = document.len();
                    self.session.install(document);
                    self.status = Status::Done(format!("{objects} objects"));
                }
                Err(e) => {
                    tracing::error!("Evaluation failed: {e}");
                    self.status = Status::Failed(e.to_string());
                }
            }
        } else if matches!(self.status, Status::Busy) && !self.slot.is_busy() {
            self.status = Status::Failed("Evaluation ended without a result".into());
        }
        if self.slot.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }

    fn download(&mut self) {
        let Some(document) = self.session.document() else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(self.preset.download_name)
            .add_filter("Document", &[DOCUMENT_EXTENSION])
            .save_file()
        else {
            return;
        };
        match document.save(&path) {
            Ok(()) => {
                tracing::info!("Saved document to {}", path.display());
                self.status = Status::Done(format!("Saved {}", path.display()));
            }
            Err(e) => {
                tracing::error!("Failed to save {}: {e}", path.display());
                self.status = Status::Failed(format!("Save failed: {e}"));
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_evaluation(ctx);
        self.viewport
            .frame_if_changed(self.session.scene(), self.session.installed_count());

        let mut actions = ControlActions::default();
        keyboard::handle_keyboard(ctx, &mut actions, &mut self.viewport);

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)))
            .show(ctx, |ui| {
                status_bar::show(ui, &self.session, &self.status);
            });

        // ── Left panel: inputs ───────────────────────────────
        let busy = self.slot.is_busy();
        let has_document = self.session.document().is_some();
        egui::SidePanel::left("controls")
            .default_width(240.0)
            .resizable(true)
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(8)))
            .show(ctx, |ui| {
                let panel = controls::show(ui, self.preset, &mut self.values, busy, has_document);
                actions.compute |= panel.compute;
                actions.download |= panel.download;
            });

        // ── Central panel: 3D viewport ───────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, self.session.scene());
            });

        if actions.cancel && busy {
            self.slot.cancel();
            tracing::info!("Evaluation cancelled");
            self.status = Status::Ready;
        }
        if actions.compute {
            self.start_evaluation();
        }
        if actions.download && !busy {
            self.download();
        }
    }
}
