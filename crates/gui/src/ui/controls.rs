//! Left panel: preset inputs and actions

use egui::Ui;

use compute_gui_lib::presets::Preset;

/// What the user asked for this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlActions {
    pub compute: bool,
    pub download: bool,
    pub cancel: bool,
}

pub fn show(ui: &mut Ui, preset: &Preset, values: &mut [f64], busy: bool, has_document: bool) -> ControlActions {
    let mut actions = ControlActions::default();

    ui.heading(preset.name);
    ui.separator();

    if preset.sliders.is_empty() {
        ui.weak("No inputs");
    }
    for (spec, value) in preset.sliders.iter().zip(values.iter_mut()) {
        ui.label(spec.label);
        let response = ui.add(egui::Slider::new(value, spec.min..=spec.max).step_by(spec.step));
        // Evaluate on release, or on keyboard edits which never drag
        if response.drag_stopped() || (response.changed() && !response.dragged()) {
            *value = spec.snap(*value);
            actions.compute = true;
        }
    }

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        let label = match preset.operation {
            compute_gui_lib::policy::Operation::MeshBooleanUnion => "Boolean union",
            compute_gui_lib::policy::Operation::Evaluate => "Compute",
        };
        if ui.add_enabled(!busy, egui::Button::new(label)).clicked() {
            actions.compute = true;
        }
        if busy {
            ui.spinner();
        }
    });

    if ui
        .add_enabled(has_document && !busy, egui::Button::new("Download"))
        .on_hover_text(preset.download_name)
        .clicked()
    {
        actions.download = true;
    }

    actions
}
