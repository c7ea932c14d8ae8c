//! Keyboard shortcut handling

use eframe::egui;

use crate::ui::controls::ControlActions;
use crate::viewport::ViewportPanel;

/// F5 computes, Escape cancels, Ctrl+S downloads, Home resets the camera
pub fn handle_keyboard(ctx: &egui::Context, actions: &mut ControlActions, viewport: &mut ViewportPanel) {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    ctx.input(|i| {
        if i.key_pressed(egui::Key::F5) {
            actions.compute = true;
        }
        if i.key_pressed(egui::Key::Escape) {
            actions.cancel = true;
        }
        if i.modifiers.command && i.key_pressed(egui::Key::S) {
            actions.download = true;
        }
        if i.key_pressed(egui::Key::Home) {
            viewport.reset_camera();
        }
    });
}
