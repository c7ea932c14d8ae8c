// Library crate: the evaluation client and everything integration tests drive.
// The egui app, panels and viewport painting live in the binary crate.

pub mod compute;
pub mod definition;
pub mod error;
pub mod geometry;
pub mod policy;
pub mod presets;
pub mod slot;
pub mod state;

/// Render-side types the session publishes into.
/// Camera and painting stay in the binary crate.
pub mod viewport {
    pub mod mesh;
    pub mod scene;
}
