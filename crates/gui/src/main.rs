mod app;
mod ui;
mod viewport;

use compute_gui_lib::compute::ComputeClient;
use compute_gui_lib::definition::{read_source, Definition};
use compute_gui_lib::presets::{self, Preset};
use compute_gui_lib::state::{ComputeSettings, Session};

use app::ViewerApp;

/// Command-line overrides
#[derive(Debug, Default)]
struct LaunchOptions {
    preset: Option<String>,
    definition: Option<String>,
    model: Option<String>,
    url: Option<String>,
    /// Persist the effective compute settings before starting
    save_settings: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "compute_gui=info,compute_gui_lib=info".into()),
        )
        .init();

    let options = parse_args();

    let preset_name = options.preset.as_deref().unwrap_or(presets::DEFAULT_PRESET);
    let Some(preset) = presets::find(preset_name) else {
        tracing::error!(
            "Unknown preset '{preset_name}', expected one of: {}",
            presets::names().join(", ")
        );
        return;
    };

    let mut settings = ComputeSettings::load();
    if let Some(url) = &options.url {
        settings.url = url.clone();
    }
    if options.save_settings {
        settings.save();
    }

    let client = match ComputeClient::new(&settings) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Invalid compute settings: {e}");
            return;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {e}");
            return;
        }
    };

    let mut session = Session::new(client);
    session.set_policy(preset.policy(), preset.operation);
    let startup_error = load_assets(&runtime, &mut session, preset, &options, &settings);

    tracing::info!("Starting preset '{}' against {}", preset.name, settings.url);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("Compute Viewer: {}", preset.name))
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "compute-gui",
        native_options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(cc, runtime, session, preset, startup_error)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

/// Load the preset's definition and model. Returns the first failure as a
/// status message; the viewer still opens.
fn load_assets(
    runtime: &tokio::runtime::Runtime,
    session: &mut Session,
    preset: &Preset,
    options: &LaunchOptions,
    settings: &ComputeSettings,
) -> Option<String> {
    let http = session.client().http().clone();
    let assets_url = settings.assets_url.as_deref();
    let mut error = None;

    if let Some(source) = options.definition.as_deref().or(preset.definition) {
        match runtime.block_on(Definition::load(&http, source, assets_url)) {
            Ok(definition) => session.load_definition(definition),
            Err(e) => {
                tracing::error!("Failed to load definition: {e}");
                error = Some(e.to_string());
            }
        }
    }

    if let Some(source) = options.model.as_deref().or(preset.model) {
        let loaded = runtime
            .block_on(read_source(&http, source, assets_url))
            .and_then(|bytes| session.load_model(&bytes));
        if let Err(e) = loaded {
            tracing::error!("Failed to load model: {e}");
            error.get_or_insert(e.to_string());
        }
    }

    error
}

fn parse_args() -> LaunchOptions {
    let mut options = LaunchOptions::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let slot = match arg.as_str() {
            "--preset" => &mut options.preset,
            "--definition" => &mut options.definition,
            "--model" => &mut options.model,
            "--url" => &mut options.url,
            "--save-settings" => {
                options.save_settings = true;
                continue;
            }
            other => {
                tracing::warn!("Ignoring unknown argument '{other}'");
                continue;
            }
        };
        match args.next() {
            Some(value) => *slot = Some(value),
            None => tracing::warn!("Missing value for {arg}"),
        }
    }
    options
}
