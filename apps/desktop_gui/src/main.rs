mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::backend_bridge::runtime::{self, WorkerConfig};
use crate::controller::events::UiEvent;
use crate::ui::theme::{PersistedUiSettings, ThemePreference, SETTINGS_STORAGE_KEY};
use crate::ui::{DocChatApp, StartupConfig};

/// Desktop chat client for a document question-answering backend.
#[derive(Debug, Parser)]
#[command(name = "docchat", version)]
struct Args {
    /// Base URL of the backend server.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server_url: String,

    /// Conversation session identifier; a backend-default session is used
    /// when omitted.
    #[arg(long)]
    session_id: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    runtime::launch(
        WorkerConfig {
            server_url: args.server_url.clone(),
        },
        cmd_rx,
        ui_tx,
    );

    let startup = StartupConfig {
        server_url: args.server_url,
        session_id: args.session_id,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("DocChat")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([820.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "DocChat",
        options,
        Box::new(move |cc| {
            let persisted = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedUiSettings>(&text).ok())
            });
            // Persisted choice wins; otherwise follow the system preference
            // egui detected at startup.
            let theme = persisted.and_then(|settings| settings.theme).unwrap_or(
                ThemePreference::from_dark_mode(cc.egui_ctx.style().visuals.dark_mode),
            );
            Ok(Box::new(DocChatApp::bootstrap(startup, theme, cmd_tx, ui_rx)))
        }),
    )
}
