use anyhow::Context;
use eframe::egui;
use std::sync::Arc;

use portfolio_terminal::app::TerminalApp;
use portfolio_terminal::avatar::{AvatarCoordinator, GeneratingAvatarService};
use portfolio_terminal::avatar_store::AvatarStore;
use portfolio_terminal::config::AppConfig;
use portfolio_terminal::history::HistoryStore;
use portfolio_terminal::image_generator::ImageGenerator;
use portfolio_terminal::logging;
use portfolio_terminal::session::get_or_create_session_id;
use portfolio_terminal::storage;
use portfolio_terminal::terminal::Terminal;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    logging::init_global(&config.log_path());
    tracing::info!("Starting with data dir {:?}", config.data_dir);

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    let mut store = storage::open_or_unavailable(&config.storage_path());
    let session_id = get_or_create_session_id(store.as_mut());
    let history = HistoryStore::open(store);

    let generator = ImageGenerator::new(config.openai_api_key.clone(), config.request_timeout)
        .context("failed to build HTTP client")?;
    let service = GeneratingAvatarService::new(generator, AvatarStore::new(config.avatars_path()));
    let coordinator = AvatarCoordinator::new(Arc::new(service), runtime.handle().clone());

    let terminal = Terminal::new(&config, session_id, history, coordinator);
    let app = TerminalApp::new(terminal, config, runtime);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_title("Portfolio Terminal")
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "Portfolio Terminal",
        options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);

            let mut visuals = egui::Visuals::dark();
            visuals.window_fill = egui::Color32::from_rgb(12, 12, 20);
            visuals.panel_fill = egui::Color32::from_rgb(12, 12, 20);
            visuals.extreme_bg_color = egui::Color32::from_rgb(12, 12, 20);
            cc.egui_ctx.set_visuals(visuals);

            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("terminal window failed: {}", e))
}
