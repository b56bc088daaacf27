mod app;
mod color;
mod config;
mod data;
mod error;
mod group;
mod state;
mod ui;

use std::path::PathBuf;

use app::StudentDashboardApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load(std::env::args_os().nth(1).map(PathBuf::from))
        .unwrap_or_else(|e| {
            log::error!("Falling back to default configuration: {e:#}");
            DashboardConfig::default()
        });
    log::info!("Configuration: {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Student Dashboard – Group 050",
        options,
        Box::new(move |_cc| Ok(Box::new(StudentDashboardApp::new(config)))),
    )
}
