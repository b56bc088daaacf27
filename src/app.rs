use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::SessionState;
use crate::ui::{dashboard, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct StudentDashboardApp {
    pub state: SessionState,
}

impl StudentDashboardApp {
    /// Start a session, opening the configured roster if there is one.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = SessionState::new(config);
        if let Some(path) = state.config.source.clone() {
            state.load_source(&path);
        }
        Self { state }
    }
}

impl eframe::App for StudentDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tables, metrics, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard::central_panel(ui, &self.state);
        });
    }
}
