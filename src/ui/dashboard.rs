use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::data::pipeline::{Evaluation, NoticeLevel, NO_DATA_MESSAGE};
use crate::state::SessionState;
use crate::ui::{panels, plot, summary, table};

// ---------------------------------------------------------------------------
// Central panel: tables, metrics, charts, statistics
// ---------------------------------------------------------------------------

/// Render the main dashboard, top to bottom.
pub fn central_panel(ui: &mut Ui, state: &SessionState) {
    let Some(roster) = &state.table else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a roster to start  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Student dashboard");

            egui::CollapsingHeader::new(RichText::new("Roster data").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    let all: Vec<usize> = (0..roster.len()).collect();
                    table::student_table(ui, "roster_table", roster, &all);
                });

            let view = match &state.evaluation {
                Some(Evaluation::Ready(view)) => view,
                Some(Evaluation::NoData) => {
                    ui.separator();
                    panels::notice_label(ui, NoticeLevel::Warning, NO_DATA_MESSAGE);
                    return;
                }
                None => return,
            };

            egui::CollapsingHeader::new(RichText::new("Filtered data").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    table::student_table(ui, "filtered_table", roster, &view.categorical);
                });

            ui.separator();
            ui.heading("Summary");
            summary::metrics_row(ui, &view.metrics);

            ui.separator();
            ui.heading("Distributions");
            plot::charts(ui, &view.charts, &state.blood_colors, &state.hair_colors);

            ui.separator();
            ui.heading("Statistics (height, weight, BMI)");
            summary::describe_blocks(
                ui,
                [
                    ("Height (cm)", &view.height_stats),
                    ("Weight (kg)", &view.weight_stats),
                    ("BMI", &view.bmi_stats),
                ],
            );
        });
}
