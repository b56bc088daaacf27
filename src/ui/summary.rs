use eframe::egui::{self, Ui};

use crate::data::aggregate::{Describe, SummaryMetrics};

fn show(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "–".to_string())
}

/// The five headline metrics side by side.
pub fn metrics_row(ui: &mut Ui, metrics: &SummaryMetrics) {
    let tiles = [
        ("Total students", metrics.count.to_string()),
        ("Mean age", show(metrics.mean_age)),
        ("Mean height (cm)", show(metrics.mean_height_cm)),
        ("Mean weight (kg)", show(metrics.mean_weight)),
        ("Mean BMI", show(metrics.mean_bmi)),
    ];
    ui.columns(tiles.len(), |cols| {
        for (col, (label, value)) in cols.iter_mut().zip(tiles) {
            col.group(|ui: &mut Ui| {
                ui.label(label);
                ui.heading(value);
            });
        }
    });
}

/// One `describe()` block per measurement.
pub fn describe_blocks(ui: &mut Ui, blocks: [(&str, &Describe); 3]) {
    ui.columns(blocks.len(), |cols| {
        for (col, (title, stats)) in cols.iter_mut().zip(blocks) {
            col.strong(title);
            egui::Grid::new(title)
                .striped(true)
                .num_columns(2)
                .show(col, |ui: &mut Ui| {
                    for (name, value) in stats.rows() {
                        ui.label(name);
                        ui.label(show(value));
                        ui.end_row();
                    }
                });
        }
    });
}
