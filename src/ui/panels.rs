use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::filter::RangeControl;
use crate::data::model::{format_number, Category};
use crate::data::pipeline::{Evaluation, Notice, NoticeLevel, NO_DATA_MESSAGE};
use crate::state::SessionState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut SessionState) {
    ui.heading("Filters");
    ui.separator();

    let table = match &state.table {
        Some(table) => table.clone(),
        None => {
            ui.label("No roster loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Multi-select per category (collapsible) ----
            for category in Category::ALL {
                let values = table.distinct(category);
                let n_selected = state.filters.selected_count(category);
                let header_text =
                    format!("{}  ({n_selected}/{})", category.label(), values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(category.label())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("Clear").clicked() {
                            state.clear_filter(category);
                        }
                        for value in values {
                            let mut text = RichText::new(value);
                            match category {
                                Category::BloodType => {
                                    text = text.color(state.blood_colors.color_for(value))
                                }
                                Category::HairColor => {
                                    text = text.color(state.hair_colors.color_for(value))
                                }
                                Category::Neighborhood => {}
                            }
                            let mut checked = state.filters.is_selected(category, value);
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(category, value);
                            }
                        }
                    });
            }
            ui.label(RichText::new("Nothing ticked means no filter.").weak());

            ui.separator();
            let mut group_only = state.filters.group_only;
            if ui
                .checkbox(&mut group_only, "Members of our group only")
                .changed()
            {
                state.set_group_only(group_only);
            }

            ui.separator();
            ui.strong("Range filters");
            range_filters(ui, state);
        });
}

fn range_filters(ui: &mut Ui, state: &mut SessionState) {
    let (age, age_applied, height, height_applied, notices) = match &state.evaluation {
        Some(Evaluation::Ready(view)) => (
            view.age,
            view.age_applied,
            view.height,
            view.height_applied,
            view.notices.clone(),
        ),
        Some(Evaluation::NoData) => {
            notice_label(ui, NoticeLevel::Warning, NO_DATA_MESSAGE);
            return;
        }
        None => return,
    };

    for Notice { level, message } in &notices {
        notice_label(ui, *level, message);
    }

    if let Some(range) = range_slider(ui, "Age", "years", age, age_applied) {
        state.set_age_range(range);
    }
    if let Some(range) = range_slider(ui, "Height (cm)", "cm", height, height_applied) {
        state.set_height_range(range);
    }
}

/// From/to sliders over the bounds, or just the value when it is fixed.
/// Returns the new range when the user moved a handle.
fn range_slider(
    ui: &mut Ui,
    label: &str,
    unit: &str,
    control: RangeControl,
    applied: (i64, i64),
) -> Option<(i64, i64)> {
    ui.label(label);
    if let Some(single) = control.single {
        ui.label(format!("{} {unit}", format_number(single)));
        return None;
    }

    let (mut lo, mut hi) = applied;
    let from = ui.add(Slider::new(&mut lo, control.min..=control.max).text("from"));
    let to = ui.add(Slider::new(&mut hi, control.min..=control.max).text("to"));
    if !(from.changed() || to.changed()) {
        return None;
    }
    if lo > hi {
        if from.changed() {
            hi = lo;
        } else {
            lo = hi;
        }
    }
    Some((lo, hi))
}

pub fn notice_label(ui: &mut Ui, level: NoticeLevel, message: &str) {
    let color = match level {
        NoticeLevel::Warning => Color32::from_rgb(230, 160, 40),
        NoticeLevel::Info => Color32::LIGHT_BLUE,
    };
    ui.label(RichText::new(message).color(color));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut SessionState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let export_label = format!("Export top {}", state.config.top_n);
            if ui
                .add_enabled(state.table.is_some(), egui::Button::new(export_label))
                .clicked()
            {
                state.export_top();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            let visible = match &state.evaluation {
                Some(Evaluation::Ready(view)) => view.indices.len(),
                _ => 0,
            };
            ui.label(format!(
                "{} students loaded, {} visible",
                table.len(),
                visible
            ));
        }

        if let Some(source) = &state.source {
            ui.separator();
            ui.label(RichText::new(source.display().to_string()).weak());
        }

        match &state.export_message {
            Some(Ok(msg)) => {
                ui.separator();
                ui.label(RichText::new(format!("✅ {msg}")).color(Color32::GREEN));
            }
            Some(Err(msg)) => {
                ui.separator();
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            None => {}
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut SessionState) {
    let file = rfd::FileDialog::new()
        .set_title("Open student roster")
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xls", "xlsb", "ods", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xls", "xlsb", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_source(&path);
    }
}
