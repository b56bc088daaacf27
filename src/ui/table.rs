use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::export::EXPORT_COLUMNS;
use crate::data::model::{format_number, CellValue, StudentRecord, StudentTable};

const ROW_HEIGHT: f32 = 18.0;

/// Scrollable grid of the given rows, same column layout as the exports.
pub fn student_table(ui: &mut Ui, id: &str, table: &StudentTable, indices: &[usize]) {
    let n_columns = EXPORT_COLUMNS.len() + table.extra_columns.len();

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(260.0)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(48.0), n_columns)
            .header(ROW_HEIGHT + 2.0, |mut header| {
                let names = EXPORT_COLUMNS
                    .iter()
                    .copied()
                    .chain(table.extra_columns.iter().map(String::as_str));
                for name in names {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, indices.len(), |mut row| {
                    let rec = &table.records[indices[row.index()]];
                    for text in record_cells(table, rec) {
                        row.col(|ui: &mut Ui| {
                            ui.label(text);
                        });
                    }
                });
            });
    });
}

fn record_cells(table: &StudentTable, rec: &StudentRecord) -> Vec<String> {
    let mut cells = vec![
        rec.code.clone(),
        rec.blood_type.clone(),
        rec.hair_color.clone(),
        rec.neighborhood.clone(),
        rec.birth_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        rec.age.map(|a| a.to_string()).unwrap_or_default(),
        format_number(rec.height_m),
        format_number(rec.height_cm),
        format_number(rec.weight),
        format!("{:.2}", rec.bmi),
        rec.bmi_class.to_string(),
        format_number(rec.shoe_size),
        rec.is_group_member.to_string(),
    ];
    cells.extend(table.extra_columns.iter().map(|c| match rec.extra.get(c) {
        Some(CellValue::Null) | None => String::new(),
        Some(v) => v.to_string(),
    }));
    cells
}
