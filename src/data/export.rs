use std::path::Path;

use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};

use super::aggregate::top_n_by;
use super::model::{
    CellValue, StudentTable, COL_BIRTH_DATE, COL_BLOOD_TYPE, COL_CODE, COL_HAIR_COLOR,
    COL_HEIGHT, COL_NEIGHBORHOOD, COL_SHOE_SIZE, COL_WEIGHT,
};
use crate::error::DataError;

/// Header of every exported sheet; extra source columns follow.
pub const EXPORT_COLUMNS: [&str; 13] = [
    COL_CODE,
    COL_BLOOD_TYPE,
    COL_HAIR_COLOR,
    COL_NEIGHBORHOOD,
    COL_BIRTH_DATE,
    "Edad",
    COL_HEIGHT,
    "Estatura_cm",
    COL_WEIGHT,
    "IMC",
    "Clasificación_IMC",
    COL_SHOE_SIZE,
    "Integrante_Grupo",
];

/// Write the top-`n` rows by height and by weight of the full table.
pub fn export_top_n(
    table: &StudentTable,
    n: usize,
    height_path: &Path,
    weight_path: &Path,
) -> Result<(), DataError> {
    let by_height = top_n_by(table, n, |r| r.height_cm);
    let by_weight = top_n_by(table, n, |r| r.weight);
    write_records(height_path, table, &by_height)?;
    write_records(weight_path, table, &by_weight)?;
    log::info!(
        "Wrote top {n} by height to {} and by weight to {}",
        height_path.display(),
        weight_path.display()
    );
    Ok(())
}

/// Write the given rows (header first, no index column) to an `.xlsx` file.
pub fn write_records(path: &Path, table: &StudentTable, indices: &[usize]) -> Result<(), DataError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let header = EXPORT_COLUMNS
        .iter()
        .copied()
        .chain(table.extra_columns.iter().map(String::as_str));
    for (col, name) in header.enumerate() {
        sheet.write_string(0, col as u16, name)?;
    }

    for (out_row, &idx) in indices.iter().enumerate() {
        let row = out_row as u32 + 1;
        let rec = &table.records[idx];

        sheet.write_string(row, 0, &rec.code)?;
        sheet.write_string(row, 1, &rec.blood_type)?;
        sheet.write_string(row, 2, &rec.hair_color)?;
        sheet.write_string(row, 3, &rec.neighborhood)?;
        if let Some(d) = rec.birth_date {
            write_date(sheet, row, 4, d, &date_format)?;
        }
        if let Some(age) = rec.age {
            sheet.write_number(row, 5, age as f64)?;
        }
        write_float(sheet, row, 6, rec.height_m)?;
        write_float(sheet, row, 7, rec.height_cm)?;
        write_float(sheet, row, 8, rec.weight)?;
        write_float(sheet, row, 9, rec.bmi)?;
        sheet.write_string(row, 10, rec.bmi_class.label())?;
        write_float(sheet, row, 11, rec.shoe_size)?;
        sheet.write_boolean(row, 12, rec.is_group_member)?;

        for (offset, name) in table.extra_columns.iter().enumerate() {
            let col = (EXPORT_COLUMNS.len() + offset) as u16;
            match rec.extra.get(name) {
                Some(CellValue::Text(s)) => {
                    sheet.write_string(row, col, s)?;
                }
                Some(CellValue::Number(v)) => write_float(sheet, row, col, *v)?,
                Some(CellValue::Bool(b)) => {
                    sheet.write_boolean(row, col, *b)?;
                }
                Some(CellValue::Date(d)) => write_date(sheet, row, col, *d, &date_format)?,
                Some(CellValue::Null) | None => {}
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Spreadsheets have no infinity or NaN; those go out as text.
fn write_float(sheet: &mut Worksheet, row: u32, col: u16, v: f64) -> Result<(), DataError> {
    if v.is_finite() {
        sheet.write_number(row, col, v)?;
    } else {
        sheet.write_string(row, col, v.to_string())?;
    }
    Ok(())
}

fn write_date(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    date: NaiveDate,
    format: &Format,
) -> Result<(), DataError> {
    let dt = ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)?;
    sheet.write_datetime_with_format(row, col, &dt, format)?;
    Ok(())
}
