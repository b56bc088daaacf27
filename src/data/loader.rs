use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array,
    Int64Array,
};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use bytes::Bytes;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Days, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawRecord, RawTable, REQUIRED_COLUMNS};
use crate::error::DataError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a raw roster from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.xlsb` / `.ods` – first worksheet, header row first
/// * `.csv`     – header row with column names
/// * `.json`    – `[{ "Código": "...", "RH": "O+", ... }, ...]`
/// * `.parquet` – one column per field (Pandas / Polars output)
///
/// All eight roster columns must be present; anything else is carried along.
pub fn load_file(path: &Path) -> Result<RawTable> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    load_bytes(path, bytes)
}

/// Parse file contents already in memory. `path` only selects the format
/// and names the source in errors.
pub fn load_bytes(path: &Path, bytes: Vec<u8>) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => load_spreadsheet(bytes),
        "csv" => load_csv(&bytes),
        "json" => load_json(&bytes),
        "parquet" | "pq" => load_parquet(bytes),
        other => return Err(DataError::UnsupportedExtension(other.to_string()).into()),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    check_required_columns(&table.columns)?;
    Ok(table)
}

fn check_required_columns(columns: &[String]) -> Result<(), DataError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|req| !columns.iter().any(|c| c == *req))
        .map(|req| req.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataError::MissingColumns(missing))
    }
}

/// Convert an Excel serial day number (1899-12-30 epoch) to a date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_spreadsheet(bytes: Vec<u8>) -> Result<RawTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(DataError::from)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(DataError::EmptyWorkbook)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(DataError::from)
        .with_context(|| format!("reading sheet '{sheet_name}'"))?;

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| c.to_string()).collect(),
        None => return Ok(RawTable::default()),
    };

    let records = rows
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let value = row.get(i).map(spreadsheet_cell).unwrap_or(CellValue::Null);
                    (col.clone(), value)
                })
                .collect::<RawRecord>()
        })
        .collect();

    Ok(RawTable {
        columns,
        rows: records,
    })
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::String(s) => CellValue::text(s),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            match excel_serial_to_date(serial) {
                Some(d) => CellValue::Date(d),
                None => CellValue::Number(serial),
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(bytes: &[u8]) -> Result<RawTable> {
    let mut reader = csv::Reader::from_reader(bytes);
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row: RawRecord = columns
            .iter()
            .enumerate()
            .map(|(i, col)| (col.clone(), guess_cell_type(record.get(i).unwrap_or(""))))
            .collect();
        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}

fn guess_cell_type(s: &str) -> CellValue {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return CellValue::Null;
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Number(f);
    }
    if trimmed == "true" || trimmed == "false" {
        return CellValue::Bool(trimmed == "true");
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
/// Keys missing from a record read as null.
fn load_json(bytes: &[u8]) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            columns
                .iter()
                .map(|col| {
                    let value = obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null);
                    (col.clone(), value)
                })
                .collect::<RawRecord>()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::text(s),
        JsonValue::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Null),
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

fn load_parquet(bytes: Vec<u8>) -> Result<RawTable> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes))
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let record: RawRecord = columns
                .iter()
                .enumerate()
                .map(|(i, col)| (col.clone(), arrow_cell(batch.column(i), row)))
                .collect();
            rows.push(record);
        }
    }

    Ok(RawTable { columns, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Utf8 => Some(CellValue::text(col.as_string::<i32>().value(row))),
        DataType::LargeUtf8 => Some(CellValue::text(col.as_string::<i64>().value(row))),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Number(a.value(row) as f64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Number(a.value(row) as f64)),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Number(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Number(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row))),
        DataType::Date32 => any
            .downcast_ref::<Date32Array>()
            .and_then(|a| a.value_as_date(row))
            .map(CellValue::Date),
        _ => None,
    };
    // Timestamps and anything exotic go through their display form.
    value.unwrap_or_else(|| match array_value_to_string(col.as_ref(), row) {
        Ok(s) => CellValue::text(&s),
        Err(_) => CellValue::Null,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const HEADER: &str =
        "Código,RH,Color_Cabello,Barrio_Residencia,Fecha_Nacimiento,Estatura,Peso,Talla_Zapato";

    #[test]
    fn csv_blank_cells_are_null() {
        let file = write_temp(
            ".csv",
            &format!("{HEADER}\n202310254018,o+,negro,centro,2001-03-04,1.80,90,42\nX1,A-,,sur,2002-01-01,1.6,55,37\n"),
        );
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.columns.len(), 8);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Estatura"], CellValue::Number(1.8));
        assert_eq!(table.rows[0]["RH"], CellValue::Text("o+".into()));
        assert!(table.rows[1]["Color_Cabello"].is_null());
    }

    #[test]
    fn missing_columns_are_reported() {
        let file = write_temp(".csv", "Código,RH\nA,O+\n");
        let err = load_file(file.path()).unwrap_err();
        let data_err = err.downcast_ref::<DataError>().unwrap();
        match data_err {
            DataError::MissingColumns(cols) => {
                assert_eq!(cols.len(), 6);
                assert!(cols.contains(&"Estatura".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn json_records_fill_missing_keys_with_null() {
        let file = write_temp(
            ".json",
            r#"[
                {"Código": "A", "RH": "O+", "Color_Cabello": "Negro", "Barrio_Residencia": "Centro",
                 "Fecha_Nacimiento": "2000-01-01", "Estatura": 1.7, "Peso": 60, "Talla_Zapato": 40},
                {"Código": "B", "RH": "A+", "Color_Cabello": "Rubio", "Barrio_Residencia": "Norte",
                 "Estatura": 1.6, "Peso": 50, "Talla_Zapato": 37}
            ]"#,
        );
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows[1]["Fecha_Nacimiento"].is_null());
        assert_eq!(table.rows[0]["Peso"], CellValue::Number(60.0));
    }

    #[test]
    fn bytes_parse_without_touching_disk() {
        let contents = format!("{HEADER}\nA,O+,negro,centro,2001-03-04,1.80,90,42\n");
        let table = load_bytes(Path::new("roster.csv"), contents.into_bytes()).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0]["Código"], CellValue::Text("A".into()));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let file = write_temp(".txt", "nothing");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::UnsupportedExtension(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn excel_serial_epoch() {
        assert_eq!(
            excel_serial_to_date(36526.0),
            NaiveDate::from_ymd_opt(2000, 1, 1)
        );
        assert_eq!(excel_serial_to_date(-1.0), None);
    }
}
