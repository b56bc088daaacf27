use chrono::{NaiveDate, NaiveDateTime};

use super::model::{
    BmiClass, CellValue, RawRecord, RawTable, StudentRecord, StudentTable, COL_BIRTH_DATE,
    COL_BLOOD_TYPE, COL_CODE, COL_HAIR_COLOR, COL_HEIGHT, COL_NEIGHBORHOOD, COL_SHOE_SIZE,
    COL_WEIGHT, REQUIRED_COLUMNS,
};
use crate::group::GROUP_CODES;


static NULL: CellValue = CellValue::Null;

/// Turn a raw roster into the prepared table.
///
/// Rows with a null in any column are dropped first; every derived field is
/// computed from the surviving cells. `today` anchors the age computation.
pub fn prepare(raw: &RawTable, today: NaiveDate) -> StudentTable {
    let complete = complete_rows(raw);
    let dropped_null = raw.rows.len() - complete.len();
    if dropped_null > 0 {
        log::info!("Dropped {dropped_null} incomplete row(s)");
    }

    let extra_columns: Vec<String> = raw
        .columns
        .iter()
        .filter(|c| !REQUIRED_COLUMNS.contains(&c.as_str()))
        .cloned()
        .collect();

    let records: Vec<StudentRecord> = complete
        .into_iter()
        .filter_map(|(i, row)| {
            let record = prepare_row(row, &extra_columns, today);
            if record.is_none() {
                let code = row.get(COL_CODE).map(code_string).unwrap_or_default();
                log::warn!(
                    "Data row {} (code {code}): non-numeric height, weight or shoe size; skipped",
                    i + 1
                );
            }
            record
        })
        .collect();

    let zero_height = records.iter().filter(|r| !r.bmi.is_finite()).count();
    if zero_height > 0 {
        log::warn!("{zero_height} row(s) have a non-finite BMI (zero height)");
    }

    log::info!(
        "Prepared {} of {} raw rows",
        records.len(),
        raw.rows.len()
    );
    StudentTable::from_records(records, extra_columns)
}

/// Rows without a null in any column, with their index in `raw.rows`.
fn complete_rows(raw: &RawTable) -> Vec<(usize, &RawRecord)> {
    raw.rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            raw.columns
                .iter()
                .all(|col| row.get(col).is_some_and(|v| !v.is_null()))
        })
        .collect()
}

fn prepare_row(row: &RawRecord, extra_columns: &[String], today: NaiveDate) -> Option<StudentRecord> {
    let cell = |col: &str| row.get(col).unwrap_or(&NULL);

    let height_m = cell(COL_HEIGHT).as_f64()?;
    let weight = cell(COL_WEIGHT).as_f64()?;
    let shoe_size = cell(COL_SHOE_SIZE).as_f64()?;

    let birth_date = parse_birth_date(cell(COL_BIRTH_DATE));
    let age = birth_date.map(|d| age_in_years(d, today));

    let bmi = weight / (height_m * height_m);
    let code = code_string(cell(COL_CODE));
    let is_group_member = GROUP_CODES.contains(&code.as_str());

    Some(StudentRecord {
        blood_type: cell(COL_BLOOD_TYPE).to_string().to_uppercase(),
        hair_color: title_case(&cell(COL_HAIR_COLOR).to_string()),
        neighborhood: title_case(&cell(COL_NEIGHBORHOOD).to_string()),
        birth_date,
        age,
        height_m,
        height_cm: height_m * 100.0,
        weight,
        bmi,
        bmi_class: BmiClass::classify(bmi),
        shoe_size,
        is_group_member,
        code,
        extra: extra_columns
            .iter()
            .map(|c| (c.clone(), cell(c).clone()))
            .collect(),
    })
}

/// Lowercase, trim, then capitalise the first letter of every alphabetic run.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.trim().chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// Trimmed code text; integral numbers lose their fractional part.
fn code_string(value: &CellValue) -> String {
    value.to_string().trim().to_string()
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Best-effort birth date. Anything that does not look like a date is `None`.
pub fn parse_birth_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => {
            let s = s.trim();
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .or_else(|| {
                    DATETIME_FORMATS
                        .iter()
                        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                        .map(|dt| dt.date())
                })
        }
        _ => None,
    }
}

/// Whole years as `floor(days / 365)`.
pub fn age_in_years(birth_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - birth_date).num_days().div_euclid(365)
}
