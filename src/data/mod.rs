/// Data layer: core types, loading, preparation, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable (header + cells)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ prepare   │  drop incomplete rows, normalise, derive age/BMI/group
///   └──────────┘      (memoised per file content by `cache`)
///        │
///        ▼
///   ┌──────────────┐
///   │ StudentTable │  immutable, shared via Arc
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  filter → ranges → metrics / charts / describe
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  top-N of the full table → .xlsx
///   └──────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod prepare;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use super::model::{BmiClass, StudentRecord, StudentTable};
    use crate::group::GROUP_CODES;

    /// A prepared record with consistent derived fields.
    pub fn record(
        code: &str,
        blood_type: &str,
        hair_color: &str,
        neighborhood: &str,
        age: Option<i64>,
        height_m: f64,
        weight: f64,
    ) -> StudentRecord {
        let bmi = weight / (height_m * height_m);
        StudentRecord {
            code: code.to_string(),
            blood_type: blood_type.to_string(),
            hair_color: hair_color.to_string(),
            neighborhood: neighborhood.to_string(),
            birth_date: age.and_then(|_| NaiveDate::from_ymd_opt(2004, 1, 1)),
            age,
            height_m,
            height_cm: height_m * 100.0,
            weight,
            bmi,
            bmi_class: BmiClass::classify(bmi),
            shoe_size: 40.0,
            is_group_member: GROUP_CODES.contains(&code),
            extra: Default::default(),
        }
    }

    pub fn table(records: Vec<StudentRecord>) -> StudentTable {
        StudentTable::from_records(records, Vec::new())
    }
}
