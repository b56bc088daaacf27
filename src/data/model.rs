use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Source column names
// ---------------------------------------------------------------------------

pub const COL_NEIGHBORHOOD: &str = "Barrio_Residencia";
pub const COL_HAIR_COLOR: &str = "Color_Cabello";
pub const COL_BLOOD_TYPE: &str = "RH";
pub const COL_BIRTH_DATE: &str = "Fecha_Nacimiento";
pub const COL_HEIGHT: &str = "Estatura";
pub const COL_WEIGHT: &str = "Peso";
pub const COL_CODE: &str = "Código";
pub const COL_SHOE_SIZE: &str = "Talla_Zapato";

/// Columns every roster must carry.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_NEIGHBORHOOD,
    COL_HAIR_COLOR,
    COL_BLOOD_TYPE,
    COL_BIRTH_DATE,
    COL_HEIGHT,
    COL_WEIGHT,
    COL_CODE,
    COL_SHOE_SIZE,
];

// ---------------------------------------------------------------------------
// CellValue – a single raw cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Spreadsheet date cell.
    Date(NaiveDate),
    Null,
}

impl CellValue {
    /// Build a text cell; blank text reads as null.
    pub fn text(s: &str) -> Self {
        if s.trim().is_empty() {
            CellValue::Null
        } else {
            CellValue::Text(s.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Number(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the cell. Text is accepted with `.` or `,` as the
    /// decimal separator.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Text(s) => {
                let s = s.trim();
                s.parse::<f64>()
                    .ok()
                    .or_else(|| s.replace(',', ".").parse::<f64>().ok())
            }
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(v) => write!(f, "{}", format_number(*v)),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

/// Render a float without a trailing `.0` when it is integral.
pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

/// One raw row: column name → cell.
pub type RawRecord = BTreeMap<String, CellValue>;

/// The raw table as loaded: header order plus rows.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRecord>,
}

// ---------------------------------------------------------------------------
// BMI classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BmiClass {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiClass {
    /// `<18.5` underweight, `[18.5, 25)` normal, `[25, 30)` overweight,
    /// everything else obese. NaN fails every comparison and lands in
    /// `Obese`, as does infinity.
    pub fn classify(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiClass::Underweight
        } else if bmi < 25.0 {
            BmiClass::Normal
        } else if bmi < 30.0 {
            BmiClass::Overweight
        } else {
            BmiClass::Obese
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiClass::Underweight => "Underweight",
            BmiClass::Normal => "Normal",
            BmiClass::Overweight => "Overweight",
            BmiClass::Obese => "Obese",
        }
    }
}

impl fmt::Display for BmiClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// StudentRecord – one row of the prepared table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub code: String,
    pub blood_type: String,
    pub hair_color: String,
    pub neighborhood: String,
    pub birth_date: Option<NaiveDate>,
    pub age: Option<i64>,
    /// Source height, in meters.
    pub height_m: f64,
    /// Always `height_m * 100`.
    pub height_cm: f64,
    pub weight: f64,
    pub bmi: f64,
    pub bmi_class: BmiClass,
    pub shoe_size: f64,
    pub is_group_member: bool,
    /// Non-required source columns, passed through untouched.
    pub extra: BTreeMap<String, CellValue>,
}

/// Categorical fields exposed as multi-select filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    BloodType,
    HairColor,
    Neighborhood,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::BloodType, Category::HairColor, Category::Neighborhood];

    pub fn label(&self) -> &'static str {
        match self {
            Category::BloodType => "Blood type (RH)",
            Category::HairColor => "Hair color",
            Category::Neighborhood => "Neighborhood",
        }
    }

    pub fn value<'a>(&self, record: &'a StudentRecord) -> &'a str {
        match self {
            Category::BloodType => &record.blood_type,
            Category::HairColor => &record.hair_color,
            Category::Neighborhood => &record.neighborhood,
        }
    }
}

// ---------------------------------------------------------------------------
// StudentTable – the prepared, immutable table
// ---------------------------------------------------------------------------

/// The prepared table with the distinct values of each categorical field.
#[derive(Debug, Clone, Default)]
pub struct StudentTable {
    pub records: Vec<StudentRecord>,
    /// Names of the pass-through columns, in source order.
    pub extra_columns: Vec<String>,
    /// Distinct values per category, in order of first appearance.
    pub unique_values: BTreeMap<Category, Vec<String>>,
}

impl StudentTable {
    /// Build category indices from prepared records.
    pub fn from_records(records: Vec<StudentRecord>, extra_columns: Vec<String>) -> Self {
        let mut unique_values: BTreeMap<Category, Vec<String>> = BTreeMap::new();
        for category in Category::ALL {
            let values = unique_values.entry(category).or_default();
            for rec in &records {
                let v = category.value(rec);
                if !values.iter().any(|seen| seen == v) {
                    values.push(v.to_string());
                }
            }
        }
        StudentTable {
            records,
            extra_columns,
            unique_values,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn distinct(&self, category: Category) -> &[String] {
        self.unique_values
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_class_boundaries() {
        assert_eq!(BmiClass::classify(18.4999), BmiClass::Underweight);
        assert_eq!(BmiClass::classify(18.5), BmiClass::Normal);
        assert_eq!(BmiClass::classify(24.999), BmiClass::Normal);
        assert_eq!(BmiClass::classify(25.0), BmiClass::Overweight);
        assert_eq!(BmiClass::classify(29.999), BmiClass::Overweight);
        assert_eq!(BmiClass::classify(30.0), BmiClass::Obese);
    }

    #[test]
    fn non_finite_bmi_is_obese() {
        assert_eq!(BmiClass::classify(f64::INFINITY), BmiClass::Obese);
        assert_eq!(BmiClass::classify(f64::NAN), BmiClass::Obese);
    }

    #[test]
    fn blank_text_and_nan_are_null() {
        assert!(CellValue::text("   ").is_null());
        assert!(CellValue::Number(f64::NAN).is_null());
        assert!(!CellValue::text("O+").is_null());
    }

    #[test]
    fn numeric_text_accepts_decimal_comma() {
        assert_eq!(CellValue::Text("1,75".into()).as_f64(), Some(1.75));
        assert_eq!(CellValue::Text(" 62.5 ".into()).as_f64(), Some(62.5));
        assert_eq!(CellValue::Text("tall".into()).as_f64(), None);
    }

    #[test]
    fn format_number_drops_integral_fraction() {
        assert_eq!(format_number(202310254018.0), "202310254018");
        assert_eq!(format_number(38.5), "38.5");
    }
}
