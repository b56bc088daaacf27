use thiserror::Error;

/// Typed failures of the data layer. Value-level problems (bad dates,
/// zero heights, empty filter results) are not errors; see `data::model`.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Workbook contains no sheets")]
    EmptyWorkbook,

    #[error("Spreadsheet read error: {0}")]
    SpreadsheetRead(#[from] calamine::Error),

    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),
}
