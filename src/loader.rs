use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{Result, SpendError};
use crate::models::{Field, RawTable};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Serial for 9999-12-31, the last day Excel can represent.
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..MAX_EXCEL_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::TimeDelta::try_days(serial.trunc() as i64)?)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceKind {
    Csv,
    #[cfg(feature = "excel")]
    Spreadsheet,
}

impl SourceKind {
    /// Pick a parser from the file name's extension.
    pub fn detect(file_name: &str) -> Result<SourceKind> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(SourceKind::Csv),
            #[cfg(feature = "excel")]
            "xlsx" | "xls" | "xlsm" | "ods" => Ok(SourceKind::Spreadsheet),
            _ => Err(SpendError::UnsupportedFormat(file_name.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// load_table
// ---------------------------------------------------------------------------

pub fn load_table(file_path: &Path) -> Result<RawTable> {
    let name = file_path.to_string_lossy().to_string();
    let table = match SourceKind::detect(&name)? {
        SourceKind::Csv => {
            let bytes = std::fs::read(file_path)?;
            load_csv_bytes(&bytes, &name)?
        }
        #[cfg(feature = "excel")]
        SourceKind::Spreadsheet => load_spreadsheet(file_path)?,
    };
    info!(
        file = %name,
        rows = table.rows.len(),
        columns = table.headers.len(),
        "loaded table"
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Decode CSV bytes as UTF-8, falling back to CP949 for legacy Korean exports.
pub fn decode_csv_text(bytes: &[u8], name: &str) -> Result<String> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(body) {
        Ok(text) => Ok(text.to_string()),
        Err(e) => {
            debug!(file = %name, error = %e, "not valid UTF-8, retrying as CP949");
            encoding_rs::EUC_KR
                .decode_without_bom_handling_and_without_replacement(body)
                .map(|text| text.into_owned())
                .ok_or_else(|| SpendError::Decode(name.to_string()))
        }
    }
}

pub fn load_csv_bytes(bytes: &[u8], name: &str) -> Result<RawTable> {
    let text = decode_csv_text(bytes, name)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let width = headers.len();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let mut row: Vec<Field> = record.iter().map(Field::text).collect();
        row.resize(width.max(row.len()), Field::Empty);
        rows.push(row);
    }
    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// Spreadsheet (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "excel")]
fn load_spreadsheet(file_path: &Path) -> Result<RawTable> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(file_path)?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(RawTable::default());
    };
    debug!(sheet = %sheet, "reading first worksheet");
    let range = workbook.worksheet_range(&sheet)?;
    Ok(table_from_range(&range))
}

/// First row is the header; fully blank rows are skipped and short rows padded.
#[cfg(feature = "excel")]
fn table_from_range(range: &calamine::Range<calamine::Data>) -> RawTable {
    let mut iter = range.rows();
    let headers: Vec<String> = match iter.next() {
        Some(header_row) => header_row.iter().map(|c| c.to_string()).collect(),
        None => return RawTable::default(),
    };
    let width = headers.len();
    let mut rows = Vec::new();
    for row in iter {
        let mut fields: Vec<Field> = row.iter().map(field_from_cell).collect();
        if fields.iter().all(Field::is_blank) {
            continue;
        }
        fields.resize(width.max(fields.len()), Field::Empty);
        rows.push(fields);
    }
    RawTable { headers, rows }
}

#[cfg(feature = "excel")]
fn field_from_cell(cell: &calamine::Data) -> Field {
    use calamine::Data;
    match cell {
        Data::Empty | Data::Error(_) => Field::Empty,
        Data::String(s) => Field::text(s),
        Data::Float(f) => Field::Number(*f),
        Data::Int(i) => Field::Number(*i as f64),
        Data::Bool(b) => Field::Bool(*b),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(Field::Date)
            .unwrap_or(Field::Empty),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Field::text(s),
    }
}
