use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate};
use serde_json::{Map, Value};
use std::io::Cursor;
use thiserror::Error;

use crate::api::validation::Validate;
use crate::database::models::ClientCreate;

/// One parsed spreadsheet row: header -> cell, empty cells as `null`
pub type ImportRow = Map<String, Value>;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unsupported file format. Please upload a CSV or Excel file.")]
    UnsupportedFormat,

    #[error("Could not read file: {0}")]
    Parse(String),

    /// Every failing row, one message per line
    #[error("{}", .0.join("\n"))]
    Invalid(Vec<String>),
}

impl From<csv::Error> for ImportError {
    fn from(e: csv::Error) -> Self {
        ImportError::Parse(e.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(e: calamine::Error) -> Self {
        ImportError::Parse(e.to_string())
    }
}

/// Parse an uploaded file into rows, dispatching on the filename extension
pub fn parse_upload(bytes: &[u8], filename: &str) -> Result<Vec<ImportRow>, ImportError> {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".csv") {
        parse_csv(bytes)
    } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        parse_workbook(bytes)
    } else {
        Err(ImportError::UnsupportedFormat)
    }
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<ImportRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cells = headers.iter().enumerate().map(|(i, header)| {
            let value = match record.get(i) {
                Some(cell) if !cell.is_empty() => Value::String(cell.to_string()),
                _ => Value::Null,
            };
            (header.clone(), value)
        });
        push_row(&mut rows, cells);
    }
    Ok(rows)
}

/// First worksheet only; its first row is the header
fn parse_workbook(bytes: &[u8]) -> Result<Vec<ImportRow>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::Parse("workbook has no worksheets".to_string()))??;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header) => header.iter().map(|c| cell_text(c).unwrap_or_default().trim().to_string()).collect(),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for sheet_row in sheet_rows {
        let cells = headers.iter().enumerate().map(|(i, header)| {
            let value = sheet_row
                .get(i)
                .and_then(cell_text)
                .map(Value::String)
                .unwrap_or(Value::Null);
            (header.clone(), value)
        });
        push_row(&mut rows, cells);
    }
    Ok(rows)
}

/// Keep rows with at least one value; unnamed columns are dropped
fn push_row(rows: &mut Vec<ImportRow>, cells: impl Iterator<Item = (String, Value)>) {
    let row: ImportRow = cells.filter(|(header, _)| !header.is_empty()).collect();
    if row.values().any(|v| !v.is_null()) {
        rows.push(row);
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(n) => Some(n.to_string()),
        Data::Float(f) => Some(float_text(*f)),
        Data::Bool(b) => Some(b.to_string()),
        Data::Error(e) => Some(format!("#ERR({:?})", e)),
        Data::DateTime(dt) => Some(serial_date_text(dt.as_f64())),
        Data::DateTimeIso(s) => Some(s.clone()),
        Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Spreadsheets store every number as a float; whole numbers render without `.0`
fn float_text(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

/// Excel serial day number (1900 system) to `YYYY-MM-DD`
fn serial_date_text(serial: f64) -> String {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default();
    Duration::try_days(serial.floor() as i64)
        .and_then(|days| epoch.checked_add_signed(days))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| float_text(serial))
}

/// Validate every row as a client; any failure rejects the whole batch
pub fn validate_clients(rows: Vec<ImportRow>) -> Result<Vec<ClientCreate>, ImportError> {
    let mut clients = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        let row_no = index + 1;
        match serde_json::from_value::<ClientCreate>(Value::Object(row)) {
            Ok(client) => match client.validate() {
                Ok(()) => clients.push(client),
                Err(e) => errors.push(format!("Row {}: {}", row_no, e)),
            },
            Err(e) => errors.push(format!("Row {}: {}", row_no, e)),
        }
    }

    if errors.is_empty() {
        Ok(clients)
    } else {
        Err(ImportError::Invalid(errors))
    }
}
