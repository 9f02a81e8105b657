//! Table rows to downloadable CSV or XLSX files.
//!
//! The XLSX writer emits the smallest package spreadsheet tools accept: one
//! worksheet, inline strings, no styles.

use quick_xml::escape::escape;
use serde_json::Value;
use std::collections::BTreeSet;
use std::io::{Cursor, Write};
use std::str::FromStr;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid entity")]
    UnknownEntity(String),

    #[error("Unsupported export format '{0}'")]
    UnknownFormat(String),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Tables that can be exported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportEntity {
    Clients,
    Proposals,
    Assignments,
    Invoices,
    Receipts,
}

impl ExportEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportEntity::Clients => "clients",
            ExportEntity::Proposals => "proposals",
            ExportEntity::Assignments => "assignments",
            ExportEntity::Invoices => "invoices",
            ExportEntity::Receipts => "receipts",
        }
    }
}

impl FromStr for ExportEntity {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clients" => Ok(ExportEntity::Clients),
            "proposals" => Ok(ExportEntity::Proposals),
            "assignments" => Ok(ExportEntity::Assignments),
            "invoices" => Ok(ExportEntity::Invoices),
            "receipts" => Ok(ExportEntity::Receipts),
            other => Err(ExportError::UnknownEntity(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xlsx" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

/// A finished export, ready to send as an attachment
#[derive(Debug)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub fn export(entity: ExportEntity, format: ExportFormat, rows: &[Value]) -> Result<ExportFile, ExportError> {
    let bytes = match format {
        ExportFormat::Csv => to_csv(rows)?,
        ExportFormat::Xlsx => to_xlsx(entity.as_str(), rows)?,
    };
    Ok(ExportFile {
        filename: format!("{}.{}", entity.as_str(), format.extension()),
        content_type: format.content_type(),
        bytes,
    })
}

/// Sorted union of field names across all rows
fn header(rows: &[Value]) -> Vec<String> {
    let names: BTreeSet<&String> = rows
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|row| row.keys())
        .collect();
    names.into_iter().cloned().collect()
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn to_csv(rows: &[Value]) -> Result<Vec<u8>, ExportError> {
    let columns = header(rows);
    let mut writer = csv::Writer::from_writer(Vec::new());
    // An empty table has no columns; a blank header record would read back as one
    if !columns.is_empty() {
        writer.write_record(&columns)?;
    }
    for row in rows {
        writer.write_record(columns.iter().map(|c| cell_text(row.get(c))))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape(sheet_name)
    )
}

/// Zero-based column index to spreadsheet letters: 0 -> A, 26 -> AA
fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn write_cell(xml: &mut String, reference: &str, value: Option<&Value>) {
    match value {
        None | Some(Value::Null) => {}
        Some(Value::Number(n)) => {
            xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, n));
        }
        Some(Value::Bool(b)) => {
            xml.push_str(&format!(r#"<c r="{}" t="b"><v>{}</v></c>"#, reference, u8::from(*b)));
        }
        Some(other) => {
            xml.push_str(&format!(
                r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                reference,
                escape(cell_text(Some(other)).as_str())
            ));
        }
    }
}

fn sheet_xml(rows: &[Value]) -> String {
    let columns = header(rows);
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    if !columns.is_empty() {
        xml.push_str(r#"<row r="1">"#);
        for (i, column) in columns.iter().enumerate() {
            let name = Value::String(column.clone());
            write_cell(&mut xml, &format!("{}1", column_name(i)), Some(&name));
        }
        xml.push_str("</row>");
    }

    for (r, row) in rows.iter().enumerate() {
        let row_no = r + 2;
        xml.push_str(&format!(r#"<row r="{}">"#, row_no));
        for (i, column) in columns.iter().enumerate() {
            write_cell(&mut xml, &format!("{}{}", column_name(i), row_no), row.get(column));
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Single-sheet workbook named after `sheet_name`
pub fn to_xlsx(sheet_name: &str, rows: &[Value]) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", workbook_xml(sheet_name)),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(rows)),
    ];
    for (name, body) in parts {
        zip.start_file(name, SimpleFileOptions::default())?;
        zip.write_all(body.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_auto_from_rs, Data, Reader};
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({ "client_code": "CL0001", "client_name": "Acme & Sons", "status": "Active" }),
            json!({ "client_code": "CL0002", "client_name": "Birla", "industry": "Food", "fee": 1200.5 }),
        ]
    }

    #[test]
    fn csv_header_is_sorted_union() {
        let bytes = to_csv(&rows()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("client_code,client_name,fee,industry,status"));
        assert_eq!(lines.next(), Some("CL0001,Acme & Sons,,,Active"));
        assert_eq!(lines.next(), Some("CL0002,Birla,1200.5,Food,"));
    }

    #[test]
    fn empty_tables_export_without_a_header() {
        assert!(to_csv(&[]).unwrap().is_empty());

        let bytes = to_xlsx("receipts", &[]).unwrap();
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();
        assert!(range.is_empty());
    }

    #[test]
    fn column_names_roll_over() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn xlsx_opens_with_named_sheet_and_typed_cells() {
        let bytes = to_xlsx("clients", &rows()).unwrap();
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["clients".to_string()]);

        let range = workbook.worksheet_range_at(0).unwrap().unwrap();
        assert_eq!(range.get_size(), (3, 5));
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("client_code".into())));
        assert_eq!(range.get_value((1, 1)), Some(&Data::String("Acme & Sons".into())));
        assert_eq!(range.get_value((2, 2)), Some(&Data::Float(1200.5)));
        assert_eq!(range.get_value((1, 3)), Some(&Data::Empty));
    }

    #[test]
    fn export_names_the_attachment() {
        let file = export(ExportEntity::Invoices, ExportFormat::Csv, &[]).unwrap();
        assert_eq!(file.filename, "invoices.csv");
        assert_eq!(file.content_type, "text/csv");
    }

    #[test]
    fn unknown_entity_and_format_are_rejected() {
        assert!(matches!("users".parse::<ExportEntity>(), Err(ExportError::UnknownEntity(_))));
        assert!(matches!("pdf".parse::<ExportFormat>(), Err(ExportError::UnknownFormat(_))));
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
    }
}
