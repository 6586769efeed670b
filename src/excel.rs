//! File parsing for question imports (Excel and CSV)
//!
//! Turns the first sheet of a workbook, or a CSV file with a header row, into
//! `RawRecord`s keyed by the header text. Any failure here is a read failure for
//! the whole file: no partial row set is ever returned.

use crate::error::{CoreError, Result};
use crate::normalize::RawRecord;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use serde_json::{Number, Value};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read rows from an `.xlsx`/`.xls`/`.ods` or `.csv` file.
pub fn read_rows(file_path: impl AsRef<Path>) -> Result<Vec<RawRecord>> {
    let path = file_path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let rows = match extension.as_str() {
        "xlsx" | "xls" | "xlsm" | "ods" => read_workbook(path)?,
        "csv" => {
            let file = std::fs::File::open(path).map_err(|e| CoreError::source_read(path.display().to_string(), e))?;
            read_csv(file).map_err(|e| retag(e, path))?
        }
        _ => return Err(CoreError::UnsupportedFormat(extension)),
    };

    debug!(path = %path.display(), rows = rows.len(), "read import rows");
    Ok(rows)
}

fn retag(err: CoreError, path: &Path) -> CoreError {
    match err {
        CoreError::SourceRead { message, .. } => CoreError::source_read(path.display().to_string(), message),
        other => other,
    }
}

/// Parse CSV text with a header row. Blank lines and blank rows are skipped.
pub fn read_csv<R: Read>(input: R) -> Result<Vec<RawRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CoreError::source_read("csv", format!("Failed to read CSV headers: {}", e)))?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| CoreError::source_read("csv", format!("Failed to read CSV row: {}", e)))?;
        let row: RawRecord = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.trim().is_empty())
            .map(|(header, value)| (header.clone(), Value::String(value.to_string())))
            .collect();

        if !is_blank_row(&row) {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn read_workbook(path: &Path) -> Result<Vec<RawRecord>> {
    let source = path.display().to_string();
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| CoreError::source_read(&source, format!("Failed to open Excel file: {}", e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| CoreError::source_read(&source, "No sheets found in Excel file"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| CoreError::source_read(&source, format!("Failed to read sheet: {}", e)))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header_row) => header_row.iter().map(get_cell_string).collect(),
        None => return Ok(Vec::new()),
    };

    let rows = sheet_rows
        .map(|row| {
            headers
                .iter()
                .zip(row.iter())
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, cell)| (header.clone(), cell_value(cell)))
                .collect::<RawRecord>()
        })
        .filter(|row| !is_blank_row(row))
        .collect();

    Ok(rows)
}

fn is_blank_row(row: &RawRecord) -> bool {
    row.values().all(|v| match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    })
}

/// Cell as a JSON value; numbers and booleans keep their type.
fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::Number((*i).into()),
        Data::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Data::Bool(b) => Value::Bool(*b),
        Data::Empty | Data::Error(_) => Value::Null,
        other => Value::String(get_cell_string(other)),
    }
}

/// Helper to extract string from Excel cell
fn get_cell_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}
