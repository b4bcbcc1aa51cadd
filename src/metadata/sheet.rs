//! CSV sheet reading and writing.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{FolioError, FolioResult};

/// One data row, addressed by column name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based line of the record in the file
    pub line: u64,
    cells: HashMap<String, String>,
}

impl SheetRow {
    pub fn new(line: u64, cells: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            line,
            cells: cells.into_iter().collect(),
        }
    }

    /// Trimmed cell text, `None` for missing or blank cells
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .get(column)
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
    }
}

#[derive(Debug, Default)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
    /// Records that could not be decoded
    pub errors: Vec<FolioError>,
}

fn sheet_error(path: &Path, source: csv::Error) -> FolioError {
    FolioError::Spreadsheet {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a sheet with a header row
///
/// # Errors
///
/// Fails when the file cannot be opened or has no header row. Undecodable
/// records are collected in `Sheet::errors`.
pub fn read_sheet(path: &Path) -> FolioResult<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| sheet_error(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| sheet_error(path, e))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(FolioError::InvalidSheet {
            path: path.to_path_buf(),
            reason: "missing header row".to_string(),
        });
    }

    let mut sheet = Sheet {
        headers,
        ..Default::default()
    };
    for record in reader.records() {
        match record {
            Ok(record) => {
                let line = record.position().map_or(0, |p| p.line());
                let cells = sheet
                    .headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, cell)| (h.clone(), cell.to_string()));
                sheet.rows.push(SheetRow::new(line, cells));
            }
            Err(e) => sheet.errors.push(sheet_error(path, e)),
        }
    }
    Ok(sheet)
}

/// Write a complete sheet, replacing any existing file
pub fn write_sheet(path: &Path, headers: &[&str], rows: &[Vec<String>]) -> FolioResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| FolioError::io(parent, e))?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| sheet_error(path, e))?;
    writer.write_record(headers).map_err(|e| sheet_error(path, e))?;
    for row in rows {
        writer.write_record(row).map_err(|e| sheet_error(path, e))?;
    }
    writer.flush().map_err(|e| FolioError::io(path, e))
}

/// Append rows to an existing sheet without touching its current content
pub fn append_rows(path: &Path, rows: &[Vec<String>]) -> FolioResult<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .open(path)
        .map_err(|e| FolioError::io(path, e))?;

    if !ends_with_newline(&mut file).map_err(|e| FolioError::io(path, e))? {
        file.write_all(b"\n").map_err(|e| FolioError::io(path, e))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    for row in rows {
        writer.write_record(row).map_err(|e| sheet_error(path, e))?;
    }
    writer.flush().map_err(|e| FolioError::io(path, e))
}

fn ends_with_newline(file: &mut fs::File) -> std::io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
