/// Roster CSV reader
///
/// The format is deliberately simple: one header line, then one student
/// per line with fields split on every comma. Quoting and escaping are
/// not supported.
use std::fs;
use std::path::Path;

use super::data::{LoadedRow, ROW_FIELDS};
use crate::error::{GreditError, Result};

/// Split one line on every comma.
pub fn parse_line(line: &str) -> Vec<String> {
    line.split(',').map(str::to_string).collect()
}

/// Read a roster CSV file, skipping its header.
/// Rows are returned in file order.
/// Bytes that are not valid UTF-8 are replaced with U+FFFD.
pub fn read_csv(path: &Path) -> Result<Vec<LoadedRow>> {
    let bytes = fs::read(path).map_err(|e| GreditError::io(path, e))?;
    let content = String::from_utf8_lossy(&bytes);
    let rows = parse_csv(&content, path)?;
    log::info!("📄 Parsed {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn parse_csv(content: &str, path: &Path) -> Result<Vec<LoadedRow>> {
    let mut lines = content.lines();

    // First line is the header
    if lines.next().is_none() {
        return Err(GreditError::EmptyCsv(path.to_path_buf()));
    }

    let mut rows = Vec::new();
    for (offset, line) in lines.enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let fields = parse_line(line);
        let count = fields.len();
        let fields: [String; ROW_FIELDS] =
            fields.try_into().map_err(|_| GreditError::MalformedRow {
                // header is line 1
                line: offset + 2,
                fields: count,
                expected: ROW_FIELDS,
            })?;
        rows.push(LoadedRow { fields });
    }

    Ok(rows)
}
