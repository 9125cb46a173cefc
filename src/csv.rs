//! Minimal CSV/TSV reader that loads an issue list into a workbook sheet.
//!
//! The first line lands in row 1 (the index header row), so a CSV exported
//! from a tracker can stand in for the issue sheet of an XLSX input.

use crate::error::Result;
use crate::types::{CellValue, Workbook};

/// Field separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
}

impl Delimiter {
    /// Tab for `.tsv`/`.tab` paths, comma otherwise.
    #[must_use]
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab") => {
                Self::Tab
            }
            _ => Self::Comma,
        }
    }

    fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Tab => '\t',
        }
    }
}

/// Replace the contents of `sheet` with the rows of a delimited file. The
/// sheet is created when missing. Numeric fields become numbers; blank
/// fields stay empty.
///
/// # Errors
/// Currently infallible; the `Result` keeps the signature in line with the
/// XLSX importer.
pub fn load_issue_csv(
    workbook: &mut Workbook,
    sheet: &str,
    data: &[u8],
    delimiter: Delimiter,
) -> Result<()> {
    let text = String::from_utf8_lossy(data);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    workbook.add_sheet(sheet);
    let Some(target) = workbook.sheet_mut(sheet) else {
        return Ok(());
    };
    target.clear();

    let mut rows = 0u32;
    for (row, line) in (1u32..).zip(text.lines()) {
        for (col, field) in (1u32..).zip(split_csv_line(line, delimiter.as_char())) {
            let value = field.trim();
            if value.is_empty() {
                continue;
            }
            let cell = value
                .parse::<f64>()
                .map_or_else(|_| CellValue::from(value), CellValue::Number);
            target.put(row, col, cell);
        }
        rows = row;
    }
    tracing::debug!(sheet, rows, cells = target.cells.len(), "loaded delimited issue list");
    Ok(())
}

/// Split a CSV line respecting quoted fields.
fn split_csv_line(line: &str, sep: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    // Escaped quote
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == sep {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::grid::GridAdapter;
    use std::path::Path;

    #[test]
    fn test_load_issue_list() {
        let mut wb = Workbook::new();
        let data = b"Issue key,Summary,Points\nX-1,Login fails,3\n,orphan summary,\nX-3,Crash,";
        load_issue_csv(&mut wb, "Issue List", data, Delimiter::Comma).unwrap();
        assert_eq!(wb.cell("Issue List", 1, 1).unwrap(), "Issue key".into());
        assert_eq!(wb.cell("Issue List", 2, 3).unwrap(), 3.0.into());
        assert_eq!(wb.cell("Issue List", 3, 1).unwrap(), CellValue::Empty);
        assert_eq!(wb.cell("Issue List", 4, 2).unwrap(), "Crash".into());
        assert_eq!(wb.last_used_row("Issue List").unwrap(), 4);
    }

    #[test]
    fn test_load_replaces_existing_contents() {
        let mut wb = Workbook::new();
        wb.add_sheet("Issue List");
        wb.set_cell("Issue List", 9, 9, "stale".into()).unwrap();
        load_issue_csv(&mut wb, "Issue List", b"A\tB\n1\t2", Delimiter::Tab).unwrap();
        assert_eq!(wb.sheets.len(), 1);
        assert_eq!(wb.sheets[0].cells.len(), 4);
        assert_eq!(wb.cell("Issue List", 9, 9).unwrap(), CellValue::Empty);
    }

    #[test]
    fn test_quoted_fields_and_bom() {
        let data = "\u{feff}\"Hello, World\",42\n\"She said \"\"hi\"\"\",0".as_bytes();
        let mut wb = Workbook::new();
        load_issue_csv(&mut wb, "S", data, Delimiter::Comma).unwrap();
        assert_eq!(wb.cell("S", 1, 1).unwrap(), "Hello, World".into());
        assert_eq!(wb.cell("S", 2, 1).unwrap(), "She said \"hi\"".into());
    }

    #[test]
    fn test_delimiter_from_path() {
        assert_eq!(Delimiter::from_path(Path::new("a.TSV")), Delimiter::Tab);
        assert_eq!(Delimiter::from_path(Path::new("a.csv")), Delimiter::Comma);
        assert_eq!(Delimiter::from_path(Path::new("a")), Delimiter::Comma);
    }
}
