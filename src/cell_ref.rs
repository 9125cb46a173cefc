//! Utilities for Excel-style cell references and ranges.
//!
//! All rows and columns in this crate are 1-based, matching A1 notation:
//! `A1` is `(row 1, col 1)`.

use crate::error::{AnswerSheetError, Result};

/// Convert a 1-based column index to letters (1 -> A, 26 -> Z, 27 -> AA).
///
/// Column 0 has no letter form and yields an empty string.
pub fn col_to_letter(col: u32) -> String {
    let mut result = Vec::new();
    let mut n = col;
    while n > 0 {
        n -= 1;
        // n % 26 < 26, always a valid ASCII letter offset
        #[allow(clippy::cast_possible_truncation)]
        result.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    result.reverse();
    String::from_utf8(result).unwrap_or_default()
}

/// Convert column letters ("A", "aa", "$D") to a 1-based column index.
pub fn letter_to_col(letters: &str) -> Option<u32> {
    let mut col: u32 = 0;
    let mut saw_col = false;
    for b in letters.bytes() {
        if b == b'$' {
            continue;
        }
        if !b.is_ascii_alphabetic() {
            return None;
        }
        let upper = b.to_ascii_uppercase();
        col = col.checked_mul(26)?.checked_add(u32::from(upper - b'A') + 1)?;
        saw_col = true;
    }
    saw_col.then_some(col)
}

/// Parse a cell reference like "D3" or "$D$3" into 1-based `(row, col)`.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let trimmed = cell_ref.trim();
    let digits_at = trimmed.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = trimmed.split_at(digits_at);
    let col = letter_to_col(letters)?;
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row, col))
}

/// Parse a cell reference from raw bytes (quick-xml attribute values).
pub fn parse_cell_ref_bytes(ref_bytes: &[u8]) -> Option<(u32, u32)> {
    std::str::from_utf8(ref_bytes).ok().and_then(parse_cell_ref)
}

/// Format a 1-based `(row, col)` as an A1 reference.
pub fn a1(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letter(col), row)
}

/// A rectangular block of cells, inclusive on both ends, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl CellRange {
    #[must_use]
    pub fn new(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self {
            start_row,
            start_col,
            end_row,
            end_col,
        }
    }

    /// A range covering `rows` rows and `cols` columns from `(row, col)`.
    ///
    /// Zero-sized requests collapse to the single anchor cell.
    #[must_use]
    pub fn sized(row: u32, col: u32, rows: u32, cols: u32) -> Self {
        Self {
            start_row: row,
            start_col: col,
            end_row: row + rows.max(1) - 1,
            end_col: col + cols.max(1) - 1,
        }
    }

    #[must_use]
    pub fn cell(row: u32, col: u32) -> Self {
        Self::sized(row, col, 1, 1)
    }

    /// A single-column run of rows.
    #[must_use]
    pub fn column_span(start_row: u32, end_row: u32, col: u32) -> Self {
        Self {
            start_row,
            start_col: col,
            end_row,
            end_col: col,
        }
    }

    #[must_use]
    pub fn rows(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    #[must_use]
    pub fn cols(&self) -> u32 {
        self.end_col - self.start_col + 1
    }

    #[must_use]
    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.start_row..=self.end_row).contains(&row)
            && (self.start_col..=self.end_col).contains(&col)
    }

    #[must_use]
    pub fn intersects(&self, other: &CellRange) -> bool {
        self.start_row <= other.end_row
            && other.start_row <= self.end_row
            && self.start_col <= other.end_col
            && other.start_col <= self.end_col
    }

    /// A1 text: "D3" for a single cell, "D3:D11" otherwise.
    #[must_use]
    pub fn to_a1(&self) -> String {
        if self.start_row == self.end_row && self.start_col == self.end_col {
            a1(self.start_row, self.start_col)
        } else {
            format!(
                "{}:{}",
                a1(self.start_row, self.start_col),
                a1(self.end_row, self.end_col)
            )
        }
    }
}

impl std::fmt::Display for CellRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_a1())
    }
}

impl std::str::FromStr for CellRange {
    type Err = AnswerSheetError;

    fn from_str(s: &str) -> Result<Self> {
        parse_cell_range(s).ok_or_else(|| AnswerSheetError::CellRef(s.to_string()))
    }
}

/// Parse a cell range like "A2:C11" or "D3" into a normalized [`CellRange`].
pub fn parse_cell_range(range: &str) -> Option<CellRange> {
    if let Some((start, end)) = range.split_once(':') {
        let (row1, col1) = parse_cell_ref(start)?;
        let (row2, col2) = parse_cell_ref(end)?;
        Some(CellRange {
            start_row: row1.min(row2),
            start_col: col1.min(col2),
            end_row: row1.max(row2),
            end_col: col1.max(col2),
        })
    } else {
        let (row, col) = parse_cell_ref(range)?;
        Some(CellRange::cell(row, col))
    }
}

/// Parse an sqref string ("D3:D6 D9:D11") into ranges, skipping invalid parts.
pub fn parse_sqref(sqref: &str) -> Vec<CellRange> {
    sqref.split_whitespace().filter_map(parse_cell_range).collect()
}
