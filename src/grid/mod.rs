//! Grid adapter: the storage capabilities the generator consumes.
//!
//! The generator never touches a workbook directly; everything goes through
//! [`GridAdapter`], so the same engine can drive the in-memory [`Workbook`]
//! or a host spreadsheet. Rows and columns are 1-based.
//!
//! [`Workbook`]: crate::types::Workbook

mod memory;

use crate::cell_ref::CellRange;
use crate::error::Result;
use crate::types::{CellValue, DomainRef, RangeFormat, SheetId};

/// A merged region created by [`GridAdapter::merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeHandle {
    pub sheet: String,
    pub range: CellRange,
}

/// Cell, formula, validation, merge and format storage for named sheets.
pub trait GridAdapter {
    /// Opaque sheet identity, only used to build link targets.
    fn sheet_id(&self, sheet: &str) -> Result<SheetId>;

    fn cell(&self, sheet: &str, row: u32, col: u32) -> Result<CellValue>;

    fn set_cell(&mut self, sheet: &str, row: u32, col: u32, value: CellValue) -> Result<()>;

    /// Values of `range`, row-major, `range.rows()` x `range.cols()`.
    fn range(&self, sheet: &str, range: CellRange) -> Result<Vec<Vec<CellValue>>>;

    /// Write a block of values; `values` must match the shape of `range`.
    fn set_range(&mut self, sheet: &str, range: CellRange, values: &[Vec<CellValue>])
        -> Result<()>;

    fn set_formula(&mut self, sheet: &str, row: u32, col: u32, formula: &str) -> Result<()>;

    fn validation(&self, sheet: &str, row: u32, col: u32) -> Result<Option<DomainRef>>;

    fn set_validation(&mut self, sheet: &str, row: u32, col: u32, domain: &DomainRef)
        -> Result<()>;

    fn merge(&mut self, sheet: &str, range: CellRange) -> Result<MergeHandle>;

    fn set_merged_value(&mut self, handle: &MergeHandle, value: CellValue) -> Result<()>;

    /// Remove all contents, merges, validations and formats.
    fn clear_sheet(&mut self, sheet: &str) -> Result<()>;

    /// Last row holding a value, 0 for an empty sheet.
    fn last_used_row(&self, sheet: &str) -> Result<u32>;

    /// Last column holding a value, 0 for an empty sheet.
    fn last_used_col(&self, sheet: &str) -> Result<u32>;

    fn apply_format(&mut self, sheet: &str, range: CellRange, format: &RangeFormat) -> Result<()>;

    /// Replace every occurrence of `find` inside text cells. Returns the
    /// number of cells changed.
    fn replace_text(&mut self, sheet: &str, find: &str, replacement: &str) -> Result<usize> {
        let last_row = self.last_used_row(sheet)?;
        let last_col = self.last_used_col(sheet)?;
        if find.is_empty() || last_row == 0 || last_col == 0 {
            return Ok(0);
        }
        let values = self.range(sheet, CellRange::sized(1, 1, last_row, last_col))?;
        let mut changed = 0;
        for (row, cols) in (1..).zip(values) {
            for (col, value) in (1..).zip(cols) {
                if let CellValue::Text(text) = value {
                    if text.contains(find) {
                        self.set_cell(sheet, row, col, text.replace(find, replacement).into())?;
                        changed += 1;
                    }
                }
            }
        }
        Ok(changed)
    }
}
