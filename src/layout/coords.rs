//! Coordinate model shared by the section writer, the link formulas and
//! the status formulas.
//!
//! Every absolute answer-sheet row in the crate is derived from
//! [`SectionGeometry::base_row`]; nothing else multiplies by the section
//! height.

use serde::Serialize;

use crate::cell_ref::CellRange;
use crate::error::{AnswerSheetError, Result};
use crate::types::{Record, RowSpan, SectionSchema};

/// Row of the first section on the answer sheet.
pub const FIRST_SECTION_ROW: u32 = 1;

/// Rows in an XLSX worksheet.
pub const MAX_SHEET_ROWS: u32 = 1_048_576;

/// Fixed-stride placement of sections: `base_row(i) = i * height + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionGeometry {
    height: u32,
}

impl SectionGeometry {
    #[must_use]
    pub fn new(height: u32) -> Self {
        Self { height }
    }

    #[must_use]
    pub fn of(schema: &SectionSchema) -> Self {
        Self::new(schema.height)
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// First absolute row of section `index`.
    ///
    /// Saturates instead of wrapping; sections that pass
    /// [`SectionGeometry::ensure_fits`] never reach the limit.
    #[must_use]
    pub fn base_row(&self, index: u32) -> u32 {
        index
            .saturating_mul(self.height)
            .saturating_add(FIRST_SECTION_ROW)
    }

    /// Last absolute row of section `index`.
    #[must_use]
    pub fn last_row(&self, index: u32) -> u32 {
        self.base_row(index)
            .saturating_add(self.height.saturating_sub(1))
    }

    /// Absolute row of `relative_row` inside section `index`.
    #[must_use]
    pub fn row(&self, index: u32, relative_row: u32) -> u32 {
        self.base_row(index).saturating_add(relative_row)
    }

    /// Last row of section `index`, `None` on overflow or zero height.
    #[must_use]
    pub fn checked_last_row(&self, index: u32) -> Option<u32> {
        index
            .checked_mul(self.height)?
            .checked_add(FIRST_SECTION_ROW)?
            .checked_add(self.height.checked_sub(1)?)
    }

    /// Fails when section `index` would end past the last sheet row.
    pub fn ensure_fits(&self, index: u32) -> Result<()> {
        match self.checked_last_row(index) {
            Some(last) if last <= MAX_SHEET_ROWS => Ok(()),
            _ => Err(AnswerSheetError::Configuration(format!(
                "section {} of height {} ends past sheet row {MAX_SHEET_ROWS}",
                index + 1,
                self.height
            ))),
        }
    }

    /// Absolute single-column range of `span` inside section `index`.
    #[must_use]
    pub fn span_range(&self, index: u32, span: &RowSpan, col: u32) -> CellRange {
        CellRange::column_span(self.row(index, span.start), self.row(index, span.end), col)
    }

    /// Section index implied by an index-sheet row's position alone.
    #[must_use]
    pub fn index_offset(index_row: u32, first_data_row: u32) -> Option<u32> {
        index_row.checked_sub(first_data_row)
    }
}

/// One record placed on the answer sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Position among written sections (0-based, gap-free)
    pub index: u32,
    pub base_row: u32,
    pub height: u32,
    /// Index-sheet row the record came from
    pub index_row: u32,
    pub record: Record,
}

impl Section {
    #[must_use]
    pub fn row(&self, relative_row: u32) -> u32 {
        self.base_row.saturating_add(relative_row)
    }

    #[must_use]
    pub fn last_row(&self) -> u32 {
        self.row(self.height.saturating_sub(1))
    }

    /// Absolute answer cells of `span` in this section.
    #[must_use]
    pub fn span_range(&self, span: &RowSpan, answer_col: u32) -> CellRange {
        CellRange::column_span(self.row(span.start), self.row(span.end), answer_col)
    }

    /// Absolute answer-field cells the schema places inside `span`.
    #[must_use]
    pub fn answer_cells_in(&self, schema: &SectionSchema, span: &RowSpan) -> Vec<(u32, u32)> {
        schema
            .fields_in(span)
            .filter(|f| f.relative_col == schema.answer_col)
            .map(|f| (self.row(f.relative_row), f.relative_col))
            .collect()
    }
}
