//! Formula text for index-sheet links and completion status.
//!
//! Formulas are emitted as opaque text for the host evaluator. The row
//! arithmetic inside them comes from the same [`SectionGeometry`] the section
//! writer uses, so a link or status check always points at the rows the
//! writer populated for that section index.

use serde::{Deserialize, Serialize};

use crate::cell_ref::{a1, col_to_letter};
use crate::layout::{IndexLink, LinkMode, SectionGeometry};
use crate::types::{IndexRow, RequiredSpan, SheetId};

/// Host flavor of the emitted formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormulaDialect {
    /// `#gid=<id>&range=A<row>` links, unquoted sheet names in `INDIRECT`
    #[default]
    GoogleSheets,
    /// `#'<sheet>'!A<row>` links, quoted sheet names in `INDIRECT`
    Excel,
}

/// How link formulas are laid out in the link column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkLayout {
    /// One formula per keyed index row
    #[default]
    PerRow,
    /// A single `ARRAYFORMULA` in the first data row covering the column
    ArrayFormula,
}

/// Everything formula text depends on.
#[derive(Debug, Clone)]
pub struct FormulaContext {
    pub dialect: FormulaDialect,
    pub answer_sheet: String,
    pub answer_sheet_id: SheetId,
    pub geometry: SectionGeometry,
    pub first_data_row: u32,
    /// Index-sheet key column (1-based)
    pub key_col: u32,
    /// Answer-sheet column holding answers (1-based)
    pub answer_col: u32,
    /// Answer-sheet column the links land on (1-based)
    pub anchor_col: u32,
    pub link_label: String,
    pub done_label: String,
    pub wip_label: String,
}

impl FormulaContext {
    /// Link target text up to (not including) the row number.
    fn target_prefix(&self) -> String {
        let col = col_to_letter(self.anchor_col);
        match self.dialect {
            FormulaDialect::GoogleSheets => {
                format!("#gid={}&range={col}", self.answer_sheet_id)
            }
            FormulaDialect::Excel => format!("#{}!{col}", quoted_sheet(&self.answer_sheet)),
        }
    }

    fn sheet_ref(&self) -> String {
        match self.dialect {
            FormulaDialect::GoogleSheets => self.answer_sheet.clone(),
            FormulaDialect::Excel => quoted_sheet(&self.answer_sheet),
        }
    }

    /// Link whose target row is computed by the host from the row position:
    /// `(ROW(key) - firstDataRow) * height + 1`.
    #[must_use]
    pub fn offset_link_formula(&self, index_row: u32) -> String {
        let key = a1(index_row, self.key_col);
        format!(
            "=IF({key}=\"\", \"\", HYPERLINK(\"{}\" & ((ROW({key})-{})*{}+1), \"{}\"))",
            self.target_prefix(),
            self.first_data_row,
            self.geometry.height(),
            self.link_label
        )
    }

    /// Link with a precomputed target row.
    #[must_use]
    pub fn fixed_link_formula(&self, index_row: u32, target_row: u32) -> String {
        let key = a1(index_row, self.key_col);
        format!(
            "=IF({key}=\"\", \"\", HYPERLINK(\"{}{target_row}\", \"{}\"))",
            self.target_prefix(),
            self.link_label
        )
    }

    /// One formula covering the whole link column from the first data row.
    #[must_use]
    pub fn array_link_formula(&self) -> String {
        let letter = col_to_letter(self.key_col);
        let keys = format!("{letter}{}:{letter}", self.first_data_row);
        format!(
            "=ARRAYFORMULA(IF({keys}=\"\", \"\", HYPERLINK(\"{}\" & ((ROW({keys})-{})*{}+1), \"{}\")))",
            self.target_prefix(),
            self.first_data_row,
            self.geometry.height(),
            self.link_label
        )
    }

    /// Per-row link formula, `None` when the row has no key or no planned link.
    #[must_use]
    pub fn link_formula(
        &self,
        row: &IndexRow,
        link: Option<&IndexLink>,
        mode: LinkMode,
    ) -> Option<String> {
        if !row.has_key() {
            return None;
        }
        let link = link?;
        Some(match mode {
            LinkMode::IndexOffset => self.offset_link_formula(row.row),
            LinkMode::Compacted => self.fixed_link_formula(row.row, link.target_row),
        })
    }

    /// Completion check for `span` of section `target_index`: `DONE` when
    /// the non-empty answer count reaches the span's threshold, else `WIP`.
    #[must_use]
    pub fn status_formula(&self, target_index: u32, span: &RequiredSpan) -> String {
        let range = self
            .geometry
            .span_range(target_index, &span.rows, self.answer_col);
        format!(
            "=IF(COUNTA(INDIRECT(\"{}!{}\"))={}, \"{}\", \"{}\")",
            self.sheet_ref(),
            range.to_a1(),
            span.threshold(),
            self.done_label,
            self.wip_label
        )
    }

    /// Status formula for an index row, `None` when the row has no link.
    #[must_use]
    pub fn status_for(&self, link: Option<&IndexLink>, span: &RequiredSpan) -> Option<String> {
        link.map(|l| self.status_formula(l.target_index, span))
    }
}

fn quoted_sheet(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}
