//! Common test utilities and assertion helpers.
//!
//! Builds the stock three-sheet workbook (issue list, answer sheet,
//! template) as real XLSX bytes and offers short accessors for cells and
//! formulas of the generated result.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use std::io::{Cursor, Read};

use answer_sheet::grid::GridAdapter;
use answer_sheet::{parser, GenerateReport, Generator, GeneratorConfig, Workbook};

// Re-export fixtures for convenience
pub use super::fixtures::*;

pub const ISSUES: &str = "Issue List";
pub const ANSWERS: &str = "Answer Sheet";
pub const TEMPLATE: &str = "Template";

/// Header text renamed by the presentation pass.
pub const TESTER_HEADER: &str = "Tester - (non-subtask level)";

// ============================================================================
// Sheet Builders
// ============================================================================

/// Issue list with a header row and one `(key, summary)` pair per row from
/// row 2. Empty strings leave the cell blank.
#[must_use]
pub fn issue_sheet(rows: &[(&str, &str)]) -> SheetBuilder {
    let mut sheet = SheetBuilder::new(ISSUES)
        .cell("A1", "Issue key")
        .cell("B1", "Summary")
        .cell("C1", TESTER_HEADER);
    for (row, (key, summary)) in (2..).zip(rows) {
        if !key.is_empty() {
            sheet = sheet.cell(&format!("A{row}"), *key);
        }
        if !summary.is_empty() {
            sheet = sheet.cell(&format!("B{row}"), *summary);
        }
    }
    sheet
}

/// Single-phase template: questions in `A2:C11`, answer domains in column D.
#[must_use]
pub fn single_phase_template() -> SheetBuilder {
    let mut sheet = SheetBuilder::new(TEMPLATE).cell("A1", "Section").cell("B1", "Question");
    for row in 2..=11 {
        sheet = sheet
            .cell(&format!("A{row}"), format!("{}", row - 1))
            .cell(&format!("B{row}"), format!("Question {}", row - 1));
    }
    sheet
        .list_validation("D3:D6 D9:D11", &["Yes", "No"])
        .list_validation("D7", &["Low", "Medium", "High"])
        .list_validation("D8", &["Dev", "QA"])
}

/// Dev/QA template: questions in `A2:C14`, notes in E3 and E8.
#[must_use]
pub fn dev_qa_template() -> SheetBuilder {
    let mut sheet = SheetBuilder::new(TEMPLATE);
    for row in 2..=14 {
        sheet = sheet.cell(&format!("B{row}"), format!("Check {}", row - 1));
    }
    sheet
        .cell("E3", "Root cause")
        .cell("E8", "Prevention")
        .list_validation("D3:D7", &["Yes", "No"])
        .list_validation("D8:D12", &["Pass", "Fail"])
}

/// Template with only `rows` filled question rows.
#[must_use]
pub fn short_template(rows: u32) -> SheetBuilder {
    let mut sheet = SheetBuilder::new(TEMPLATE);
    for row in 2..2 + rows {
        sheet = sheet.cell(&format!("B{row}"), format!("Question {row}"));
    }
    sheet
        .list_validation("D3", &["Yes", "No"])
        .list_validation("D7", &["Low", "High"])
        .list_validation("D8", &["Dev", "QA"])
}

/// Stock workbook bytes: issue list, empty answer sheet, `template`.
#[must_use]
pub fn workbook_xlsx(rows: &[(&str, &str)], template: SheetBuilder) -> Vec<u8> {
    XlsxBuilder::new()
        .sheet(issue_sheet(rows))
        .sheet(SheetBuilder::new(ANSWERS))
        .sheet(template)
        .build()
}

/// Stock single-phase workbook, imported.
#[must_use]
pub fn workbook(rows: &[(&str, &str)]) -> Workbook {
    parser::parse(&workbook_xlsx(rows, single_phase_template())).expect("parse fixture")
}

// ============================================================================
// Generation Helpers
// ============================================================================

/// Run the generator with `config`, panicking on failure.
pub fn generate(wb: &mut Workbook, config: GeneratorConfig) -> GenerateReport {
    Generator::new(config)
        .expect("valid config")
        .run(wb)
        .expect("generation succeeds")
}

/// Display text of a cell ("" when empty).
#[must_use]
pub fn text(wb: &Workbook, sheet: &str, row: u32, col: u32) -> String {
    wb.cell(sheet, row, col).unwrap().display()
}

/// Formula text of a cell, `None` when the cell holds no formula.
#[must_use]
pub fn formula(wb: &Workbook, sheet: &str, row: u32, col: u32) -> Option<String> {
    wb.cell(sheet, row, col)
        .unwrap()
        .as_formula()
        .map(str::to_string)
}

/// Expected per-row offset link for the stock layout (gid of the answer
/// sheet, 13-row sections, first data row 2).
#[must_use]
pub fn offset_link(gid: u32, row: u32) -> String {
    format!(
        "=IF(A{row}=\"\", \"\", HYPERLINK(\"#gid={gid}&range=A\" & ((ROW(A{row})-2)*13+1), \"Answer\"))"
    )
}

/// Expected single-phase status formula over `range`.
#[must_use]
pub fn status(range: &str) -> String {
    format!("=IF(COUNTA(INDIRECT(\"Answer Sheet!{range}\"))=9, \"DONE\", \"WIP\")")
}

// ============================================================================
// Package Inspection
// ============================================================================

/// Raw text of one part of an XLSX package.
#[must_use]
pub fn read_part(xlsx: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(xlsx)).expect("Failed to open ZIP archive");
    let mut file = archive.by_name(name).expect("part exists");
    let mut out = String::new();
    file.read_to_string(&mut out).expect("utf-8 part");
    out
}
