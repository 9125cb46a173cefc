//! Generates worksheet XML from a `Sheet` struct.
//!
//! Text cells are written as inline strings (`t="inlineStr"`) so no shared
//! string table is needed. Formulas are written without a cached value; the
//! host recalculates on open.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::cell_ref::{a1, col_to_letter};
use crate::data_validation::data_validations_xml;
use crate::types::{CellValue, Sheet, Workbook};
use crate::xml_helpers::escape;

/// Write a complete worksheet XML string from a `Sheet`.
pub(crate) fn write_sheet_xml(
    workbook: &Workbook,
    sheet: &Sheet,
    styles: &BTreeMap<(u32, u32), u32>,
) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
    );
    out.push_str(
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );

    // every cell that has a value or a style, row-major
    let mut cells: BTreeMap<(u32, u32), (Option<&CellValue>, u32)> = BTreeMap::new();
    for cd in &sheet.cells {
        cells.insert((cd.r, cd.c), (Some(&cd.value), 0));
    }
    for (&pos, &style) in styles {
        cells.entry(pos).or_insert((None, 0)).1 = style;
    }

    // <dimension>
    let max_row = cells.keys().map(|&(r, _)| r).max().unwrap_or(1);
    let max_col = cells.keys().map(|&(_, c)| c).max().unwrap_or(1);
    let _ = write!(
        out,
        r#"<dimension ref="A1:{}{}"/>"#,
        col_to_letter(max_col),
        max_row
    );

    out.push_str("<sheetData>");
    let mut current_row = None;
    for (&(row, col), &(value, style)) in &cells {
        if current_row != Some(row) {
            if current_row.is_some() {
                out.push_str("</row>");
            }
            let _ = write!(out, r#"<row r="{row}">"#);
            current_row = Some(row);
        }
        write_cell(&mut out, row, col, value, style);
    }
    if current_row.is_some() {
        out.push_str("</row>");
    }
    out.push_str("</sheetData>");

    // <mergeCells>
    if !sheet.merges.is_empty() {
        let _ = write!(out, r#"<mergeCells count="{}">"#, sheet.merges.len());
        for merge in &sheet.merges {
            let _ = write!(out, r#"<mergeCell ref="{}"/>"#, merge.to_a1());
        }
        out.push_str("</mergeCells>");
    }

    out.push_str(&data_validations_xml(workbook, sheet));
    out.push_str("</worksheet>");
    out
}

/// Write a single `<c>` element.
fn write_cell(out: &mut String, row: u32, col: u32, value: Option<&CellValue>, style: u32) {
    let _ = write!(out, r#"<c r="{}""#, a1(row, col));
    if style > 0 {
        let _ = write!(out, r#" s="{style}""#);
    }
    match value {
        None | Some(CellValue::Empty) => out.push_str("/>"),
        Some(CellValue::Text(s)) => {
            let _ = write!(
                out,
                r#" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                escape(s)
            );
        }
        Some(CellValue::Number(n)) => {
            let _ = write!(out, "><v>{n}</v></c>");
        }
        Some(CellValue::Boolean(b)) => {
            let _ = write!(out, r#" t="b"><v>{}</v></c>"#, u8::from(*b));
        }
        Some(CellValue::Formula(f)) => {
            let body = f.strip_prefix('=').unwrap_or(f);
            let _ = write!(out, "><f>{}</f></c>", escape(body));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cell_ref::CellRange;
    use crate::grid::GridAdapter;

    #[test]
    fn test_sheet_xml_cells_and_merges() {
        let mut wb = Workbook::new();
        wb.add_sheet("Answer Sheet");
        wb.set_cell("Answer Sheet", 1, 1, "Issue".into()).unwrap();
        wb.set_cell("Answer Sheet", 1, 2, 3.5.into()).unwrap();
        wb.set_formula("Answer Sheet", 2, 1, "=IF(A1=\"\", \"\", 1)")
            .unwrap();
        wb.merge("Answer Sheet", CellRange::column_span(3, 7, 5))
            .unwrap();
        let mut styles = BTreeMap::new();
        styles.insert((2, 4), 1);

        let sheet = wb.sheet("Answer Sheet").unwrap();
        let xml = write_sheet_xml(&wb, sheet, &styles);
        assert!(xml.contains(r#"<dimension ref="A1:D2"/>"#));
        assert!(xml.contains(
            r#"<c r="A1" t="inlineStr"><is><t xml:space="preserve">Issue</t></is></c>"#
        ));
        assert!(xml.contains(r#"<c r="B1"><v>3.5</v></c>"#));
        assert!(xml.contains(r#"<c r="A2"><f>IF(A1=&quot;&quot;, &quot;&quot;, 1)</f></c>"#));
        assert!(xml.contains(r#"<c r="D2" s="1"/>"#));
        assert!(xml.contains(r#"<mergeCell ref="E3:E7"/>"#));
        assert!(!xml.contains("<dataValidations"));
    }
}
