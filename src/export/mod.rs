//! XLSX export pipeline.
//!
//! Writes a complete package from the in-memory workbook: content types,
//! relationships, workbook part, one style table shared by all sheets, and
//! one worksheet part per sheet. The output is deterministic, so exporting
//! the same workbook twice yields identical bytes.

pub(crate) mod sheet_writer;
pub(crate) mod styles;

use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{AnswerSheetError, Result};
use crate::types::Workbook;
use crate::xml_helpers::escape;

use sheet_writer::write_sheet_xml;
use styles::StyleTable;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Serialize a workbook to XLSX bytes.
///
/// # Errors
/// Fails for a workbook without sheets, or if the ZIP writer fails.
pub fn write_xlsx(workbook: &Workbook) -> Result<Vec<u8>> {
    if workbook.sheets.is_empty() {
        return Err(AnswerSheetError::Configuration(
            "a workbook needs at least one sheet".into(),
        ));
    }

    let mut table = StyleTable::new();
    let sheet_styles: Vec<_> = workbook
        .sheets
        .iter()
        .map(|sheet| table.resolve_sheet(sheet))
        .collect();

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut add = |name: &str, body: &str| -> Result<()> {
        writer.start_file(name, options)?;
        writer.write_all(body.as_bytes())?;
        Ok(())
    };

    add("[Content_Types].xml", &content_types(workbook))?;
    add("_rels/.rels", ROOT_RELS)?;
    add("xl/workbook.xml", &workbook_xml(workbook))?;
    add("xl/_rels/workbook.xml.rels", &workbook_rels(workbook))?;
    add("xl/styles.xml", &table.to_xml())?;
    for (idx, (sheet, styles)) in workbook.sheets.iter().zip(&sheet_styles).enumerate() {
        let xml = write_sheet_xml(workbook, sheet, styles);
        add(&format!("xl/worksheets/sheet{}.xml", idx + 1), &xml)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    "</Relationships>"
);

fn content_types(workbook: &Workbook) -> String {
    let mut out = String::from(XML_DECL);
    out.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    out.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    out.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    out.push_str(r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
    out.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
    for idx in 1..=workbook.sheets.len() {
        let _ = write!(
            out,
            r#"<Override PartName="/xl/worksheets/sheet{idx}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        );
    }
    out.push_str("</Types>");
    out
}

fn workbook_xml(workbook: &Workbook) -> String {
    let mut out = String::from(XML_DECL);
    out.push_str(
        r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    for (idx, sheet) in workbook.sheets.iter().enumerate() {
        // sheetId must be positive
        let sheet_id = sheet.id.0.max(1);
        let _ = write!(
            out,
            r#"<sheet name="{}" sheetId="{sheet_id}" r:id="rId{}"/>"#,
            escape(&sheet.name),
            idx + 1
        );
    }
    out.push_str("</sheets></workbook>");
    out
}

fn workbook_rels(workbook: &Workbook) -> String {
    let mut out = String::from(XML_DECL);
    out.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    let count = workbook.sheets.len();
    for idx in 1..=count {
        let _ = write!(
            out,
            r#"<Relationship Id="rId{idx}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{idx}.xml"/>"#
        );
    }
    let _ = write!(
        out,
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        count + 1
    );
    out.push_str("</Relationships>");
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::grid::GridAdapter;
    use crate::types::{CellValue, DataValidation};

    #[test]
    fn test_round_trip_through_parser() {
        let mut wb = Workbook::new();
        wb.add_sheet("Issue List");
        wb.add_sheet("Answer Sheet");
        wb.set_cell("Issue List", 2, 1, "X-1".into()).unwrap();
        wb.set_cell("Issue List", 2, 3, 7.0.into()).unwrap();
        wb.set_cell("Issue List", 2, 4, true.into()).unwrap();
        wb.set_formula("Issue List", 2, 6, "=IF(A2=\"\", \"\", 1)")
            .unwrap();
        let d = wb.register_domain(DataValidation::list(&["Yes", "No"]));
        for row in [3, 4, 9] {
            wb.set_validation("Answer Sheet", row, 4, &d).unwrap();
        }

        let bytes = write_xlsx(&wb).unwrap();
        assert_eq!(bytes, write_xlsx(&wb).unwrap());

        let back = crate::parser::parse(&bytes).unwrap();
        assert_eq!(back.sheets.len(), 2);
        assert_eq!(back.sheet("Issue List").unwrap().id, wb.sheet("Issue List").unwrap().id);
        assert_eq!(back.cell("Issue List", 2, 1).unwrap(), "X-1".into());
        assert_eq!(back.cell("Issue List", 2, 3).unwrap(), 7.0.into());
        assert_eq!(back.cell("Issue List", 2, 4).unwrap(), true.into());
        assert_eq!(
            back.cell("Issue List", 2, 6).unwrap(),
            CellValue::Formula("=IF(A2=\"\", \"\", 1)".into())
        );

        // one domain, shared by all three cells
        assert_eq!(back.domains.len(), 1);
        let a = back.validation("Answer Sheet", 3, 4).unwrap().unwrap();
        let b = back.validation("Answer Sheet", 9, 4).unwrap().unwrap();
        assert!(a.same_object(&b));
        assert_eq!(a.rule().list_values.clone().unwrap(), vec!["Yes", "No"]);
    }

    #[test]
    fn test_empty_workbook_rejected() {
        assert!(write_xlsx(&Workbook::new()).is_err());
    }
}
