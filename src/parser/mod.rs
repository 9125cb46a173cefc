//! Main XLSX parser
//!
//! Reads the parts the generator needs from the ZIP archive: sheet list,
//! shared strings, cell values and formulas, merges and data validations.
//! Styles are not imported; the presentation pass rebuilds formatting.

mod relationships;
mod worksheet;

use std::io::Cursor;
use zip::ZipArchive;

use crate::data_validation::attach;
use crate::error::{AnswerSheetError, Result};
use crate::types::Workbook;

use relationships::{get_sheet_info, parse_shared_strings, parse_workbook_relationships};
use worksheet::parse_sheet;

/// Parse an XLSX file from bytes.
///
/// # Errors
/// Fails when the archive or `xl/workbook.xml` is unreadable, a listed
/// worksheet part is missing, or two sheets share a name.
pub fn parse(data: &[u8]) -> Result<Workbook> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    // Parse workbook relationships first to get actual file paths
    let relationships = parse_workbook_relationships(&mut archive);
    let shared_strings =
        parse_shared_strings(&mut archive, relationships.shared_strings.as_deref());
    let sheet_infos = get_sheet_info(&mut archive, &relationships.worksheets)?;

    let mut workbook = Workbook::new();
    for info in &sheet_infos {
        if workbook.sheet(&info.name).is_some() {
            return Err(AnswerSheetError::Parse(format!(
                "duplicate sheet name {:?}",
                info.name
            )));
        }
        let (sheet, validations) = parse_sheet(&mut archive, info, &shared_strings)?;
        tracing::debug!(
            sheet = %info.name,
            cells = sheet.cells.len(),
            merges = sheet.merges.len(),
            validations = validations.len(),
            "parsed worksheet"
        );
        workbook.sheets.push(sheet);
        for parsed in validations {
            attach(&mut workbook, &info.name, parsed);
        }
    }

    Ok(workbook)
}
