//! [`GridAdapter`] over the in-memory [`Workbook`].

use super::{GridAdapter, MergeHandle};
use crate::cell_ref::CellRange;
use crate::error::{AnswerSheetError, Result};
use crate::types::{CellValue, DomainRef, FormatRun, RangeFormat, Sheet, SheetId, Workbook};

impl Workbook {
    fn require(&self, sheet: &str) -> Result<&Sheet> {
        self.sheet(sheet)
            .ok_or_else(|| AnswerSheetError::MissingSheet(sheet.to_string()))
    }

    fn require_mut(&mut self, sheet: &str) -> Result<&mut Sheet> {
        self.sheet_mut(sheet)
            .ok_or_else(|| AnswerSheetError::MissingSheet(sheet.to_string()))
    }
}

fn check_coords(row: u32, col: u32) -> Result<()> {
    if row == 0 || col == 0 {
        return Err(AnswerSheetError::CellRef(format!(
            "row {row}, col {col} (coordinates are 1-based)"
        )));
    }
    Ok(())
}

impl GridAdapter for Workbook {
    fn sheet_id(&self, sheet: &str) -> Result<SheetId> {
        Ok(self.require(sheet)?.id)
    }

    fn cell(&self, sheet: &str, row: u32, col: u32) -> Result<CellValue> {
        check_coords(row, col)?;
        Ok(self
            .require(sheet)?
            .value_at(row, col)
            .cloned()
            .unwrap_or_default())
    }

    fn set_cell(&mut self, sheet: &str, row: u32, col: u32, value: CellValue) -> Result<()> {
        check_coords(row, col)?;
        self.require_mut(sheet)?.put(row, col, value);
        Ok(())
    }

    fn range(&self, sheet: &str, range: CellRange) -> Result<Vec<Vec<CellValue>>> {
        check_coords(range.start_row, range.start_col)?;
        let s = self.require(sheet)?;
        Ok((range.start_row..=range.end_row)
            .map(|row| {
                (range.start_col..=range.end_col)
                    .map(|col| s.value_at(row, col).cloned().unwrap_or_default())
                    .collect()
            })
            .collect())
    }

    fn set_range(
        &mut self,
        sheet: &str,
        range: CellRange,
        values: &[Vec<CellValue>],
    ) -> Result<()> {
        check_coords(range.start_row, range.start_col)?;
        let shape_ok = values.len() == range.rows() as usize
            && values.iter().all(|r| r.len() == range.cols() as usize);
        if !shape_ok {
            return Err(AnswerSheetError::CellRef(format!(
                "{} values do not match the shape of {range}",
                values.len()
            )));
        }
        let s = self.require_mut(sheet)?;
        for (row, cols) in (range.start_row..).zip(values) {
            for (col, value) in (range.start_col..).zip(cols) {
                s.put(row, col, value.clone());
            }
        }
        Ok(())
    }

    fn set_formula(&mut self, sheet: &str, row: u32, col: u32, formula: &str) -> Result<()> {
        self.set_cell(sheet, row, col, CellValue::Formula(formula.to_string()))
    }

    fn validation(&self, sheet: &str, row: u32, col: u32) -> Result<Option<DomainRef>> {
        check_coords(row, col)?;
        Ok(self
            .require(sheet)?
            .domain_at(row, col)
            .and_then(|id| self.domain(id)))
    }

    fn set_validation(
        &mut self,
        sheet: &str,
        row: u32,
        col: u32,
        domain: &DomainRef,
    ) -> Result<()> {
        check_coords(row, col)?;
        // Only handles issued by this workbook may be attached.
        match self.domain(domain.id()) {
            Some(registered) if registered.same_object(domain) => {}
            _ => return Err(AnswerSheetError::UnknownDomain(domain.id().0)),
        }
        self.require_mut(sheet)?.put_domain(row, col, domain.id());
        Ok(())
    }

    fn merge(&mut self, sheet: &str, range: CellRange) -> Result<MergeHandle> {
        check_coords(range.start_row, range.start_col)?;
        let s = self.require_mut(sheet)?;
        if let Some(existing) = s.merges.iter().find(|m| m.intersects(&range)) {
            if *existing != range {
                return Err(AnswerSheetError::CellRef(format!(
                    "merge {range} overlaps existing merge {existing}"
                )));
            }
        } else {
            s.merges.push(range);
        }
        Ok(MergeHandle {
            sheet: sheet.to_string(),
            range,
        })
    }

    fn set_merged_value(&mut self, handle: &MergeHandle, value: CellValue) -> Result<()> {
        self.set_cell(
            &handle.sheet,
            handle.range.start_row,
            handle.range.start_col,
            value,
        )
    }

    fn clear_sheet(&mut self, sheet: &str) -> Result<()> {
        self.require_mut(sheet)?.clear();
        Ok(())
    }

    fn last_used_row(&self, sheet: &str) -> Result<u32> {
        Ok(self.require(sheet)?.last_row())
    }

    fn last_used_col(&self, sheet: &str) -> Result<u32> {
        Ok(self.require(sheet)?.last_col())
    }

    fn apply_format(&mut self, sheet: &str, range: CellRange, format: &RangeFormat) -> Result<()> {
        check_coords(range.start_row, range.start_col)?;
        if format.is_empty() {
            return Ok(());
        }
        self.require_mut(sheet)?.formats.push(FormatRun {
            range,
            format: format.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::DataValidation;

    fn workbook() -> Workbook {
        let mut wb = Workbook::new();
        wb.add_sheet("Answer Sheet");
        wb
    }

    #[test]
    fn test_cell_roundtrip_and_missing_sheet() {
        let mut wb = workbook();
        wb.set_cell("Answer Sheet", 2, 4, "Answer".into()).unwrap();
        assert_eq!(
            wb.cell("Answer Sheet", 2, 4).unwrap(),
            CellValue::from("Answer")
        );
        assert_eq!(wb.cell("Answer Sheet", 9, 9).unwrap(), CellValue::Empty);
        assert!(matches!(
            wb.cell("Nope", 1, 1),
            Err(AnswerSheetError::MissingSheet(_))
        ));
        assert!(matches!(
            wb.cell("Answer Sheet", 0, 1),
            Err(AnswerSheetError::CellRef(_))
        ));
    }

    #[test]
    fn test_set_range_checks_shape() {
        let mut wb = workbook();
        let values = vec![vec![CellValue::from("a"), CellValue::from("b")]];
        wb.set_range("Answer Sheet", CellRange::sized(3, 1, 1, 2), &values)
            .unwrap();
        assert_eq!(wb.cell("Answer Sheet", 3, 2).unwrap(), "b".into());
        assert!(wb
            .set_range("Answer Sheet", CellRange::sized(3, 1, 2, 2), &values)
            .is_err());
    }

    #[test]
    fn test_validation_requires_registered_domain() {
        let mut wb = workbook();
        let domain = wb.register_domain(DataValidation::list(&["Yes", "No"]));
        wb.set_validation("Answer Sheet", 3, 4, &domain).unwrap();
        let back = wb.validation("Answer Sheet", 3, 4).unwrap().unwrap();
        assert!(back.same_object(&domain));

        let mut other = Workbook::new();
        let foreign = other.register_domain(DataValidation::list(&["Yes", "No"]));
        let mut small = Workbook::new();
        small.add_sheet("S");
        assert!(matches!(
            small.set_validation("S", 1, 1, &foreign),
            Err(AnswerSheetError::UnknownDomain(0))
        ));
    }

    #[test]
    fn test_merge_rejects_overlap() {
        let mut wb = workbook();
        let handle = wb
            .merge("Answer Sheet", CellRange::column_span(3, 7, 5))
            .unwrap();
        wb.set_merged_value(&handle, "Root cause".into()).unwrap();
        assert_eq!(wb.cell("Answer Sheet", 3, 5).unwrap(), "Root cause".into());
        assert!(wb
            .merge("Answer Sheet", CellRange::column_span(6, 9, 5))
            .is_err());
        // Re-merging the same region is a no-op
        wb.merge("Answer Sheet", CellRange::column_span(3, 7, 5))
            .unwrap();
        assert_eq!(wb.sheet("Answer Sheet").unwrap().merges.len(), 1);
    }

    #[test]
    fn test_replace_text() {
        let mut wb = workbook();
        wb.set_cell("Answer Sheet", 1, 5, "Tester - (non-subtask level)".into())
            .unwrap();
        wb.set_cell("Answer Sheet", 2, 1, "X-1".into()).unwrap();
        let n = wb
            .replace_text("Answer Sheet", "Tester - (non-subtask level)", "Tester")
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(wb.cell("Answer Sheet", 1, 5).unwrap(), "Tester".into());
    }

    #[test]
    fn test_clear_sheet() {
        let mut wb = workbook();
        wb.set_cell("Answer Sheet", 1, 1, "x".into()).unwrap();
        wb.merge("Answer Sheet", CellRange::column_span(1, 2, 2))
            .unwrap();
        wb.clear_sheet("Answer Sheet").unwrap();
        assert_eq!(wb.last_used_row("Answer Sheet").unwrap(), 0);
        assert!(wb.sheet("Answer Sheet").unwrap().merges.is_empty());
    }
}
