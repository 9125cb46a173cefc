//! Writes planned sections onto the answer sheet.

use serde::Serialize;

use super::Section;
use crate::cell_ref::CellRange;
use crate::error::Result;
use crate::grid::GridAdapter;
use crate::types::{CellValue, FieldKind, SectionSchema};

/// What a section write pass produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteStats {
    pub sections: u32,
    /// Last row of the last section, 0 when nothing was written
    pub last_row: u32,
    pub merges: u32,
    pub validated_cells: u32,
}

/// Clear `sheet` once, then write every section in order.
///
/// A failure part-way leaves the sheet cleared or partially written; running
/// the generator again rebuilds it from scratch.
pub fn write_sections<G: GridAdapter + ?Sized>(
    grid: &mut G,
    sheet: &str,
    schema: &SectionSchema,
    sections: &[Section],
) -> Result<WriteStats> {
    grid.clear_sheet(sheet)?;

    let labels = LabelBlock::from_schema(schema);
    let mut stats = WriteStats::default();
    for section in sections {
        write_header(grid, sheet, schema, section)?;
        if let Some(labels) = &labels {
            grid.set_range(sheet, labels.at(section), &labels.values)?;
        }

        for field in &schema.fields {
            match field.kind {
                FieldKind::Label | FieldKind::AnswerInput => {}
                FieldKind::NoteText => {
                    grid.set_cell(
                        sheet,
                        section.row(field.relative_row),
                        field.relative_col,
                        field.value.clone(),
                    )?;
                }
                FieldKind::MergedNote { rows } => {
                    let start = section.row(field.relative_row);
                    let handle = grid.merge(
                        sheet,
                        CellRange::column_span(start, start + rows - 1, field.relative_col),
                    )?;
                    grid.set_merged_value(&handle, field.value.clone())?;
                    stats.merges += 1;
                }
            }
        }

        for group in &schema.validation_groups {
            for relative_row in group.rows.iter() {
                grid.set_validation(
                    sheet,
                    section.row(relative_row),
                    schema.answer_col,
                    &group.domain,
                )?;
                stats.validated_cells += 1;
            }
        }

        tracing::debug!(
            key = %section.record.key,
            index = section.index,
            base_row = section.base_row,
            "wrote section"
        );
        stats.sections += 1;
        stats.last_row = section.last_row();
    }
    Ok(stats)
}

fn write_header<G: GridAdapter + ?Sized>(
    grid: &mut G,
    sheet: &str,
    schema: &SectionSchema,
    section: &Section,
) -> Result<()> {
    let label = section
        .record
        .category
        .clone()
        .unwrap_or_else(|| schema.record_label.clone());
    let base = section.base_row;
    grid.set_cell(sheet, base, schema.label_col, label.into())?;
    grid.set_cell(sheet, base, schema.key_col, section.record.key.as_str().into())?;
    grid.set_cell(
        sheet,
        base,
        schema.summary_col,
        section.record.summary.as_str().into(),
    )?;
    grid.set_cell(sheet, base + 1, schema.answer_col, schema.answer_label.as_str().into())
}

/// Template labels as one rectangular block, written with a single
/// `set_range` per section.
struct LabelBlock {
    relative_row: u32,
    col: u32,
    rows: u32,
    cols: u32,
    values: Vec<Vec<CellValue>>,
}

impl LabelBlock {
    fn from_schema(schema: &SectionSchema) -> Option<Self> {
        let labels = || schema.fields.iter().filter(|f| f.kind == FieldKind::Label);
        let first_row = labels().map(|f| f.relative_row).min()?;
        let last_row = labels().map(|f| f.relative_row).max()?;
        let first_col = labels().map(|f| f.relative_col).min()?;
        let last_col = labels().map(|f| f.relative_col).max()?;

        let rows = last_row - first_row + 1;
        let cols = last_col - first_col + 1;
        let mut values = vec![vec![CellValue::Empty; cols as usize]; rows as usize];
        for field in labels() {
            let slot = values
                .get_mut((field.relative_row - first_row) as usize)
                .and_then(|row| row.get_mut((field.relative_col - first_col) as usize));
            if let Some(slot) = slot {
                slot.clone_from(&field.value);
            }
        }
        Some(Self {
            relative_row: first_row,
            col: first_col,
            rows,
            cols,
            values,
        })
    }

    fn at(&self, section: &Section) -> CellRange {
        CellRange::sized(section.row(self.relative_row), self.col, self.rows, self.cols)
    }
}
