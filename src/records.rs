//! Reading the index region.

use crate::cell_ref::CellRange;
use crate::config::GeneratorConfig;
use crate::error::{AnswerSheetError, Result};
use crate::grid::GridAdapter;
use crate::types::{CellValue, IndexRow};

/// Read every index row from `first_data_row` down to the last row holding a
/// key, summary or category.
///
/// Rows failing the key/summary rule are returned too; the layout planner
/// decides what becomes a section, and link formulas are positional.
pub fn read_index_rows<G: GridAdapter + ?Sized>(
    grid: &G,
    config: &GeneratorConfig,
) -> Result<Vec<IndexRow>> {
    let sheet = config.index_sheet.as_str();
    let cols = config.index_columns;
    let first = config.first_data_row;
    let last_row = grid.last_used_row(sheet).map_err(|e| match e {
        AnswerSheetError::MissingSheet(name) => {
            AnswerSheetError::Configuration(format!("index sheet {name:?} does not exist"))
        }
        other => other,
    })?;
    if last_row < first {
        return Ok(Vec::new());
    }

    let read_col = |col: u32| -> Result<Vec<String>> {
        let values = grid.range(sheet, CellRange::column_span(first, last_row, col))?;
        Ok(values
            .into_iter()
            .map(|row| row.into_iter().next().map(cell_text).unwrap_or_default())
            .collect())
    };
    let keys = read_col(cols.key)?;
    let summaries = read_col(cols.summary)?;
    let categories = cols.category.map(read_col).transpose()?;

    let mut rows: Vec<IndexRow> = keys
        .into_iter()
        .zip(summaries)
        .zip(first..)
        .enumerate()
        .map(|(i, ((key, summary), row))| IndexRow {
            row,
            category: categories
                .as_ref()
                .and_then(|c| c.get(i))
                .filter(|c| !c.is_empty())
                .cloned(),
            key,
            summary,
        })
        .collect();

    // The sheet may extend past the index region (link and status columns).
    while rows
        .last()
        .is_some_and(|r| r.key.is_empty() && r.summary.is_empty() && r.category.is_none())
    {
        rows.pop();
    }
    tracing::debug!(sheet, rows = rows.len(), "read index rows");
    Ok(rows)
}

/// Text of an index cell. Formulas are not evaluated: a formula-only key
/// counts as empty.
fn cell_text(value: CellValue) -> String {
    match value {
        CellValue::Text(s) => s.trim().to_string(),
        CellValue::Number(_) | CellValue::Boolean(_) => value.display(),
        CellValue::Empty | CellValue::Formula(_) => String::new(),
    }
}
