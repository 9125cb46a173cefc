//! Index-sheet annotation: link and status formulas next to each record.

use serde::Serialize;

use crate::cell_ref::CellRange;
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::formula::{FormulaContext, LinkLayout};
use crate::grid::GridAdapter;
use crate::layout::{plan_links, Section, SectionGeometry};
use crate::types::{CellValue, IndexRow, SectionSchema};

/// What the annotation pass wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexOutcome {
    pub links: u32,
    pub status_formulas: u32,
    /// Keyed rows that got no status formula because they have no link
    pub status_omitted: Vec<u32>,
    /// Index rows whose link lands on a section other than their own
    pub dangling_links: Vec<u32>,
}

/// Write link formulas and one status formula per required span.
///
/// Stale link and status cells from a previous run are cleared first, so
/// rows that lost their record lose their formulas too.
pub fn annotate<G: GridAdapter + ?Sized>(
    grid: &mut G,
    config: &GeneratorConfig,
    schema: &SectionSchema,
    rows: &[IndexRow],
    sections: &[Section],
) -> Result<IndexOutcome> {
    let sheet = config.index_sheet.as_str();
    let geometry = SectionGeometry::of(schema);
    let ctx = formula_context(grid, config, schema, geometry)?;
    let status_cols = config.status_cols(schema.required_spans.len());
    let links = plan_links(
        rows,
        sections,
        geometry,
        config.first_data_row,
        config.link_mode,
    )?;

    grid.set_cell(sheet, 1, config.link_col, config.link_header.as_str().into())?;
    for (col, span) in status_cols.clone().zip(&schema.required_spans) {
        grid.set_cell(sheet, 1, col, span.status_header.as_str().into())?;
    }

    let last = grid.last_used_row(sheet)?;
    if last >= config.first_data_row {
        let cols = [config.link_col].into_iter().chain(status_cols.clone());
        for col in cols {
            let range = CellRange::column_span(config.first_data_row, last, col);
            let blank = vec![vec![CellValue::Empty]; range.rows() as usize];
            grid.set_range(sheet, range, &blank)?;
        }
    }

    let link_for = |row: u32| links.iter().find(|l| l.index_row == row);

    let mut outcome = IndexOutcome::default();
    if config.link_layout == LinkLayout::ArrayFormula {
        grid.set_formula(
            sheet,
            config.first_data_row,
            config.link_col,
            &ctx.array_link_formula(),
        )?;
        outcome.links = u32::try_from(links.len()).unwrap_or(u32::MAX);
    }

    for row in rows {
        let link = link_for(row.row);
        if config.link_layout == LinkLayout::PerRow {
            if let Some(formula) = ctx.link_formula(row, link, config.link_mode) {
                grid.set_formula(sheet, row.row, config.link_col, &formula)?;
                outcome.links += 1;
            }
        }
        if let Some(link) = link.filter(|l| !l.is_consistent()) {
            tracing::warn!(
                index_row = link.index_row,
                target_row = link.target_row,
                written = ?link.written_section,
                "link does not land on this row's section"
            );
            outcome.dangling_links.push(link.index_row);
        }
        if row.has_key() && link.is_none() {
            outcome.status_omitted.push(row.row);
            continue;
        }
        for (col, span) in status_cols.clone().zip(&schema.required_spans) {
            if let Some(formula) = ctx.status_for(link, span) {
                grid.set_formula(sheet, row.row, col, &formula)?;
                outcome.status_formulas += 1;
            }
        }
    }
    Ok(outcome)
}

/// Formula context for the configured sheets and the materialized schema.
pub fn formula_context<G: GridAdapter + ?Sized>(
    grid: &G,
    config: &GeneratorConfig,
    schema: &SectionSchema,
    geometry: SectionGeometry,
) -> Result<FormulaContext> {
    Ok(FormulaContext {
        dialect: config.dialect,
        answer_sheet: config.answer_sheet.clone(),
        answer_sheet_id: grid.sheet_id(&config.answer_sheet)?,
        geometry,
        first_data_row: config.first_data_row,
        key_col: config.index_columns.key,
        answer_col: schema.answer_col,
        anchor_col: schema.label_col,
        link_label: config.link_label.clone(),
        done_label: config.done_label.clone(),
        wip_label: config.wip_label.clone(),
    })
}
