//! Cosmetic pass over the index and answer sheets.
//!
//! Nothing here changes cell values except the configured header renames.

use crate::cell_ref::CellRange;
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::grid::GridAdapter;
use crate::layout::Section;
use crate::types::{Border, BorderStyle, HAlign, RangeFormat, SectionSchema, VAlign};

const FONT: &str = "Arial";
const BODY_SIZE: f64 = 11.0;
const HEADER_SIZE: f64 = 12.0;
const HEADER_FILL: &str = "#d9ead3";

fn header_format() -> RangeFormat {
    RangeFormat {
        font_size: Some(HEADER_SIZE),
        background: Some(HEADER_FILL.to_string()),
        bottom_border: Some(Border {
            style: BorderStyle::Thick,
            color: "#000000".to_string(),
        }),
        ..RangeFormat::default()
    }
}

fn bold() -> RangeFormat {
    RangeFormat {
        bold: Some(true),
        ..RangeFormat::default()
    }
}

/// Format both sheets and apply the header renames.
pub fn apply<G: GridAdapter + ?Sized>(
    grid: &mut G,
    config: &GeneratorConfig,
    schema: &SectionSchema,
    sections: &[Section],
) -> Result<()> {
    let renamed = config
        .header_renames
        .iter()
        .map(|r| grid.replace_text(&config.index_sheet, &r.find, &r.replace))
        .sum::<Result<usize>>()?;
    if renamed > 0 {
        tracing::debug!(renamed, "renamed index headers");
    }

    format_index(grid, config, schema)?;
    format_answers(grid, config, schema, sections)
}

fn format_index<G: GridAdapter + ?Sized>(
    grid: &mut G,
    config: &GeneratorConfig,
    schema: &SectionSchema,
) -> Result<()> {
    let sheet = config.index_sheet.as_str();
    let last_status = config
        .status_cols(schema.required_spans.len())
        .last()
        .unwrap_or(config.link_col);
    let last_col = grid
        .last_used_col(sheet)?
        .max(last_status)
        .max(config.link_col);
    let last_row = grid.last_used_row(sheet)?;
    let first = config.first_data_row;

    if last_row >= first {
        // key and summary read left, everything after them centered
        let cols = config.index_columns;
        let left_end = cols.key.max(cols.summary);
        grid.apply_format(
            sheet,
            CellRange::new(first, 1, last_row, left_end),
            &RangeFormat::basic(HAlign::Left, VAlign::Middle, FONT, BODY_SIZE),
        )?;
        if last_col > left_end {
            grid.apply_format(
                sheet,
                CellRange::new(first, left_end + 1, last_row, last_col),
                &RangeFormat::basic(HAlign::Center, VAlign::Middle, FONT, BODY_SIZE),
            )?;
        }
    }

    let mut header = header_format();
    header.overlay(&bold());
    header.font_family = Some(FONT.to_string());
    grid.apply_format(
        sheet,
        CellRange::new(1, 1, first - 1, last_col),
        &header,
    )
}

fn format_answers<G: GridAdapter + ?Sized>(
    grid: &mut G,
    config: &GeneratorConfig,
    schema: &SectionSchema,
    sections: &[Section],
) -> Result<()> {
    let Some(last) = sections.last() else {
        return Ok(());
    };
    let sheet = config.answer_sheet.as_str();
    let last_col = grid.last_used_col(sheet)?.max(schema.last_col());
    let last_row = last.last_row();

    grid.apply_format(
        sheet,
        CellRange::new(1, 1, last_row, last_col),
        &RangeFormat::basic(HAlign::Left, VAlign::Middle, FONT, BODY_SIZE),
    )?;
    grid.apply_format(
        sheet,
        CellRange::column_span(1, last_row, schema.answer_col),
        &RangeFormat {
            h_align: Some(HAlign::Center),
            ..RangeFormat::default()
        },
    )?;

    let header = header_format();
    for section in sections {
        grid.apply_format(
            sheet,
            CellRange::sized(section.base_row, 1, schema.header_rows, last_col),
            &header,
        )?;
        // the last header row carries the answer label above the questions
        grid.apply_format(
            sheet,
            CellRange::sized(section.row(schema.header_rows - 1), 1, 1, last_col),
            &bold(),
        )?;
    }
    Ok(())
}
