//! Section layout engine.
//!
//! This module handles:
//! - The shared coordinate function (`base_row(i) = i * height + 1`)
//! - Folding index rows into an immutable, gap-free list of [`Section`]s
//! - Planning which answer-sheet row each index row links to
//! - Writing sections (header, template copy, merges, validations)

mod coords;
mod writer;

use serde::{Deserialize, Serialize};

pub use coords::{Section, SectionGeometry, FIRST_SECTION_ROW, MAX_SHEET_ROWS};
pub use writer::{write_sections, WriteStats};

use crate::error::Result;
use crate::types::IndexRow;

/// How index rows are mapped to sections for links and status formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkMode {
    /// Target derived from the index row position: `(row - firstDataRow)`.
    /// Matches the written sections only while the index list is dense; an
    /// interior row without key or summary shifts every later link.
    #[default]
    IndexOffset,
    /// Target derived from the kept-record ordinal, so every link and status
    /// formula points at a section that was actually written.
    Compacted,
}

/// Where one index row's link and status formulas point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexLink {
    pub index_row: u32,
    /// Section index used for the row arithmetic
    pub target_index: u32,
    /// Absolute answer-sheet row the link navigates to
    pub target_row: u32,
    /// Section actually written for this index row, if any
    pub written_section: Option<u32>,
}

impl IndexLink {
    /// Whether the link lands on the section written for this row.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.written_section == Some(self.target_index)
    }
}

/// Fold index rows into sections. Rows failing the key/summary rule get no
/// section and consume no section index.
///
/// Fails with a configuration error when the last section would end past
/// the last sheet row.
pub fn plan_sections(rows: &[IndexRow], geometry: SectionGeometry) -> Result<Vec<Section>> {
    rows.iter()
        .filter_map(|row| row.record().map(|record| (row.row, record)))
        .try_fold(Vec::new(), |mut sections, (index_row, record)| {
            let index = u32::try_from(sections.len()).unwrap_or(u32::MAX);
            geometry.ensure_fits(index)?;
            sections.push(Section {
                index,
                base_row: geometry.base_row(index),
                height: geometry.height(),
                index_row,
                record,
            });
            Ok(sections)
        })
}

/// Link targets for every index row that gets a link.
///
/// In [`LinkMode::IndexOffset`] every keyed row gets a link, including rows
/// with an empty summary that produced no section. In
/// [`LinkMode::Compacted`] only rows with a written section are linked.
/// Positional targets past the last sheet row are a configuration error.
pub fn plan_links(
    rows: &[IndexRow],
    sections: &[Section],
    geometry: SectionGeometry,
    first_data_row: u32,
    mode: LinkMode,
) -> Result<Vec<IndexLink>> {
    match mode {
        LinkMode::IndexOffset => rows
            .iter()
            .filter(|row| row.has_key())
            .filter_map(|row| {
                let target_index = SectionGeometry::index_offset(row.row, first_data_row)?;
                Some(geometry.ensure_fits(target_index).map(|()| IndexLink {
                    index_row: row.row,
                    target_index,
                    target_row: geometry.base_row(target_index),
                    written_section: sections
                        .iter()
                        .find(|s| s.index_row == row.row)
                        .map(|s| s.index),
                }))
            })
            .collect(),
        LinkMode::Compacted => Ok(sections
            .iter()
            .map(|s| IndexLink {
                index_row: s.index_row,
                target_index: s.index,
                target_row: s.base_row,
                written_section: Some(s.index),
            })
            .collect()),
    }
}
