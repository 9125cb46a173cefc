//! The "Generate Answer List" action: one full regeneration pass.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::GeneratorConfig;
use crate::error::{AnswerSheetError, Result};
use crate::grid::GridAdapter;
use crate::index::{annotate, IndexOutcome};
use crate::layout::{plan_sections, write_sections, Section, SectionGeometry, WriteStats};
use crate::records::read_index_rows;
use crate::template::materialize_template;

/// Summary of one generator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReport {
    pub blueprint: String,
    pub section_height: u32,
    /// Index rows read, including rows that produced no section
    pub index_rows: u32,
    /// Index rows skipped for a missing key or summary
    pub skipped_rows: Vec<u32>,
    pub sections: Vec<Section>,
    pub write: WriteStats,
    pub index: IndexOutcome,
}

/// Regenerates the answer sheet and the index annotations.
///
/// A `Generator` refuses overlapping runs: while [`Generator::run`] is in
/// progress a second call returns [`AnswerSheetError::AlreadyRunning`].
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    running: AtomicBool,
}

struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AnswerSheetError::AlreadyRunning)?;
        Ok(Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            running: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Whether a run is currently in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Rebuild the answer sheet from the index sheet.
    ///
    /// Template and index are read and validated before the answer sheet is
    /// touched, so configuration errors leave every sheet unchanged.
    pub fn run<G: GridAdapter + ?Sized>(&self, grid: &mut G) -> Result<GenerateReport> {
        let _guard = RunGuard::acquire(&self.running)?;
        let config = &self.config;
        let blueprint = config.blueprint.resolve();
        tracing::info!(
            blueprint = %blueprint.name,
            index = %config.index_sheet,
            answers = %config.answer_sheet,
            "generating answer sheet"
        );

        // Everything fallible that needs no write happens first.
        grid.sheet_id(&config.answer_sheet).map_err(|_| {
            AnswerSheetError::Configuration(format!(
                "answer sheet {:?} does not exist",
                config.answer_sheet
            ))
        })?;
        let schema = materialize_template(grid, &config.template_sheet, &blueprint)?;
        let rows = read_index_rows(grid, config)?;
        let geometry = SectionGeometry::of(&schema);
        let sections = plan_sections(&rows, geometry)?;

        let skipped_rows: Vec<u32> = rows
            .iter()
            .filter(|r| r.record().is_none())
            .map(|r| r.row)
            .collect();
        for row in &skipped_rows {
            tracing::warn!(index_row = row, "skipping index row without key or summary");
        }

        let index = annotate(grid, config, &schema, &rows, &sections)?;
        let write = write_sections(grid, &config.answer_sheet, &schema, &sections)?;
        if config.presentation {
            crate::presentation::apply(grid, config, &schema, &sections)?;
        }

        tracing::info!(
            sections = write.sections,
            skipped = skipped_rows.len(),
            links = index.links,
            dangling = index.dangling_links.len(),
            "answer sheet generated"
        );
        Ok(GenerateReport {
            blueprint: blueprint.name,
            section_height: geometry.height(),
            index_rows: u32::try_from(rows.len()).unwrap_or(u32::MAX),
            skipped_rows,
            sections,
            write,
            index,
        })
    }
}
