//! Generator configuration.
//!
//! Every field has a default matching the stock issue-list workbook, so an
//! empty JSON object (or `GeneratorConfig::default()`) is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AnswerSheetError, Result};
use crate::formula::{FormulaDialect, LinkLayout};
use crate::layout::LinkMode;
use crate::template::{BlueprintPreset, SectionBlueprint};

/// Either a built-in blueprint name or a full custom blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlueprintChoice {
    Preset(BlueprintPreset),
    Custom(Box<SectionBlueprint>),
}

impl Default for BlueprintChoice {
    fn default() -> Self {
        Self::Preset(BlueprintPreset::SinglePhase)
    }
}

impl BlueprintChoice {
    #[must_use]
    pub fn resolve(&self) -> SectionBlueprint {
        match self {
            Self::Preset(preset) => preset.blueprint(),
            Self::Custom(blueprint) => (**blueprint).clone(),
        }
    }
}

/// Columns of the index region (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexColumns {
    pub key: u32,
    pub summary: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<u32>,
}

impl Default for IndexColumns {
    fn default() -> Self {
        Self {
            key: 1,
            summary: 2,
            category: None,
        }
    }
}

impl IndexColumns {
    fn all(&self) -> impl Iterator<Item = u32> {
        [Some(self.key), Some(self.summary), self.category]
            .into_iter()
            .flatten()
    }
}

/// A text substitution applied to index-sheet cells during presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderRename {
    pub find: String,
    pub replace: String,
}

/// Full generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    pub index_sheet: String,
    pub answer_sheet: String,
    pub template_sheet: String,
    /// First index row holding a record; rows above it are headers
    pub first_data_row: u32,
    pub index_columns: IndexColumns,
    /// Index column receiving link formulas
    pub link_col: u32,
    /// First index column receiving status formulas, one per required span
    pub status_col: u32,
    pub link_header: String,
    pub link_label: String,
    pub done_label: String,
    pub wip_label: String,
    pub blueprint: BlueprintChoice,
    pub link_mode: LinkMode,
    pub link_layout: LinkLayout,
    pub dialect: FormulaDialect,
    pub header_renames: Vec<HeaderRename>,
    pub presentation: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            index_sheet: "Issue List".into(),
            answer_sheet: "Answer Sheet".into(),
            template_sheet: "Template".into(),
            first_data_row: 2,
            index_columns: IndexColumns::default(),
            link_col: 6,
            status_col: 7,
            link_header: "Link".into(),
            link_label: "Answer".into(),
            done_label: "DONE".into(),
            wip_label: "WIP".into(),
            blueprint: BlueprintChoice::default(),
            link_mode: LinkMode::default(),
            link_layout: LinkLayout::default(),
            dialect: FormulaDialect::default(),
            header_renames: vec![HeaderRename {
                find: "Tester - (non-subtask level)".into(),
                replace: "Tester".into(),
            }],
            presentation: true,
        }
    }
}

impl GeneratorConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Index columns written by the generator: link column then one status
    /// column per required span.
    #[must_use]
    pub fn status_cols(&self, spans: usize) -> std::ops::Range<u32> {
        let spans = u32::try_from(spans).unwrap_or(u32::MAX);
        self.status_col..self.status_col.saturating_add(spans)
    }

    /// Reject inconsistent settings before any sheet is touched.
    pub fn validate(&self) -> Result<()> {
        let names = [&self.index_sheet, &self.answer_sheet, &self.template_sheet];
        if names.iter().any(|n| n.is_empty()) {
            return Err(config_err("sheet names must not be empty"));
        }
        if self.answer_sheet == self.index_sheet || self.answer_sheet == self.template_sheet {
            return Err(config_err(
                "answer sheet must differ from the index and template sheets",
            ));
        }
        if self.first_data_row < 2 {
            return Err(config_err("first data row must leave room for a header row"));
        }
        let cols = &self.index_columns;
        if cols.all().any(|c| c == 0) || self.link_col == 0 || self.status_col == 0 {
            return Err(config_err("columns are 1-based"));
        }
        if cols.key == cols.summary || cols.category.is_some_and(|c| c == cols.key || c == cols.summary)
        {
            return Err(config_err("index key, summary and category need distinct columns"));
        }

        let blueprint = self.blueprint.resolve();
        blueprint.validate()?;
        let status = self.status_cols(blueprint.required_spans.len());
        if cols.all().any(|c| c == self.link_col || status.contains(&c)) {
            return Err(config_err(
                "link and status columns must not overwrite index columns",
            ));
        }
        if status.contains(&self.link_col) {
            return Err(config_err("link column collides with a status column"));
        }
        if self.link_layout == LinkLayout::ArrayFormula {
            if self.dialect != FormulaDialect::GoogleSheets {
                return Err(config_err("the arrayFormula link layout needs the googleSheets dialect"));
            }
            if self.link_mode != LinkMode::IndexOffset {
                return Err(config_err("the arrayFormula link layout only supports indexOffset links"));
            }
        }
        Ok(())
    }
}

fn config_err(msg: &str) -> AnswerSheetError {
    AnswerSheetError::Configuration(msg.to_string())
}
