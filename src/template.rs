//! Template model: section blueprints and their materialization.
//!
//! A [`SectionBlueprint`] is the static, versionable description of a section
//! (height, header rows, where the template block lives, which rows take
//! which validation domain, which spans must be answered). Reading the
//! template sheet through the grid turns it into a [`SectionSchema`] whose
//! text and domain handles are copied verbatim into every section.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::cell_ref::{parse_cell_ref, CellRange};
use crate::error::{AnswerSheetError, Result};
use crate::grid::GridAdapter;
use crate::layout::MAX_SHEET_ROWS;
use crate::types::{
    CellValue, DomainRef, FieldKind, FieldSpec, RequiredSpan, RowSpan, SectionSchema, ValidationGroup,
};

/// Relative rows whose answers take the domain found at `source` on the
/// template sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSource {
    pub rows: RowSpan,
    /// A1 reference of a template cell carrying the validation domain
    pub source: String,
}

/// A multi-row note merged into one cell of column `col`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedNoteSource {
    pub name: String,
    pub rows: RowSpan,
    /// 1-based column
    pub col: u32,
}

/// Static section description, resolved against a template sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionBlueprint {
    pub name: String,
    pub height: u32,
    pub header_rows: u32,
    pub label_col: u32,
    pub key_col: u32,
    pub summary_col: u32,
    pub answer_col: u32,
    pub record_label: String,
    pub answer_label: String,
    /// Template block (A1 range on the template sheet)
    pub template_region: String,
    /// Section row receiving the template block's first row
    pub template_row_offset: u32,
    /// Fewer non-empty template rows than this is a configuration error
    pub min_template_rows: u32,
    #[serde(default)]
    pub validation_groups: Vec<ValidationSource>,
    #[serde(default)]
    pub merged_notes: Vec<MergedNoteSource>,
    pub required_spans: Vec<RequiredSpan>,
}

/// Built-in blueprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlueprintPreset {
    SinglePhase,
    DevQaSplit,
}

impl BlueprintPreset {
    #[must_use]
    pub fn blueprint(self) -> SectionBlueprint {
        match self {
            Self::SinglePhase => SectionBlueprint::single_phase(),
            Self::DevQaSplit => SectionBlueprint::dev_qa_split(),
        }
    }
}

impl SectionBlueprint {
    /// 13-row sections: one question block `Template!A2:C11`, nine answers.
    #[must_use]
    pub fn single_phase() -> Self {
        Self {
            name: "single-phase".into(),
            height: 13,
            header_rows: 2,
            label_col: 1,
            key_col: 2,
            summary_col: 3,
            answer_col: 4,
            record_label: "Issue".into(),
            answer_label: "Answer".into(),
            template_region: "A2:C11".into(),
            template_row_offset: 1,
            min_template_rows: 10,
            validation_groups: vec![
                ValidationSource {
                    rows: RowSpan::new(2, 5),
                    source: "D3".into(),
                },
                ValidationSource {
                    rows: RowSpan::single(6),
                    source: "D7".into(),
                },
                ValidationSource {
                    rows: RowSpan::single(7),
                    source: "D8".into(),
                },
                ValidationSource {
                    rows: RowSpan::new(8, 10),
                    source: "D3".into(),
                },
            ],
            merged_notes: Vec::new(),
            required_spans: vec![RequiredSpan {
                name: "answers".into(),
                rows: RowSpan::new(2, 10),
                threshold: None,
                status_header: "Status".into(),
            }],
        }
    }

    /// 16-row sections split into a dev phase and a QA phase, each with its
    /// own merged note and status column.
    #[must_use]
    pub fn dev_qa_split() -> Self {
        Self {
            name: "dev-qa-split".into(),
            height: 16,
            header_rows: 2,
            label_col: 1,
            key_col: 2,
            summary_col: 3,
            answer_col: 4,
            record_label: "Issue".into(),
            answer_label: "Answer".into(),
            template_region: "A2:C14".into(),
            template_row_offset: 1,
            min_template_rows: 13,
            validation_groups: vec![
                ValidationSource {
                    rows: RowSpan::new(2, 6),
                    source: "D3".into(),
                },
                ValidationSource {
                    rows: RowSpan::new(7, 11),
                    source: "D8".into(),
                },
            ],
            merged_notes: vec![
                MergedNoteSource {
                    name: "root-cause".into(),
                    rows: RowSpan::new(2, 6),
                    col: 5,
                },
                MergedNoteSource {
                    name: "prevention".into(),
                    rows: RowSpan::new(7, 11),
                    col: 5,
                },
            ],
            required_spans: vec![
                RequiredSpan {
                    name: "dev".into(),
                    rows: RowSpan::new(2, 6),
                    threshold: None,
                    status_header: "Dev Status".into(),
                },
                RequiredSpan {
                    name: "qa".into(),
                    rows: RowSpan::new(7, 11),
                    threshold: None,
                    status_header: "QA Status".into(),
                },
            ],
        }
    }

    /// Parsed template region.
    pub fn region(&self) -> Result<CellRange> {
        self.template_region
            .parse()
            .map_err(|_| config_err(format!("bad template region {:?}", self.template_region)))
    }

    /// Template sheet row that lands on section row `relative_row`.
    fn template_row_for(&self, region: &CellRange, relative_row: u32) -> Option<u32> {
        (region.start_row + relative_row).checked_sub(self.template_row_offset)
    }

    /// Structural checks that need no sheet access.
    pub fn validate(&self) -> Result<()> {
        if self.height == 0 || self.header_rows == 0 || self.header_rows >= self.height {
            return Err(config_err(format!(
                "{}: header rows ({}) must be within section height ({})",
                self.name, self.header_rows, self.height
            )));
        }
        if self.height > MAX_SHEET_ROWS {
            return Err(config_err(format!(
                "{}: section height {} exceeds the {MAX_SHEET_ROWS} rows of a sheet",
                self.name, self.height
            )));
        }
        let cols = [self.label_col, self.key_col, self.summary_col, self.answer_col];
        if cols.contains(&0) {
            return Err(config_err(format!("{}: columns are 1-based", self.name)));
        }
        if self.label_col == self.key_col
            || self.key_col == self.summary_col
            || self.label_col == self.summary_col
        {
            return Err(config_err(format!(
                "{}: header label, key and summary need distinct columns",
                self.name
            )));
        }

        let region = self.region()?;
        if self.template_row_offset + region.rows() > self.height {
            return Err(config_err(format!(
                "{}: template region {} does not fit a {}-row section at offset {}",
                self.name, region, self.height, self.template_row_offset
            )));
        }
        if (region.start_col..=region.end_col).contains(&self.answer_col) {
            return Err(config_err(format!(
                "{}: answer column overlaps template region {}",
                self.name, region
            )));
        }
        if self.min_template_rows > region.rows() {
            return Err(config_err(format!(
                "{}: requires {} template rows but region {} has {}",
                self.name,
                self.min_template_rows,
                region.rows(),
                region.rows()
            )));
        }

        let body = RowSpan::new(self.header_rows, self.height - 1);
        let in_body =
            |span: &RowSpan| !span.is_empty() && span.start >= body.start && span.end <= body.end;

        if self.required_spans.is_empty() {
            return Err(config_err(format!(
                "{}: at least one required answer span is needed",
                self.name
            )));
        }
        for (i, span) in self.required_spans.iter().enumerate() {
            if !in_body(&span.rows) {
                return Err(config_err(format!(
                    "{}: span {:?} rows {}..={} fall outside the section body",
                    self.name, span.name, span.rows.start, span.rows.end
                )));
            }
            if span.threshold() == 0 || span.threshold() > span.rows.len() {
                return Err(config_err(format!(
                    "{}: span {:?} threshold must be between 1 and {}",
                    self.name,
                    span.name,
                    span.rows.len()
                )));
            }
            let clash = self
                .required_spans
                .iter()
                .skip(i + 1)
                .any(|other| other.rows.overlaps(&span.rows));
            if clash {
                return Err(config_err(format!(
                    "{}: required spans must be disjoint ({:?})",
                    self.name, span.name
                )));
            }
        }

        for (i, group) in self.validation_groups.iter().enumerate() {
            if !in_body(&group.rows) {
                return Err(config_err(format!(
                    "{}: validation rows {}..={} fall outside the section body",
                    self.name, group.rows.start, group.rows.end
                )));
            }
            if parse_cell_ref(&group.source).is_none() {
                return Err(config_err(format!(
                    "{}: bad validation source {:?}",
                    self.name, group.source
                )));
            }
            let clash = self
                .validation_groups
                .iter()
                .skip(i + 1)
                .any(|other| other.rows.overlaps(&group.rows));
            if clash {
                return Err(config_err(format!(
                    "{}: validation groups overlap at rows {}..={}",
                    self.name, group.rows.start, group.rows.end
                )));
            }
        }

        for (i, note) in self.merged_notes.iter().enumerate() {
            if !in_body(&note.rows) {
                return Err(config_err(format!(
                    "{}: note {:?} falls outside the section body",
                    self.name, note.name
                )));
            }
            if note.col == 0
                || note.col == self.answer_col
                || (region.start_col..=region.end_col).contains(&note.col)
            {
                return Err(config_err(format!(
                    "{}: note {:?} column collides with the template or answer column",
                    self.name, note.name
                )));
            }
            let clash = self
                .merged_notes
                .iter()
                .skip(i + 1)
                .any(|other| other.col == note.col && other.rows.overlaps(&note.rows));
            if clash {
                return Err(config_err(format!(
                    "{}: notes overlap in column {}",
                    self.name, note.col
                )));
            }
        }
        Ok(())
    }
}

fn config_err(msg: String) -> AnswerSheetError {
    AnswerSheetError::Configuration(msg)
}

/// Read the template sheet once and resolve `blueprint` into a schema.
///
/// Fails with a configuration error, before anything is written, when the
/// template is undersized or a validation source carries no domain.
pub fn materialize_template<G: GridAdapter + ?Sized>(
    grid: &G,
    template_sheet: &str,
    blueprint: &SectionBlueprint,
) -> Result<SectionSchema> {
    blueprint.validate()?;
    let region = blueprint.region()?;

    let block = grid
        .range(template_sheet, region)
        .map_err(|e| missing_as_config(e, template_sheet))?;
    let filled_rows = block
        .iter()
        .filter(|row| row.iter().any(|v| !v.is_empty()))
        .count();
    if filled_rows < blueprint.min_template_rows as usize {
        return Err(config_err(format!(
            "template {template_sheet}!{region} has {filled_rows} filled rows, {} required",
            blueprint.min_template_rows
        )));
    }

    let mut fields = Vec::new();
    for (relative_row, row) in (blueprint.template_row_offset..).zip(&block) {
        for (col, value) in (region.start_col..).zip(row) {
            fields.push(FieldSpec {
                relative_row,
                relative_col: col,
                kind: FieldKind::Label,
                value: value.clone(),
            });
        }
    }

    // One handle per source cell, shared by every group that names it.
    let mut domains = HashMap::new();
    let mut validation_groups = Vec::with_capacity(blueprint.validation_groups.len());
    for group in &blueprint.validation_groups {
        let domain = match domains.get(&group.source) {
            Some(domain) => DomainRef::clone(domain),
            None => {
                let (row, col) = parse_cell_ref(&group.source)
                    .ok_or_else(|| config_err(format!("bad validation source {:?}", group.source)))?;
                let domain = grid.validation(template_sheet, row, col)?.ok_or_else(|| {
                    config_err(format!(
                        "template cell {template_sheet}!{} has no data validation",
                        group.source
                    ))
                })?;
                domains.insert(group.source.clone(), domain.clone());
                domain
            }
        };
        validation_groups.push(ValidationGroup {
            rows: group.rows,
            domain,
        });
    }

    let mut answer_rows: Vec<u32> = blueprint
        .validation_groups
        .iter()
        .flat_map(|g| g.rows.iter())
        .chain(blueprint.required_spans.iter().flat_map(|s| s.rows.iter()))
        .collect();
    answer_rows.sort_unstable();
    answer_rows.dedup();
    fields.extend(answer_rows.into_iter().map(|relative_row| FieldSpec {
        relative_row,
        relative_col: blueprint.answer_col,
        kind: FieldKind::AnswerInput,
        value: CellValue::Empty,
    }));

    for note in &blueprint.merged_notes {
        let value = match blueprint.template_row_for(&region, note.rows.start) {
            Some(row) if row > 0 => grid.cell(template_sheet, row, note.col)?,
            _ => CellValue::Empty,
        };
        let kind = if note.rows.len() > 1 {
            FieldKind::MergedNote {
                rows: note.rows.len(),
            }
        } else {
            FieldKind::NoteText
        };
        fields.push(FieldSpec {
            relative_row: note.rows.start,
            relative_col: note.col,
            kind,
            value,
        });
    }

    tracing::debug!(
        blueprint = %blueprint.name,
        fields = fields.len(),
        domains = domains.len(),
        "materialized template"
    );

    Ok(SectionSchema {
        name: blueprint.name.clone(),
        height: blueprint.height,
        header_rows: blueprint.header_rows,
        label_col: blueprint.label_col,
        key_col: blueprint.key_col,
        summary_col: blueprint.summary_col,
        answer_col: blueprint.answer_col,
        record_label: blueprint.record_label.clone(),
        answer_label: blueprint.answer_label.clone(),
        fields,
        validation_groups,
        required_spans: blueprint.required_spans.clone(),
    })
}

fn missing_as_config(e: AnswerSheetError, sheet: &str) -> AnswerSheetError {
    match e {
        AnswerSheetError::MissingSheet(_) => config_err(format!("template sheet {sheet:?} not found")),
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::{CellValue, DataValidation, Workbook};

    fn template_workbook(rows: u32) -> Workbook {
        let mut wb = Workbook::new();
        wb.add_sheet("Template");
        for r in 0..rows {
            let row = 2 + r;
            wb.set_cell("Template", row, 1, CellValue::Number(f64::from(r)))
                .unwrap();
            wb.set_cell("Template", row, 2, format!("Question {r}").into())
                .unwrap();
        }
        let yes_no = wb.register_domain(DataValidation::list(&["Yes", "No"]));
        let level = wb.register_domain(DataValidation::list(&["Low", "High"]));
        let phase = wb.register_domain(DataValidation::list(&["Dev", "QA"]));
        wb.set_validation("Template", 3, 4, &yes_no).unwrap();
        wb.set_validation("Template", 7, 4, &level).unwrap();
        wb.set_validation("Template", 8, 4, &phase).unwrap();
        wb
    }

    #[test]
    fn test_presets_are_valid() {
        SectionBlueprint::single_phase().validate().unwrap();
        SectionBlueprint::dev_qa_split().validate().unwrap();
    }

    #[test]
    fn test_single_phase_schema() {
        let wb = template_workbook(10);
        let schema =
            materialize_template(&wb, "Template", &SectionBlueprint::single_phase()).unwrap();
        assert_eq!(schema.height, 13);
        let labels: Vec<_> = schema
            .fields
            .iter()
            .filter(|f| f.kind == FieldKind::Label)
            .collect();
        assert_eq!(labels.len(), 30);
        assert_eq!(labels[0].relative_row, 1);
        assert_eq!(labels[0].value, CellValue::Number(0.0));
        assert_eq!(labels[29].relative_row, 10);
        assert_eq!(labels[29].relative_col, 3);

        let answers = schema
            .fields
            .iter()
            .filter(|f| f.kind == FieldKind::AnswerInput)
            .count();
        assert_eq!(answers, 9);

        // groups 0 and 3 share the D3 domain object
        let g = &schema.validation_groups;
        assert_eq!(g.len(), 4);
        assert!(g[0].domain.same_object(&g[3].domain));
        assert!(!g[0].domain.same_object(&g[1].domain));
    }

    #[test]
    fn test_undersized_template_is_fatal() {
        let wb = template_workbook(7);
        let err = materialize_template(&wb, "Template", &SectionBlueprint::single_phase())
            .unwrap_err();
        assert!(matches!(err, AnswerSheetError::Configuration(_)));
    }

    #[test]
    fn test_missing_domain_is_fatal() {
        let mut wb = template_workbook(10);
        wb.sheet_mut("Template").unwrap().validations.clear();
        let err = materialize_template(&wb, "Template", &SectionBlueprint::single_phase())
            .unwrap_err();
        assert!(matches!(err, AnswerSheetError::Configuration(_)));
    }

    #[test]
    fn test_missing_template_sheet_is_fatal() {
        let wb = Workbook::new();
        let err = materialize_template(&wb, "Template", &SectionBlueprint::single_phase())
            .unwrap_err();
        assert!(err.is_pre_write());
    }

    #[test]
    fn test_blueprint_rejects_overlapping_spans() {
        let mut bp = SectionBlueprint::dev_qa_split();
        bp.required_spans[1].rows = RowSpan::new(6, 11);
        assert!(bp.validate().is_err());
    }

    #[test]
    fn test_blueprint_rejects_region_taller_than_section() {
        let mut bp = SectionBlueprint::single_phase();
        bp.height = 10;
        assert!(bp.validate().is_err());
    }

    #[test]
    fn test_blueprint_rejects_height_beyond_sheet() {
        let mut bp = SectionBlueprint::single_phase();
        bp.height = 2_000_000_000;
        let err = bp.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds"));
        bp.height = MAX_SHEET_ROWS;
        bp.validate().unwrap();
    }

    #[test]
    fn test_numeric_template_cells_keep_their_type() {
        let wb = template_workbook(10);
        let schema =
            materialize_template(&wb, "Template", &SectionBlueprint::single_phase()).unwrap();
        let first_col: Vec<_> = schema
            .fields
            .iter()
            .filter(|f| f.kind == FieldKind::Label && f.relative_col == 1)
            .map(|f| f.value.clone())
            .collect();
        assert_eq!(first_col[3], CellValue::Number(3.0));
        assert_eq!(first_col.len(), 10);
    }

    #[test]
    fn test_dev_qa_notes() {
        let mut wb = template_workbook(13);
        wb.set_cell("Template", 3, 5, "Root cause".into()).unwrap();
        wb.set_cell("Template", 8, 5, "Prevention".into()).unwrap();
        let schema =
            materialize_template(&wb, "Template", &SectionBlueprint::dev_qa_split()).unwrap();
        let notes: Vec<_> = schema
            .fields
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::MergedNote { .. }))
            .collect();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].value, "Root cause".into());
        assert_eq!(notes[0].kind, FieldKind::MergedNote { rows: 5 });
        assert_eq!(notes[1].value, "Prevention".into());
        assert_eq!(notes[1].relative_row, 7);
    }
}
