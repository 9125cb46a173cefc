//! Section schema: the fixed shape every answer section is laid out with.
//!
//! Rows inside a section are *relative*: row 0 is the section's base row.

use serde::{Deserialize, Serialize};

use super::{CellValue, DomainRef};

/// Inclusive run of relative rows inside a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSpan {
    pub start: u32,
    pub end: u32,
}

impl RowSpan {
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn single(row: u32) -> Self {
        Self::new(row, row)
    }

    /// Number of rows covered; 0 for an inverted span.
    #[must_use]
    pub fn len(&self) -> u32 {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, row: u32) -> bool {
        (self.start..=self.end).contains(&row)
    }

    #[must_use]
    pub fn overlaps(&self, other: &RowSpan) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// A named run of answer rows that must all be filled for completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredSpan {
    pub name: String,
    pub rows: RowSpan,
    /// Non-empty answer count that marks the span done. Defaults to the row count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,
    /// Index sheet column header for this span's status column
    pub status_header: String,
}

impl RequiredSpan {
    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold.unwrap_or_else(|| self.rows.len())
    }
}

/// What a schema field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// Question/instruction text copied from the template
    Label,
    /// Answer cell left blank for the user, usually validated
    AnswerInput,
    /// Free note text from the template
    NoteText,
    /// Note text in a merged single-column region of `rows` rows
    MergedNote { rows: u32 },
}

/// One cell of the section shape, resolved from the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub relative_row: u32,
    /// 1-based sheet column
    pub relative_col: u32,
    pub kind: FieldKind,
    /// Template content, copied with its type
    pub value: CellValue,
}

/// Relative rows whose answer cells take one validation domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationGroup {
    pub rows: RowSpan,
    pub domain: DomainRef,
}

/// Section layout resolved from a blueprint and the template sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSchema {
    pub name: String,
    /// Constant row count per section
    pub height: u32,
    /// Rows holding the record header and the question header
    pub header_rows: u32,
    /// Header columns for the record label, key and summary (1-based)
    pub label_col: u32,
    pub key_col: u32,
    pub summary_col: u32,
    /// Column holding answers (1-based)
    pub answer_col: u32,
    /// Text in header row 0 when the record has no category
    pub record_label: String,
    /// Text written above the answer column in header row 1
    pub answer_label: String,
    pub fields: Vec<FieldSpec>,
    pub validation_groups: Vec<ValidationGroup>,
    pub required_spans: Vec<RequiredSpan>,
}

impl SectionSchema {
    /// Fields whose rows fall inside `span`.
    pub fn fields_in<'a>(&'a self, span: &'a RowSpan) -> impl Iterator<Item = &'a FieldSpec> + 'a {
        self.fields
            .iter()
            .filter(move |f| span.contains(f.relative_row))
    }

    /// Widest column the schema writes to.
    #[must_use]
    pub fn last_col(&self) -> u32 {
        self.fields
            .iter()
            .map(|f| f.relative_col)
            .chain([self.label_col, self.key_col, self.summary_col, self.answer_col])
            .max()
            .unwrap_or(self.answer_col)
    }
}
