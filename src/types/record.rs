use serde::{Deserialize, Serialize};

/// One tracked item (an issue) that gets its own answer section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub summary: String,
}

/// A raw row of the index (issue list) region.
///
/// Rows are kept even when they fail the key/summary predicate: link
/// formulas are derived from the row position, not from the kept records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRow {
    /// 1-based sheet row
    pub row: u32,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub summary: String,
}

impl IndexRow {
    #[must_use]
    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }

    /// Sparse-population rule: a record needs both a key and a summary.
    #[must_use]
    pub fn record(&self) -> Option<Record> {
        if self.key.is_empty() || self.summary.is_empty() {
            return None;
        }
        Some(Record {
            key: self.key.clone(),
            category: self.category.clone().filter(|c| !c.is_empty()),
            summary: self.summary.clone(),
        })
    }
}
