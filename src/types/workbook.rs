use serde::{Deserialize, Serialize};
use std::rc::Rc;

use super::{CellData, CellValue, DataValidation, DomainId, DomainRef, FormatRun, ValidationCell};
use crate::cell_ref::CellRange;

/// Stable per-sheet identity, used to build navigable link targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetId(pub u32);

impl std::fmt::Display for SheetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A workbook held in memory: sheets plus the registry of validation domains.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    /// Validation domains, indexed by [`DomainId`]
    #[serde(default)]
    pub domains: Vec<Rc<DataValidation>>,
}

impl Workbook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty sheet and return its id. Ids start at 1, like XLSX
    /// `sheetId`s. An existing sheet with the same name is returned as-is.
    pub fn add_sheet(&mut self, name: &str) -> SheetId {
        if let Some(sheet) = self.sheet(name) {
            return sheet.id;
        }
        let id = SheetId(self.sheets.iter().map(|s| s.id.0 + 1).max().unwrap_or(1));
        self.sheets.push(Sheet::new(name, id));
        id
    }

    #[must_use]
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    /// Register a validation domain and return its handle.
    pub fn register_domain(&mut self, rule: DataValidation) -> DomainRef {
        let id = DomainId(u32::try_from(self.domains.len()).unwrap_or(u32::MAX));
        let rule = Rc::new(rule);
        self.domains.push(Rc::clone(&rule));
        DomainRef::new(id, rule)
    }

    /// Handle for a registered domain.
    #[must_use]
    pub fn domain(&self, id: DomainId) -> Option<DomainRef> {
        self.domains
            .get(id.0 as usize)
            .map(|rule| DomainRef::new(id, Rc::clone(rule)))
    }
}

/// A single sheet. Cells, validations and merges use 1-based coordinates;
/// cells and validations are kept sorted by `(row, col)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub name: String,
    pub id: SheetId,
    #[serde(default)]
    pub cells: Vec<CellData>,
    #[serde(default)]
    pub merges: Vec<CellRange>,
    #[serde(default)]
    pub validations: Vec<ValidationCell>,
    #[serde(default)]
    pub formats: Vec<FormatRun>,
}

impl Sheet {
    #[must_use]
    pub fn new(name: &str, id: SheetId) -> Self {
        Self {
            name: name.to_string(),
            id,
            cells: Vec::new(),
            merges: Vec::new(),
            validations: Vec::new(),
            formats: Vec::new(),
        }
    }

    /// Index into `cells` for `(row, col)`, if the cell exists.
    #[must_use]
    pub fn cell_index_at(&self, row: u32, col: u32) -> Option<usize> {
        self.cells
            .binary_search_by_key(&(row, col), |cd| (cd.r, cd.c))
            .ok()
    }

    #[must_use]
    pub fn value_at(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cell_index_at(row, col)
            .and_then(|idx| self.cells.get(idx))
            .map(|cd| &cd.value)
    }

    /// Write a cell; empty values remove it.
    pub fn put(&mut self, row: u32, col: u32, value: CellValue) {
        match self.cells.binary_search_by_key(&(row, col), |cd| (cd.r, cd.c)) {
            Ok(idx) => {
                if value.is_empty() {
                    self.cells.remove(idx);
                } else if let Some(cd) = self.cells.get_mut(idx) {
                    cd.value = value;
                }
            }
            Err(idx) => {
                if !value.is_empty() {
                    self.cells.insert(idx, CellData { r: row, c: col, value });
                }
            }
        }
    }

    #[must_use]
    pub fn domain_at(&self, row: u32, col: u32) -> Option<DomainId> {
        self.validations
            .binary_search_by_key(&(row, col), |v| (v.r, v.c))
            .ok()
            .and_then(|idx| self.validations.get(idx))
            .map(|v| v.domain)
    }

    pub fn put_domain(&mut self, row: u32, col: u32, domain: DomainId) {
        let cell = ValidationCell { r: row, c: col, domain };
        match self
            .validations
            .binary_search_by_key(&(row, col), |v| (v.r, v.c))
        {
            Ok(idx) => {
                if let Some(slot) = self.validations.get_mut(idx) {
                    *slot = cell;
                }
            }
            Err(idx) => self.validations.insert(idx, cell),
        }
    }

    /// Last row holding a cell value, 0 when the sheet is empty.
    #[must_use]
    pub fn last_row(&self) -> u32 {
        self.cells.last().map_or(0, |cd| cd.r)
    }

    /// Last column holding a cell value, 0 when the sheet is empty.
    #[must_use]
    pub fn last_col(&self) -> u32 {
        self.cells.iter().map(|cd| cd.c).max().unwrap_or(0)
    }

    /// Drop contents, merges, validations and formats.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.merges.clear();
        self.validations.clear();
        self.formats.clear();
    }

    /// Restore the sorted-cell invariant after bulk deserialization.
    pub fn normalize(&mut self) {
        self.cells.retain(|cd| !cd.value.is_empty());
        self.cells.sort_by_key(|cd| (cd.r, cd.c));
        self.cells.dedup_by_key(|cd| (cd.r, cd.c));
        self.validations.sort_by_key(|v| (v.r, v.c));
        self.validations.dedup_by_key(|v| (v.r, v.c));
    }
}
