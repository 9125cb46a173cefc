//! Structured error types for answer-sheet.
//!
//! Skipped records and omitted status formulas are not errors; they are
//! reported through [`crate::generate::GenerateReport`].

/// All errors that can occur while importing, generating or exporting.
#[derive(Debug, thiserror::Error)]
pub enum AnswerSheetError {
    /// Template region or generator configuration is malformed. Fatal; raised
    /// before anything is written to the answer sheet.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A sheet named by the configuration does not exist in the workbook.
    #[error("Missing sheet: {0}")]
    MissingSheet(String),

    /// A validation domain handle that is not registered in the workbook.
    #[error("Unknown validation domain: {0}")]
    UnknownDomain(u32),

    /// Invalid cell reference or coordinate.
    #[error("Invalid cell reference: {0}")]
    CellRef(String),

    /// A second regeneration was started while one is still in progress.
    #[error("A generation run is already in progress")]
    AlreadyRunning,

    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON (config, report, workbook model) error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// General parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnswerSheetError>;

impl AnswerSheetError {
    /// Whether the error was raised before the answer sheet was touched.
    ///
    /// Any other failure may leave the answer sheet cleared or partially
    /// rewritten; re-running the generator performs a full regeneration.
    #[must_use]
    pub fn is_pre_write(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::MissingSheet(_) | Self::AlreadyRunning
        )
    }
}

#[cfg(target_arch = "wasm32")]
impl From<AnswerSheetError> for wasm_bindgen::JsValue {
    fn from(e: AnswerSheetError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
