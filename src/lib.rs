//! answer-sheet - sectioned answer sheets generated from an issue list
//!
//! Turns an index sheet of records (issue key + summary) and a question
//! template into an answer sheet with one fixed-height section per record:
//! - Template questions, notes and validation domains stamped per section
//! - A deep link per index row pointing at its section
//! - A DONE/WIP status formula per required span
//! - Uniform presentation (fonts, fills, borders, alignment)
//!
//! Runs natively (see the `answer_sheet_cli` binary) or in the browser via
//! WebAssembly.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { generate_xlsx } from 'answer-sheet';
//! await init();
//! const out = generate_xlsx(bytes, JSON.stringify({ blueprint: "devQaSplit" }));
//! ```

// Model and storage
pub mod cell_ref;
pub mod error;
pub mod grid;
pub mod types;

// Generation
pub mod config;
pub mod formula;
pub mod generate;
pub mod index;
pub mod layout;
pub mod presentation;
pub mod records;
pub mod template;

// XLSX / CSV I/O
pub mod csv;
pub mod data_validation;
pub mod export;
pub mod parser;
pub mod xml_helpers;

use wasm_bindgen::prelude::*;

pub use config::GeneratorConfig;
pub use error::{AnswerSheetError, Result};
pub use generate::{GenerateReport, Generator};
pub use grid::GridAdapter;
pub use types::*;

/// Parse an XLSX workbook, regenerate its answer sheet and return the
/// updated workbook together with the run report.
///
/// # Errors
/// Any import, configuration, generation or export failure.
pub fn regenerate_xlsx(data: &[u8], config: GeneratorConfig) -> Result<(Vec<u8>, GenerateReport)> {
    let mut workbook = parser::parse(data)?;
    let report = Generator::new(config)?.run(&mut workbook)?;
    let bytes = export::write_xlsx(&workbook)?;
    Ok((bytes, report))
}

fn config_from_json(config_json: &str) -> Result<GeneratorConfig> {
    if config_json.trim().is_empty() {
        return Ok(GeneratorConfig::default());
    }
    GeneratorConfig::from_json(config_json)
}

/// Regenerate the answer sheet of an XLSX file and return the new XLSX bytes
///
/// # Arguments
/// * `data` - The raw bytes of the XLSX file
/// * `config_json` - Generator configuration as JSON; empty for defaults
///
/// # Errors
/// Returns an error if the file cannot be parsed, the configuration or
/// template is invalid, or the output cannot be written.
#[wasm_bindgen]
pub fn generate_xlsx(data: &[u8], config_json: &str) -> std::result::Result<Vec<u8>, JsValue> {
    console_error_panic_hook::set_once();
    let config = config_from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let (bytes, _report) =
        regenerate_xlsx(data, config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(bytes)
}

/// Run the generator on an XLSX file and return only the report as a `JsValue`
///
/// # Errors
/// Same failures as [`generate_xlsx`], plus report serialization errors.
#[wasm_bindgen]
pub fn generate_report(data: &[u8], config_json: &str) -> std::result::Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let config = config_from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let (_bytes, report) =
        regenerate_xlsx(data, config).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&report)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
