//! Data types for answer-sheet generation.

mod cell;
mod content;
mod record;
mod schema;
mod style;
mod workbook;

pub use cell::*;
pub use content::*;
pub use record::*;
pub use schema::*;
pub use style::*;
pub use workbook::*;
