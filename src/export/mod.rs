//! Export functionality for analysis
//!
//! Currently supports CSV export of per-policy EFE decompositions.

mod efe_csv;

pub use efe_csv::{EfeCsvExporter, EfeExportRecord};
