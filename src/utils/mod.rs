pub mod config;
pub mod errors;
pub mod logging;

pub use config::{AppConfig, ExportConfig, LoggingConfig, SplitDefaults, SummaryConfig, SummaryProvider};
pub use errors::{CsvSplitterError, Result};
pub use logging::init_tracing;

/// Prefixes cells that a spreadsheet would evaluate as a formula.
pub fn sanitize_cell(value: &str) -> String {
    if value.starts_with('=')
        || value.starts_with('+')
        || value.starts_with('-')
        || value.starts_with('@')
    {
        format!("'{}", value)
    } else {
        value.to_string()
    }
}
