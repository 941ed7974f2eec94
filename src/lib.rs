pub mod csv_processor;
pub mod export;
pub mod state;
pub mod summary;
pub mod utils;

pub use csv_processor::{
    load_csv_file, parse_csv, serialize, split, split_table, Chunk, CsvSplitter, RowsPerFile,
    SerializeOptions, Table,
};
pub use export::{export_all, export_one, ExportedFile};
pub use state::{SessionState, Workbench};
pub use summary::{summarize_or_fallback, ConfiguredSummarizer, Summarizer, FALLBACK_MESSAGE};
pub use utils::{init_tracing, AppConfig, CsvSplitterError, Result};
