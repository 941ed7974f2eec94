pub mod analyzer;
pub mod chunker;
pub mod reader;
pub mod table;
pub mod writer;

pub use analyzer::{bounded_sample, estimate_tokens, preview_text};
pub use chunker::{
    estimate_chunk_count, part_file_name, split, split_table, ChunkRange, CsvSplitter, RowsPerFile,
};
pub use reader::{is_csv_upload, load_csv_file, parse_csv, source_name_for};
pub use table::{base_name, Chunk, Table};
pub use writer::{serialize, serialize_with, serialize_with_header, CsvStringWriter, SerializeOptions};
