use crate::csv_processor::table::{base_name, Chunk, Table};
use crate::csv_processor::writer::{serialize_with_header, SerializeOptions};
use crate::utils::{CsvSplitterError, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use tracing::info;

/// Validated number of data rows per output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowsPerFile(NonZeroUsize);

impl RowsPerFile {
    pub fn new(rows: usize) -> Result<Self> {
        NonZeroUsize::new(rows).map(Self).ok_or_else(|| {
            CsvSplitterError::InvalidParameter("rows per file must be at least 1, got 0".into())
        })
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<i64> for RowsPerFile {
    type Error = CsvSplitterError;

    fn try_from(value: i64) -> Result<Self> {
        if value < 1 {
            return Err(CsvSplitterError::InvalidParameter(format!(
                "rows per file must be at least 1, got {}",
                value
            )));
        }
        let rows = usize::try_from(value).map_err(|_| {
            CsvSplitterError::InvalidParameter(format!("rows per file too large: {}", value))
        })?;
        Self::new(rows)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRange {
    pub index: usize,
    pub start_row: usize,
    pub end_row: usize,
}

impl ChunkRange {
    pub fn row_count(&self) -> usize {
        self.end_row - self.start_row
    }
}

pub struct CsvSplitter {
    rows_per_file: RowsPerFile,
    options: SerializeOptions,
}

impl CsvSplitter {
    pub fn new(rows_per_file: RowsPerFile) -> Self {
        Self {
            rows_per_file,
            options: SerializeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SerializeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn calculate_chunks(&self, total_rows: usize) -> Vec<ChunkRange> {
        let size = self.rows_per_file.get();
        let mut chunks = Vec::with_capacity(total_rows.div_ceil(size));
        let mut current_start = 0;
        let mut chunk_index = 0;

        while current_start < total_rows {
            let end_row = (current_start + size).min(total_rows);

            chunks.push(ChunkRange {
                index: chunk_index,
                start_row: current_start,
                end_row,
            });

            current_start = end_row;
            chunk_index += 1;
        }

        chunks
    }

    pub fn split(&self, table: &Table) -> Result<Vec<Chunk>> {
        let ranges = self.calculate_chunks(table.rows.len());
        let total_chunks = ranges.len();
        let base = base_name(&table.source_name);

        let chunks = ranges
            .iter()
            .map(|range| -> Result<Chunk> {
                let rows = &table.rows[range.start_row..range.end_row];
                let content = serialize_with_header(&table.header, rows, self.options)?;
                Ok(Chunk::new(
                    part_file_name(base, range.index + 1, total_chunks),
                    content,
                    rows.len(),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            source = %table.source_name,
            rows = table.rows.len(),
            rows_per_file = self.rows_per_file.get(),
            chunks = chunks.len(),
            "Split CSV"
        );

        Ok(chunks)
    }

    pub fn rows_per_file(&self) -> RowsPerFile {
        self.rows_per_file
    }
}

/// Splits with default serialization options.
pub fn split(table: &Table, rows_per_file: RowsPerFile) -> Result<Vec<Chunk>> {
    CsvSplitter::new(rows_per_file).split(table)
}

/// Entry point for unvalidated input: non-positive counts are rejected.
pub fn split_table(table: &Table, rows_per_file: i64) -> Result<Vec<Chunk>> {
    split(table, RowsPerFile::try_from(rows_per_file)?)
}

/// How many files a split would produce, for display before splitting.
pub fn estimate_chunk_count(total_rows: usize, rows_per_file: RowsPerFile) -> usize {
    total_rows.div_ceil(rows_per_file.get())
}

/// `{base}_part_{index}.csv`, index 1-based and padded to the digits of `total`.
pub fn part_file_name(base: &str, index: usize, total: usize) -> String {
    let width = total.to_string().len();
    format!("{}_part_{:0width$}.csv", base, index, width = width)
}
