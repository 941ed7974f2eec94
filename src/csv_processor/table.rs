use serde::{Deserialize, Serialize};

/// A parsed CSV document: header record plus data rows.
///
/// Every row carries exactly `header.len()` fields; the parser rejects
/// anything else, so downstream code does not re-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub source_name: String,
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>, source_name: impl Into<String>) -> Self {
        Self {
            header,
            rows,
            source_name: source_name.into(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `n` data rows, used for previews and summary prompts.
    pub fn sample_rows(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Source name with one trailing `.csv` removed.
    pub fn base_name(&self) -> &str {
        base_name(&self.source_name)
    }
}

/// One serialized output file produced by a split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub name: String,
    pub content: String,
    /// Data rows only; the header record is not counted.
    pub row_count: usize,
    pub size_bytes: usize,
}

impl Chunk {
    pub fn new(name: String, content: String, row_count: usize) -> Self {
        let size_bytes = content.len();
        Self {
            name,
            content,
            row_count,
            size_bytes,
        }
    }
}

pub fn base_name(source_name: &str) -> &str {
    source_name.strip_suffix(".csv").unwrap_or(source_name)
}
