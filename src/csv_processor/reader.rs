use crate::csv_processor::table::Table;
use crate::utils::{CsvSplitterError, Result};
use csv::StringRecord;
use std::path::Path;
use tracing::{debug, info};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const CSV_MIME_TYPES: &[&str] = &["text/csv", "application/csv", "application/vnd.ms-excel"];

/// Parses a whole CSV document held in memory.
///
/// Records made only of empty fields are dropped, the first remaining
/// record becomes the header and every later record must match its width.
/// A quoted field left open at end of input is an error.
pub fn parse_csv(content: &[u8], source_name: impl Into<String>) -> Result<Table> {
    let source_name = source_name.into();
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content);

    let mut records: Vec<(u64, StringRecord)> = Vec::new();
    let mut skipped = 0usize;
    let mut last_start = None;
    for result in reader.records() {
        let record = result?;
        last_start = record.position().cloned();
        if is_blank_record(&record) {
            skipped += 1;
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        records.push((line, record));
    }

    // The csv reader runs an open quote to end of input without complaint,
    // so only the final record can hide one.
    if let Some(start) = last_start {
        let tail = usize::try_from(start.byte())
            .ok()
            .and_then(|offset| content.get(offset..))
            .unwrap_or_default();
        if has_unterminated_quote(tail) {
            return Err(CsvSplitterError::Parse(format!(
                "unterminated quoted field in record starting on line {}",
                start.line()
            )));
        }
    }

    let mut iter = records.into_iter();
    let (_, header_record) = iter.next().ok_or(CsvSplitterError::EmptyInput)?;
    let header = string_record_to_vec(&header_record);

    let mut rows = Vec::with_capacity(iter.len());
    for (line, record) in iter {
        if record.len() != header.len() {
            return Err(CsvSplitterError::Parse(format!(
                "record on line {} has {} fields, expected {}",
                line,
                record.len(),
                header.len()
            )));
        }
        rows.push(string_record_to_vec(&record));
    }

    debug!(skipped_blank = skipped, "Dropped blank records");
    info!(
        source = %source_name,
        columns = header.len(),
        rows = rows.len(),
        "Parsed CSV"
    );

    Ok(Table::new(header, rows, source_name))
}

/// Reads and parses a CSV file, naming the table after the file.
pub async fn load_csv_file(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let content = tokio::fs::read(path).await?;
    let source_name = source_name_for(path);

    tokio::task::spawn_blocking(move || parse_csv(&content, source_name))
        .await
        .map_err(|e| CsvSplitterError::TaskFailed(e.to_string()))?
}

/// Whether an incoming file looks like CSV, by MIME type or extension.
pub fn is_csv_upload(file_name: &str, mime_type: Option<&str>) -> bool {
    let mime_ok = mime_type
        .map(|m| {
            let essence = m.split(';').next().unwrap_or("").trim();
            CSV_MIME_TYPES
                .iter()
                .any(|known| essence.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false);

    mime_ok || file_name.to_ascii_lowercase().ends_with(".csv")
}

/// Table name for a file on disk: its file name, or the whole path when it has none.
pub fn source_name_for(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn string_record_to_vec(record: &StringRecord) -> Vec<String> {
    record.iter().map(|s| s.to_string()).collect()
}

fn is_blank_record(record: &StringRecord) -> bool {
    record.iter().all(|field| field.is_empty())
}

#[derive(Clone, Copy, PartialEq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Whether `raw` ends inside a quoted field. Quotes only open a field at its
/// first byte; `""` inside a quoted field is an escaped quote.
fn has_unterminated_quote(raw: &[u8]) -> bool {
    use QuoteState::*;

    let mut state = FieldStart;
    for &byte in raw {
        state = match (state, byte) {
            (FieldStart, b'"') => Quoted,
            (FieldStart | Unquoted | QuoteInQuoted, b',' | b'\n' | b'\r') => FieldStart,
            (FieldStart | Unquoted, _) => Unquoted,
            (Quoted, b'"') => QuoteInQuoted,
            (Quoted, _) => Quoted,
            (QuoteInQuoted, b'"') => Quoted,
            (QuoteInQuoted, _) => Unquoted,
        };
    }
    state == Quoted
}
