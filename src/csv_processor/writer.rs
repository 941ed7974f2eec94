use crate::utils::{sanitize_cell, CsvSplitterError, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};

#[derive(Debug, Clone, Copy, Default)]
pub struct SerializeOptions {
    /// Prefix formula-like cells with `'`. Breaks exact round-tripping.
    pub sanitize_formulas: bool,
}

/// Serializes records as CSV with `\r\n` terminators, quoting only where needed.
pub fn serialize(records: &[Vec<String>]) -> Result<String> {
    serialize_with(records, SerializeOptions::default())
}

pub fn serialize_with(records: &[Vec<String>], options: SerializeOptions) -> Result<String> {
    let mut writer = CsvStringWriter::new(options);
    writer.write_rows(records)?;
    writer.finish()
}

/// Writes a header followed by rows, without cloning either into one buffer.
pub fn serialize_with_header(
    header: &[String],
    rows: &[Vec<String>],
    options: SerializeOptions,
) -> Result<String> {
    let mut writer = CsvStringWriter::new(options);
    writer.write_row(header)?;
    writer.write_rows(rows)?;
    writer.finish()
}

pub struct CsvStringWriter {
    writer: csv::Writer<Vec<u8>>,
    options: SerializeOptions,
}

impl CsvStringWriter {
    pub fn new(options: SerializeOptions) -> Self {
        let writer = WriterBuilder::new()
            .flexible(true)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::CRLF)
            .from_writer(Vec::new());

        Self { writer, options }
    }

    pub fn write_row(&mut self, row: &[String]) -> Result<()> {
        if self.options.sanitize_formulas {
            let sanitized: Vec<String> = row.iter().map(|s| sanitize_cell(s)).collect();
            self.writer.write_record(&sanitized)?;
        } else {
            self.writer.write_record(row)?;
        }
        Ok(())
    }

    pub fn write_rows(&mut self, rows: &[Vec<String>]) -> Result<()> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    pub fn finish(self) -> Result<String> {
        let bytes = self
            .writer
            .into_inner()
            .map_err(|e| CsvSplitterError::Io(std::io::Error::other(e.to_string())))?;
        // Input fields are `String`s, so the output is always valid UTF-8.
        String::from_utf8(bytes).map_err(|e| CsvSplitterError::Parse(e.to_string()))
    }
}
