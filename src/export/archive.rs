use crate::csv_processor::{base_name, Chunk};
use crate::utils::{CsvSplitterError, Result};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

/// Builds a ZIP archive in memory with one entry per chunk, in chunk order.
pub fn build_archive(chunks: &[Chunk]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for chunk in chunks {
            zip.start_file(chunk.name.as_str(), options)?;
            zip.write_all(chunk.content.as_bytes())
                .map_err(|e| CsvSplitterError::Export(format!("Failed to add {}: {}", chunk.name, e)))?;
        }
        zip.finish()?;
    }
    Ok(buf)
}

/// Appends `.zip` unless the name already ends with it.
pub fn normalize_archive_name(name: &str) -> String {
    if name.ends_with(".zip") {
        name.to_string()
    } else {
        format!("{}.zip", name)
    }
}

/// Conventional archive name for a source file: `{base}_split.zip`.
pub fn archive_name_for(source_name: &str) -> String {
    format!("{}_split.zip", base_name(source_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn chunk(name: &str, content: &str) -> Chunk {
        Chunk::new(name.to_string(), content.to_string(), 1)
    }

    #[test]
    fn archive_entries_match_chunk_content() {
        let chunks = vec![
            chunk("d_part_1.csv", "id\r\n1\r\n"),
            chunk("d_part_2.csv", "id\r\n2\r\n"),
        ];
        let bytes = build_archive(&chunks).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        for (i, expected) in chunks.iter().enumerate() {
            let mut entry = archive.by_index(i).unwrap();
            assert_eq!(entry.name(), expected.name);
            let mut content = String::new();
            entry.read_to_string(&mut content).unwrap();
            assert_eq!(content, expected.content);
        }
    }

    #[test]
    fn empty_chunk_list_gives_valid_empty_archive() {
        let bytes = build_archive(&[]).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn zip_suffix_is_added_once() {
        assert_eq!(normalize_archive_name("data_split"), "data_split.zip");
        assert_eq!(normalize_archive_name("data_split.zip"), "data_split.zip");
        assert_eq!(archive_name_for("sales.csv"), "sales_split.zip");
        assert_eq!(archive_name_for("sales"), "sales_split.zip");
    }
}
