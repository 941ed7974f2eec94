use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsvSplitterError {
    #[error("CSV parse error: {0}")]
    Parse(String),

    #[error("CSV is empty")]
    EmptyInput,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Remote service error: {0}")]
    RemoteService(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("No CSV file loaded")]
    NoTableLoaded,

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<csv::Error> for CsvSplitterError {
    fn from(err: csv::Error) -> Self {
        CsvSplitterError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for CsvSplitterError {
    fn from(err: reqwest::Error) -> Self {
        CsvSplitterError::RemoteService(err.to_string())
    }
}

impl From<zip::result::ZipError> for CsvSplitterError {
    fn from(err: zip::result::ZipError) -> Self {
        CsvSplitterError::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CsvSplitterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_errors_become_parse_errors() {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(&b"a,\xff\n"[..]);
        let err = reader
            .records()
            .next()
            .and_then(|r| r.err())
            .expect("invalid utf-8 should fail");

        let converted: CsvSplitterError = err.into();
        assert!(matches!(converted, CsvSplitterError::Parse(_)));
    }

    #[test]
    fn empty_input_message_matches_user_alert() {
        assert_eq!(CsvSplitterError::EmptyInput.to_string(), "CSV is empty");
    }
}
