//! Session state for one interactive split workflow.
//!
//! A presentation layer owns a [`Workbench`] and calls into it from user
//! events. Heavy work (parse, split, archive) runs on the blocking pool and
//! the summary request runs without holding the state lock, so a split can
//! proceed while a summary is pending. Results that arrive after the table
//! was replaced or reset are dropped.

use crate::csv_processor::{
    estimate_chunk_count, parse_csv, source_name_for, Chunk, CsvSplitter, RowsPerFile,
    SerializeOptions, Table,
};
use crate::export::{self, archive_name_for, ExportedFile};
use crate::summary::{summarize_or_fallback, summary_sample, Summarizer};
use crate::utils::{AppConfig, CsvSplitterError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SessionState {
    pub table_id: Option<Uuid>,
    pub table: Option<Arc<Table>>,
    pub chunks: Arc<Vec<Chunk>>,
    pub rows_per_file: RowsPerFile,
    pub is_analyzing: bool,
    pub summary: Option<String>,
    /// Loads and splits currently running on the blocking pool.
    running_tasks: usize,
}

impl SessionState {
    pub fn new(rows_per_file: RowsPerFile) -> Self {
        Self {
            table_id: None,
            table: None,
            chunks: Arc::new(Vec::new()),
            rows_per_file,
            is_analyzing: false,
            summary: None,
            running_tasks: 0,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.running_tasks > 0
    }

    /// Output file count the current setting would produce.
    pub fn estimated_files(&self) -> Option<usize> {
        self.table
            .as_ref()
            .map(|t| estimate_chunk_count(t.row_count(), self.rows_per_file))
    }

    fn loaded(&self) -> Result<(Uuid, Arc<Table>)> {
        match (self.table_id, &self.table) {
            (Some(id), Some(table)) => Ok((id, Arc::clone(table))),
            _ => Err(CsvSplitterError::NoTableLoaded),
        }
    }

    fn clear_outputs(&mut self) {
        self.chunks = Arc::new(Vec::new());
        self.summary = None;
        self.is_analyzing = false;
    }

    fn begin_task(&mut self) {
        self.running_tasks += 1;
    }

    fn end_task(&mut self) {
        self.running_tasks = self.running_tasks.saturating_sub(1);
    }
}

pub struct Workbench<S> {
    state: Arc<RwLock<SessionState>>,
    summarizer: Arc<S>,
    config: Arc<AppConfig>,
}

impl<S> Clone for Workbench<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            summarizer: Arc::clone(&self.summarizer),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: Summarizer> Workbench<S> {
    pub fn new(config: AppConfig, summarizer: S) -> Result<Self> {
        let rows_per_file = RowsPerFile::new(config.split.default_rows_per_file)?;

        Ok(Self {
            state: Arc::new(RwLock::new(SessionState::new(rows_per_file))),
            summarizer: Arc::new(summarizer),
            config: Arc::new(config),
        })
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parses `content` as the new working table.
    ///
    /// Previous chunks and summary are cleared up front and the old table id
    /// is withdrawn while parsing, so splits and summaries still running
    /// against the old table cannot store their results. On failure the
    /// previously loaded table is reinstated.
    pub async fn load_bytes(&self, source_name: impl Into<String>, content: Vec<u8>) -> Result<Arc<Table>> {
        let source_name = source_name.into();
        let previous_id = {
            let mut state = self.state.write().await;
            state.begin_task();
            state.clear_outputs();
            state.table_id.take()
        };

        let parsed = tokio::task::spawn_blocking(move || parse_csv(&content, source_name))
            .await
            .map_err(|e| CsvSplitterError::TaskFailed(e.to_string()))
            .and_then(|r| r);

        let mut state = self.state.write().await;
        state.end_task();

        let table = match parsed {
            Ok(table) => Arc::new(table),
            Err(e) => {
                if state.table_id.is_none() && state.table.is_some() {
                    state.table_id = previous_id;
                }
                warn!(error = %e, "Failed to load CSV");
                return Err(e);
            }
        };

        let table_id = Uuid::new_v4();
        state.table_id = Some(table_id);
        state.table = Some(Arc::clone(&table));
        state.clear_outputs();

        info!(
            %table_id,
            source = %table.source_name,
            rows = table.row_count(),
            columns = table.column_count(),
            "Loaded table"
        );

        Ok(table)
    }

    pub async fn load_file(&self, path: impl AsRef<Path>) -> Result<Arc<Table>> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        self.load_bytes(source_name_for(path), content).await
    }

    /// Rejects non-positive values; the current setting is kept on error.
    pub async fn set_rows_per_file(&self, rows_per_file: i64) -> Result<RowsPerFile> {
        let validated = RowsPerFile::try_from(rows_per_file)?;
        self.state.write().await.rows_per_file = validated;
        Ok(validated)
    }

    pub async fn split(&self) -> Result<Arc<Vec<Chunk>>> {
        let (table_id, table, rows_per_file) = {
            let mut state = self.state.write().await;
            let (id, table) = state.loaded()?;
            state.begin_task();
            (id, table, state.rows_per_file)
        };

        let options = SerializeOptions {
            sanitize_formulas: self.config.split.sanitize_formulas,
        };

        let result = tokio::task::spawn_blocking(move || {
            CsvSplitter::new(rows_per_file)
                .with_options(options)
                .split(&table)
        })
        .await
        .map_err(|e| CsvSplitterError::TaskFailed(e.to_string()))
        .and_then(|r| r);

        let mut state = self.state.write().await;
        state.end_task();

        let chunks = Arc::new(result?);
        if state.table_id == Some(table_id) {
            state.chunks = Arc::clone(&chunks);
        } else {
            info!(%table_id, "Discarding split of a table that is no longer loaded");
        }

        Ok(chunks)
    }

    /// Requests a summary of the loaded table. Remote failures come back as
    /// the fixed fallback text, never as an error.
    pub async fn analyze(&self) -> Result<String> {
        let (table_id, header, sample) = {
            let mut state = self.state.write().await;
            let (id, table) = state.loaded()?;
            state.is_analyzing = true;
            let sample = summary_sample(&table, &self.config.summary).to_vec();
            (id, table.header.clone(), sample)
        };

        let summary = summarize_or_fallback(self.summarizer.as_ref(), &header, &sample).await;

        let mut state = self.state.write().await;
        if state.table_id == Some(table_id) {
            state.is_analyzing = false;
            state.summary = Some(summary.clone());
        } else {
            info!(%table_id, "Discarding summary of a table that is no longer loaded");
        }

        Ok(summary)
    }

    pub async fn export_chunk(&self, index: usize) -> Result<ExportedFile> {
        self.export_chunk_to(index, self.config.export.output_dir.clone())
            .await
    }

    pub async fn export_chunk_to(&self, index: usize, dir: impl Into<PathBuf>) -> Result<ExportedFile> {
        let chunks = Arc::clone(&self.state.read().await.chunks);
        let dir = dir.into();

        tokio::task::spawn_blocking(move || {
            let chunk = chunks.get(index).ok_or_else(|| {
                CsvSplitterError::InvalidParameter(format!(
                    "chunk index {} out of range ({} chunks)",
                    index,
                    chunks.len()
                ))
            })?;
            export::export_one(chunk, &dir)
        })
        .await
        .map_err(|e| CsvSplitterError::TaskFailed(e.to_string()))?
    }

    /// Bundles the current chunks; `archive_name` defaults to `{base}_split.zip`.
    pub async fn export_all(&self, archive_name: Option<&str>) -> Result<ExportedFile> {
        self.export_all_to(archive_name, self.config.export.output_dir.clone())
            .await
    }

    pub async fn export_all_to(
        &self,
        archive_name: Option<&str>,
        dir: impl Into<PathBuf>,
    ) -> Result<ExportedFile> {
        let (table, chunks) = {
            let state = self.state.read().await;
            let (_, table) = state.loaded()?;
            (table, Arc::clone(&state.chunks))
        };

        let name = archive_name
            .map(str::to_string)
            .unwrap_or_else(|| archive_name_for(&table.source_name));
        let dir = dir.into();

        tokio::task::spawn_blocking(move || export::export_all(&chunks, &name, &dir))
            .await
            .map_err(|e| CsvSplitterError::TaskFailed(e.to_string()))?
    }

    /// Drops the table, chunks and summary. The rows-per-file setting survives.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.table_id = None;
        state.table = None;
        state.clear_outputs();
        info!("Session reset");
    }
}
