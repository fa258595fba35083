// ============================================================
// REVIEW PIPELINE USE CASE
// ============================================================
// Loader -> Column Resolver -> Review Analyzer -> Result Assembler

use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use super::column_resolver;
use super::result_assembler;
use super::review_analyzer::{ProgressSink, ReviewAnalyzer};
use crate::domain::csv::Dataset;
use crate::domain::error::Result;
use crate::domain::review::{ResultTable, ReviewRow};
use crate::infrastructure::csv::CsvLoader;

const PREVIEW_ROWS: usize = 5;

/// What the user sees after uploading, before starting analysis
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub columns: Vec<String>,
    pub review_column: String,
    pub preview: Vec<Vec<(String, String)>>,
}

/// A loaded upload whose columns have all been checked. Building one never
/// calls the text-generation service.
pub struct PreparedUpload {
    pub dataset: Dataset,
    pub review_column: String,
    pub rows: Vec<ReviewRow>,
}

impl PreparedUpload {
    /// Resolves the review column and extracts rows, failing on any
    /// missing column.
    pub fn from_dataset(dataset: Dataset) -> Result<Self> {
        let review_column = column_resolver::resolve(dataset.columns())?;
        let rows = ReviewAnalyzer::extract_rows(&dataset, &review_column)?;

        info!(
            rows = rows.len(),
            review_column = %review_column,
            "Loaded {} reviews",
            rows.len()
        );

        Ok(Self {
            dataset,
            review_column,
            rows,
        })
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            row_count: self.dataset.row_count(),
            columns: self.dataset.columns().to_vec(),
            review_column: self.review_column.clone(),
            preview: self.dataset.preview(PREVIEW_ROWS),
        }
    }
}

/// Finished run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub results: ResultTable,
    pub csv: Vec<u8>,
    pub failed_rows: usize,
    pub elapsed_ms: u64,
}

pub struct ReviewPipeline {
    loader: CsvLoader,
    analyzer: ReviewAnalyzer,
}

impl ReviewPipeline {
    pub fn new(loader: CsvLoader, analyzer: ReviewAnalyzer) -> Self {
        Self { loader, analyzer }
    }

    /// Parse the upload and check its columns. No service calls.
    pub fn prepare(&self, bytes: &[u8]) -> Result<PreparedUpload> {
        PreparedUpload::from_dataset(self.loader.load(bytes)?)
    }

    pub fn prepare_path(&self, path: &Path) -> Result<PreparedUpload> {
        PreparedUpload::from_dataset(self.loader.load_path(path)?)
    }

    pub fn inspect(&self, bytes: &[u8]) -> Result<DatasetSummary> {
        Ok(self.prepare(bytes)?.summary())
    }

    /// Analyze a prepared upload and serialize the results.
    pub async fn execute(
        &self,
        upload: &PreparedUpload,
        progress: &dyn ProgressSink,
    ) -> Result<PipelineOutput> {
        let start = Instant::now();

        let results = self.analyzer.analyze(upload.rows.clone(), progress).await;
        let csv = result_assembler::assemble(results.rows())?;
        let failed_rows = results.failed_count();
        let elapsed_ms = start.elapsed().as_millis() as u64;

        info!(
            rows = results.len(),
            failed_rows,
            elapsed_ms,
            "Analysis completed"
        );

        Ok(PipelineOutput {
            results,
            csv,
            failed_rows,
            elapsed_ms,
        })
    }

    /// `prepare` then `execute`.
    pub async fn run(&self, bytes: &[u8], progress: &dyn ProgressSink) -> Result<PipelineOutput> {
        let upload = self.prepare(bytes)?;
        self.execute(&upload, progress).await
    }
}
