use crate::domain::csv::Dataset;
use crate::domain::error::{AppError, Result};
use crate::domain::prompt::build_review_prompt;
use crate::domain::review::{
    AnalysisResult, Progress, ResultTable, ReviewRow, PRODUCT_NAME_COLUMN, RATING_COLUMN,
};
use crate::infrastructure::llm_clients::LLMClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Receives `processed/total` after every row.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(Progress) + Send + Sync,
{
    fn report(&self, progress: Progress) {
        self(progress)
    }
}

/// Sink for callers that only want the final table.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: Progress) {}
}

/// Sends each review to the text-generation service, one at a time.
///
/// A failed call never stops the run: the row keeps its error text as its
/// analysis and the loop moves on. Every row, failed or not, is followed by
/// the same fixed pause.
pub struct ReviewAnalyzer {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    delay: Duration,
}

impl ReviewAnalyzer {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>, delay: Duration) -> Self {
        Self { llm_client, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Reads `ReviewRow`s out of the dataset. Fails before any service call if
    /// `product_name`, `rating` or the review column is absent.
    pub fn extract_rows(dataset: &Dataset, review_column: &str) -> Result<Vec<ReviewRow>> {
        for column in [PRODUCT_NAME_COLUMN, RATING_COLUMN, review_column] {
            if !dataset.has_column(column) {
                return Err(AppError::MissingColumn(column.to_string()));
            }
        }

        dataset
            .rows
            .iter()
            .map(|row| -> Result<ReviewRow> {
                let field = |column: &str| {
                    row.get(column)
                        .map(str::to_string)
                        .ok_or_else(|| AppError::MissingColumn(column.to_string()))
                };
                Ok(ReviewRow {
                    product_name: field(PRODUCT_NAME_COLUMN)?,
                    review_text: field(review_column)?,
                    rating: field(RATING_COLUMN)?,
                })
            })
            .collect()
    }

    /// Produces exactly one result per row, in input order.
    pub async fn analyze(&self, rows: Vec<ReviewRow>, progress: &dyn ProgressSink) -> ResultTable {
        let total = rows.len();
        let mut results = ResultTable::with_capacity(total);

        for (index, row) in rows.into_iter().enumerate() {
            let analysis = self.analyze_row(&row).await;
            results.push(AnalysisResult::from_row(row, analysis));

            let current = Progress::new(index + 1, total);
            progress.report(current);
            info!(processed = current.processed, total, "Processed review {}/{}", current.processed, total);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        results
    }

    /// Analysis text for one row: trimmed service output, or the error text.
    pub async fn analyze_row(&self, row: &ReviewRow) -> String {
        let prompt = build_review_prompt(&row.review_text, &row.rating);

        match self.llm_client.generate(&prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                warn!(product = %row.product_name, error = %err, "Review analysis failed");
                AnalysisResult::failure_text(&err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::review::ANALYSIS_ERROR_PREFIX;
    use crate::infrastructure::csv::CsvLoader;
    use crate::infrastructure::llm_clients::stub::ScriptedClient;
    use std::sync::Mutex;
    use std::time::Instant;

    const STUB_TEXT: &str =
        "1. Sentiment: Positive\n2. Key points: comfortable\n3. Recommendation: Yes";

    fn rows(count: usize) -> Vec<ReviewRow> {
        (0..count)
            .map(|i| ReviewRow {
                product_name: format!("Product {}", i),
                review_text: format!("Review {}", i),
                rating: (i % 5 + 1).to_string(),
            })
            .collect()
    }

    fn analyzer(client: Arc<ScriptedClient>) -> ReviewAnalyzer {
        ReviewAnalyzer::new(client, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_success_text_is_trimmed() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(format!("\n  {}  \n", STUB_TEXT))]));
        let table = analyzer(client).analyze(rows(1), &NoProgress).await;
        assert_eq!(table.rows()[0].analysis, STUB_TEXT);
    }

    #[tokio::test]
    async fn test_all_failures_still_yield_every_row_in_order() {
        let client = Arc::new(ScriptedClient::always_failing(4));
        let table = analyzer(client).analyze(rows(4), &NoProgress).await;

        assert_eq!(table.len(), 4);
        for (i, result) in table.rows().iter().enumerate() {
            assert_eq!(result.product_name, format!("Product {}", i));
            assert_eq!(result.review, format!("Review {}", i));
            assert!(result.analysis.starts_with(ANALYSIS_ERROR_PREFIX));
            assert!(result.analysis.contains("quota exceeded"));
        }
        assert_eq!(table.failed_count(), 4);
    }

    #[tokio::test]
    async fn test_failure_is_contained_to_its_row() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok("first".to_string()),
            Ok("second".to_string()),
            Err(AppError::LLMError("deadline exceeded".to_string())),
            Ok("fourth".to_string()),
        ]));
        let table = analyzer(client).analyze(rows(4), &NoProgress).await;
        let analyses: Vec<&str> = table.rows().iter().map(|r| r.analysis.as_str()).collect();

        assert_eq!(analyses[0], "first");
        assert_eq!(analyses[1], "second");
        assert_eq!(
            analyses[2],
            "Error: Could not analyze review. (LLM error: deadline exceeded)"
        );
        assert_eq!(analyses[3], "fourth");
    }

    #[tokio::test]
    async fn test_prompt_carries_review_and_rating() {
        let client = Arc::new(ScriptedClient::new(vec![Ok("ok".to_string())]));
        analyzer(client.clone()).analyze(rows(1), &NoProgress).await;

        let prompts = client.prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0], build_review_prompt("Review 0", "1"));
    }

    #[tokio::test]
    async fn test_progress_reported_after_each_row() {
        let seen = Mutex::new(Vec::new());
        let sink = |p: Progress| seen.lock().unwrap().push((p.processed, p.total));
        let client = Arc::new(ScriptedClient::always_failing(3));

        analyzer(client).analyze(rows(3), &sink).await;
        assert_eq!(*seen.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let client = Arc::new(ScriptedClient::new(Vec::new()));
        let table = analyzer(client.clone()).analyze(Vec::new(), &NoProgress).await;
        assert!(table.is_empty());
        assert!(client.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_delay_follows_every_row() {
        let client = Arc::new(ScriptedClient::always_failing(2));
        let analyzer = ReviewAnalyzer::new(client, Duration::from_millis(20));

        let started = Instant::now();
        analyzer.analyze(rows(2), &NoProgress).await;
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_extracted_rows_use_resolved_column() {
        let dataset = CsvLoader::new()
            .load(b"product_name,review_text,rating\nShoe A,Great fit,5\nShoe B,Too tight,2\n")
            .unwrap();
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(STUB_TEXT.to_string()),
            Err(AppError::LLMError("Request failed: operation timed out".to_string())),
        ]));

        let rows = ReviewAnalyzer::extract_rows(&dataset, "review_text").unwrap();
        let table = analyzer(client).analyze(rows, &NoProgress).await;

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].review, "Great fit");
        assert_eq!(table.rows()[0].analysis, STUB_TEXT);
        assert_eq!(table.rows()[1].rating, "2");
        assert!(table.rows()[1].analysis.starts_with(ANALYSIS_ERROR_PREFIX));
    }

    #[test]
    fn test_missing_rating_column() {
        let dataset = CsvLoader::new()
            .load(b"product_name,review\nShoe A,Great fit\n")
            .unwrap();

        let err = ReviewAnalyzer::extract_rows(&dataset, "review").unwrap_err();
        assert_eq!(err, AppError::MissingColumn("rating".to_string()));
    }

    #[test]
    fn test_missing_product_name_column() {
        let dataset = CsvLoader::new()
            .load(b"review,rating\nGreat fit,5\n")
            .unwrap();

        let err = ReviewAnalyzer::extract_rows(&dataset, "review").unwrap_err();
        assert_eq!(err, AppError::MissingColumn("product_name".to_string()));
        assert!(err.is_file_level());
    }
}
