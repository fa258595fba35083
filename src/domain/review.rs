use serde::{Deserialize, Serialize};

/// Fixed column supplying the product name.
pub const PRODUCT_NAME_COLUMN: &str = "product_name";
/// Fixed column supplying the rating.
pub const RATING_COLUMN: &str = "rating";

/// Prefix written into `analysis` when the service call for a row fails.
pub const ANALYSIS_ERROR_PREFIX: &str = "Error: Could not analyze review.";

/// One review as read from the uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRow {
    pub product_name: String,
    pub review_text: String,
    /// Raw cell text; may be numeric ("5") or textual ("five stars").
    pub rating: String,
}

/// Enriched output row. Created once per [`ReviewRow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub product_name: String,
    pub review: String,
    pub rating: String,
    pub analysis: String,
}

impl AnalysisResult {
    pub fn from_row(row: ReviewRow, analysis: String) -> Self {
        Self {
            product_name: row.product_name,
            review: row.review_text,
            rating: row.rating,
            analysis,
        }
    }

    /// Analysis text for a row whose service call failed.
    pub fn failure_text(detail: &str) -> String {
        format!("{} ({})", ANALYSIS_ERROR_PREFIX, detail)
    }

    pub fn is_failure(&self) -> bool {
        self.analysis.starts_with(ANALYSIS_ERROR_PREFIX)
    }
}

/// Results in input row order. Append-only while a run is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<AnalysisResult>,
}

impl ResultTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, result: AnalysisResult) {
        self.rows.push(result);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[AnalysisResult] {
        &self.rows
    }

    pub fn failed_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_failure()).count()
    }
}

impl From<Vec<AnalysisResult>> for ResultTable {
    fn from(rows: Vec<AnalysisResult>) -> Self {
        Self { rows }
    }
}

/// Rows processed so far out of the run total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(processed: usize, total: usize) -> Self {
        Self { processed, total }
    }

    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_text_format() {
        let text = AnalysisResult::failure_text("deadline exceeded");
        assert_eq!(
            text,
            "Error: Could not analyze review. (deadline exceeded)"
        );
    }

    #[test]
    fn test_failed_count() {
        let ok = AnalysisResult {
            product_name: "A".to_string(),
            review: "good".to_string(),
            rating: "5".to_string(),
            analysis: "1. Sentiment: Positive".to_string(),
        };
        let failed = AnalysisResult {
            analysis: AnalysisResult::failure_text("quota"),
            ..ok.clone()
        };
        let table = ResultTable::from(vec![ok, failed]);
        assert_eq!(table.failed_count(), 1);
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(Progress::new(1, 4).fraction(), 0.25);
        assert_eq!(Progress::new(0, 0).fraction(), 1.0);
        assert!(Progress::new(2, 2).is_complete());
    }
}
