use crate::domain::error::{AppError, Result};

/// Review-text column names, highest priority first.
pub const REVIEW_COLUMN_CANDIDATES: [&str; 4] = ["review", "review_text", "text", "comment"];

/// Picks the column that supplies review text.
///
/// Candidates are tried in [`REVIEW_COLUMN_CANDIDATES`] order, so a file with
/// both `text` and `review` resolves to `review` whatever the column order.
/// Matching is exact and case-sensitive.
pub fn resolve<S: AsRef<str>>(columns: &[S]) -> Result<String> {
    REVIEW_COLUMN_CANDIDATES
        .iter()
        .find(|candidate| columns.iter().any(|column| column.as_ref() == **candidate))
        .map(|candidate| candidate.to_string())
        .ok_or_else(|| AppError::ColumnNotFound {
            available: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        })
}
