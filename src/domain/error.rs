use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    NotFound(String),
    ValidationError(String),
    ParseError(String),
    /// None of the review-text candidates is present in the dataset.
    ColumnNotFound { available: Vec<String> },
    /// A fixed column (`product_name`, `rating`) is absent from the dataset.
    MissingColumn(String),
    LLMError(String),
    ConfigError(String),
    SecurityError(String),
    IoError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::ColumnNotFound { available } => write!(
                f,
                "No review column found. Available columns: {:?}. Rename your CSV column to 'review' or 'review_text'.",
                available
            ),
            AppError::MissingColumn(name) => {
                write!(f, "Missing required column: '{}'", name)
            }
            AppError::LLMError(msg) => write!(f, "LLM error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::SecurityError(msg) => write!(f, "Security error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// File-level errors stop a run before any service call is made.
    pub fn is_file_level(&self) -> bool {
        matches!(
            self,
            AppError::ParseError(_)
                | AppError::ColumnNotFound { .. }
                | AppError::MissingColumn(_)
                | AppError::ValidationError(_)
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_not_found_lists_columns() {
        let err = AppError::ColumnNotFound {
            available: vec!["name".to_string(), "stars".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("\"name\""));
        assert!(message.contains("\"stars\""));
        assert!(err.is_file_level());
    }

    #[test]
    fn test_llm_error_is_row_level() {
        assert!(!AppError::LLMError("timeout".to_string()).is_file_level());
    }
}
