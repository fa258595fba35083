pub mod error;
pub mod llm_config;
pub mod prompt;
pub mod review;

// Uploaded CSV tables
pub mod csv;
