pub mod use_cases;

pub use use_cases::review_analyzer::{NoProgress, ProgressSink, ReviewAnalyzer};
pub use use_cases::review_pipeline::{DatasetSummary, PipelineOutput, PreparedUpload, ReviewPipeline};
