pub mod column_resolver;
pub mod result_assembler;
pub mod review_analyzer;
pub mod review_pipeline;
