// ============================================================
// CSV DOMAIN LAYER
// ============================================================
// Core tabular types for uploaded review files
// No I/O, no async

mod csv_row;

pub use csv_row::{CsvField, CsvRow, Dataset};
