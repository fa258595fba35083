// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// CSV decoding and parsing for review uploads

mod csv_loader;

pub use csv_loader::CsvLoader;
