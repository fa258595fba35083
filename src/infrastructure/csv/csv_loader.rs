// ============================================================
// CSV LOADER
// ============================================================
// Parse uploaded CSV bytes into a Dataset, with BOM-aware decoding

use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

use crate::domain::csv::{CsvField, CsvRow, Dataset};
use crate::domain::error::{AppError, Result};

/// CSV loader for review uploads
pub struct CsvLoader {
    /// Delimiter character (default: comma)
    delimiter: u8,

    /// Reject datasets with more rows than this
    max_rows: Option<usize>,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self {
            delimiter: b',',
            max_rows: None,
        }
    }
}

impl CsvLoader {
    /// Create a new CSV loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set an upper bound on the number of data rows
    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Read a CSV file from disk and parse it
    pub fn load_path(&self, path: &Path) -> Result<Dataset> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        self.load(&bytes)
    }

    /// Parse raw CSV bytes
    pub fn load(&self, bytes: &[u8]) -> Result<Dataset> {
        let content = decode(bytes)?;

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::None)
            .flexible(true) // Short rows are padded below
            .from_reader(content.as_bytes());

        let raw_headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        if raw_headers.is_empty() {
            return Err(AppError::ParseError(
                "No columns to parse from file".to_string(),
            ));
        }

        let headers = disambiguate_headers(&raw_headers);
        let mut rows = Vec::new();

        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;

            if record.len() > headers.len() {
                let line = record
                    .position()
                    .map(|pos| pos.line())
                    .unwrap_or(index as u64 + 2);
                return Err(AppError::ParseError(format!(
                    "Error tokenizing data. Expected {} fields in line {}, saw {}",
                    headers.len(),
                    line,
                    record.len()
                )));
            }

            rows.push(parse_row(index, &headers, &record));
        }

        if let Some(max_rows) = self.max_rows {
            if rows.len() > max_rows {
                return Err(AppError::ValidationError(format!(
                    "CSV has {} rows, which exceeds the configured limit of {}",
                    rows.len(),
                    max_rows
                )));
            }
        }

        debug!(rows = rows.len(), columns = headers.len(), "Parsed CSV upload");

        Ok(Dataset::new(headers, rows))
    }
}

/// Decode bytes, honouring a UTF-8/UTF-16 byte-order mark. Anything else must be UTF-8.
fn decode(bytes: &[u8]) -> Result<String> {
    let (encoding, body): (&'static Encoding, &[u8]) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (UTF_8, bytes),
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(AppError::ParseError(format!(
            "CSV is not valid {}",
            encoding.name()
        )));
    }

    Ok(text.into_owned())
}

/// Repeated header names become `name`, `name.1`, `name.2`, ...
fn disambiguate_headers(raw: &StringRecord) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut headers: Vec<String> = Vec::with_capacity(raw.len());

    for name in raw.iter() {
        let mut candidate = name.to_string();
        while headers.contains(&candidate) {
            let counter = seen.entry(name.to_string()).or_insert(0);
            *counter += 1;
            candidate = format!("{}.{}", name, counter);
        }
        headers.push(candidate);
    }

    headers
}

fn parse_row(index: usize, headers: &[String], record: &StringRecord) -> CsvRow {
    let fields = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            CsvField::new(header.clone(), record.get(idx).unwrap_or("").to_string())
        })
        .collect();

    CsvRow::new(index, fields)
}
