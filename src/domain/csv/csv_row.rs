// ============================================================
// CSV ROW TYPES
// ============================================================
// Data structures representing parsed CSV content

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single field in a CSV row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvField {
    /// Header the value sits under
    pub name: String,

    /// Raw cell value, untrimmed
    pub value: String,
}

impl CsvField {
    pub fn new(name: String, value: String) -> Self {
        Self { name, value }
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// A single row in a CSV file
#[derive(Debug, Clone)]
pub struct CsvRow {
    /// Row index (0-based, header excluded)
    pub index: usize,

    /// All fields in header order
    pub fields: Vec<CsvField>,

    /// Header name -> position in `fields`
    field_map: HashMap<String, usize>,
}

impl CsvRow {
    pub fn new(index: usize, fields: Vec<CsvField>) -> Self {
        let field_map = fields
            .iter()
            .enumerate()
            .map(|(position, field)| (field.name.clone(), position))
            .collect();

        Self {
            index,
            fields,
            field_map,
        }
    }

    /// Value under `column`, if the column exists
    pub fn get(&self, column: &str) -> Option<&str> {
        self.field_map
            .get(column)
            .and_then(|&position| self.fields.get(position))
            .map(|field| field.value.as_str())
    }

    /// Ordered `(header, value)` pairs, used for previews
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.value.clone()))
            .collect()
    }
}

/// Tabular dataset loaded from an uploaded CSV
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Column names in file order
    pub headers: Vec<String>,

    /// Data rows in file order
    pub rows: Vec<CsvRow>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<CsvRow>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|header| header == column)
    }

    /// First `limit` rows as ordered `(header, value)` pairs
    pub fn preview(&self, limit: usize) -> Vec<Vec<(String, String)>> {
        self.rows.iter().take(limit).map(CsvRow::to_pairs).collect()
    }
}
