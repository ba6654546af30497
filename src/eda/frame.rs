// src/eda/frame.rs
//! In-memory column store for uploaded CSV datasets.
//!
//! Datasets are small enough to hold entirely in memory for the lifetime of a
//! session, so the frame keeps every cell as an optional string and parses
//! numbers on demand. Empty cells are missing values.

use std::collections::HashSet;
use thiserror::Error;

/// Distinct-value threshold below which a column is treated as categorical,
/// even when every value parses as a number.
pub const CATEGORICAL_UNIQUE_LIMIT: usize = 25;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("CSV input is empty")]
    Empty,

    #[error("CSV has a header but no data rows")]
    NoDataRows,

    #[error("CSV row could not be parsed: {0}")]
    MalformedRow(String),
}

/// Column-major dataframe backing the EDA endpoints.
#[derive(Debug, Clone)]
pub struct DataFrame {
    names: Vec<String>,
    columns: Vec<Vec<Option<String>>>,
    n_rows: usize,
}

/// Columns split by kind, in original dataset order.
#[derive(Debug, Clone, Default)]
pub struct ColumnClasses {
    pub continuous: Vec<String>,
    pub categorical: Vec<String>,
}

impl DataFrame {
    /// Parse raw upload bytes into a frame.
    ///
    /// Bytes are decoded as UTF-8 first, falling back to Latin-1 when the
    /// input is not valid UTF-8 (spreadsheet exports from older tools are
    /// frequently Latin-1 encoded).
    pub fn from_csv_bytes(data: &[u8]) -> Result<Self, FrameError> {
        let text = match std::str::from_utf8(data) {
            Ok(s) => s.to_string(),
            // Latin-1 maps every byte directly to the same code point.
            Err(_) => data.iter().map(|&b| b as char).collect(),
        };
        Self::from_csv_str(&text)
    }

    /// Parse CSV text. The first row is the header; header names are trimmed.
    /// Ragged rows are padded or truncated to the header width.
    pub fn from_csv_str(text: &str) -> Result<Self, FrameError> {
        let mut rows = parse_csv_rows(text)?;
        if rows.is_empty() {
            return Err(FrameError::Empty);
        }

        let names: Vec<String> = rows
            .remove(0)
            .into_iter()
            .map(|name| name.trim().to_string())
            .collect();

        if rows.is_empty() {
            return Err(FrameError::NoDataRows);
        }

        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
        let mut n_rows = 0usize;

        for mut cells in rows {
            cells.resize(names.len(), String::new());
            for (col, cell) in columns.iter_mut().zip(cells) {
                col.push(if cell.is_empty() { None } else { Some(cell) });
            }
            n_rows += 1;
        }

        Ok(Self {
            names,
            columns,
            n_rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Cell values for a named column, missing cells as `None`.
    pub fn column(&self, name: &str) -> Option<&[Option<String>]> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[idx])
    }

    /// Column values parsed as floats. Non-missing cells that fail to parse
    /// become missing, so callers working on continuous columns see every
    /// value (classification guarantees they all parse).
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let values = self.column(name)?;
        Some(
            values
                .iter()
                .map(|cell| cell.as_deref().and_then(|v| v.trim().parse::<f64>().ok()))
                .collect(),
        )
    }

    /// Number of rows that duplicate an earlier row, comparing cells as raw
    /// strings with missing cells equal to each other.
    pub fn duplicate_row_count(&self) -> usize {
        let mut seen: HashSet<Vec<Option<&str>>> = HashSet::with_capacity(self.n_rows);
        let mut duplicates = 0;
        for row in 0..self.n_rows {
            let key: Vec<Option<&str>> = self
                .columns
                .iter()
                .map(|col| col[row].as_deref())
                .collect();
            if !seen.insert(key) {
                duplicates += 1;
            }
        }
        duplicates
    }

    /// First `limit` rows in row-major order, for dataset previews.
    pub fn head(&self, limit: usize) -> Vec<Vec<Option<String>>> {
        (0..self.n_rows.min(limit))
            .map(|row| self.columns.iter().map(|col| col[row].clone()).collect())
            .collect()
    }

    /// Split columns into continuous and categorical.
    ///
    /// A column is categorical when its distinct-value count is at most
    /// [`CATEGORICAL_UNIQUE_LIMIT`] or when any non-missing cell is not
    /// numeric; everything else is continuous. Missing cells count as one
    /// distinct value and are ignored for the numeric check.
    pub fn classify_columns(&self) -> ColumnClasses {
        let mut classes = ColumnClasses::default();
        for (name, values) in self.names.iter().zip(&self.columns) {
            let mut distinct: HashSet<Option<&str>> = HashSet::new();
            let mut all_numeric = true;
            for cell in values {
                distinct.insert(cell.as_deref());
                if let Some(v) = cell.as_deref() {
                    if v.trim().parse::<f64>().is_err() {
                        all_numeric = false;
                    }
                }
            }
            if distinct.len() <= CATEGORICAL_UNIQUE_LIMIT || !all_numeric {
                classes.categorical.push(name.clone());
            } else {
                classes.continuous.push(name.clone());
            }
        }
        classes
    }
}

/// Split CSV text into rows of cells, honoring double-quoted fields and `""`
/// escapes. A newline inside quotes belongs to the cell, not the row
/// structure. Blank rows are skipped.
fn parse_csv_rows(text: &str) -> Result<Vec<Vec<String>>, FrameError> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut cells: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut row_preview = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if row_preview.len() < 32 && c != '\n' && c != '\r' {
            row_preview.push(c);
        }
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            ',' if !in_quotes => {
                cells.push(std::mem::take(&mut current));
            }
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                cells.push(std::mem::take(&mut current));
                flush_row(&mut rows, &mut cells);
                row_preview.clear();
            }
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(FrameError::MalformedRow(format!(
            "unterminated quote in row starting with '{}'",
            row_preview
        )));
    }

    if !cells.is_empty() || !current.is_empty() {
        cells.push(current);
        flush_row(&mut rows, &mut cells);
    }

    Ok(rows)
}

fn flush_row(rows: &mut Vec<Vec<String>>, cells: &mut Vec<String>) {
    if cells.len() == 1 && cells[0].trim().is_empty() {
        cells.clear();
    } else {
        rows.push(std::mem::take(cells));
    }
}
