//! CSV datasets.
//!
//! Format: UTF-8, comma-separated, one sample per row. A first row with any
//! non-numeric cell is treated as a header and skipped. Double-quoted fields
//! may contain commas.

use std::path::Path;

use crate::data::dataset::InMemoryDataset;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMode {
    /// Last column is an integer class index, one-hot encoded to `n_classes`.
    ClassIndex { n_classes: usize },
    /// Last `n_label_cols` columns are taken as the label vector verbatim.
    Columns { n_label_cols: usize },
}

/// Reads a CSV file into memory.
pub fn load_csv(path: impl AsRef<Path>, label_mode: LabelMode) -> Result<InMemoryDataset> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let (inputs, labels) = parse_csv(&text, label_mode)?;
    log::debug!("loaded {} samples from {}", inputs.len(), path.as_ref().display());
    InMemoryDataset::new(inputs, labels)
}

/// Parses CSV text into `(inputs, labels)` of equal length.
pub fn parse_csv(text: &str, label_mode: LabelMode) -> Result<(Vec<Vec<f64>>, Vec<Vec<f64>>)> {
    let mut lines = text.lines().peekable();
    if lines.peek().is_some_and(|first| is_header(first)) {
        lines.next();
    }

    let mut inputs: Vec<Vec<f64>> = Vec::new();
    let mut labels = Vec::new();

    for (row_idx, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = row_idx + 1;
        let cells = split_row(line);

        let n_label_cols = match label_mode {
            LabelMode::ClassIndex { .. } => 1,
            LabelMode::Columns { n_label_cols } => n_label_cols,
        };
        if cells.len() <= n_label_cols {
            return Err(Error::InvalidData(format!(
                "row {row}: expected at least {} columns, got {}",
                n_label_cols + 1,
                cells.len()
            )));
        }
        let split = cells.len() - n_label_cols;
        let features = parse_floats(&cells[..split], row)?;

        let label = match label_mode {
            LabelMode::ClassIndex { n_classes } => {
                let cell = cells[split].trim();
                let class: usize = cell.parse().map_err(|_| {
                    Error::InvalidData(format!("row {row}: class index '{cell}' is not a non-negative integer"))
                })?;
                if class >= n_classes {
                    return Err(Error::InvalidData(format!(
                        "row {row}: class index {class} >= n_classes {n_classes}"
                    )));
                }
                let mut one_hot = vec![0.0; n_classes];
                one_hot[class] = 1.0;
                one_hot
            }
            LabelMode::Columns { .. } => parse_floats(&cells[split..], row)?,
        };

        if let Some(first) = inputs.first() {
            if first.len() != features.len() {
                return Err(Error::InvalidData(format!(
                    "row {row}: {} features, first row has {}",
                    features.len(),
                    first.len()
                )));
            }
        }
        inputs.push(features);
        labels.push(label);
    }

    if inputs.is_empty() {
        return Err(Error::EmptyDataset);
    }
    Ok((inputs, labels))
}

fn is_header(line: &str) -> bool {
    split_row(line).iter().any(|c| {
        let t = c.trim();
        !t.is_empty() && t.parse::<f64>().is_err()
    })
}

/// Splits one row on commas, honouring double quotes (`""` is a literal quote).
pub(crate) fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn parse_floats(cells: &[String], row: usize) -> Result<Vec<f64>> {
    cells
        .iter()
        .map(|c| {
            c.trim()
                .parse::<f64>()
                .map_err(|_| Error::InvalidData(format!("row {row}: '{c}' is not a valid number")))
        })
        .collect()
}
