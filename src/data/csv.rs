//! MNIST CSV reading.
//!
//! Supported format:
//! - UTF-8, comma-separated, one image per row
//! - first column is the class label, followed by `input_size` raw pixel
//!   intensities in [0, 255]
//! - optional header row (auto-detected: the first row is a header if it
//!   contains any non-numeric, non-empty cell)
//! - blank lines are ignored
//!
//! Pixels are scaled with `scale_pixel` and labels one-hot encoded with
//! `one_hot`, so every returned `Sample` is ready for `Network::train`.

use std::path::Path;

use tracing::debug;

use crate::data::encode::{one_hot, scale_pixel, MAX_PIXEL};
use crate::data::Sample;
use crate::error::{NetError, Result};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reads and parses an MNIST CSV file.
pub fn read_csv<P: AsRef<Path>>(path: P, input_size: usize, classes: usize) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let samples = parse_csv(&text, input_size, classes)?;
    debug!(path = %path.display(), samples = samples.len(), "read dataset");
    Ok(samples)
}

/// Parses MNIST CSV text into samples.
///
/// Row numbers in errors are 1-based line numbers of the input text.
pub fn parse_csv(text: &str, input_size: usize, classes: usize) -> Result<Vec<Sample>> {
    let mut lines = text.lines().enumerate().peekable();

    // Auto-detect header: skip first line if any cell is non-numeric.
    if let Some((_, first)) = lines.peek() {
        if is_header(first) {
            lines.next();
        }
    }

    let mut samples = Vec::new();

    for (idx, line) in lines {
        let row = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        if cells.len() != input_size + 1 {
            return Err(NetError::Dataset {
                row,
                reason: format!(
                    "expected {} columns (label + {} pixels), got {}",
                    input_size + 1,
                    input_size,
                    cells.len()
                ),
            });
        }

        let label = parse_label(cells[0], classes, row)?;
        let input = cells[1..]
            .iter()
            .map(|cell| parse_pixel(cell, row).map(scale_pixel))
            .collect::<Result<Vec<f64>>>()?;
        let target = one_hot(label, classes)?;

        samples.push(Sample { label, input, target });
    }

    Ok(samples)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Returns `true` if the row looks like a header (any cell non-numeric).
fn is_header(line: &str) -> bool {
    line.split(',').any(|c| {
        let t = c.trim();
        !t.is_empty() && t.parse::<f64>().is_err()
    })
}

fn parse_label(cell: &str, classes: usize, row: usize) -> Result<usize> {
    let label: usize = cell.parse().map_err(|_| NetError::Dataset {
        row,
        reason: format!("label '{cell}' is not a non-negative integer"),
    })?;
    if label >= classes {
        return Err(NetError::Dataset {
            row,
            reason: format!("label {label} >= number of classes {classes}"),
        });
    }
    Ok(label)
}

fn parse_pixel(cell: &str, row: usize) -> Result<f64> {
    let value: f64 = cell.parse().map_err(|_| NetError::Dataset {
        row,
        reason: format!("'{cell}' is not a valid number"),
    })?;
    if !(0.0..=MAX_PIXEL).contains(&value) {
        return Err(NetError::Dataset {
            row,
            reason: format!("pixel value {value} outside [0, {MAX_PIXEL}]"),
        });
    }
    Ok(value)
}
