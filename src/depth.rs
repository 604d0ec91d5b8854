//! Per-sequence read depth targets.

use crate::error::HarnessError;

/// Depth assigned to one reference sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceDepth {
    /// `relative_depth * base_depth`
    pub total: f64,
    /// `total / rotation_count`, handed to every simulator call
    pub per_rotation: f64,
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Parse a comma-delimited list such as `"1.0, 1.5,2"`.
pub fn parse_relative_depths(text: &str) -> Result<Vec<f64>, HarnessError> {
    text.split(',')
        .map(|tok| {
            let tok = tok.trim();
            match tok.parse::<f64>() {
                Ok(v) if positive(v) => Ok(v),
                _ => Err(HarnessError::config(format!(
                    "relative depth {tok:?} is not a positive number"
                ))),
            }
        })
        .collect()
}

/// Spread each sequence's total depth evenly over `rotation_count` simulator calls.
pub fn allocate(
    relative_depths: &[f64],
    sequence_count: usize,
    base_depth: f64,
    rotation_count: usize,
) -> Result<Vec<SequenceDepth>, HarnessError> {
    if relative_depths.len() != sequence_count {
        return Err(HarnessError::config(format!(
            "you must provide exactly one relative depth for each reference sequence \
             ({} depths given, {} sequences in reference)",
            relative_depths.len(),
            sequence_count
        )));
    }
    if rotation_count == 0 {
        return Err(HarnessError::config("rotation count must be at least 1"));
    }
    if !positive(base_depth) {
        return Err(HarnessError::config(format!(
            "base read depth must be a positive number, got {base_depth}"
        )));
    }
    Ok(relative_depths
        .iter()
        .map(|&rel| {
            let total = rel * base_depth;
            SequenceDepth { total, per_rotation: total / rotation_count as f64 }
        })
        .collect())
}
