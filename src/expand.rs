//! Expansion of delimiter-separated multi-valued columns into flat token sequences.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;

/// Splits every non-null value of a string column on `delimiter`, trims each token,
/// and drops tokens that are empty after trimming. Null entries contribute no tokens.
///
/// Token order is source row order, then within-row split order, so repeated runs over
/// the same column produce identical output.
///
/// The only error is a column whose dtype is not string-like; callers treat that as an
/// invalid field format for the column rather than a fatal condition.
pub fn expand_column(series: &Series, delimiter: char) -> Result<Vec<String>> {
    let values = series.str().map_err(|_| {
        eyre!(
            "column '{}' is not string-typed (found {}), cannot split into labels",
            series.name(),
            series.dtype()
        )
    })?;

    let mut tokens = Vec::new();
    for value in values.iter().flatten() {
        tokens.extend(split_value(value, delimiter));
    }
    Ok(tokens)
}

/// Splits a single raw value into trimmed, non-empty tokens.
pub fn split_value(value: &str, delimiter: char) -> Vec<String> {
    value
        .split(delimiter)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
