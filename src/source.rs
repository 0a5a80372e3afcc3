//! Loading the cleaned catalog CSV and validating its structure.
//!
//! Cleaning itself (imputation, date parsing, row drops) happens upstream; this module
//! only materializes the table and enforces the structural precondition that every
//! configured column exists.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;

use crate::config::AppConfig;

/// Reads the cleaned catalog into a `DataFrame` and validates required columns.
pub fn load_catalog(path: &Path, config: &AppConfig) -> Result<DataFrame> {
    let pl_path = PlPath::Local(Arc::from(path));
    let df = LazyCsvReader::new(pl_path)
        .with_has_header(true)
        .finish()?
        .collect()?;
    validate_columns(&df, config)?;
    Ok(df)
}

/// Fatal when any configured column (or the type-split column) is absent; no partial
/// analysis is meaningful without them.
pub fn validate_columns(df: &DataFrame, config: &AppConfig) -> Result<()> {
    let mut required: Vec<&str> = config.fields.iter().map(|f| f.column.as_str()).collect();
    required.push(config.type_column.as_str());
    required.sort_unstable();
    required.dedup();

    let missing: Vec<&str> = required
        .into_iter()
        .filter(|name| df.column(name).is_err())
        .collect();
    if !missing.is_empty() {
        return Err(eyre!(
            "input table is missing required column(s): {}",
            missing.join(", ")
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_passes_for_complete_table() -> Result<()> {
        let config = AppConfig::default();
        let columns: Vec<Column> = config
            .fields
            .iter()
            .map(|f| Series::new(f.column.as_str().into(), &["x"]).into())
            .collect();
        let df = DataFrame::new(columns)?;
        validate_columns(&df, &config)?;
        Ok(())
    }

    #[test]
    fn validation_names_missing_columns() -> Result<()> {
        let config = AppConfig::default();
        let df = DataFrame::new(vec![
            Series::new("type".into(), &["Movie"]).into(),
            Series::new("rating".into(), &["PG"]).into(),
        ])?;
        let err = validate_columns(&df, &config).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("listed_in"));
        assert!(msg.contains("country"));
        Ok(())
    }
}
