//! Per-field report assembly: expansion, tabulation, shape statistics, outlier
//! detection, and data-quality figures, composed into one serializable report.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::{AppConfig, FieldKind, FieldSpec};
use crate::expand::{expand_column, split_value};
use crate::frequency::FrequencyTable;
use crate::outliers::{detect, IqrFences, Outlier};
use crate::statistics::{summarize, AnalysisFlag, DistributionSummary};

/// Missing-value figures for one field, computed from the raw column.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MissingStats {
    pub missing: usize,
    pub total: usize,
    pub percent: f64,
}

impl MissingStats {
    fn new(missing: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            missing as f64 / total as f64 * 100.0
        };
        Self {
            missing,
            total,
            percent,
        }
    }

    /// Complement of `percent`; the two sum to 100 (within float rounding).
    pub fn percent_present(&self) -> f64 {
        100.0 - self.percent
    }
}

/// Content-type breakdown for one top category of a multi-valued field.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySplit {
    pub category: String,
    pub types: BTreeMap<String, u64>,
}

/// Everything the engine produced for a single field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    pub field: String,
    pub column: String,
    pub kind: FieldKind,
    pub frequency: FrequencyTable,
    pub top_values: Vec<(String, u64)>,
    pub distribution: Option<DistributionSummary>,
    pub fences: Option<IqrFences>,
    pub z_threshold: f64,
    pub outliers_iqr: Vec<Outlier>,
    pub outliers_zscore: Vec<Outlier>,
    pub missing: MissingStats,
    pub type_split: Option<Vec<CategorySplit>>,
    pub flags: Vec<AnalysisFlag>,
}

/// The full analysis report: one `FieldReport` per analyzed field, keyed by field
/// name. Created once per run and read-only afterward.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogReport {
    pub total_rows: usize,
    pub fields: BTreeMap<String, FieldReport>,
}

/// Holds the cleaned table and the per-field configuration for one analysis run.
/// Every invocation reads fresh inputs and returns fresh outputs; there is no state
/// carried between runs.
pub struct AnalysisContext {
    df: DataFrame,
    config: AppConfig,
}

impl AnalysisContext {
    pub fn new(df: DataFrame, config: AppConfig) -> Self {
        Self { df, config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Analyzes every configured field.
    pub fn analyze_all(&self) -> Result<CatalogReport> {
        let specs: Vec<&FieldSpec> = self.config.fields.iter().collect();
        self.analyze_specs(&specs)
    }

    /// Analyzes only the named fields; unknown names are an error.
    pub fn analyze_fields(&self, names: &[String]) -> Result<CatalogReport> {
        let mut specs = Vec::with_capacity(names.len());
        for name in names {
            let spec = self
                .config
                .field(name)
                .ok_or_else(|| eyre!("unknown field '{}' (not in configuration)", name))?;
            specs.push(spec);
        }
        self.analyze_specs(&specs)
    }

    fn analyze_specs(&self, specs: &[&FieldSpec]) -> Result<CatalogReport> {
        let mut fields = BTreeMap::new();
        for spec in specs {
            let report = self.analyze_field(spec)?;
            fields.insert(spec.name.clone(), report);
        }
        Ok(CatalogReport {
            total_rows: self.df.height(),
            fields,
        })
    }

    /// Runs the full pipeline for one field. Recoverable conditions (bad format,
    /// empty column, degenerate sample) are recorded as flags on the field report; a
    /// column missing from the table entirely is fatal and propagates.
    pub fn analyze_field(&self, spec: &FieldSpec) -> Result<FieldReport> {
        let column = self
            .df
            .column(&spec.column)
            .map_err(|_| eyre!("required column '{}' is missing from the table", spec.column))?;
        let series = column.as_materialized_series();

        let missing = MissingStats::new(series.null_count(), series.len());
        let z_threshold = self.config.z_threshold_for(spec);

        let table = match spec.kind {
            FieldKind::MultiValued => match expand_column(series, self.config.delimiter) {
                Ok(tokens) => FrequencyTable::from_tokens(
                    &tokens,
                    series.len(),
                    series.len() - series.null_count(),
                ),
                Err(_) => {
                    // Not string-like: report the field as malformed instead of
                    // failing the whole run.
                    return Ok(FieldReport {
                        field: spec.name.clone(),
                        column: spec.column.clone(),
                        kind: spec.kind,
                        frequency: FrequencyTable::default(),
                        top_values: Vec::new(),
                        distribution: None,
                        fences: None,
                        z_threshold,
                        outliers_iqr: Vec::new(),
                        outliers_zscore: Vec::new(),
                        missing,
                        type_split: None,
                        flags: vec![AnalysisFlag::InvalidFieldFormat],
                    });
                }
            },
            FieldKind::Scalar => FrequencyTable::from_scalar(series)?,
        };

        if table.is_empty() {
            return Ok(FieldReport {
                field: spec.name.clone(),
                column: spec.column.clone(),
                kind: spec.kind,
                frequency: table,
                top_values: Vec::new(),
                distribution: None,
                fences: None,
                z_threshold,
                outliers_iqr: Vec::new(),
                outliers_zscore: Vec::new(),
                missing,
                type_split: None,
                flags: vec![AnalysisFlag::InsufficientData],
            });
        }

        let summary = summarize(&table, self.config.normality_cap)?;
        let outliers = detect(&table, &summary, z_threshold);

        let mut flags = summary.flags.clone();
        for flag in &outliers.flags {
            if !flags.contains(flag) {
                flags.push(*flag);
            }
        }

        let top_values = table.top(self.config.top_n);
        let type_split = if spec.type_split && spec.kind == FieldKind::MultiValued {
            let top_labels: Vec<String> =
                top_values.iter().map(|(label, _)| label.clone()).collect();
            Some(self.type_split_for_top(spec, &top_labels)?)
        } else {
            None
        };

        Ok(FieldReport {
            field: spec.name.clone(),
            column: spec.column.clone(),
            kind: spec.kind,
            frequency: table,
            top_values,
            distribution: Some(summary),
            fences: Some(outliers.fences),
            z_threshold,
            outliers_iqr: outliers.iqr,
            outliers_zscore: outliers.zscore,
            missing,
            type_split,
            flags,
        })
    }

    /// For each top category of a multi-valued field, tabulates the content-type
    /// column over the rows whose expanded token set contains that category. Bounded
    /// reuse of the tabulator, not a separate algorithm: membership is exact token
    /// equality, not substring matching.
    fn type_split_for_top(
        &self,
        spec: &FieldSpec,
        categories: &[String],
    ) -> Result<Vec<CategorySplit>> {
        let multi = self
            .df
            .column(&spec.column)?
            .as_materialized_series()
            .clone();
        let multi = multi.str()?;
        let type_column = self
            .df
            .column(&self.config.type_column)
            .map_err(|_| {
                eyre!(
                    "required column '{}' is missing from the table",
                    self.config.type_column
                )
            })?
            .as_materialized_series();

        let mut splits: BTreeMap<&str, BTreeMap<String, u64>> = BTreeMap::new();
        for category in categories {
            splits.insert(category, BTreeMap::new());
        }

        for (idx, raw) in multi.iter().enumerate() {
            let Some(raw) = raw else { continue };
            let type_value = type_column.get(idx)?;
            if matches!(type_value, AnyValue::Null) {
                continue;
            }
            let type_label = type_value.str_value().trim().to_string();
            let tokens = split_value(raw, self.config.delimiter);
            for token in &tokens {
                if let Some(counts) = splits.get_mut(token.as_str()) {
                    *counts.entry(type_label.clone()).or_insert(0) += 1;
                }
            }
        }

        // Preserve the dominance order of `categories`, not map order.
        Ok(categories
            .iter()
            .map(|category| CategorySplit {
                category: category.clone(),
                types: splits.remove(category.as_str()).unwrap_or_default(),
            })
            .collect())
    }
}
