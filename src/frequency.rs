//! Frequency tabulation of categorical columns and expanded token sequences.

use color_eyre::Result;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Mapping from category label to occurrence count, plus the row bookkeeping needed to
/// express counts as percentages of the source table.
///
/// Labels are trimmed and compared exactly (no case folding). Counts are kept in a
/// `BTreeMap` so iteration order is deterministic (ascending label).
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrequencyTable {
    counts: BTreeMap<String, u64>,
    source_rows: usize,
    non_missing_rows: usize,
}

impl FrequencyTable {
    /// Tabulates an already-expanded token sequence from a multi-valued column.
    /// One row may contribute several tokens, so the occurrence total can exceed
    /// the row count.
    pub fn from_tokens(tokens: &[String], source_rows: usize, non_missing_rows: usize) -> Self {
        let mut counts = BTreeMap::new();
        for token in tokens {
            let label = token.trim();
            if label.is_empty() {
                continue;
            }
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
        Self {
            counts,
            source_rows,
            non_missing_rows,
        }
    }

    /// Tabulates a scalar categorical column. Null entries are excluded; every other
    /// value is rendered to its canonical string form and counted, so integer columns
    /// (e.g. years) tabulate the same way string columns do. An empty or all-null
    /// column yields an empty table without failing.
    pub fn from_scalar(series: &Series) -> Result<Self> {
        let mut counts = BTreeMap::new();
        let mut non_missing = 0usize;
        for idx in 0..series.len() {
            let value = series.get(idx)?;
            if matches!(value, AnyValue::Null) {
                continue;
            }
            non_missing += 1;
            let label = value.str_value().trim().to_string();
            if label.is_empty() {
                continue;
            }
            *counts.entry(label).or_insert(0) += 1;
        }
        Ok(Self {
            counts,
            source_rows: series.len(),
            non_missing_rows: non_missing,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct categories.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.counts.get(label).copied()
    }

    /// Total occurrences across all categories. For multi-valued fields this is at
    /// least the non-missing row count; for scalar fields it equals it.
    pub fn total_occurrences(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn source_rows(&self) -> usize {
        self.source_rows
    }

    pub fn non_missing_rows(&self) -> usize {
        self.non_missing_rows
    }

    pub fn missing_rows(&self) -> usize {
        self.source_rows - self.non_missing_rows
    }

    /// Count for each category as a fraction of source rows, in percent.
    pub fn share_of_rows(&self, count: u64) -> f64 {
        if self.source_rows == 0 {
            return 0.0;
        }
        count as f64 / self.source_rows as f64 * 100.0
    }

    /// Iterates (label, count) in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(label, &count)| (label.as_str(), count))
    }

    /// The sample the distribution engine works on: one count per category, in
    /// ascending label order.
    pub fn counts(&self) -> Vec<f64> {
        self.counts.values().map(|&c| c as f64).collect()
    }

    /// The `n` largest categories, descending by count, ties broken by ascending label.
    pub fn top(&self, n: usize) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> = self
            .counts
            .iter()
            .map(|(label, &count)| (label.clone(), count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }
}
