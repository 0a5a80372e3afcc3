//! Distribution shape statistics over the counts of a frequency table.
//!
//! The sample a summary describes is the multiset of counts, one scalar per distinct
//! category. Summaries are immutable snapshots; nothing is recomputed implicitly, so a
//! caller holding a changed table must summarize again.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::frequency::FrequencyTable;

/// Statistics that can be individually skipped when the sample is too small.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Skewness,
    Kurtosis,
    Normality,
}

/// Recoverable per-field conditions. These are data carried in results, not errors:
/// one field's condition never aborts the rest of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisFlag {
    /// A supposedly multi-valued column holds non-string values.
    InvalidFieldFormat,
    /// Tabulation produced zero categories.
    InsufficientData,
    /// Fewer categories than the named statistic requires; that statistic is skipped.
    InsufficientSampleSize(Statistic),
    /// Zero-variance sample. Disables the z-score outlier method, not IQR fencing.
    DegenerateSample,
}

impl fmt::Display for AnalysisFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisFlag::InvalidFieldFormat => write!(f, "invalid field format"),
            AnalysisFlag::InsufficientData => write!(f, "insufficient data"),
            AnalysisFlag::InsufficientSampleSize(s) => {
                let name = match s {
                    Statistic::Skewness => "skewness",
                    Statistic::Kurtosis => "kurtosis",
                    Statistic::Normality => "normality",
                };
                write!(f, "insufficient sample size for {}", name)
            }
            AnalysisFlag::DegenerateSample => write!(f, "degenerate sample (zero variance)"),
        }
    }
}

/// Result of the Shapiro-Wilk-style normality check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NormalityTest {
    pub statistic: f64,
    pub p_value: f64,
    /// Counts actually tested, after any cap truncation.
    pub sample_size: usize,
    /// True when the sample was truncated to the cap. Truncation takes the first
    /// `normality_cap` counts in table order: deterministic, but not a representative
    /// sample of very high-cardinality fields.
    pub truncated: bool,
}

/// Immutable snapshot of the shape of a frequency table's counts.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionSummary {
    /// Number of distinct categories (the sample size).
    pub categories: usize,
    pub sum: u64,
    pub mean: f64,
    pub median: f64,
    pub min: u64,
    pub max: u64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    /// Sample standard deviation (n−1). Reported as 0.0 when n==1, with a
    /// `DegenerateSample` flag.
    pub std: f64,
    /// Fisher-Pearson adjusted skewness; `None` when n<3 or the sample is degenerate.
    pub skewness: Option<f64>,
    /// Adjusted excess kurtosis (kurtosis − 3); `None` when n<4 or degenerate.
    pub kurtosis: Option<f64>,
    pub normality: Option<NormalityTest>,
    pub flags: Vec<AnalysisFlag>,
}

/// Minimum categories before the normality test is attempted.
pub const NORMALITY_MIN_SAMPLE: usize = 4;

/// Computes a distribution summary over the table's counts.
///
/// `normality_cap` bounds the normality test's sample; larger tables are truncated to
/// their first `normality_cap` counts in deterministic table order. An empty table is
/// an error; callers surface it as `InsufficientData` for the field.
pub fn summarize(table: &FrequencyTable, normality_cap: usize) -> Result<DistributionSummary> {
    let counts = table.counts();
    if counts.is_empty() {
        return Err(eyre!("cannot summarize an empty frequency table"));
    }

    let n = counts.len();
    let mut sorted = counts.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let sum: f64 = sorted.iter().sum();
    let mean = sum / n as f64;
    let q1 = quantile_linear(&sorted, 0.25);
    let median = quantile_linear(&sorted, 0.5);
    let q3 = quantile_linear(&sorted, 0.75);

    let mut flags = Vec::new();
    let std = if n < 2 {
        flags.push(AnalysisFlag::DegenerateSample);
        0.0
    } else {
        let variance: f64 =
            sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let std = variance.sqrt();
        if std == 0.0 {
            flags.push(AnalysisFlag::DegenerateSample);
        }
        std
    };

    let skewness = if n < 3 {
        flags.push(AnalysisFlag::InsufficientSampleSize(Statistic::Skewness));
        None
    } else if std == 0.0 {
        None
    } else {
        Some(adjusted_skewness(&sorted, mean, std))
    };

    let kurtosis = if n < 4 {
        flags.push(AnalysisFlag::InsufficientSampleSize(Statistic::Kurtosis));
        None
    } else if std == 0.0 {
        None
    } else {
        Some(adjusted_excess_kurtosis(&sorted, mean, std))
    };

    let normality = if n < NORMALITY_MIN_SAMPLE {
        flags.push(AnalysisFlag::InsufficientSampleSize(Statistic::Normality));
        None
    } else if std == 0.0 {
        None
    } else {
        // Cap truncation mirrors the upstream behavior: first-k in table order, not a
        // random sample, so the result is reproducible but skewed for huge tables.
        let truncated = counts.len() > normality_cap;
        let sample = if truncated {
            &counts[..normality_cap]
        } else {
            &counts[..]
        };
        shapiro_wilk(sample).map(|(statistic, p_value)| NormalityTest {
            statistic,
            p_value,
            sample_size: sample.len(),
            truncated,
        })
    };

    Ok(DistributionSummary {
        categories: n,
        sum: sum as u64,
        mean,
        median,
        min: sorted[0] as u64,
        max: sorted[n - 1] as u64,
        q1,
        q3,
        iqr: q3 - q1,
        std,
        skewness,
        kurtosis,
        normality,
        flags,
    })
}

/// Quantile by linear interpolation between order statistics at position `p·(n−1)`.
/// Matches the conventional "linear" method, so IQR fences reproduce across runs and
/// implementations. `sorted` must be ascending and non-empty.
pub fn quantile_linear(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = p * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Fisher-Pearson adjusted skewness: n/((n−1)(n−2)) · Σ((x−mean)/s)³ with sample s.
fn adjusted_skewness(values: &[f64], mean: f64, std: f64) -> f64 {
    let n = values.len() as f64;
    let sum_cubed: f64 = values
        .iter()
        .map(|v| {
            let z = (v - mean) / std;
            z * z * z
        })
        .sum();
    n / ((n - 1.0) * (n - 2.0)) * sum_cubed
}

/// Adjusted excess kurtosis (kurtosis − 3 convention), consistent for all n ≥ 4.
fn adjusted_excess_kurtosis(values: &[f64], mean: f64, std: f64) -> f64 {
    let n = values.len() as f64;
    let sum_fourth: f64 = values
        .iter()
        .map(|v| {
            let z = (v - mean) / std;
            let z2 = z * z;
            z2 * z2
        })
        .sum();
    n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0)) * sum_fourth
        - 3.0 * (n - 1.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0))
}

/// Approximate Shapiro-Wilk test: correlation of the sorted sample with Blom normal
/// scores gives the W statistic; the p-value blends W with moment penalties. Returns
/// `None` for degenerate input.
fn shapiro_wilk(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 3 {
        return None;
    }

    let mean: f64 = values.iter().sum::<f64>() / n as f64;
    let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std = variance.sqrt();
    if std == 0.0 {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut sum_expected_sq = 0.0;
    let mut sum_data_sq = 0.0;
    let mut sum_product = 0.0;
    for (i, &value) in sorted.iter().enumerate() {
        // Blom plotting position
        let p = (i as f64 + 1.0 - 0.375) / (n as f64 + 0.25);
        let expected = normal_quantile(p);
        let z = (value - mean) / std;
        sum_expected_sq += expected * expected;
        sum_data_sq += z * z;
        sum_product += expected * z;
    }

    let w = if sum_expected_sq > 0.0 && sum_data_sq > 0.0 {
        ((sum_product * sum_product) / (sum_expected_sq * sum_data_sq)).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let skew: f64 = sorted.iter().map(|v| ((v - mean) / std).powi(3)).sum::<f64>() / n as f64;
    let kurt: f64 = sorted.iter().map(|v| ((v - mean) / std).powi(4)).sum::<f64>() / n as f64;
    let skew_penalty = (skew.abs() / 2.0).min(1.0);
    let kurt_penalty = ((kurt - 3.0).abs() / 2.0).min(1.0);
    let penalty_factor = 1.0 - (skew_penalty + kurt_penalty) / 2.0;
    let p_value = (w * 0.7 + penalty_factor * 0.3).clamp(0.0, 1.0);

    Some((w, p_value))
}

/// Beasley-Springer-Moro approximation of the standard normal quantile function.
fn normal_quantile(p: f64) -> f64 {
    if p < 0.5 {
        -normal_quantile(1.0 - p)
    } else {
        let t = (-2.0 * (1.0 - p).ln()).sqrt();
        t - (2.515517 + 0.802853 * t + 0.010328 * t * t)
            / (1.0 + 1.432788 * t + 0.189269 * t * t + 0.001308 * t * t * t)
    }
}
