//! Outlier detection over frequency tables: IQR fencing and z-score thresholding.
//!
//! Both methods always run and both result sets are reported; callers decide which to
//! surface. Detection is a pure function of the table, its summary, and the threshold.

use serde::Serialize;

use crate::frequency::FrequencyTable;
use crate::statistics::{AnalysisFlag, DistributionSummary};

/// Which fence an IQR outlier crossed, or which side of the mean a z outlier sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    AboveUpperBound,
    BelowLowerBound,
}

/// One outlying category with its signed deviation score.
#[derive(Debug, Clone, Serialize)]
pub struct Outlier {
    pub label: String,
    pub count: u64,
    /// Signed z-score; `None` when the sample is degenerate (std == 0).
    pub z_score: Option<f64>,
    pub direction: Direction,
}

/// IQR fences at Q3 + 1.5·IQR and Q1 − 1.5·IQR.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IqrFences {
    pub lower: f64,
    pub upper: f64,
}

/// Output of both detection methods over one frequency table.
#[derive(Debug, Clone, Serialize)]
pub struct OutlierReport {
    pub fences: IqrFences,
    pub z_threshold: f64,
    /// IQR-fence outliers: upper outliers first, descending by count (ties by label
    /// ascending), then lower outliers ascending by count.
    pub iqr: Vec<Outlier>,
    /// Categories with |z| > threshold, descending by count, ties by label.
    pub zscore: Vec<Outlier>,
    pub flags: Vec<AnalysisFlag>,
}

/// Runs IQR fencing and z-score thresholding over `table`.
///
/// A zero-variance sample short-circuits the z-score method to an empty result (with a
/// `DegenerateSample` flag) instead of dividing by zero; IQR fencing is unaffected.
pub fn detect(
    table: &FrequencyTable,
    summary: &DistributionSummary,
    z_threshold: f64,
) -> OutlierReport {
    let fences = IqrFences {
        lower: summary.q1 - 1.5 * summary.iqr,
        upper: summary.q3 + 1.5 * summary.iqr,
    };

    let z_of = |count: u64| -> Option<f64> {
        if summary.std > 0.0 {
            Some((count as f64 - summary.mean) / summary.std)
        } else {
            None
        }
    };

    let mut upper = Vec::new();
    let mut lower = Vec::new();
    for (label, count) in table.iter() {
        if (count as f64) > fences.upper {
            upper.push(Outlier {
                label: label.to_string(),
                count,
                z_score: z_of(count),
                direction: Direction::AboveUpperBound,
            });
        } else if (count as f64) < fences.lower {
            // Counts are non-negative, so this fires only for unusual fences, but the
            // check is kept for correctness.
            lower.push(Outlier {
                label: label.to_string(),
                count,
                z_score: z_of(count),
                direction: Direction::BelowLowerBound,
            });
        }
    }
    // Dominance ranking: biggest categories first. Table iteration is already
    // label-ascending, and the sort is stable, so ties stay label-ordered.
    upper.sort_by(|a, b| b.count.cmp(&a.count));
    lower.sort_by(|a, b| a.count.cmp(&b.count));
    let mut iqr = upper;
    iqr.append(&mut lower);

    let mut flags = Vec::new();
    let zscore = if summary.std > 0.0 {
        let mut hits: Vec<Outlier> = table
            .iter()
            .filter_map(|(label, count)| {
                let z = (count as f64 - summary.mean) / summary.std;
                if z.abs() > z_threshold {
                    Some(Outlier {
                        label: label.to_string(),
                        count,
                        z_score: Some(z),
                        direction: if z > 0.0 {
                            Direction::AboveUpperBound
                        } else {
                            Direction::BelowLowerBound
                        },
                    })
                } else {
                    None
                }
            })
            .collect();
        hits.sort_by(|a, b| b.count.cmp(&a.count));
        hits
    } else {
        flags.push(AnalysisFlag::DegenerateSample);
        Vec::new()
    };

    OutlierReport {
        fences,
        z_threshold,
        iqr,
        zscore,
        flags,
    }
}
