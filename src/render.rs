//! Plain-text rendering of a catalog report.

use chrono::Month;
use std::fmt::Write;

use crate::report::{CatalogReport, FieldReport};

/// Calendar position of a month-name label, used to order month frequencies the way a
/// reader expects instead of by count.
fn month_number(label: &str) -> Option<u32> {
    label.parse::<Month>().ok().map(|m| m.number_from_month())
}

fn is_month_field(field: &FieldReport) -> bool {
    field.frequency.iter().all(|(label, _)| month_number(label).is_some())
        && !field.frequency.is_empty()
}

/// Formats the whole report as sectioned text.
pub fn render_report(report: &CatalogReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "catalog analysis: {} rows", report.total_rows);
    for field in report.fields.values() {
        render_field(&mut out, field);
    }
    out
}

fn render_field(out: &mut String, field: &FieldReport) {
    let _ = writeln!(out);
    let _ = writeln!(out, "== {} (column '{}') ==", field.field, field.column);
    let _ = writeln!(
        out,
        "missing: {} of {} rows ({:.2}%)",
        field.missing.missing, field.missing.total, field.missing.percent
    );

    if !field.flags.is_empty() {
        let notes: Vec<String> = field.flags.iter().map(|f| f.to_string()).collect();
        let _ = writeln!(out, "notes: {}", notes.join("; "));
    }

    if field.frequency.is_empty() {
        return;
    }

    let _ = writeln!(
        out,
        "categories: {}, occurrences: {}",
        field.frequency.len(),
        field.frequency.total_occurrences()
    );

    if is_month_field(field) {
        let mut entries: Vec<(&str, u64)> = field.frequency.iter().collect();
        entries.sort_by_key(|(label, _)| month_number(label).unwrap_or(u32::MAX));
        let _ = writeln!(out, "by calendar month:");
        for (label, count) in entries {
            let _ = writeln!(
                out,
                "  {}: {} ({:.2}%)",
                label,
                count,
                field.frequency.share_of_rows(count)
            );
        }
    } else {
        let _ = writeln!(out, "top {}:", field.top_values.len());
        for (label, count) in &field.top_values {
            let _ = writeln!(
                out,
                "  {}: {} ({:.2}%)",
                label,
                count,
                field.frequency.share_of_rows(*count)
            );
        }
    }

    if let Some(dist) = &field.distribution {
        let _ = writeln!(
            out,
            "distribution: mean {:.2}, median {:.2}, min {}, max {}, sum {}",
            dist.mean, dist.median, dist.min, dist.max, dist.sum
        );
        let _ = writeln!(
            out,
            "quartiles: q1 {:.2}, q3 {:.2}, iqr {:.2}, std {:.2}",
            dist.q1, dist.q3, dist.iqr, dist.std
        );
        match (dist.skewness, dist.kurtosis) {
            (Some(skew), Some(kurt)) => {
                let _ = writeln!(out, "shape: skewness {:.4}, excess kurtosis {:.4}", skew, kurt);
            }
            (Some(skew), None) => {
                let _ = writeln!(out, "shape: skewness {:.4}", skew);
            }
            _ => {}
        }
        if let Some(test) = &dist.normality {
            let verdict = if test.p_value < 0.05 { "non-normal" } else { "normal" };
            let truncated = if test.truncated { ", truncated" } else { "" };
            let _ = writeln!(
                out,
                "normality: W {:.4}, p {:.6} ({}, n {}{})",
                test.statistic, test.p_value, verdict, test.sample_size, truncated
            );
        }
    }

    if let Some(fences) = &field.fences {
        let _ = writeln!(
            out,
            "iqr fences: [{:.2}, {:.2}], outliers: {}",
            fences.lower,
            fences.upper,
            field.outliers_iqr.len()
        );
        for outlier in &field.outliers_iqr {
            match outlier.z_score {
                Some(z) => {
                    let _ = writeln!(out, "  - {}: {} (z {:.2})", outlier.label, outlier.count, z);
                }
                None => {
                    let _ = writeln!(out, "  - {}: {}", outlier.label, outlier.count);
                }
            }
        }
        let _ = writeln!(
            out,
            "z-score outliers (|z| > {:.1}): {}",
            field.z_threshold,
            field.outliers_zscore.len()
        );
        for outlier in &field.outliers_zscore {
            let z = outlier.z_score.unwrap_or(0.0);
            let _ = writeln!(out, "  - {}: {} (z {:.2})", outlier.label, outlier.count, z);
        }
    }

    if let Some(splits) = &field.type_split {
        let _ = writeln!(out, "type split for top categories:");
        for split in splits {
            let parts: Vec<String> = split
                .types
                .iter()
                .map(|(label, count)| format!("{} {}", count, label))
                .collect();
            let _ = writeln!(out, "  {}: {}", split.category, parts.join(", "));
        }
    }
}
