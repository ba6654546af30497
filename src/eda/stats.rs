// src/eda/stats.rs
//! Descriptive statistics over frame columns.
//!
//! Semantics follow the conventions of mainstream dataframe libraries:
//! sample standard deviation (ddof = 1), linearly interpolated quantiles, and
//! Pearson correlation over pairwise-complete observations. Undefined results
//! (too few observations, zero variance) are `None` rather than NaN so they
//! serialize as JSON `null`.

use serde::Serialize;

use super::frame::DataFrame;

/// Five-number-plus summary of a continuous column.
#[derive(Debug, Clone, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub q25: Option<f64>,
    pub q50: Option<f64>,
    pub q75: Option<f64>,
}

/// One histogram bucket over `[start, end)`; the final bucket includes `end`.
#[derive(Debug, Clone, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Box-plot summary for one group of a grouped continuous column.
#[derive(Debug, Clone, Serialize)]
pub struct BoxGroup {
    pub label: String,
    pub count: usize,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (ddof = 1). `None` for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Quantile with linear interpolation between order statistics.
/// `sorted` must be ascending; `q` in `[0, 1]`.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Full descriptive summary of the non-missing values of a column.
pub fn describe(values: &[f64]) -> Describe {
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Describe {
        count: sorted.len(),
        mean: mean(&sorted),
        std: sample_std(&sorted),
        min: sorted.first().copied(),
        max: sorted.last().copied(),
        q25: quantile(&sorted, 0.25),
        q50: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
    }
}

/// Pearson correlation over rows where both columns are present.
/// `None` when fewer than two complete pairs exist or either side has zero
/// variance.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let my = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        cov += (x - mx) * (y - my);
        var_x += (x - mx).powi(2);
        var_y += (y - my).powi(2);
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some(cov / denom)
}

/// Pearson correlation matrix over the given continuous columns.
/// The diagonal is 1.0 whenever the column has any non-missing value.
pub fn correlation_matrix(df: &DataFrame, columns: &[String]) -> Vec<Vec<Option<f64>>> {
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|name| df.numeric_column(name).unwrap_or_default())
        .collect();

    let mut matrix = vec![vec![None; columns.len()]; columns.len()];
    for i in 0..columns.len() {
        for j in 0..columns.len() {
            matrix[i][j] = if i == j {
                series[i]
                    .iter()
                    .any(Option::is_some)
                    .then_some(1.0)
            } else if j < i {
                matrix[j][i]
            } else {
                pearson(&series[i], &series[j])
            };
        }
    }
    matrix
}

/// Fixed-width histogram over `[min, max]` of the values.
/// A constant column collapses to a single bucket holding everything.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Occurrence counts per distinct value, in first-seen order. Missing cells
/// are bucketed under `missing_label`.
pub fn value_counts(values: &[Option<String>], missing_label: &str) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for cell in values {
        let key = cell.as_deref().unwrap_or(missing_label).to_string();
        if !counts.contains_key(&key) {
            order.push(key.clone());
        }
        *counts.entry(key).or_insert(0) += 1;
    }
    order
        .into_iter()
        .map(|key| {
            let count = counts[&key];
            (key, count)
        })
        .collect()
}

/// Group numeric `ys` by the string `xs` and summarize each group for a box
/// plot, groups in first-seen order. Rows where either side is missing are
/// skipped.
pub fn box_groups(xs: &[Option<String>], ys: &[Option<f64>]) -> Vec<BoxGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: std::collections::HashMap<String, Vec<f64>> =
        std::collections::HashMap::new();
    for (x, y) in xs.iter().zip(ys) {
        let (Some(label), Some(value)) = (x.as_deref(), *y) else {
            continue;
        };
        let entry = grouped.entry(label.to_string()).or_default();
        if entry.is_empty() {
            order.push(label.to_string());
        }
        entry.push(value);
    }

    order
        .into_iter()
        .filter_map(|label| {
            let mut values = grouped.remove(&label)?;
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            Some(BoxGroup {
                label,
                count: values.len(),
                min: *values.first()?,
                q25: quantile(&values, 0.25)?,
                median: quantile(&values, 0.5)?,
                q75: quantile(&values, 0.75)?,
                max: *values.last()?,
            })
        })
        .collect()
}
