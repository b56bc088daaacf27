use std::collections::HashMap;

use super::model::{StudentRecord, StudentTable};

// ---------------------------------------------------------------------------
// Scalar metrics
// ---------------------------------------------------------------------------

/// Headline numbers over the filtered subset, means rounded to 2 decimals.
/// Means are `None` when there is nothing to average.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryMetrics {
    pub count: usize,
    pub mean_age: Option<f64>,
    pub mean_height_cm: Option<f64>,
    pub mean_weight: Option<f64>,
    pub mean_bmi: Option<f64>,
}

pub fn summary_metrics(table: &StudentTable, indices: &[usize]) -> SummaryMetrics {
    let rows = || indices.iter().map(move |&i| &table.records[i]);
    SummaryMetrics {
        count: indices.len(),
        mean_age: mean(rows().filter_map(|r| r.age).map(|a| a as f64)).map(round2),
        mean_height_cm: mean(rows().map(|r| r.height_cm)).map(round2),
        mean_weight: mean(rows().map(|r| r.weight)).map(round2),
        mean_bmi: mean(rows().map(|r| r.bmi)).map(round2),
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Mean of the non-NaN values.
pub fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// count / mean / std / min / quartiles / max, as a dataframe `describe()`
/// reports them: sample standard deviation, linearly interpolated quantiles,
/// NaN ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub q50: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl Describe {
    /// Rows in display order.
    pub fn rows(&self) -> [(&'static str, Option<f64>); 8] {
        [
            ("count", Some(self.count as f64)),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.q50),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

pub fn describe(values: impl Iterator<Item = f64>) -> Describe {
    let mut sorted: Vec<f64> = values.filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return Describe::default();
    }
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = (n > 1).then(|| {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    });

    Describe {
        count: n,
        mean: Some(mean),
        std,
        min: sorted.first().copied(),
        q25: Some(quantile(&sorted, 0.25)),
        q50: Some(quantile(&sorted, 0.50)),
        q75: Some(quantile(&sorted, 0.75)),
        max: sorted.last().copied(),
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

// ---------------------------------------------------------------------------
// Chart-ready aggregations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
/// A single distinct value gets the range `value ± 0.5`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|b| HistogramBin {
            start: lo + width * b as f64,
            end: lo + width * (b + 1) as f64,
            count: 0,
        })
        .collect();
    for v in finite {
        let b = (((v - lo) / width).floor() as usize).min(bins - 1);
        out[b].count += 1;
    }
    out
}

/// Counts per distinct value, most frequent first; ties keep first appearance.
pub fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut position: HashMap<&'a str, usize> = HashMap::new();
    for v in values {
        match position.get(v) {
            Some(&p) => counts[p].1 += 1,
            None => {
                position.insert(v, counts.len());
                counts.push((v.to_string(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

pub const AGE_HISTOGRAM_BINS: usize = 10;
pub const TOP_NEIGHBORHOODS: usize = 10;

/// Everything the six charts need.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub age_histogram: Vec<HistogramBin>,
    pub blood_type_shares: Vec<Share>,
    /// `[height_cm, weight]` pairs.
    pub height_weight: Vec<[f64; 2]>,
    pub hair_color_counts: Vec<(String, usize)>,
    /// Shoe size → count, ascending by size.
    pub shoe_size_counts: Vec<(f64, usize)>,
    pub top_neighborhoods: Vec<(String, usize)>,
}

pub fn chart_data(table: &StudentTable, indices: &[usize]) -> ChartData {
    let rows: Vec<&StudentRecord> = indices.iter().map(|&i| &table.records[i]).collect();

    let ages: Vec<f64> = rows.iter().filter_map(|r| r.age).map(|a| a as f64).collect();

    let total = rows.len();
    let blood_type_shares = value_counts(rows.iter().map(|r| r.blood_type.as_str()))
        .into_iter()
        .map(|(label, count)| Share {
            percent: 100.0 * count as f64 / total as f64,
            label,
            count,
        })
        .collect();

    let mut top_neighborhoods = value_counts(rows.iter().map(|r| r.neighborhood.as_str()));
    top_neighborhoods.truncate(TOP_NEIGHBORHOODS);

    ChartData {
        age_histogram: histogram(&ages, AGE_HISTOGRAM_BINS),
        blood_type_shares,
        height_weight: rows.iter().map(|r| [r.height_cm, r.weight]).collect(),
        hair_color_counts: value_counts(rows.iter().map(|r| r.hair_color.as_str())),
        shoe_size_counts: sorted_counts(rows.iter().map(|r| r.shoe_size)),
        top_neighborhoods,
    }
}

fn sorted_counts(values: impl Iterator<Item = f64>) -> Vec<(f64, usize)> {
    let mut sorted: Vec<f64> = values.filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    let mut out: Vec<(f64, usize)> = Vec::new();
    for v in sorted {
        match out.last_mut() {
            Some((last, n)) if *last == v => *n += 1,
            _ => out.push((v, 1)),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Top-N over the full table
// ---------------------------------------------------------------------------

/// Indices of the `n` largest records by `key`; NaN is skipped and ties keep
/// table order.
pub fn top_n_by(table: &StudentTable, n: usize, key: impl Fn(&StudentRecord) -> f64) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = table
        .records
        .iter()
        .enumerate()
        .map(|(i, r)| (i, key(r)))
        .filter(|(_, v)| !v.is_nan())
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().take(n).map(|(i, _)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::{record, table};

    fn assert_close(a: Option<f64>, b: f64) {
        let a = a.expect("value present");
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn metrics_round_and_skip_null_age() {
        let t = table(vec![
            record("A", "O+", "Negro", "Centro", Some(20), 1.70, 60.0),
            record("B", "O+", "Negro", "Centro", None, 1.80, 90.0),
            record("C", "O+", "Negro", "Centro", Some(21), 1.65, 61.0),
        ]);
        let m = summary_metrics(&t, &[0, 1, 2]);
        assert_eq!(m.count, 3);
        assert_eq!(m.mean_age, Some(20.5));
        assert_eq!(m.mean_height_cm, Some(171.67));
        assert_eq!(m.mean_weight, Some(70.33));
        assert!(m.mean_bmi.is_some());
    }

    #[test]
    fn metrics_on_empty_subset() {
        let t = table(vec![record("A", "O+", "Negro", "Centro", Some(20), 1.70, 60.0)]);
        let m = summary_metrics(&t, &[]);
        assert_eq!(m.count, 0);
        assert_eq!(m.mean_height_cm, None);
    }

    #[test]
    fn describe_matches_dataframe_conventions() {
        let d = describe([1.0, 2.0, 3.0, 4.0].into_iter());
        assert_eq!(d.count, 4);
        assert_close(d.mean, 2.5);
        assert_close(d.std, 1.2909944487358056);
        assert_close(d.min, 1.0);
        assert_close(d.q25, 1.75);
        assert_close(d.q50, 2.5);
        assert_close(d.q75, 3.25);
        assert_close(d.max, 4.0);
    }

    #[test]
    fn describe_single_value_has_no_std() {
        let d = describe(std::iter::once(170.0));
        assert_eq!(d.count, 1);
        assert_eq!(d.std, None);
        assert_close(d.q75, 170.0);
        assert_eq!(describe(std::iter::empty()), Describe::default());
    }

    #[test]
    fn histogram_closes_last_bin() {
        let bins = histogram(&[18.0, 19.0, 20.0, 28.0], 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].count, 1);
        assert_eq!(bins[2].count, 1);
        assert_eq!(bins[9].count, 1);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);
    }

    #[test]
    fn histogram_single_value_widens() {
        let bins = histogram(&[20.0, 20.0], 10);
        assert_eq!(bins[0].start, 19.5);
        assert_eq!(bins[9].end, 20.5);
        assert_eq!(bins.iter().filter(|b| b.count == 2).count(), 1);
        assert!(histogram(&[], 10).is_empty());
    }

    #[test]
    fn value_counts_ties_keep_first_appearance() {
        let counts = value_counts(["B", "A", "A", "C", "B", "D"].into_iter());
        assert_eq!(
            counts,
            vec![
                ("B".to_string(), 2),
                ("A".to_string(), 2),
                ("C".to_string(), 1),
                ("D".to_string(), 1)
            ]
        );
    }

    #[test]
    fn chart_data_shapes() {
        let mut rows: Vec<_> = (0..12)
            .map(|i| record(&format!("S{i}"), "O+", "Negro", &format!("Barrio {i}"), Some(20), 1.70, 60.0))
            .collect();
        rows[0].shoe_size = 42.0;
        rows[1].shoe_size = 36.5;
        rows[2].blood_type = "A-".into();
        rows[3].blood_type = "A-".into();
        rows[4].blood_type = "A-".into();
        let t = table(rows);
        let all: Vec<usize> = (0..12).collect();
        let charts = chart_data(&t, &all);

        assert_eq!(charts.top_neighborhoods.len(), TOP_NEIGHBORHOODS);
        assert_eq!(charts.height_weight.len(), 12);
        assert_eq!(charts.shoe_size_counts, vec![(36.5, 1), (40.0, 10), (42.0, 1)]);
        assert_eq!(charts.blood_type_shares[0].label, "O+");
        assert_close(Some(charts.blood_type_shares[0].percent), 75.0);
        assert_close(Some(charts.blood_type_shares[1].percent), 25.0);
    }

    #[test]
    fn top_n_is_stable_on_ties() {
        let t = table(vec![
            record("A", "O+", "Negro", "Centro", Some(20), 1.70, 60.0),
            record("B", "O+", "Negro", "Centro", Some(20), 1.90, 60.0),
            record("C", "O+", "Negro", "Centro", Some(20), 1.70, 60.0),
            record("D", "O+", "Negro", "Centro", Some(20), 1.50, 60.0),
        ]);
        assert_eq!(top_n_by(&t, 3, |r| r.height_cm), vec![1, 0, 2]);
        assert_eq!(top_n_by(&t, 10, |r| r.weight), vec![0, 1, 2, 3]);
    }
}
