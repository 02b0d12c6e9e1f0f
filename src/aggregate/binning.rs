//! Numeric binning for the distribution and death-rate charts.

use crate::models::{NumericField, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A bin interval, closed at `lower` and open at `upper`, or the bucket for missing values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BinRange {
    Span { lower: f64, upper: f64 },
    Missing,
}

impl BinRange {
    pub fn contains(&self, v: f64) -> bool {
        match *self {
            BinRange::Span { lower, upper } => v >= lower && v < upper,
            BinRange::Missing => false,
        }
    }

    pub fn midpoint(&self) -> Option<f64> {
        match *self {
            BinRange::Span { lower, upper } => Some((lower + upper) / 2.0),
            BinRange::Missing => None,
        }
    }

    /// Bucket name. Integer spans print their inclusive range (`10-14`).
    pub fn label(&self) -> String {
        match *self {
            BinRange::Missing => "N/A".to_string(),
            BinRange::Span { lower, upper } => {
                if lower.fract() == 0.0 && upper.fract() == 0.0 && upper - lower >= 1.0 {
                    format!("{}-{}", lower as i64, upper as i64 - 1)
                } else {
                    format!("{lower:.2}-{upper:.2}")
                }
            }
        }
    }
}

/// One (bin, category) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedBin {
    pub range: BinRange,
    pub group: String,
    pub count: usize,
    /// Mean outcome of the rows in the cell. Only set by the death-rate aggregation.
    pub mean_outcome: Option<f64>,
}

/// Fixed-width bin containing `v`.
pub fn fixed_width_range(v: f64, width: f64) -> BinRange {
    let lower = (v / width).floor() * width;
    BinRange::Span {
        lower,
        upper: lower + width,
    }
}

/// Sort key: spans by index, missing last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum BinKey {
    Span(i64),
    Missing,
}

/// Counts per bin and category, dense over both axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionTable {
    pub categories: Vec<String>,
    pub bins: Vec<BinRange>,
    /// `counts[bin][category]`.
    pub counts: Vec<Vec<usize>>,
}

impl DistributionTable {
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn bin_total(&self, bin: usize) -> usize {
        self.counts.get(bin).map(|c| c.iter().sum()).unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        (0..self.bins.len()).map(|b| self.bin_total(b)).sum()
    }

    /// Bin with the largest total; earliest wins ties.
    pub fn modal_bin(&self) -> Option<(BinRange, usize)> {
        let mut best: Option<(usize, usize)> = None;
        for b in 0..self.bins.len() {
            let t = self.bin_total(b);
            if best.is_none_or(|(_, bt)| t > bt) {
                best = Some((b, t));
            }
        }
        best.map(|(b, t)| (self.bins[b], t))
    }

    /// Flatten into one cell per (bin, category), zero counts included.
    pub fn cells(&self) -> Vec<AggregatedBin> {
        let mut out = Vec::with_capacity(self.bins.len() * self.categories.len());
        for (range, row) in self.bins.iter().zip(&self.counts) {
            for (group, count) in self.categories.iter().zip(row) {
                out.push(AggregatedBin {
                    range: *range,
                    group: group.clone(),
                    count: *count,
                    mean_outcome: None,
                });
            }
        }
        out
    }
}

/// Bucket `rows` by `field` into fixed-width bins, one count per category.
///
/// Rows whose `dx` is not in `categories` are ignored. Missing values land in `N/A`.
pub fn distribution_bins(
    rows: &[&Row],
    field: NumericField,
    width: f64,
    categories: &[String],
) -> DistributionTable {
    let mut cells: BTreeMap<BinKey, Vec<usize>> = BTreeMap::new();
    for r in rows {
        let Some(ci) = categories.iter().position(|c| *c == r.dx) else {
            continue;
        };
        let key = match r.value(field) {
            Some(v) => BinKey::Span((v / width).floor() as i64),
            None => BinKey::Missing,
        };
        cells.entry(key).or_insert_with(|| vec![0; categories.len()])[ci] += 1;
    }

    let mut bins = Vec::with_capacity(cells.len());
    let mut counts = Vec::with_capacity(cells.len());
    for (key, row) in cells {
        bins.push(match key {
            BinKey::Span(k) => {
                let lower = k as f64 * width;
                BinRange::Span {
                    lower,
                    upper: lower + width,
                }
            }
            BinKey::Missing => BinRange::Missing,
        });
        counts.push(row);
    }
    DistributionTable {
        categories: categories.to_vec(),
        bins,
        counts,
    }
}

/// Cumulative band of one category in one bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackSegment {
    pub y0: f64,
    pub y1: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackLayer {
    pub category: String,
    /// One segment per bin, in bin order.
    pub segments: Vec<StackSegment>,
}

/// Stack categories bottom-up in category order.
pub fn stack_layers(table: &DistributionTable) -> Vec<StackLayer> {
    let mut base = vec![0.0_f64; table.bins.len()];
    let mut layers = Vec::with_capacity(table.categories.len());
    for (ci, category) in table.categories.iter().enumerate() {
        let segments = table
            .counts
            .iter()
            .zip(base.iter_mut())
            .map(|(row, b)| {
                let y0 = *b;
                let y1 = y0 + row[ci] as f64;
                *b = y1;
                StackSegment { y0, y1 }
            })
            .collect();
        layers.push(StackLayer {
            category: category.clone(),
            segments,
        });
    }
    layers
}

/// `n` equal-width bins over `[min, max]`, returned as `n + 1` edges.
///
/// The last edge sits just above `max` so the maximum falls inside the last bin.
/// Fewer than two values gives no edges.
pub fn equal_width_edges(values: &[f64], n: usize) -> Vec<f64> {
    if values.len() < 2 || n == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = (max - min) / n as f64;
    let mut edges: Vec<f64> = (0..n).map(|k| min + k as f64 * step).collect();
    edges.push(max + 1e-7);
    edges
}

/// Index of the bin holding `v`, if any.
///
/// The top edge is inclusive: at large magnitudes `max + 1e-7` rounds back to `max`.
pub fn locate_bin(edges: &[f64], v: f64) -> Option<usize> {
    let last = *edges.last()?;
    if edges.len() < 2 || v < edges[0] || v > last {
        return None;
    }
    let idx = edges.partition_point(|e| *e <= v);
    Some((idx - 1).min(edges.len() - 2))
}

/// Death-rate cells plus the edges they were binned on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeathRateTable {
    pub edges: Vec<f64>,
    /// Non-empty cells ordered by group, then bin.
    pub bins: Vec<AggregatedBin>,
}

impl DeathRateTable {
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Mean outcome per (disease, equal-width bin of `field`).
///
/// Rows missing either `field` or the outcome are dropped before the edges are computed.
pub fn death_rate_bins(rows: &[&Row], field: NumericField, n: usize) -> DeathRateTable {
    let usable: Vec<(f64, f64, &str)> = rows
        .iter()
        .filter_map(|r| Some((r.value(field)?, r.death_inhosp?, r.dx.as_str())))
        .collect();
    let xs: Vec<f64> = usable.iter().map(|(x, _, _)| *x).collect();
    let edges = equal_width_edges(&xs, n);
    if edges.is_empty() {
        return DeathRateTable::default();
    }

    // (sum, count) per cell
    let mut acc: BTreeMap<(&str, usize), (f64, usize)> = BTreeMap::new();
    for &(x, outcome, dx) in &usable {
        if let Some(b) = locate_bin(&edges, x) {
            let e = acc.entry((dx, b)).or_insert((0.0, 0));
            e.0 += outcome;
            e.1 += 1;
        }
    }

    let bins = acc
        .into_iter()
        .map(|((dx, b), (sum, count))| AggregatedBin {
            range: BinRange::Span {
                lower: edges[b],
                upper: edges[b + 1],
            },
            group: dx.to_string(),
            count,
            mean_outcome: Some(sum / count as f64),
        })
        .collect();
    DeathRateTable { edges, bins }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_labels() {
        assert_eq!(fixed_width_range(12.0, 5.0).label(), "10-14");
        assert_eq!(fixed_width_range(40.0, 5.0).label(), "40-44");
        assert_eq!(fixed_width_range(-0.5, 5.0).label(), "-5--1");
        assert_eq!(BinRange::Missing.label(), "N/A");
    }

    #[test]
    fn edges_include_maximum() {
        let vals = [0.0, 2.5, 10.0];
        let edges = equal_width_edges(&vals, 10);
        assert_eq!(edges.len(), 11);
        assert_eq!(locate_bin(&edges, 10.0), Some(9));
        assert_eq!(locate_bin(&edges, 0.0), Some(0));
        assert_eq!(locate_bin(&edges, -1.0), None);
    }

    #[test]
    fn single_value_gives_no_edges() {
        assert!(equal_width_edges(&[3.0], 10).is_empty());
        assert!(equal_width_edges(&[], 10).is_empty());
    }

    #[test]
    fn large_maximum_is_still_binned() {
        let edges = equal_width_edges(&[0.0, 3.0e9], 10);
        assert_eq!(locate_bin(&edges, 3.0e9), Some(9));
        assert_eq!(locate_bin(&edges, 0.0), Some(0));
        assert_eq!(locate_bin(&edges, 3.0e9 + 1.0e3), None);
    }

    #[test]
    fn constant_values_land_in_last_bin() {
        let edges = equal_width_edges(&[7.0, 7.0, 7.0], 4);
        assert_eq!(locate_bin(&edges, 7.0), Some(3));
    }
}
