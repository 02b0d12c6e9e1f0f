//! Top-K category ranking.

use super::binning::AggregatedBin;
use crate::models::Row;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCategory {
    pub name: String,
    /// Count-weighted mean outcome, 0..=1.
    pub rate: f64,
    /// Rows behind the rate.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopK {
    pub requested: usize,
    pub entries: Vec<RankedCategory>,
}

impl TopK {
    /// Fewer categories than requested qualified.
    pub fn has_shortfall(&self) -> bool {
        self.entries.len() < self.requested
    }

    pub fn legend_title(&self) -> String {
        format!("Top {} Diseases:", self.entries.len())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }
}

/// `Σ(mean·count) / Σ(count)` per category, ordered by name.
///
/// Cells without a mean outcome are skipped.
pub fn weighted_rates(bins: &[AggregatedBin]) -> Vec<RankedCategory> {
    let mut acc: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for b in bins {
        let Some(mean) = b.mean_outcome else { continue };
        let e = acc.entry(b.group.as_str()).or_insert((0.0, 0));
        e.0 += mean * b.count as f64;
        e.1 += b.count;
    }
    acc.into_iter()
        .filter(|(_, (_, n))| *n > 0)
        .map(|(name, (sum, count))| RankedCategory {
            name: name.to_string(),
            rate: sum / count as f64,
            count,
        })
        .collect()
}

/// Categories with a positive weighted rate, highest first, at most `k`.
pub fn top_k_by_rate(bins: &[AggregatedBin], k: usize) -> TopK {
    let mut entries: Vec<RankedCategory> = weighted_rates(bins)
        .into_iter()
        .filter(|c| c.rate > 0.0)
        .collect();
    entries.sort_by(|a, b| {
        b.rate
            .partial_cmp(&a.rate)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    entries.truncate(k);
    TopK {
        requested: k,
        entries,
    }
}

/// Most frequent diseases by row count, ties by name.
pub fn top_k_by_frequency(rows: &[&Row], k: usize) -> Vec<(String, usize)> {
    let mut counts: AHashMap<&str, usize> = AHashMap::new();
    for r in rows {
        *counts.entry(r.dx.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(dx, n)| (dx.to_string(), n))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::binning::BinRange;

    fn cell(group: &str, count: usize, rate: f64) -> AggregatedBin {
        AggregatedBin {
            range: BinRange::Span { lower: 0.0, upper: 1.0 },
            group: group.into(),
            count,
            mean_outcome: Some(rate),
        }
    }

    #[test]
    fn rate_is_count_weighted() {
        let rates = weighted_rates(&[cell("A", 10, 0.5), cell("A", 1, 0.0)]);
        assert_eq!(rates.len(), 1);
        assert!((rates[0].rate - 5.0 / 11.0).abs() < 1e-12);
        assert_eq!(rates[0].count, 11);
    }

    #[test]
    fn zero_rates_dropped_and_shortfall_reported() {
        let top = top_k_by_rate(&[cell("A", 3, 0.2), cell("B", 4, 0.0), cell("C", 2, 0.6)], 5);
        let names: Vec<_> = top.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["C", "A"]);
        assert!(top.has_shortfall());
        assert_eq!(top.legend_title(), "Top 2 Diseases:");
    }
}
