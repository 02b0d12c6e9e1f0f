use crate::models::{NumericField, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary statistics for one numeric column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSummary {
    pub field: NumericField,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute statistics of `field` over `rows`, ignoring missing values.
pub fn field_summary(rows: &[&Row], field: NumericField) -> FieldSummary {
    let mut vals: Vec<f64> = rows.iter().filter_map(|r| r.value(field)).collect();
    let missing = rows.len() - vals.len();
    vals.sort_by(f64::total_cmp);

    let count = vals.len();
    let mean = if count > 0 {
        Some(vals.iter().sum::<f64>() / count as f64)
    } else {
        None
    };
    let median = if count == 0 {
        None
    } else if count % 2 == 1 {
        Some(vals[count / 2])
    } else {
        Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
    };
    FieldSummary {
        field,
        count,
        missing,
        min: vals.first().copied(),
        max: vals.last().copied(),
        mean,
        median,
    }
}

/// Row counts per value of a category column, ordered by value.
pub fn category_counts<'a, F>(rows: &[&'a Row], key: F) -> BTreeMap<&'a str, usize>
where
    F: Fn(&'a Row) -> &'a str,
{
    let mut counts = BTreeMap::new();
    for r in rows {
        *counts.entry(key(*r)).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(dx: &str, age: Option<f64>) -> Row {
        Row {
            sex: "M".into(),
            department: "A".into(),
            dx: dx.into(),
            age,
            height: None,
            weight: None,
            bmi: None,
            death_inhosp: None,
        }
    }

    #[test]
    fn summary_skips_missing() {
        let rows = [row("a", Some(3.0)), row("a", None), row("b", Some(1.0)), row("b", Some(2.0))];
        let refs: Vec<&Row> = rows.iter().collect();
        let s = field_summary(&refs, NumericField::Age);
        assert_eq!(s.count, 3);
        assert_eq!(s.missing, 1);
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.median, Some(2.0));
        assert_eq!(s.mean, Some(2.0));
    }

    #[test]
    fn counts_by_disease() {
        let rows = [row("flu", None), row("gout", None), row("flu", None)];
        let refs: Vec<&Row> = rows.iter().collect();
        let c = category_counts(&refs, |r| r.dx.as_str());
        assert_eq!(c.get("flu"), Some(&2));
        assert_eq!(c.get("gout"), Some(&1));
    }
}
