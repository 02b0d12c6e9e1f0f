//! Scatter points: raw rows for one disease, or per-department means.

use crate::models::{NumericField, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ROW_RADIUS: f64 = 6.0;
pub const GROUP_RADIUS: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScatterMode {
    /// One point per row of the selected disease.
    Rows,
    /// One point per department, at the mean of its rows.
    Departments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    /// Colour key: the disease in row mode, the department in group mode.
    pub key: String,
    pub x: f64,
    pub y: f64,
    /// Rows behind the point (1 in row mode).
    pub count: usize,
    pub radius: f64,
    /// Source row in row mode.
    pub row: Option<Row>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterSet {
    pub mode: ScatterMode,
    pub points: Vec<ScatterPoint>,
    pub x_domain: Option<(f64, f64)>,
    pub y_domain: Option<(f64, f64)>,
}

impl ScatterSet {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Build the scatter set. `disease_selected` picks row mode.
pub fn scatter_points(
    rows: &[&Row],
    x: NumericField,
    y: NumericField,
    disease_selected: bool,
) -> ScatterSet {
    let (mode, points) = if disease_selected {
        (ScatterMode::Rows, row_points(rows, x, y))
    } else {
        (ScatterMode::Departments, department_points(rows, x, y))
    };
    let x_domain = extent(points.iter().map(|p| p.x));
    let y_domain = extent(points.iter().map(|p| p.y));
    ScatterSet {
        mode,
        points,
        x_domain,
        y_domain,
    }
}

fn row_points(rows: &[&Row], x: NumericField, y: NumericField) -> Vec<ScatterPoint> {
    rows.iter()
        .filter_map(|r| {
            Some(ScatterPoint {
                key: r.dx.clone(),
                x: r.value(x)?,
                y: r.value(y)?,
                count: 1,
                radius: ROW_RADIUS,
                row: Some((*r).clone()),
            })
        })
        .collect()
}

#[derive(Default)]
struct GroupAcc {
    rows: usize,
    x_sum: f64,
    x_n: usize,
    y_sum: f64,
    y_n: usize,
}

fn department_points(rows: &[&Row], x: NumericField, y: NumericField) -> Vec<ScatterPoint> {
    let mut groups: BTreeMap<&str, GroupAcc> = BTreeMap::new();
    for r in rows {
        let g = groups.entry(r.department.as_str()).or_default();
        g.rows += 1;
        if let Some(v) = r.value(x) {
            g.x_sum += v;
            g.x_n += 1;
        }
        if let Some(v) = r.value(y) {
            g.y_sum += v;
            g.y_n += 1;
        }
    }
    groups
        .into_iter()
        .filter(|(_, g)| g.x_n > 0 && g.y_n > 0)
        .map(|(dept, g)| ScatterPoint {
            key: dept.to_string(),
            x: g.x_sum / g.x_n as f64,
            y: g.y_sum / g.y_n as f64,
            count: g.rows,
            radius: GROUP_RADIUS,
            row: None,
        })
        .collect()
}

/// Min and max of `values`, `None` when empty.
pub fn extent<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
