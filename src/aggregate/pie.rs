//! Pie slices: the selected disease against the rest of the selected departments.

use crate::config::PieMode;
use crate::models::Row;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Slices below this share get no percentage label.
pub const LABEL_MIN_PCT: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub name: String,
    pub value: usize,
    /// Radians, 0 at 12 o'clock, growing clockwise.
    pub start_angle: f64,
    pub end_angle: f64,
    /// Share of the total, 0..=100.
    pub pct: f64,
    pub show_label: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub slices: Vec<PieSlice>,
    pub selected: usize,
    pub total: usize,
}

impl PieChart {
    /// Selected share as text, `N/A` for an empty denominator.
    pub fn selected_pct_text(&self) -> String {
        if self.total == 0 {
            "N/A".to_string()
        } else {
            format!("{:.1}%", self.selected as f64 * 100.0 / self.total as f64)
        }
    }
}

/// Split `rows` (sex and department filters only) into pie slices.
pub fn pie_slices(
    rows: &[&Row],
    disease: Option<&str>,
    mode: PieMode,
    start_angle_deg: f64,
) -> PieChart {
    let is_selected = |r: &Row| disease.is_none_or(|dx| r.dx == dx);
    let total = rows.len();
    let selected = rows.iter().filter(|r| is_selected(**r)).count();
    let others = total - selected;

    let values: Vec<(&str, usize)> = match mode {
        PieMode::SelectedVsOthers => vec![("Selected", selected), ("Others", others)],
        PieMode::SexSplit => {
            let female = rows
                .iter()
                .filter(|r| is_selected(**r) && r.sex == "F")
                .count();
            let male = rows
                .iter()
                .filter(|r| is_selected(**r) && r.sex == "M")
                .count();
            // Selected rows with other sex codes count as "Others".
            vec![
                ("Female selected", female),
                ("Male selected", male),
                ("Others", total - female - male),
            ]
        }
    };

    let mut angle = start_angle_deg.to_radians();
    let mut slices = Vec::with_capacity(values.len());
    for (name, value) in values {
        if value == 0 {
            continue;
        }
        let frac = value as f64 / total as f64;
        let end = angle + frac * TAU;
        let pct = frac * 100.0;
        slices.push(PieSlice {
            name: name.to_string(),
            value,
            start_angle: angle,
            end_angle: end,
            pct,
            show_label: pct >= LABEL_MIN_PCT,
        });
        angle = end;
    }

    PieChart {
        slices,
        selected,
        total,
    }
}

/// One-line caption for the pie.
pub fn pie_summary(chart: &PieChart, disease: Option<&str>, departments: &[String]) -> String {
    if departments.is_empty() {
        return "No department selected. Pie is empty.".to_string();
    }
    let dx = disease.unwrap_or("ALL diseases");
    let pct = chart.selected_pct_text();
    let joined = departments.join(", ");
    if departments.len() == 1 {
        format!("{dx} belongs to {joined}. It accounts for {pct} of that department's patients.")
    } else {
        format!("{dx} belongs to [{joined}]. It accounts for {pct} of these departments' patients.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sex: &str, dx: &str) -> Row {
        Row {
            sex: sex.into(),
            department: "A".into(),
            dx: dx.into(),
            age: None,
            height: None,
            weight: None,
            bmi: None,
            death_inhosp: None,
        }
    }

    #[test]
    fn slices_cover_full_circle() {
        let rows = [row("F", "flu"), row("M", "flu"), row("M", "gout"), row("F", "gout")];
        let refs: Vec<&Row> = rows.iter().collect();
        let pie = pie_slices(&refs, Some("flu"), PieMode::SelectedVsOthers, -90.0);
        assert_eq!(pie.slices.len(), 2);
        let first = &pie.slices[0];
        let last = &pie.slices[1];
        assert!((first.start_angle - (-90f64).to_radians()).abs() < 1e-12);
        assert!((last.end_angle - first.start_angle - TAU).abs() < 1e-9);
        assert_eq!(pie.selected_pct_text(), "50.0%");
    }

    #[test]
    fn no_disease_is_one_full_slice() {
        let rows = [row("F", "flu"), row("M", "gout")];
        let refs: Vec<&Row> = rows.iter().collect();
        let pie = pie_slices(&refs, None, PieMode::SelectedVsOthers, 0.0);
        assert_eq!(pie.slices.len(), 1);
        assert_eq!(pie.slices[0].name, "Selected");
        assert_eq!(pie.slices[0].pct, 100.0);
    }

    #[test]
    fn summary_wording() {
        let rows = [row("F", "flu"), row("M", "gout")];
        let refs: Vec<&Row> = rows.iter().collect();
        let pie = pie_slices(&refs, Some("flu"), PieMode::SelectedVsOthers, 0.0);
        assert_eq!(
            pie_summary(&pie, Some("flu"), &["A".to_string()]),
            "flu belongs to A. It accounts for 50.0% of that department's patients."
        );
        assert_eq!(
            pie_summary(&pie, None, &[]),
            "No department selected. Pie is empty."
        );
    }
}
