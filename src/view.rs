//! View model: everything a renderer or UI needs to show the current filter state.
//!
//! [`compute_view`] is pure. It filters the dataset, runs the aggregation for the active
//! chart kind, and assembles marks, legend, tooltips and summary lines. Nothing here
//! touches a drawing backend.

use crate::aggregate::{
    self, DeathRateTable, DistributionTable, PieChart, ScatterMode, ScatterSet, StackLayer,
};
use crate::config::{DashboardConfig, PieMode};
use crate::filter::{self, FilteredResult};
use crate::models::{Dataset, NumericField, PlotKind, Row, sex_label};
use crate::palette::{self, Palette, Rgb8};
use crate::state::{Action, FilterState};
use crate::viz::util::map_locale;
use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why nothing can be drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum EmptyReason {
    /// Sex or department selection is empty.
    NoSelection,
    /// The chart needs an axis that is not set.
    MissingAxis { kind: PlotKind },
    NoData { kind: PlotKind },
    /// Death-rate chart with fewer than two binnable values.
    NotEnoughData { kind: PlotKind },
}

impl EmptyReason {
    pub fn message(&self) -> String {
        match self {
            EmptyReason::NoSelection => "No sex or department selected.".to_string(),
            EmptyReason::MissingAxis { kind } => {
                format!("Select an axis to draw the {}.", kind.label().to_lowercase())
            }
            EmptyReason::NoData { kind } => format!("No data available for {}.", kind.label()),
            EmptyReason::NotEnoughData { kind } => {
                format!("Not enough data to bin the {} chart.", kind.label().to_lowercase())
            }
        }
    }
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb8,
    /// Dispatched when the entry is clicked. `None` means the entry is inert.
    pub action: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Legend {
    pub title: Option<String>,
    pub entries: Vec<LegendEntry>,
}

/// A hoverable element of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub id: String,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionView {
    pub field: NumericField,
    pub table: DistributionTable,
    pub layers: Vec<StackLayer>,
    /// One colour per category, aligned with `table.categories`.
    pub colors: Vec<Rgb8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterView {
    pub x_field: NumericField,
    pub y_field: NumericField,
    pub set: ScatterSet,
    /// One colour per point.
    pub colors: Vec<Rgb8>,
    pub probe: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieView {
    pub chart: PieChart,
    /// One colour per slice.
    pub colors: Vec<Rgb8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathRatePoint {
    pub lower: f64,
    pub upper: f64,
    pub x_mid: f64,
    /// Mean outcome, 0..=1.
    pub rate: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathRateSeries {
    pub name: String,
    /// Weighted rate over all bins.
    pub rate: f64,
    pub color: Rgb8,
    /// Ordered by `x_mid`.
    pub points: Vec<DeathRatePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathRateView {
    pub field: NumericField,
    pub edges: Vec<f64>,
    /// Highest weighted rate first.
    pub series: Vec<DeathRateSeries>,
    pub probe_x: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chart", rename_all = "snake_case")]
pub enum ChartView {
    Empty(EmptyReason),
    Distribution(DistributionView),
    Scatter(ScatterView),
    Pie(PieView),
    DeathRate(DeathRateView),
}

/// Complete view of one redraw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub kind: PlotKind,
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub chart: ChartView,
    pub legend: Legend,
    pub marks: Vec<Mark>,
    pub summary: Vec<String>,
}

impl View {
    pub fn empty(kind: PlotKind, reason: EmptyReason) -> Self {
        let summary = vec![reason.message()];
        Self {
            kind,
            title: kind.label().to_string(),
            x_label: None,
            y_label: None,
            chart: ChartView::Empty(reason),
            legend: Legend::default(),
            marks: Vec::new(),
            summary,
        }
    }

    pub fn empty_reason(&self) -> Option<&EmptyReason> {
        match &self.chart {
            ChartView::Empty(r) => Some(r),
            _ => None,
        }
    }

    pub fn tooltip(&self, mark_id: &str) -> Option<&str> {
        self.marks
            .iter()
            .find(|m| m.id == mark_id)
            .map(|m| m.tooltip.as_str())
    }
}

/// Derive the view for `state` over `dataset`.
pub fn compute_view(dataset: &Dataset, state: &FilterState, config: &DashboardConfig) -> View {
    let kind = state.plot_kind;
    let (locale, _) = map_locale(&config.locale);

    if state.is_empty_selection() {
        let mut view = View::empty(kind, EmptyReason::NoSelection);
        if kind == PlotKind::Pie && state.departments.is_empty() {
            view.summary = vec!["No department selected. Pie is empty.".to_string()];
        }
        return view;
    }

    let x = match state.x_field {
        Some(f) => f,
        None if kind.uses_x() => {
            log::warn!("{} needs an x axis; skipping draw", kind.label());
            return View::empty(kind, EmptyReason::MissingAxis { kind });
        }
        None => NumericField::AXES[0],
    };
    let y = match state.y_field {
        Some(f) => f,
        None if kind.uses_y() => {
            log::warn!("{} needs a y axis; skipping draw", kind.label());
            return View::empty(kind, EmptyReason::MissingAxis { kind });
        }
        None => NumericField::AXES[0],
    };

    let filtered = filter::apply(dataset, state);
    let view = match kind {
        PlotKind::Distribution => distribution_view(&filtered, state, config, x, locale),
        PlotKind::Scatter => scatter_view(&filtered, state, x, y, locale),
        PlotKind::Pie => pie_view(&filtered, state, config, locale),
        PlotKind::DeathRate => death_rate_view(&filtered, state, config, x, locale),
    };
    if let Some(reason) = view.empty_reason() {
        log::warn!("Empty chart: {reason}");
    }
    view
}

fn fmt_count(n: usize, locale: &Locale) -> String {
    n.to_formatted_string(locale)
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "N/A".to_string())
}

fn distribution_view(
    filtered: &FilteredResult<'_>,
    state: &FilterState,
    config: &DashboardConfig,
    field: NumericField,
    locale: &Locale,
) -> View {
    let kind = PlotKind::Distribution;
    let rows: &[&Row] = match state.disease {
        Some(_) => &filtered.matching_all,
        None => &filtered.all_but_disease,
    };
    if rows.is_empty() {
        return View::empty(kind, EmptyReason::NoData { kind });
    }

    let categories: Vec<String> = match &state.disease {
        Some(dx) => vec![dx.clone()],
        None => {
            let mut c: Vec<String> = rows.iter().map(|r| r.dx.clone()).collect();
            c.sort();
            c.dedup();
            c
        }
    };
    let table = aggregate::distribution_bins(rows, field, config.bin_width, &categories);
    let layers = aggregate::stack_layers(&table);
    let colors: Vec<Rgb8> = (0..categories.len())
        .map(|i| Palette::Set2.color(i))
        .collect();
    let color_of = |dx: &str| {
        categories
            .iter()
            .position(|c| c == dx)
            .map(|i| colors[i])
            .unwrap_or(palette::OTHER)
    };

    let legend = match &state.disease {
        Some(dx) => Legend {
            title: None,
            entries: vec![LegendEntry {
                label: dx.clone(),
                color: color_of(dx),
                action: None,
            }],
        },
        None => Legend {
            title: Some(format!("Top {} Diseases:", config.top_k.min(categories.len()))),
            entries: aggregate::top_k_by_frequency(rows, config.top_k)
                .into_iter()
                .map(|(dx, n)| LegendEntry {
                    label: format!("{dx} ({})", fmt_count(n, locale)),
                    color: color_of(&dx),
                    action: Some(Action::SelectDisease(Some(dx))),
                })
                .collect(),
        },
    };

    let mut marks: Vec<Mark> = categories
        .iter()
        .map(|dx| Mark {
            id: format!("layer:{dx}"),
            tooltip: format!("Disease: {dx}"),
        })
        .collect();
    for (i, range) in table.bins.iter().enumerate() {
        marks.push(Mark {
            id: format!("bin:{i}"),
            tooltip: format!(
                "{}: {}\nCount: {}",
                field.label(),
                range.label(),
                fmt_count(table.bin_total(i), locale)
            ),
        });
    }

    let mut summary = Vec::new();
    if let Some(dx) = &state.disease {
        summary.push(format!("Short summary for {dx}."));
    }
    summary.push(format!(
        "{} patients in {} bins.",
        fmt_count(table.total(), locale),
        table.bins.len()
    ));
    if let Some((range, n)) = table.modal_bin() {
        summary.push(format!(
            "Most common {}: {} ({} patients).",
            field.label(),
            range.label(),
            fmt_count(n, locale)
        ));
    }

    View {
        kind,
        title: format!("Distribution of {}", field.label()),
        x_label: Some(field.label().to_string()),
        y_label: Some("Patients".to_string()),
        chart: ChartView::Distribution(DistributionView {
            field,
            table,
            layers,
            colors,
        }),
        legend,
        marks,
        summary,
    }
}

fn scatter_view(
    filtered: &FilteredResult<'_>,
    state: &FilterState,
    x: NumericField,
    y: NumericField,
    locale: &Locale,
) -> View {
    let kind = PlotKind::Scatter;
    let set = aggregate::scatter_points(&filtered.matching_all, x, y, state.disease.is_some());
    if set.is_empty() {
        return View::empty(kind, EmptyReason::NoData { kind });
    }

    let mut keys: Vec<&str> = set.points.iter().map(|p| p.key.as_str()).collect();
    keys.sort();
    keys.dedup();
    let key_color = |k: &str| {
        keys.iter()
            .position(|v| *v == k)
            .map(|i| Palette::Category10.color(i))
            .unwrap_or(palette::OTHER)
    };
    let colors: Vec<Rgb8> = set.points.iter().map(|p| key_color(&p.key)).collect();

    let legend = Legend {
        title: None,
        entries: keys
            .iter()
            .map(|k| LegendEntry {
                label: k.to_string(),
                color: key_color(k),
                action: Some(match set.mode {
                    ScatterMode::Rows => Action::SelectDisease(None),
                    ScatterMode::Departments => Action::FocusDepartment(k.to_string()),
                }),
            })
            .collect(),
    };

    let marks = set
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let tooltip = match &p.row {
                Some(r) => format!(
                    "Disease: {}\n{}: {:.2}\n{}: {:.2}\nAge: {}\nSex: {}\nBMI: {}\nDeath: {}",
                    r.dx,
                    x.label(),
                    p.x,
                    y.label(),
                    p.y,
                    fmt_opt(r.age),
                    sex_label(&r.sex),
                    fmt_opt(r.bmi),
                    fmt_opt(r.death_inhosp),
                ),
                None => format!(
                    "Department: {}\nAvg {}: {:.2}\nAvg {}: {:.2}\nCount: {}",
                    p.key,
                    x.label(),
                    p.x,
                    y.label(),
                    p.y,
                    fmt_count(p.count, locale)
                ),
            };
            Mark {
                id: format!("point:{i}"),
                tooltip,
            }
        })
        .collect();

    let probe = state.probe_x.zip(state.probe_y);
    let mut summary = match (set.mode, &state.disease) {
        (ScatterMode::Rows, Some(dx)) => vec![format!(
            "{} patients with {dx}.",
            fmt_count(set.points.len(), locale)
        )],
        _ => vec![format!(
            "{} departments, {} patients.",
            set.points.len(),
            fmt_count(set.points.iter().map(|p| p.count).sum::<usize>(), locale)
        )],
    };
    if let Some((px, py)) = probe {
        summary.push(format!("Your input: {px:.2}, {py:.2}."));
    }

    View {
        kind,
        title: format!("{} vs {}", y.label(), x.label()),
        x_label: Some(x.label().to_string()),
        y_label: Some(y.label().to_string()),
        chart: ChartView::Scatter(ScatterView {
            x_field: x,
            y_field: y,
            set,
            colors,
            probe,
        }),
        legend,
        marks,
        summary,
    }
}

fn pie_slice_color(name: &str) -> Rgb8 {
    match name {
        "Selected" | "Female selected" => palette::PIE_SELECTED,
        "Male selected" => palette::PIE_SELECTED_MALE,
        _ => palette::PIE_OTHERS,
    }
}

fn pie_view(
    filtered: &FilteredResult<'_>,
    state: &FilterState,
    config: &DashboardConfig,
    locale: &Locale,
) -> View {
    let kind = PlotKind::Pie;
    let chart = aggregate::pie_slices(
        &filtered.all_but_disease,
        state.disease.as_deref(),
        config.pie_mode,
        config.pie_start_angle_deg,
    );
    if chart.total == 0 {
        return View::empty(kind, EmptyReason::NoData { kind });
    }
    let colors: Vec<Rgb8> = chart.slices.iter().map(|s| pie_slice_color(&s.name)).collect();

    let names: &[&str] = match config.pie_mode {
        PieMode::SelectedVsOthers => &["Selected", "Others"],
        PieMode::SexSplit => &["Female selected", "Male selected", "Others"],
    };
    let legend = Legend {
        title: None,
        entries: names
            .iter()
            .map(|n| LegendEntry {
                label: n.to_string(),
                color: pie_slice_color(n),
                action: None,
            })
            .collect(),
    };
    let marks = chart
        .slices
        .iter()
        .enumerate()
        .map(|(i, s)| Mark {
            id: format!("slice:{i}"),
            tooltip: format!("{}: {} ({:.1}%)", s.name, fmt_count(s.value, locale), s.pct),
        })
        .collect();

    let departments: Vec<String> = state.departments.iter().cloned().collect();
    let summary = vec![aggregate::pie_summary(
        &chart,
        state.disease.as_deref(),
        &departments,
    )];

    View {
        kind,
        title: match &state.disease {
            Some(dx) => format!("Share of {dx}"),
            None => "Share of all diseases".to_string(),
        },
        x_label: None,
        y_label: None,
        chart: ChartView::Pie(PieView { chart, colors }),
        legend,
        marks,
        summary,
    }
}

fn death_rate_view(
    filtered: &FilteredResult<'_>,
    state: &FilterState,
    config: &DashboardConfig,
    field: NumericField,
    locale: &Locale,
) -> View {
    let kind = PlotKind::DeathRate;
    let rows: &[&Row] = match state.disease {
        Some(_) => &filtered.matching_all,
        None => &filtered.all_but_disease,
    };
    if rows.is_empty() {
        return View::empty(kind, EmptyReason::NoData { kind });
    }
    let DeathRateTable { edges, bins } =
        aggregate::death_rate_bins(rows, field, config.death_rate_bins);
    if edges.is_empty() {
        return View::empty(kind, EmptyReason::NotEnoughData { kind });
    }

    // (name, weighted rate) of the series to draw
    let ranked: Vec<(String, f64)> = match &state.disease {
        Some(dx) => aggregate::weighted_rates(&bins)
            .into_iter()
            .filter(|c| &c.name == dx)
            .map(|c| (c.name, c.rate))
            .collect(),
        None => aggregate::top_k_by_rate(&bins, config.top_k)
            .entries
            .into_iter()
            .map(|c| (c.name, c.rate))
            .collect(),
    };

    let series: Vec<DeathRateSeries> = ranked
        .iter()
        .enumerate()
        .map(|(i, (name, rate))| {
            let mut points: Vec<DeathRatePoint> = bins
                .iter()
                .filter(|b| &b.group == name)
                .filter_map(|b| match b.range {
                    aggregate::BinRange::Span { lower, upper } => Some(DeathRatePoint {
                        lower,
                        upper,
                        x_mid: (lower + upper) / 2.0,
                        rate: b.mean_outcome?,
                        count: b.count,
                    }),
                    aggregate::BinRange::Missing => None,
                })
                .collect();
            points.sort_by(|a, b| a.x_mid.total_cmp(&b.x_mid));
            DeathRateSeries {
                name: name.clone(),
                rate: *rate,
                color: Palette::Category10.color(i),
                points,
            }
        })
        .collect();

    let mut legend = Legend {
        title: match state.disease {
            Some(_) => None,
            None => Some(format!("Top {} Diseases:", series.len())),
        },
        entries: series
            .iter()
            .map(|s| LegendEntry {
                label: format!("{} ({:.2}%)", s.name, s.rate * 100.0),
                color: s.color,
                action: Some(match state.disease {
                    Some(_) => Action::SelectDisease(None),
                    None => Action::SelectDisease(Some(s.name.clone())),
                }),
            })
            .collect(),
    };
    if state.disease.is_none() && series.len() < config.top_k {
        legend.entries.push(LegendEntry {
            label: "Other (0.00%)".to_string(),
            color: palette::OTHER,
            action: None,
        });
    }

    let mut marks = Vec::new();
    for s in &series {
        for (j, p) in s.points.iter().enumerate() {
            marks.push(Mark {
                id: format!("rate:{}:{j}", s.name),
                tooltip: format!(
                    "Disease: {}\nX range: {:.2} - {:.2}\nMean Death Rate: {:.2}%\nTotal Count: {}",
                    s.name,
                    p.lower,
                    p.upper,
                    p.rate * 100.0,
                    fmt_count(p.count, locale)
                ),
            });
        }
    }

    let summary = match (&state.disease, series.first()) {
        (Some(dx), Some(s)) => {
            let min = s.points.iter().map(|p| p.rate).fold(f64::INFINITY, f64::min);
            let max = s.points.iter().map(|p| p.rate).fold(f64::NEG_INFINITY, f64::max);
            let total: usize = s.points.iter().map(|p| p.count).sum();
            vec![
                format!("Disease: {dx}"),
                format!("Minimum Death Rate: {:.2}%", min * 100.0),
                format!("Maximum Death Rate: {:.2}%", max * 100.0),
                format!("Average Death Rate: {:.2}%", s.rate * 100.0),
                format!("Total Points: {}", fmt_count(total, locale)),
            ]
        }
        (Some(dx), None) => vec![format!("No data available for {dx}")],
        (None, _) => vec![format!(
            "{} of {} diseases have a non-zero death rate.",
            series.len(),
            bins.iter()
                .map(|b| b.group.as_str())
                .collect::<std::collections::BTreeSet<_>>()
                .len()
        )],
    };

    View {
        kind,
        title: format!("Death rate by {}", field.label()),
        x_label: Some(field.label().to_string()),
        y_label: Some("Death Rate (%)".to_string()),
        chart: ChartView::DeathRate(DeathRateView {
            field,
            edges,
            series,
            probe_x: state.probe_x,
        }),
        legend,
        marks,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sex: &str, dept: &str, dx: &str, age: f64, death: f64) -> Row {
        Row {
            sex: sex.into(),
            department: dept.into(),
            dx: dx.into(),
            age: Some(age),
            height: Some(170.0),
            weight: Some(70.0),
            bmi: Some(24.0),
            death_inhosp: Some(death),
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![
            row("M", "A", "flu", 10.0, 0.0),
            row("F", "A", "flu", 40.0, 1.0),
            row("F", "B", "gout", 60.0, 0.0),
        ])
    }

    #[test]
    fn missing_axis_is_empty_state() {
        let ds = dataset();
        let mut st = FilterState::new(ds.domain());
        st.plot_kind = PlotKind::Scatter;
        st.y_field = None;
        let v = compute_view(&ds, &st, &DashboardConfig::default());
        assert_eq!(
            v.empty_reason(),
            Some(&EmptyReason::MissingAxis { kind: PlotKind::Scatter })
        );
    }

    #[test]
    fn pie_ignores_missing_axes() {
        let ds = dataset();
        let mut st = FilterState::new(ds.domain());
        st.plot_kind = PlotKind::Pie;
        st.x_field = None;
        st.y_field = None;
        let v = compute_view(&ds, &st, &DashboardConfig::default());
        assert!(v.empty_reason().is_none());
    }

    #[test]
    fn distribution_legend_selects_disease() {
        let ds = dataset();
        let st = FilterState::new(ds.domain());
        let v = compute_view(&ds, &st, &DashboardConfig::default());
        assert_eq!(v.legend.entries.len(), 2);
        assert_eq!(
            v.legend.entries[0].action,
            Some(Action::SelectDisease(Some("flu".into())))
        );
        assert_eq!(v.tooltip("layer:gout"), Some("Disease: gout"));
    }
}
