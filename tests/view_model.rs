use vitaldash::{
    Action, ChartView, Dashboard, DashboardConfig, Dataset, EmptyReason, FilterState, NumericField,
    PlotKind, Row, compute_view,
};

fn patient(sex: &str, dept: &str, dx: &str, age: f64, died: f64) -> Row {
    Row {
        sex: sex.into(),
        department: dept.into(),
        dx: dx.into(),
        age: Some(age),
        height: Some(160.0),
        weight: Some(60.0),
        bmi: Some(23.4),
        death_inhosp: Some(died),
    }
}

fn ward() -> Dataset {
    Dataset::new(vec![
        patient("F", "Surgery", "Appendicitis", 22.0, 0.0),
        patient("M", "Surgery", "Appendicitis", 35.0, 0.0),
        patient("M", "Surgery", "Hernia", 61.0, 1.0),
        patient("F", "Internal", "Pneumonia", 78.0, 1.0),
        patient("M", "Internal", "Pneumonia", 83.0, 0.0),
        patient("F", "Internal", "Pneumonia", 70.0, 1.0),
    ])
}

fn state_for(data: &Dataset, actions: &[Action]) -> FilterState {
    actions.iter().fold(FilterState::new(data.domain()), |s, a| {
        s.reduce(a, data.domain()).unwrap()
    })
}

#[test]
fn distribution_legend_lists_most_frequent_diseases() {
    let data = ward();
    let view = compute_view(&data, &FilterState::new(data.domain()), &DashboardConfig::default());
    assert!(matches!(view.chart, ChartView::Distribution(_)));
    assert_eq!(view.legend.title.as_deref(), Some("Top 3 Diseases:"));
    assert_eq!(view.legend.entries[0].label, "Pneumonia (3)");
    assert_eq!(
        view.legend.entries[0].action,
        Some(Action::SelectDisease(Some("Pneumonia".into())))
    );
    assert!(view.tooltip("layer:Hernia").is_some());
}

#[test]
fn missing_axis_gives_empty_view() {
    let data = ward();
    let state = state_for(
        &data,
        &[Action::SetPlotKind(PlotKind::Scatter), Action::SetYField(None)],
    );
    let view = compute_view(&data, &state, &DashboardConfig::default());
    assert_eq!(
        view.empty_reason(),
        Some(&EmptyReason::MissingAxis {
            kind: PlotKind::Scatter
        })
    );
}

#[test]
fn pie_without_department_reports_empty_pie() {
    let data = ward();
    let state = state_for(
        &data,
        &[
            Action::SetPlotKind(PlotKind::Pie),
            Action::SetAllDepartments(false),
        ],
    );
    let view = compute_view(&data, &state, &DashboardConfig::default());
    assert_eq!(view.empty_reason(), Some(&EmptyReason::NoSelection));
    assert_eq!(view.summary, vec!["No department selected. Pie is empty."]);
}

#[test]
fn pie_summary_names_the_departments() {
    let data = ward();
    let state = state_for(
        &data,
        &[
            Action::SetPlotKind(PlotKind::Pie),
            Action::SelectDisease(Some("Pneumonia".into())),
            Action::FocusDepartment("Internal".into()),
        ],
    );
    let view = compute_view(&data, &state, &DashboardConfig::default());
    assert!(matches!(view.chart, ChartView::Pie(_)));
    assert!(view.summary[0].starts_with("Pneumonia belongs to Internal."));
    assert!(view.summary[0].contains("100.0%"));
}

#[test]
fn death_rate_single_disease_summary() {
    let data = ward();
    let state = state_for(
        &data,
        &[
            Action::SetPlotKind(PlotKind::DeathRate),
            Action::SetXField(Some(NumericField::Age)),
            Action::SelectDisease(Some("Pneumonia".into())),
        ],
    );
    let view = compute_view(&data, &state, &DashboardConfig::default());
    let ChartView::DeathRate(dr) = &view.chart else {
        panic!("expected death-rate chart, got {:?}", view.chart);
    };
    assert_eq!(dr.series.len(), 1);
    assert_eq!(dr.series[0].name, "Pneumonia");
    assert!(!view.summary.is_empty());
    assert!(view.marks.iter().all(|m| m.id.starts_with("rate:Pneumonia:")));
}

#[test]
fn death_rate_legend_pads_with_inert_other_entry() {
    let data = Dataset::new(vec![
        patient("F", "Internal", "Pneumonia", 70.0, 1.0),
        patient("M", "Internal", "Pneumonia", 80.0, 0.0),
        patient("F", "Surgery", "Hernia", 40.0, 0.0),
        patient("M", "Surgery", "Hernia", 50.0, 0.0),
    ]);
    let state = state_for(&data, &[Action::SetPlotKind(PlotKind::DeathRate)]);
    let view = compute_view(&data, &state, &DashboardConfig::default());

    let labels: Vec<&str> = view.legend.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Pneumonia (50.00%)", "Other (0.00%)"]);
    assert_eq!(view.legend.title.as_deref(), Some("Top 1 Diseases:"));
    assert_eq!(
        view.legend.entries[0].action,
        Some(Action::SelectDisease(Some("Pneumonia".into())))
    );
    assert_eq!(view.legend.entries[1].action, None);
}

#[test]
fn scatter_department_legend_focuses_department() {
    let mut dash = Dashboard::new(ward(), DashboardConfig::default());
    dash.dispatch_all([
        Action::SetPlotKind(PlotKind::Scatter),
        Action::SetYField(Some(NumericField::Bmi)),
    ])
    .unwrap();
    let idx = dash
        .view()
        .legend
        .entries
        .iter()
        .position(|e| e.label == "Surgery")
        .unwrap();
    assert!(dash.click_legend(idx).unwrap());
    let departments: Vec<&str> = dash.state().departments.iter().map(String::as_str).collect();
    assert_eq!(departments, vec!["Surgery"]);
}

#[test]
fn view_serializes_to_json() {
    let data = ward();
    let view = compute_view(&data, &FilterState::new(data.domain()), &DashboardConfig::default());
    let v: serde_json::Value = serde_json::to_value(&view).unwrap();
    assert_eq!(v["chart"]["chart"], "distribution");
    assert!(v["marks"].as_array().unwrap().len() > 3);
}
