use vitaldash::aggregate::{BinRange, distribution_bins};
use vitaldash::{Action, Dashboard, DashboardConfig, Dataset, FilterState, NumericField, Row, filter};

fn patient(sex: &str, department: &str, dx: &str, age: f64) -> Row {
    Row {
        sex: sex.into(),
        department: department.into(),
        dx: dx.into(),
        age: Some(age),
        height: None,
        weight: None,
        bmi: None,
        death_inhosp: None,
    }
}

fn two_flu_patients() -> Dataset {
    Dataset::new(vec![
        patient("M", "A", "flu", 10.0),
        patient("F", "A", "flu", 40.0),
    ])
}

#[test]
fn age_bins_of_width_five() {
    let data = two_flu_patients();
    let state = FilterState::new(data.domain());
    let filtered = filter::apply(&data, &state);
    assert_eq!(filtered.all_but_disease.len(), 2);

    let table = distribution_bins(
        &filtered.all_but_disease,
        NumericField::Age,
        5.0,
        &["flu".to_string()],
    );
    assert_eq!(
        table.bins,
        vec![
            BinRange::Span {
                lower: 10.0,
                upper: 15.0
            },
            BinRange::Span {
                lower: 40.0,
                upper: 45.0
            },
        ]
    );
    assert_eq!(table.bins[0].label(), "10-14");
    assert_eq!(table.bins[1].label(), "40-44");
    assert_eq!(table.bin_total(0), 1);
    assert_eq!(table.bin_total(1), 1);
}

#[test]
fn no_department_gives_empty_result_and_empty_view() {
    let mut dash = Dashboard::new(two_flu_patients(), DashboardConfig::default());
    dash.dispatch(Action::SetAllDepartments(false)).unwrap();

    let filtered = filter::apply(dash.dataset(), dash.state());
    assert!(filtered.is_empty());
    assert!(filtered.all_but_disease.is_empty());
    assert!(dash.view().empty_reason().is_some());
    assert!(dash.view().marks.is_empty());

    // drawing the empty state must not fail either
    let svg = vitaldash::viz::render_svg_string(dash.view(), dash.config()).unwrap();
    assert!(svg.contains("No sex or department selected."));
}

#[test]
fn disease_filter_on_matching_rows() {
    let data = two_flu_patients();
    let state = FilterState::new(data.domain())
        .reduce(&Action::SelectDisease(Some("flu".into())), data.domain())
        .unwrap();
    let filtered = filter::apply(&data, &state);
    assert_eq!(filtered.matching_all.len(), 2);
    assert_eq!(filtered.all_but_disease.len(), 2);
}

#[test]
fn partial_sex_selection_restricts() {
    let data = two_flu_patients();
    let domain = data.domain();
    let state = FilterState::new(domain)
        .reduce(&Action::ToggleSex("M".into()), domain)
        .unwrap();
    let filtered = filter::apply(&data, &state);
    assert_eq!(filtered.all_but_disease.len(), 1);
    assert_eq!(filtered.all_but_disease[0].sex, "F");
}
