use vitaldash::{Action, Dataset, FilterState, NumericField, PlotKind, Row, StateError};

fn domain_rows() -> Dataset {
    let row = |sex: &str, dept: &str, dx: &str| Row {
        sex: sex.into(),
        department: dept.into(),
        dx: dx.into(),
        age: Some(50.0),
        height: None,
        weight: None,
        bmi: None,
        death_inhosp: Some(0.0),
    };
    Dataset::new(vec![
        row("F", "Surgery", "Hernia"),
        row("M", "Internal", "Pneumonia"),
        row("M", "Surgery", "Appendicitis"),
    ])
}

#[test]
fn select_all_then_none_then_all() {
    let data = domain_rows();
    let d = data.domain();
    let s0 = FilterState::new(d);
    let none = s0.reduce(&Action::SetAllDepartments(false), d).unwrap();
    assert!(none.departments.is_empty());
    assert!(none.is_empty_selection());
    let all = none.reduce(&Action::SetAllDepartments(true), d).unwrap();
    assert_eq!(all, s0);
}

#[test]
fn focus_department_selects_exactly_one() {
    let data = domain_rows();
    let d = data.domain();
    let s = FilterState::new(d)
        .reduce(&Action::FocusDepartment("Internal".into()), d)
        .unwrap();
    assert_eq!(s.departments.len(), 1);
    assert!(s.departments.contains("Internal"));
    assert_eq!(s.sexes.len(), 2);
}

#[test]
fn unknown_values_and_bad_probes_are_rejected() {
    let data = domain_rows();
    let d = data.domain();
    let s = FilterState::new(d);
    assert!(matches!(
        s.reduce(&Action::ToggleSex("X".into()), d),
        Err(StateError::UnknownCategory { .. })
    ));
    assert!(matches!(
        s.reduce(&Action::SelectDisease(Some("Gout".into())), d),
        Err(StateError::UnknownCategory { .. })
    ));
    assert_eq!(
        s.reduce(
            &Action::SetProbe {
                x: Some(f64::NAN),
                y: None
            },
            d
        ),
        Err(StateError::InvalidProbe)
    );
}

#[test]
fn state_survives_json() {
    let data = domain_rows();
    let d = data.domain();
    let s = [
        Action::SetPlotKind(PlotKind::Scatter),
        Action::SetYField(Some(NumericField::Weight)),
        Action::ToggleDisease("Hernia".into()),
        Action::SetProbe {
            x: Some(40.0),
            y: Some(70.0),
        },
    ]
    .iter()
    .fold(FilterState::new(d), |s, a| s.reduce(a, d).unwrap());

    let json = serde_json::to_string(&s).unwrap();
    let back: FilterState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, s);
    assert_eq!(back.disease.as_deref(), Some("Hernia"));
}
