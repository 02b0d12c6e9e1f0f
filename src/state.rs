//! Filter state and the reducer that updates it.
//!
//! `FilterState` is a plain value. UI code never edits it in place; it builds an
//! [`Action`] and asks [`FilterState::reduce`] for the next state.

use crate::error::StateError;
use crate::models::{Domain, NumericField, PlotKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FilterState {
    /// Selected sex codes. Empty means nothing is selected.
    pub sexes: BTreeSet<String>,
    /// Selected departments. Empty means nothing is selected.
    pub departments: BTreeSet<String>,
    pub disease: Option<String>,
    pub plot_kind: PlotKind,
    pub x_field: Option<NumericField>,
    pub y_field: Option<NumericField>,
    pub probe_x: Option<f64>,
    pub probe_y: Option<f64>,
}

/// Every way the UI can change the filter state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    ToggleSex(String),
    /// `true` selects every sex, `false` clears the selection.
    SetAllSexes(bool),
    ToggleDepartment(String),
    SetAllDepartments(bool),
    /// Select exactly one department.
    FocusDepartment(String),
    SelectDisease(Option<String>),
    /// Select a disease, or clear it if it is already the active one.
    ToggleDisease(String),
    SetPlotKind(PlotKind),
    SetXField(Option<NumericField>),
    SetYField(Option<NumericField>),
    SetProbe { x: Option<f64>, y: Option<f64> },
    ClearProbe,
}

impl FilterState {
    /// Initial state: every category selected, no disease, both axes on the first field.
    pub fn new(domain: &Domain) -> Self {
        Self {
            sexes: domain.sexes.iter().cloned().collect(),
            departments: domain.departments.iter().cloned().collect(),
            disease: None,
            plot_kind: PlotKind::Distribution,
            x_field: Some(NumericField::AXES[0]),
            y_field: Some(NumericField::AXES[0]),
            probe_x: None,
            probe_y: None,
        }
    }

    /// True when either category set is empty.
    pub fn is_empty_selection(&self) -> bool {
        self.sexes.is_empty() || self.departments.is_empty()
    }

    /// Apply `action` and return the next state. On error `self` is unchanged.
    pub fn reduce(&self, action: &Action, domain: &Domain) -> Result<FilterState, StateError> {
        let mut next = self.clone();
        match action {
            Action::ToggleSex(s) => {
                if !domain.has_sex(s) {
                    return Err(unknown("sex", s));
                }
                toggle(&mut next.sexes, s);
            }
            Action::SetAllSexes(on) => {
                next.sexes = if *on {
                    domain.sexes.iter().cloned().collect()
                } else {
                    BTreeSet::new()
                };
            }
            Action::ToggleDepartment(d) => {
                if !domain.has_department(d) {
                    return Err(unknown("department", d));
                }
                toggle(&mut next.departments, d);
            }
            Action::SetAllDepartments(on) => {
                next.departments = if *on {
                    domain.departments.iter().cloned().collect()
                } else {
                    BTreeSet::new()
                };
            }
            Action::FocusDepartment(d) => {
                if !domain.has_department(d) {
                    return Err(unknown("department", d));
                }
                next.departments = BTreeSet::from([d.clone()]);
            }
            Action::SelectDisease(dx) => {
                if let Some(dx) = dx {
                    if !domain.has_disease(dx) {
                        return Err(unknown("disease", dx));
                    }
                }
                next.disease = dx.clone();
            }
            Action::ToggleDisease(dx) => {
                if !domain.has_disease(dx) {
                    return Err(unknown("disease", dx));
                }
                next.disease = if next.disease.as_deref() == Some(dx.as_str()) {
                    None
                } else {
                    Some(dx.clone())
                };
            }
            Action::SetPlotKind(k) => next.plot_kind = *k,
            Action::SetXField(f) => next.x_field = *f,
            Action::SetYField(f) => next.y_field = *f,
            Action::SetProbe { x, y } => {
                if x.is_some_and(|v| !v.is_finite()) || y.is_some_and(|v| !v.is_finite()) {
                    return Err(StateError::InvalidProbe);
                }
                next.probe_x = *x;
                next.probe_y = *y;
            }
            Action::ClearProbe => {
                next.probe_x = None;
                next.probe_y = None;
            }
        }
        Ok(next)
    }
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

fn unknown(kind: &'static str, value: &str) -> StateError {
    StateError::UnknownCategory {
        kind,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> Domain {
        Domain {
            sexes: vec!["F".into(), "M".into()],
            departments: vec!["A".into(), "B".into()],
            diseases: vec!["asthma".into(), "flu".into()],
        }
    }

    #[test]
    fn defaults_select_everything() {
        let s = FilterState::new(&domain());
        assert_eq!(s.sexes.len(), 2);
        assert_eq!(s.departments.len(), 2);
        assert_eq!(s.disease, None);
        assert_eq!(s.x_field, Some(NumericField::Age));
        assert_eq!(s.y_field, Some(NumericField::Age));
        assert_eq!(s.plot_kind, PlotKind::Distribution);
    }

    #[test]
    fn toggle_twice_is_identity() {
        let d = domain();
        let s0 = FilterState::new(&d);
        let s1 = s0.reduce(&Action::ToggleSex("M".into()), &d).unwrap();
        assert!(!s1.sexes.contains("M"));
        let s2 = s1.reduce(&Action::ToggleSex("M".into()), &d).unwrap();
        assert_eq!(s0, s2);
    }

    #[test]
    fn reselecting_disease_clears_it() {
        let d = domain();
        let s = FilterState::new(&d)
            .reduce(&Action::ToggleDisease("flu".into()), &d)
            .unwrap();
        assert_eq!(s.disease.as_deref(), Some("flu"));
        let s = s.reduce(&Action::ToggleDisease("flu".into()), &d).unwrap();
        assert_eq!(s.disease, None);
    }

    #[test]
    fn non_finite_probe_rejected() {
        let d = domain();
        let s = FilterState::new(&d);
        let err = s
            .reduce(&Action::SetProbe { x: Some(f64::NAN), y: None }, &d)
            .unwrap_err();
        assert_eq!(err, StateError::InvalidProbe);
    }
}
