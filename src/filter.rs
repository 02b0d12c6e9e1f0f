//! Row filtering by sex, department and disease.

use crate::models::{Dataset, Row};
use crate::state::FilterState;
use std::collections::BTreeSet;

/// Rows surviving the current filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredResult<'a> {
    /// Sex and department filters applied, disease ignored.
    pub all_but_disease: Vec<&'a Row>,
    /// All filters applied.
    pub matching_all: Vec<&'a Row>,
}

impl FilteredResult<'_> {
    pub fn is_empty(&self) -> bool {
        self.all_but_disease.is_empty()
    }
}

/// Filter `dataset` by `state`.
///
/// An empty sex or department selection yields no rows at all. A selection equal to the
/// whole domain does not restrict.
pub fn apply<'a>(dataset: &'a Dataset, state: &FilterState) -> FilteredResult<'a> {
    if state.is_empty_selection() {
        return FilteredResult::default();
    }
    let domain = dataset.domain();
    let sex_filter = restriction(&state.sexes, &domain.sexes);
    let dept_filter = restriction(&state.departments, &domain.departments);

    let all_but_disease: Vec<&Row> = dataset
        .rows()
        .iter()
        .filter(|r| sex_filter.is_none_or(|s| s.contains(&r.sex)))
        .filter(|r| dept_filter.is_none_or(|d| d.contains(&r.department)))
        .collect();

    let matching_all = match &state.disease {
        Some(dx) => all_but_disease
            .iter()
            .copied()
            .filter(|r| &r.dx == dx)
            .collect(),
        None => all_but_disease.clone(),
    };

    FilteredResult {
        all_but_disease,
        matching_all,
    }
}

fn restriction<'s>(selected: &'s BTreeSet<String>, domain: &[String]) -> Option<&'s BTreeSet<String>> {
    let covers_domain =
        selected.len() == domain.len() && domain.iter().all(|v| selected.contains(v));
    if covers_domain { None } else { Some(selected) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Action;

    fn row(sex: &str, dept: &str, dx: &str) -> Row {
        Row {
            sex: sex.into(),
            department: dept.into(),
            dx: dx.into(),
            age: Some(30.0),
            height: None,
            weight: None,
            bmi: None,
            death_inhosp: None,
        }
    }

    #[test]
    fn partial_selection_restricts() {
        let ds = Dataset::new(vec![row("M", "A", "flu"), row("F", "B", "flu")]);
        let st = FilterState::new(ds.domain())
            .reduce(&Action::ToggleDepartment("B".into()), ds.domain())
            .unwrap();
        let out = apply(&ds, &st);
        assert_eq!(out.all_but_disease.len(), 1);
        assert_eq!(out.all_but_disease[0].department, "A");
    }

    #[test]
    fn disease_only_narrows_matching_all() {
        let ds = Dataset::new(vec![row("M", "A", "flu"), row("F", "A", "gout")]);
        let st = FilterState::new(ds.domain())
            .reduce(&Action::SelectDisease(Some("gout".into())), ds.domain())
            .unwrap();
        let out = apply(&ds, &st);
        assert_eq!(out.all_but_disease.len(), 2);
        assert_eq!(out.matching_all.len(), 1);
        assert_eq!(out.matching_all[0].dx, "gout");
    }
}
