//! The dashboard actor: one dataset, one filter state, one current view.

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::models::Dataset;
use crate::state::{Action, FilterState};
use crate::view::{View, compute_view};
use std::path::Path;

pub struct Dashboard {
    dataset: Dataset,
    config: DashboardConfig,
    state: FilterState,
    view: View,
    generation: u64,
}

impl Dashboard {
    /// Start with every category selected and draw once.
    pub fn new(dataset: Dataset, config: DashboardConfig) -> Self {
        let state = FilterState::new(dataset.domain());
        let view = compute_view(&dataset, &state, &config);
        Self {
            dataset,
            config,
            state,
            view,
            generation: 1,
        }
    }

    /// Start from an explicit state, e.g. one built from CLI flags.
    pub fn with_state(dataset: Dataset, config: DashboardConfig, state: FilterState) -> Self {
        let view = compute_view(&dataset, &state, &config);
        Self {
            dataset,
            config,
            state,
            view,
            generation: 1,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Number of completed redraws.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reduce `action` into the state and redraw. A rejected action leaves everything as it was.
    pub fn dispatch(&mut self, action: Action) -> Result<&View> {
        let next = self.state.reduce(&action, self.dataset.domain())?;
        self.state = next;
        Ok(self.redraw())
    }

    /// Apply several actions, redrawing once at the end.
    pub fn dispatch_all<I: IntoIterator<Item = Action>>(&mut self, actions: I) -> Result<&View> {
        let mut next = self.state.clone();
        for a in actions {
            next = next.reduce(&a, self.dataset.domain())?;
        }
        self.state = next;
        Ok(self.redraw())
    }

    /// Recompute the view from the current state.
    pub fn redraw(&mut self) -> &View {
        self.view = compute_view(&self.dataset, &self.state, &self.config);
        self.generation += 1;
        log::debug!(
            "redraw #{} ({}, {} marks)",
            self.generation,
            self.state.plot_kind.label(),
            self.view.marks.len()
        );
        &self.view
    }

    /// Replace the settings and redraw.
    pub fn set_config(&mut self, config: DashboardConfig) -> Result<&View> {
        config.validate()?;
        self.config = config;
        Ok(self.redraw())
    }

    /// Dispatch the action behind legend entry `index`. Returns `false` for inert entries.
    pub fn click_legend(&mut self, index: usize) -> Result<bool> {
        let Some(action) = self
            .view
            .legend
            .entries
            .get(index)
            .and_then(|e| e.action.clone())
        else {
            return Ok(false);
        };
        self.dispatch(action)?;
        Ok(true)
    }

    pub fn tooltip(&self, mark_id: &str) -> Option<&str> {
        self.view.tooltip(mark_id)
    }

    /// Draw the current view to an SVG file.
    pub fn render_svg<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        crate::viz::render_svg(&self.view, &self.config, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DashError, StateError};
    use crate::models::{PlotKind, Row};

    fn row(dept: &str, dx: &str) -> Row {
        Row {
            sex: "F".into(),
            department: dept.into(),
            dx: dx.into(),
            age: Some(33.0),
            height: None,
            weight: None,
            bmi: Some(22.0),
            death_inhosp: Some(0.0),
        }
    }

    #[test]
    fn rejected_action_keeps_state_and_generation() {
        let mut d = Dashboard::new(
            Dataset::new(vec![row("A", "flu")]),
            DashboardConfig::default(),
        );
        let before = d.state().clone();
        let g = d.generation();
        let err = d.dispatch(Action::ToggleDepartment("Z".into())).unwrap_err();
        assert!(matches!(
            err,
            DashError::State(StateError::UnknownCategory { .. })
        ));
        assert_eq!(d.state(), &before);
        assert_eq!(d.generation(), g);
    }

    #[test]
    fn legend_click_focuses_department() {
        let mut d = Dashboard::new(
            Dataset::new(vec![row("A", "flu"), row("B", "gout")]),
            DashboardConfig::default(),
        );
        d.dispatch(Action::SetPlotKind(PlotKind::Scatter)).unwrap();
        d.dispatch(Action::SetYField(Some(crate::models::NumericField::Bmi)))
            .unwrap();
        assert!(d.click_legend(1).unwrap());
        assert_eq!(d.state().departments.len(), 1);
        assert!(d.state().departments.contains("B"));
    }
}
