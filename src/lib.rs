//! vitaldash
//!
//! A small Rust library for exploring a tabular clinical dataset: filter patients by sex,
//! department and disease, aggregate the filtered rows, and chart them. Pairs with the
//! `vitaldash` CLI and the `vitaldash-gui` desktop app.
//!
//! ### Features
//! - Load a patient CSV once; numeric cells are typed as `Option<f64>`
//! - A serialisable filter state, changed only through [`FilterState::reduce`]
//! - A pure [`compute_view`] producing marks, legend, tooltips and a summary
//! - Four charts (distribution, scatter, pie, death rate) rendered to SVG with plotters
//! - Linked legends: entries carry the [`Action`] they trigger when clicked
//!
//! ### Example
//! ```no_run
//! use vitaldash::{Action, Dashboard, DashboardConfig, PlotKind};
//!
//! let config = DashboardConfig::default();
//! let data = vitaldash::storage::load_csv("patients.csv", &config.outcome_column)?;
//! let mut dash = Dashboard::new(data, config);
//! dash.dispatch(Action::SetPlotKind(PlotKind::DeathRate))?;
//! dash.dispatch(Action::ToggleDisease("Pneumonia".into()))?;
//! for line in &dash.view().summary {
//!     println!("{line}");
//! }
//! dash.render_svg("death_rate.svg")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod models;
pub mod palette;
pub mod state;
pub mod stats;
pub mod storage;
pub mod view;
pub mod viz;

pub use config::{DashboardConfig, LegendPlacement, PieMode};
pub use dashboard::Dashboard;
pub use error::{DashError, StateError};
pub use filter::FilteredResult;
pub use models::{Dataset, Domain, NumericField, PlotKind, Row};
pub use state::{Action, FilterState};
pub use view::{ChartView, EmptyReason, View, compute_view};
