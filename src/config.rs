//! Dashboard settings.
//!
//! Settings are plain JSON. Every field is optional in the file; missing fields take
//! the defaults below. The binaries look for `--config <path>` first and then for
//! `<config_dir>/vitaldash/config.json`.

use crate::error::{DashError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Which pie layout to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PieMode {
    /// Two slices: the selected disease against the rest of the department.
    #[default]
    SelectedVsOthers,
    /// Three slices: selected female, selected male, everyone else.
    SexSplit,
}

/// Where the legend panel goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LegendPlacement {
    #[default]
    Right,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV header of the outcome column.
    pub outcome_column: String,
    /// Width of the distribution buckets.
    pub bin_width: f64,
    /// Number of equal-width bins for the death-rate chart.
    pub death_rate_bins: usize,
    pub top_k: usize,
    pub pie_mode: PieMode,
    pub pie_start_angle_deg: f64,
    pub width: u32,
    pub height: u32,
    pub legend: LegendPlacement,
    /// Locale name for count formatting (e.g. `en`, `de`, `fr`).
    pub locale: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            outcome_column: "death_inhosp".into(),
            bin_width: 5.0,
            death_rate_bins: 10,
            top_k: 5,
            pie_mode: PieMode::SelectedVsOthers,
            pie_start_angle_deg: -90.0,
            width: 1000,
            height: 600,
            legend: LegendPlacement::Right,
            locale: "en".into(),
        }
    }
}

impl DashboardConfig {
    /// Parse and validate a JSON settings file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let cfg: DashboardConfig = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Default settings location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("vitaldash").join("config.json"))
    }

    /// Explicit path if given, else the default location if that file exists, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(p) = explicit {
            return Self::from_path(p);
        }
        match Self::default_path() {
            Some(p) if p.is_file() => {
                log::info!("Using settings from {}", p.display());
                Self::from_path(p)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.bin_width.is_finite() && self.bin_width > 0.0) {
            return Err(DashError::Config(format!(
                "bin_width must be a positive number, got {}",
                self.bin_width
            )));
        }
        if self.death_rate_bins == 0 {
            return Err(DashError::Config("death_rate_bins must be at least 1".into()));
        }
        if self.top_k == 0 {
            return Err(DashError::Config("top_k must be at least 1".into()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(DashError::Config("width and height must be non-zero".into()));
        }
        if !self.pie_start_angle_deg.is_finite() {
            return Err(DashError::Config("pie_start_angle_deg must be finite".into()));
        }
        if self.outcome_column.trim().is_empty() {
            return Err(DashError::Config("outcome_column must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("config.json");
        fs::write(&p, r#"{ "top_k": 3, "pie_mode": "sex_split" }"#).unwrap();
        let cfg = DashboardConfig::from_path(&p).unwrap();
        assert_eq!(cfg.top_k, 3);
        assert_eq!(cfg.pie_mode, PieMode::SexSplit);
        assert_eq!(cfg.bin_width, 5.0);
        assert_eq!(cfg.outcome_column, "death_inhosp");
    }

    #[test]
    fn zero_bins_rejected() {
        let cfg = DashboardConfig {
            death_rate_bins: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(DashError::Config(_))));

        let cfg = DashboardConfig {
            bin_width: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
