use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// One patient record (one row of the input table).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Row {
    pub sex: String,
    pub department: String,
    /// Diagnosis category.
    pub dx: String,
    pub age: Option<f64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub bmi: Option<f64>,
    /// In-hospital death indicator (0/1) or rate.
    pub death_inhosp: Option<f64>,
}

impl Row {
    pub fn value(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::Age => self.age,
            NumericField::Height => self.height,
            NumericField::Weight => self.weight,
            NumericField::Bmi => self.bmi,
            NumericField::DeathInhosp => self.death_inhosp,
        }
    }
}

/// Numeric columns of a [`Row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Age,
    Height,
    Weight,
    Bmi,
    DeathInhosp,
}

impl NumericField {
    /// Fields offered as chart axes, in menu order.
    pub const AXES: [NumericField; 4] = [
        NumericField::Age,
        NumericField::Height,
        NumericField::Weight,
        NumericField::Bmi,
    ];

    /// Default CSV header for this field.
    pub fn column(self) -> &'static str {
        match self {
            NumericField::Age => "age",
            NumericField::Height => "height",
            NumericField::Weight => "weight",
            NumericField::Bmi => "bmi",
            NumericField::DeathInhosp => "death_inhosp",
        }
    }

    /// Axis title including the unit.
    pub fn label(self) -> &'static str {
        match self {
            NumericField::Age => "Age",
            NumericField::Height => "Height (cm)",
            NumericField::Weight => "Weight (kg)",
            NumericField::Bmi => "BMI (kg/m²)",
            NumericField::DeathInhosp => "Death rate",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for NumericField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "age" => Ok(NumericField::Age),
            "height" => Ok(NumericField::Height),
            "weight" => Ok(NumericField::Weight),
            "bmi" => Ok(NumericField::Bmi),
            "death_inhosp" | "death" => Ok(NumericField::DeathInhosp),
            other => Err(format!("unknown numeric field '{other}'")),
        }
    }
}

/// Chart kinds the dashboard can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    #[default]
    Distribution,
    Scatter,
    Pie,
    DeathRate,
}

impl PlotKind {
    pub const ALL: [PlotKind; 4] = [
        PlotKind::Distribution,
        PlotKind::Scatter,
        PlotKind::Pie,
        PlotKind::DeathRate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PlotKind::Distribution => "Distribution",
            PlotKind::Scatter => "Scatter plot",
            PlotKind::Pie => "Pie chart",
            PlotKind::DeathRate => "Death rate",
        }
    }

    /// Whether the chart reads `x_field`.
    pub fn uses_x(self) -> bool {
        !matches!(self, PlotKind::Pie)
    }

    /// Whether the chart reads `y_field`.
    pub fn uses_y(self) -> bool {
        matches!(self, PlotKind::Scatter)
    }
}

/// Display name for a sex code (`F` → `Female`, `M` → `Male`).
pub fn sex_label(code: &str) -> &str {
    match code {
        "F" => "Female",
        "M" => "Male",
        other => other,
    }
}

/// Known category values, each sorted and de-duplicated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Domain {
    pub sexes: Vec<String>,
    pub departments: Vec<String>,
    pub diseases: Vec<String>,
}

impl Domain {
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut sexes = BTreeSet::new();
        let mut departments = BTreeSet::new();
        let mut diseases = BTreeSet::new();
        for r in rows {
            sexes.insert(r.sex.clone());
            departments.insert(r.department.clone());
            diseases.insert(r.dx.clone());
        }
        Self {
            sexes: sexes.into_iter().collect(),
            departments: departments.into_iter().collect(),
            diseases: diseases.into_iter().collect(),
        }
    }

    pub fn has_sex(&self, s: &str) -> bool {
        self.sexes.binary_search_by(|v| v.as_str().cmp(s)).is_ok()
    }

    pub fn has_department(&self, d: &str) -> bool {
        self.departments.binary_search_by(|v| v.as_str().cmp(d)).is_ok()
    }

    pub fn has_disease(&self, dx: &str) -> bool {
        self.diseases.binary_search_by(|v| v.as_str().cmp(dx)).is_ok()
    }
}

/// Immutable collection of rows, loaded once.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<Row>,
    domain: Domain,
}

impl Dataset {
    pub fn new(rows: Vec<Row>) -> Self {
        let domain = Domain::from_rows(&rows);
        Self { rows, domain }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<Row>> for Dataset {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}
