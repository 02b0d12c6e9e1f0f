//! Loading the patient table and writing filtered rows or views back out.

use crate::error::{DashError, Result};
use crate::models::{Dataset, NumericField, Row};
use crate::view::View;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

const CATEGORY_COLUMNS: [&str; 3] = ["sex", "department", "dx"];

/// Column positions resolved from the header.
struct Columns {
    sex: usize,
    department: usize,
    dx: usize,
    age: usize,
    height: usize,
    weight: usize,
    bmi: usize,
    outcome: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord, outcome_column: &str) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| DashError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            sex: find(CATEGORY_COLUMNS[0])?,
            department: find(CATEGORY_COLUMNS[1])?,
            dx: find(CATEGORY_COLUMNS[2])?,
            age: find(NumericField::Age.column())?,
            height: find(NumericField::Height.column())?,
            weight: find(NumericField::Weight.column())?,
            bmi: find(NumericField::Bmi.column())?,
            outcome: find(outcome_column)?,
        })
    }
}

/// Parse a numeric cell. Blank, unparsable and non-finite cells are `None`.
pub fn parse_numeric(cell: &str) -> Option<f64> {
    let t = cell.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Load the table from a CSV file.
pub fn load_csv<P: AsRef<Path>>(path: P, outcome_column: &str) -> Result<Dataset> {
    let path = path.as_ref();
    log::info!("Loading {}", path.display());
    let file = File::open(path)?;
    load_csv_reader(file, outcome_column)
}

/// Load the table from any reader holding CSV with a header row.
pub fn load_csv_reader<R: Read>(reader: R, outcome_column: &str) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let cols = Columns::resolve(rdr.headers()?, outcome_column)?;

    let mut rows = Vec::new();
    let mut unparsable = 0usize;
    for rec in rdr.records() {
        let rec = rec?;
        let text = |i: usize| rec.get(i).unwrap_or("").to_string();
        let mut num = |i: usize| {
            let cell = rec.get(i).unwrap_or("");
            let v = parse_numeric(cell);
            if v.is_none() && !cell.trim().is_empty() {
                unparsable += 1;
            }
            v
        };
        rows.push(Row {
            sex: text(cols.sex),
            department: text(cols.department),
            dx: text(cols.dx),
            age: num(cols.age),
            height: num(cols.height),
            weight: num(cols.weight),
            bmi: num(cols.bmi),
            death_inhosp: num(cols.outcome),
        });
    }

    if rows.is_empty() {
        return Err(DashError::EmptyDataset);
    }
    let ds = Dataset::new(rows);
    log::info!(
        "Loaded {} rows ({} sexes, {} departments, {} diseases); {} unparsable numeric cells",
        ds.len(),
        ds.domain().sexes.len(),
        ds.domain().departments.len(),
        ds.domain().diseases.len(),
        unparsable
    );
    Ok(ds)
}

/// Save rows as CSV with header. Missing numerics are written as empty cells.
pub fn save_rows_csv<P: AsRef<Path>>(rows: &[&Row], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize((
        "sex",
        "department",
        "dx",
        "age",
        "height",
        "weight",
        "bmi",
        "death_inhosp",
    ))?;
    for r in rows {
        wtr.serialize((
            &r.sex,
            &r.department,
            &r.dx,
            r.age,
            r.height,
            r.weight,
            r.bmi,
            r.death_inhosp,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save rows as a pretty JSON array.
pub fn save_rows_json<P: AsRef<Path>>(rows: &[&Row], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save a view model as pretty JSON.
pub fn save_view_json<P: AsRef<Path>>(view: &View, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(view)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CSV: &str = "\
sex,department,dx,age,height,weight,bmi,death_inhosp,extra
M,A,flu,10,170,70,24.2,0,x
F,A,flu,abc,,60,21,1,y
";

    #[test]
    fn bad_numbers_become_none() {
        let ds = load_csv_reader(CSV.as_bytes(), "death_inhosp").unwrap();
        assert_eq!(ds.len(), 2);
        let r = &ds.rows()[1];
        assert_eq!(r.age, None);
        assert_eq!(r.height, None);
        assert_eq!(r.weight, Some(60.0));
        assert_eq!(r.death_inhosp, Some(1.0));
    }

    #[test]
    fn write_csv_and_json() {
        let ds = load_csv_reader(CSV.as_bytes(), "death_inhosp").unwrap();
        let rows: Vec<&Row> = ds.rows().iter().collect();
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        save_rows_csv(&rows, &csvp).unwrap();
        save_rows_json(&rows, &jsonp).unwrap();
        let back = load_csv(&csvp, "death_inhosp").unwrap();
        assert_eq!(back.rows(), ds.rows());
        assert!(jsonp.exists());
    }

    #[test]
    fn nan_cell_is_none() {
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric(" 4.5 "), Some(4.5));
        assert_eq!(parse_numeric(""), None);
    }
}
