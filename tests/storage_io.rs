use std::fs;
use vitaldash::storage;
use vitaldash::{DashError, Row};

const CSV: &str = "\
sex,department,dx,age,height,weight,bmi,death_inhosp
F,General surgery,Cholecystitis,54,161.2,70.1,27.0,0
M,Thoracic surgery,Lung cancer,67,,80,n/a,1
M,General surgery,Cholecystitis, 41 ,175,72.5,23.7,0
";

#[test]
fn loads_typed_rows_with_missing_numbers() {
    let data = storage::load_csv_reader(CSV.as_bytes(), "death_inhosp").unwrap();
    assert_eq!(data.len(), 3);
    let r = &data.rows()[1];
    assert_eq!(r.dx, "Lung cancer");
    assert_eq!(r.height, None);
    assert_eq!(r.bmi, None);
    assert_eq!(r.death_inhosp, Some(1.0));
    assert_eq!(data.rows()[2].age, Some(41.0));
    assert_eq!(
        data.domain().departments,
        vec!["General surgery".to_string(), "Thoracic surgery".to_string()]
    );
}

#[test]
fn missing_column_is_reported_by_name() {
    let csv = "sex,department,dx,age,height,weight,bmi\nF,A,flu,1,2,3,4\n";
    let err = storage::load_csv_reader(csv.as_bytes(), "death_inhosp").unwrap_err();
    match err {
        DashError::MissingColumn(name) => assert_eq!(name, "death_inhosp"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn header_only_file_is_empty_dataset() {
    let csv = "sex,department,dx,age,height,weight,bmi,death_inhosp\n";
    let err = storage::load_csv_reader(csv.as_bytes(), "death_inhosp").unwrap_err();
    assert!(matches!(err, DashError::EmptyDataset));
}

#[test]
fn custom_outcome_column() {
    let csv = "sex,department,dx,age,height,weight,bmi,died\nF,A,flu,1,2,3,4,1\n";
    let data = storage::load_csv_reader(csv.as_bytes(), "died").unwrap();
    assert_eq!(data.rows()[0].death_inhosp, Some(1.0));
}

#[test]
fn save_rows_csv_and_json() {
    let data = storage::load_csv_reader(CSV.as_bytes(), "death_inhosp").unwrap();
    let rows: Vec<&Row> = data.rows().iter().collect();
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("rows.csv");
    storage::save_rows_csv(&rows, &csv_path).unwrap();
    let back = storage::load_csv(&csv_path, "death_inhosp").unwrap();
    assert_eq!(back.rows(), data.rows());

    let json_path = dir.path().join("rows.json");
    storage::save_rows_json(&rows, &json_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 3);
    assert!(v[1]["bmi"].is_null());
}
