use dsplot::{DataFrame, Value, storage};
use std::fs;
use tempfile::tempdir;

#[test]
fn csv_round_trip_keeps_types_and_gaps() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("in.csv");
    fs::write(
        &src,
        "city,temp,seen\nBonn,12.5,2024-03-01 12:00:00\nKöln,,2024-03-02 08:30:00\nTrier,9,\n",
    )
    .unwrap();

    let df = DataFrame::from_csv_path(&src).unwrap();
    assert_eq!(df.len(), 3);
    assert_eq!(df.numeric_columns(), vec!["temp"]);
    assert!(df.is_temporal("seen").unwrap());
    assert!(df.column("temp").unwrap()[1].is_missing());
    assert_eq!(df.column("city").unwrap()[1], Value::from("Köln"));

    let out = dir.path().join("out.csv");
    storage::save_csv(&df, &out).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("index,city,temp,seen\n"));
    assert_eq!(text.lines().count(), 1 + df.len());
}

#[test]
fn json_rows_follow_column_order() {
    let dir = tempdir().unwrap();
    let df = DataFrame::builder()
        .column("b", [1.0, 2.0])
        .column("a", [Some("x"), None])
        .build()
        .unwrap();
    let path = dir.path().join("rows.json");
    storage::save_json(&df, &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["a"], serde_json::Value::Null);
    assert_eq!(rows[0]["b"], serde_json::json!(1.0));
    assert!(text.find("\"b\"").unwrap() < text.find("\"a\"").unwrap());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let r = DataFrame::from_csv_path(dir.path().join("nope.csv"));
    assert!(matches!(r, Err(dsplot::PlotError::Io(_))));
}
