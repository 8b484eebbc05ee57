use dsplot::charts::{HistOptions, ScatterMapOptions, ScatterOptions};
use dsplot::geo::{Projection, Region};
use dsplot::session::{FinishOptions, PlotFrame};
use dsplot::{DataFrame, GridShape, Session};
use std::fs;
use tempfile::tempdir;

fn sample() -> DataFrame {
    DataFrame::builder()
        .column("x", [1.0, 2.0, 3.0, 4.0, 5.0])
        .column("y", [3.0, 1.0, 4.0, 1.0, 5.0])
        .build()
        .unwrap()
}

#[test]
fn one_shot_chart_writes_svg() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("charts/hist.svg");
    let mut s = Session::new();
    let opts = HistOptions {
        frame: PlotFrame::titled("Spread").export_to(&path),
        ..Default::default()
    };
    s.hist(&sample(), "x", &opts).unwrap();
    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("<rect"));
}

#[test]
fn multiplot_writes_png_once_on_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("multi.png");
    let mut s = Session::new();
    s.begin((4.0, 2.0), GridShape::new(1, 2).unwrap()).unwrap();
    s.hist(&sample(), "x", &HistOptions::default()).unwrap();
    s.scatter(&sample(), "x", "y", &ScatterOptions {
        frame: PlotFrame::default().in_cell(0, 1),
        ..Default::default()
    })
    .unwrap();
    assert!(!path.exists());
    let mut finish = FinishOptions::export_to(&path);
    finish.export = finish.export.map(|e| e.with_dpi(50));
    s.end(&finish).unwrap();
    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}

#[test]
fn map_renders_to_svg() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("map.svg");
    let df = DataFrame::builder()
        .column("latitude", [50.7, 52.5])
        .column("longitude", [7.1, 13.4])
        .build()
        .unwrap();
    let mut s = Session::new();
    let opts = ScatterMapOptions {
        region: Some(Region::new(45.0, 0.0, 56.0, 20.0)),
        projection: Projection::Miller,
        frame: PlotFrame::default().export_to(&path),
        ..Default::default()
    };
    s.scatter_map(&df, &opts).unwrap();
    assert!(fs::metadata(&path).unwrap().len() > 0);
}
