use approx::assert_abs_diff_eq;
use dsplot::charts::{
    ColorSpec, GroupedBarOptions, LineOptions, MatrixOptions, PieOptions, PieSort,
};
use dsplot::figure::{Mark, TickFormat};
use dsplot::{DataFrame, PlotError, Rgba, Series, Session};
use std::collections::BTreeMap;

fn wedge_labels(s: &Session) -> Vec<String> {
    s.last_figure().unwrap().all_axes()[0]
        .marks
        .iter()
        .filter_map(|m| match m {
            Mark::Wedge { label, .. } => label.clone(),
            _ => None,
        })
        .collect()
}

#[test]
fn pie_accepts_a_series_and_drops_missing_rows() {
    let series = Series::new("share", [Some(2.0), None, Some(6.0)])
        .with_index(["a", "b", "c"])
        .unwrap();
    let mut s = Session::new();
    s.pie(&series, &PieOptions::default()).unwrap();
    assert_eq!(wedge_labels(&s), vec!["a", "c"]);
    let pct: Vec<String> = s.last_figure().unwrap().all_axes()[0]
        .marks
        .iter()
        .filter_map(|m| match m {
            Mark::Wedge { pct_label, .. } => pct_label.clone(),
            _ => None,
        })
        .collect();
    assert_eq!(pct, vec!["25.0%", "75.0%"]);
}

#[test]
fn pie_sorting_and_keyed_colors() {
    let df = DataFrame::builder()
        .column("n", [1.0, 5.0, 3.0])
        .column("fruit", ["pear", "apple", "fig"])
        .build()
        .unwrap();
    let mut colors = BTreeMap::new();
    colors.insert("fig".to_string(), Rgba::BLACK);
    let mut s = Session::new();
    let opts = PieOptions {
        label_column: Some("fruit".into()),
        sort: Some(PieSort::Label),
        colors: ColorSpec::Keyed(colors),
        ..Default::default()
    };
    s.pie((&df, "n"), &opts).unwrap();
    assert_eq!(wedge_labels(&s), vec!["apple", "fig", "pear"]);
    let fig_color = s.last_figure().unwrap().all_axes()[0]
        .marks
        .iter()
        .find_map(|m| match m {
            Mark::Wedge { label: Some(l), color, .. } if l == "fig" => Some(*color),
            _ => None,
        });
    assert_eq!(fig_color, Some(Rgba::BLACK));

    let opts = PieOptions {
        sort: Some(PieSort::Value),
        ..opts
    };
    s.pie((&df, "n"), &opts).unwrap();
    assert_eq!(wedge_labels(&s), vec!["apple", "fig", "pear"]);
}

#[test]
fn pie_groups_counts_rows() {
    let df = DataFrame::builder()
        .column("kind", ["b", "a", "b", "b"])
        .build()
        .unwrap();
    let mut s = Session::new();
    s.pie_groups(&df, "kind", &PieOptions::default()).unwrap();
    assert_eq!(wedge_labels(&s), vec!["b", "a"]);
}

#[test]
fn relative_stacked_bars_reach_hundred() {
    let df = DataFrame::builder()
        .column("v", [2.0, 2.0, 2.0, 6.0])
        .column("g", ["a", "a", "b", "b"])
        .column("pos", ["x", "y", "x", "y"])
        .build()
        .unwrap();
    let mut s = Session::new();
    let opts = GroupedBarOptions {
        label_column: Some("pos".into()),
        stacked: true,
        relative: true,
        ..Default::default()
    };
    s.bar_groups(&df, "v", "g", &opts).unwrap();
    let ax = &s.last_figure().unwrap().all_axes()[0];
    let tops: Vec<f64> = ax
        .marks
        .iter()
        .filter_map(|m| match m {
            Mark::Rect { y1, .. } => Some(*y1),
            _ => None,
        })
        .collect();
    assert_eq!(tops.len(), 4);
    assert_abs_diff_eq!(tops[2], 100.0);
    assert_abs_diff_eq!(tops[3], 100.0);
    assert_eq!(ax.x_ticks.as_ref().map(Vec::len), Some(2));
    assert_eq!(ax.legend.len(), 2);
    assert_eq!(ax.y_label.as_deref(), Some("v (%)"));
}

#[test]
fn lines_average_and_time_axis() {
    let times: Vec<chrono::NaiveDateTime> = (0..5)
        .map(|d| {
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1 + d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        })
        .collect();
    let df = DataFrame::builder()
        .column("v", [1.0, 2.0, 3.0, 4.0, 5.0])
        .column("day", times)
        .build()
        .unwrap();
    let mut s = Session::new();
    let opts = LineOptions {
        x_column: Some("day".into()),
        avg_window: Some(3),
        ..Default::default()
    };
    s.lines(&df, "v", &opts).unwrap();
    let ax = &s.last_figure().unwrap().all_axes()[0];
    assert_eq!(ax.x_format, TickFormat::Time);
    let Mark::Line { points, .. } = &ax.marks[0] else {
        panic!("expected a line");
    };
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    assert_eq!(ys, vec![2.0, 3.0, 4.0]);
    assert_abs_diff_eq!(points[1].0 - points[0].0, 86_400.0);
}

#[test]
fn renderers_report_unknown_columns() {
    let df = DataFrame::builder().column("a", [1.0]).build().unwrap();
    let mut s = Session::new();
    let r = s.lines(&df, "zzz", &LineOptions::default());
    assert!(matches!(r, Err(PlotError::ColumnNotFound(c)) if c == "zzz"));
    let r = s.scatter_matrix(
        &df,
        &MatrixOptions {
            columns: Some(vec!["a".into(), "b".into()]),
            ..Default::default()
        },
    );
    assert!(matches!(r, Err(PlotError::ColumnNotFound(_))));
    assert!(!s.is_open());
}
