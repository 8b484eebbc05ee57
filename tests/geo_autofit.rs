use approx::assert_abs_diff_eq;
use dsplot::charts::ScatterMapOptions;
use dsplot::geo::{MapFeatures, Projection, Region, autofit_region};
use dsplot::{DataFrame, PlotError, Session};

#[test]
fn autofit_adds_fifteen_percent() {
    let r = autofit_region(&[(50.0, 8.0), (52.0, 10.0), (51.0, 9.0)]).unwrap();
    assert_abs_diff_eq!(r.ll_lat, 49.7, epsilon = 1e-9);
    assert_abs_diff_eq!(r.ll_lon, 7.7, epsilon = 1e-9);
    assert_abs_diff_eq!(r.ur_lat, 52.3, epsilon = 1e-9);
    assert_abs_diff_eq!(r.ur_lon, 10.3, epsilon = 1e-9);
}

#[test]
fn wide_latitude_span_swaps_bounds() {
    // span 160 grows to 208 with the margins
    let r = autofit_region(&[(-80.0, 0.0), (80.0, 10.0)]).unwrap();
    assert_abs_diff_eq!(r.ll_lat, 104.0, epsilon = 1e-9);
    assert_abs_diff_eq!(r.ur_lat, -104.0, epsilon = 1e-9);

    // the projection refuses the swapped region
    let df = DataFrame::builder()
        .column("latitude", [-80.0, 80.0])
        .column("longitude", [0.0, 10.0])
        .build()
        .unwrap();
    let mut s = Session::new();
    let r = s.scatter_map(&df, &ScatterMapOptions::default());
    assert!(matches!(r, Err(PlotError::Projection(_))));
}

#[test]
fn swap_starts_just_past_half_a_turn() {
    // span 138 grows to 179.4: kept in order
    let r = autofit_region(&[(-69.0, 0.0), (69.0, 10.0)]).unwrap();
    assert_abs_diff_eq!(r.ll_lat, -89.7, epsilon = 1e-9);
    assert_abs_diff_eq!(r.ur_lat, 89.7, epsilon = 1e-9);

    // span 139 grows to 180.7: swapped
    let r = autofit_region(&[(-69.5, 0.0), (69.5, 10.0)]).unwrap();
    assert_abs_diff_eq!(r.ll_lat, 90.35, epsilon = 1e-9);
    assert_abs_diff_eq!(r.ur_lat, -90.35, epsilon = 1e-9);
}

#[test]
fn single_point_gives_an_empty_region() {
    let r = autofit_region(&[(50.0, 8.0)]).unwrap();
    assert_eq!(r, Region::new(50.0, 8.0, 50.0, 8.0));

    let df = DataFrame::builder()
        .column("latitude", [50.0])
        .column("longitude", [8.0])
        .build()
        .unwrap();
    let mut s = Session::new();
    let r = s.scatter_map(&df, &ScatterMapOptions::default());
    assert!(matches!(r, Err(PlotError::Projection(_))));
}

#[test]
fn explicit_region_is_kept_unless_autofit() {
    let df = DataFrame::builder()
        .column("latitude", [50.0, 52.0])
        .column("longitude", [8.0, 10.0])
        .build()
        .unwrap();
    let features = MapFeatures::from_geojson_str(
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"kind":"land"},
             "geometry":{"type":"Polygon","coordinates":[[[0,45],[20,45],[20,55],[0,55],[0,45]]]}}
        ]}"#,
    )
    .unwrap();
    let mut s = Session::new();
    let opts = ScatterMapOptions {
        region: Some(Region::new(40.0, 0.0, 60.0, 20.0)),
        projection: Projection::Cylindrical,
        features: Some(features),
        ..Default::default()
    };
    s.scatter_map(&df, &opts).unwrap();
    let ax = &s.last_figure().unwrap().all_axes()[0];
    assert_eq!(ax.x_limits.min, Some(0.0));
    assert_eq!(ax.x_limits.max, Some(20.0));

    let opts = ScatterMapOptions {
        autofit: true,
        ..opts
    };
    s.scatter_map(&df, &opts).unwrap();
    let ax = &s.last_figure().unwrap().all_axes()[0];
    assert_abs_diff_eq!(ax.x_limits.min.unwrap(), 7.7, epsilon = 1e-9);
}

#[test]
fn no_coordinates_is_empty_data() {
    assert!(matches!(autofit_region(&[]), Err(PlotError::EmptyData(_))));
}
