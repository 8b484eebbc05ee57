use super::referenced;
use super::scatter::{MarkerColor, SizeMode, draw_markers, marker_areas, marker_colors};
use crate::error::{PlotError, Result};
use crate::frame::DataFrame;
use crate::geo::{
    BaseMapParams, MapFeatures, MapResolution, MapStyleOverrides, Projection, Region,
    autofit_region, build_base_map,
};
use crate::session::{PlotFrame, Session};
use crate::style::{Rgba, Stroke};

const MAP_SIZE: (f64, f64) = (10.0, 10.0);
/// Marker size of map scatters when no size column is given.
pub const DEFAULT_MAP_MARKER_SIZE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterMapOptions {
    pub longitude_column: String,
    pub latitude_column: String,
    /// Shown region; `None` fits the region to the points.
    pub region: Option<Region>,
    /// Fit the region to the points even if one is given.
    pub autofit: bool,
    pub projection: Projection,
    pub resolution: MapResolution,
    /// Grid spacing `(dlat, dlon)` in degrees.
    pub grid: (f64, f64),
    pub style: Option<String>,
    pub style_overrides: MapStyleOverrides,
    /// Land, lakes, coastlines, rivers, and borders; `None` draws ocean and grid only.
    pub features: Option<MapFeatures>,
    /// Circles of equal distance, `(lat, lon, radius_km)`, drawn under the markers.
    pub circles: Vec<(f64, f64, f64)>,
    pub size_column: Option<String>,
    pub size_factor: f64,
    pub size_mode: SizeMode,
    pub color: MarkerColor,
    pub color_scale: String,
    pub frame: PlotFrame,
}

impl Default for ScatterMapOptions {
    fn default() -> Self {
        Self {
            longitude_column: "longitude".to_string(),
            latitude_column: "latitude".to_string(),
            region: None,
            autofit: false,
            projection: Projection::Mercator,
            resolution: MapResolution::Intermediate,
            grid: (1.0, 2.0),
            style: None,
            style_overrides: MapStyleOverrides::default(),
            features: None,
            circles: Vec::new(),
            size_column: None,
            size_factor: 1.0,
            size_mode: SizeMode::Area,
            color: MarkerColor::Single(Rgba::rgb(0, 0, 255)),
            color_scale: "YlGnBu".to_string(),
            frame: PlotFrame::default(),
        }
    }
}

impl Session {
    /// Scatter plot of coordinates on a map backdrop.
    pub fn scatter_map(&mut self, data: &DataFrame, opts: &ScatterMapOptions) -> Result<()> {
        let lon_column = opts.longitude_column.as_str();
        let lat_column = opts.latitude_column.as_str();
        let size_column = opts.size_column.as_deref();
        let df = data.drop_missing(&referenced(&[
            Some(lon_column),
            Some(lat_column),
            size_column,
            opts.color.column(),
        ]))?;
        let lons = df.numbers(lon_column)?;
        let lats = df.numbers(lat_column)?;
        let coords: Vec<(f64, f64)> = lats.into_iter().zip(lons).collect();
        let region = match opts.region {
            Some(r) if !opts.autofit => r,
            _ => autofit_region(&coords)?,
        };
        if !(opts.size_factor.is_finite() && opts.size_factor >= 0.0) {
            return Err(PlotError::invalid(format!(
                "size factor must be non-negative, got {}",
                opts.size_factor
            )));
        }
        let sizes = size_column.map(|c| df.numbers(c)).transpose()?;
        let areas = marker_areas(
            sizes.as_deref(),
            df.len(),
            DEFAULT_MAP_MARKER_SIZE,
            opts.size_factor,
            opts.size_mode,
        );
        let colors = marker_colors(&df, &opts.color, Rgba::rgb(0, 0, 255), &opts.color_scale)?;
        let params = BaseMapParams {
            region,
            projection: opts.projection,
            resolution: opts.resolution,
            grid: opts.grid,
            style: opts.style.clone(),
            overrides: opts.style_overrides,
        };

        self.render_chart(&opts.frame, MAP_SIZE, |surface, labels| {
            let map = build_base_map(surface, &params, opts.features.as_ref())?;
            for &(lat, lon, km) in &opts.circles {
                map.draw_circle(surface, lat, lon, km, Stroke::solid(Rgba::rgb(0xFF, 0, 0), 1.0));
            }
            let points = map.project_all(&coords);
            draw_markers(surface, &points, &areas, colors, &opts.color, labels);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::Mark;

    fn points() -> DataFrame {
        DataFrame::builder()
            .column("latitude", [50.0, 52.0, 51.0])
            .column("longitude", [8.0, 10.0, 9.0])
            .build()
            .unwrap()
    }

    #[test]
    fn fits_region_and_draws_markers_last() {
        let mut s = Session::new();
        s.scatter_map(&points(), &ScatterMapOptions::default()).unwrap();
        let fig = s.last_figure().unwrap();
        let ax = &fig.all_axes()[0];
        let markers = ax
            .marks
            .iter()
            .skip_while(|m| !matches!(m, Mark::Marker { .. }))
            .count();
        assert_eq!(markers, 3);
        assert!(matches!(ax.marks[0], Mark::Polygon { .. }));
        assert!(ax.aspect_equal);
    }

    #[test]
    fn circles_sit_between_map_and_markers() {
        let mut s = Session::new();
        let opts = ScatterMapOptions {
            circles: vec![(51.0, 9.0, 50.0)],
            ..Default::default()
        };
        s.scatter_map(&points(), &opts).unwrap();
        let marks = &s.last_figure().unwrap().all_axes()[0].marks;
        let circle = marks
            .iter()
            .position(|m| matches!(m, Mark::Line { points, .. } if points.len() == 361))
            .unwrap();
        let first_marker = marks
            .iter()
            .position(|m| matches!(m, Mark::Marker { .. }))
            .unwrap();
        assert!(circle < first_marker);
    }

    #[test]
    fn bad_style_is_reported() {
        let mut s = Session::new();
        let opts = ScatterMapOptions {
            style: Some("nope".into()),
            ..Default::default()
        };
        assert!(matches!(
            s.scatter_map(&points(), &opts),
            Err(PlotError::UnknownStyle(_))
        ));
    }
}
