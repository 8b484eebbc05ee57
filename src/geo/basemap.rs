//! Base-map construction: ocean, land with lakes, rivers, coastlines, borders, grid.

use super::features::{GeoPath, MapFeatures};
use super::{MapResolution, MapStyle, MapStyleOverrides, Projection, Region, geodesic_circle};
use crate::error::Result;
use crate::figure::{Axes, Limits, Mark};
use crate::style::{Rgba, Stroke};

/// Everything needed to draw a backdrop besides the geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMapParams {
    pub region: Region,
    pub projection: Projection,
    pub resolution: MapResolution,
    /// Grid spacing `(dlat, dlon)` in degrees.
    pub grid: (f64, f64),
    /// Preset name; `None` is `default`.
    pub style: Option<String>,
    pub overrides: MapStyleOverrides,
}

impl BaseMapParams {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            projection: Projection::Cylindrical,
            resolution: MapResolution::Intermediate,
            grid: (30.0, 60.0),
            style: None,
            overrides: MapStyleOverrides::default(),
        }
    }
}

/// A drawn backdrop; converts geographic coordinates into the axes' plot units.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMap {
    projection: Projection,
    region: Region,
    style: MapStyle,
    extent: (f64, f64, f64, f64),
}

impl BaseMap {
    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn style(&self) -> &MapStyle {
        &self.style
    }

    /// `(x0, x1, y0, y1)` of the map in plot units.
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        self.extent
    }

    /// Plot position of (`lat`, `lon`); `None` if the projection cannot show it.
    pub fn project(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        self.projection.project(lat, lon)
    }

    /// Plot positions of `(lat, lon)` pairs; hidden points become NaN and split lines.
    pub fn project_all(&self, coords: &[(f64, f64)]) -> Vec<(f64, f64)> {
        coords
            .iter()
            .map(|&(lat, lon)| self.project(lat, lon).unwrap_or((f64::NAN, f64::NAN)))
            .collect()
    }

    /// Draw a circle of `radius_km` around (`lat`, `lon`) as it appears on this map.
    pub fn draw_circle(&self, axes: &mut Axes, lat: f64, lon: f64, radius_km: f64, stroke: Stroke) {
        axes.push(Mark::Line {
            points: self.project_all(&geodesic_circle(lat, lon, radius_km)),
            stroke,
        });
    }

    fn shifts(&self) -> Vec<f64> {
        if matches!(self.projection, Projection::Orthographic { .. }) {
            return vec![0.0];
        }
        let mut out = vec![0.0];
        if self.region.ur_lon > 180.0 {
            out.push(360.0);
        }
        if self.region.ll_lon < -180.0 {
            out.push(-360.0);
        }
        out
    }

    fn project_path(&self, path: &GeoPath, shift: f64) -> Vec<(f64, f64)> {
        path.iter()
            .map(|&(lon, lat)| {
                self.project(lat, lon + shift)
                    .unwrap_or((f64::NAN, f64::NAN))
            })
            .collect()
    }

    fn fill_layer(&self, axes: &mut Axes, paths: &[GeoPath], fill: Rgba) {
        for shift in self.shifts() {
            for path in paths {
                axes.push(Mark::Polygon {
                    points: self.project_path(path, shift),
                    fill,
                    edge: None,
                });
            }
        }
    }

    fn line_layer(&self, axes: &mut Axes, paths: &[GeoPath], stroke: Stroke) {
        for shift in self.shifts() {
            for path in paths {
                axes.push(Mark::Line {
                    points: self.project_path(path, shift),
                    stroke,
                });
            }
        }
    }

    fn draw_boundary(&self, axes: &mut Axes) {
        let (x0, x1, y0, y1) = self.extent;
        let edge = Some(Stroke::solid(Rgba::BLACK, 1.0));
        let points = match self.projection {
            Projection::Orthographic { .. } => {
                let r = 180.0 / std::f64::consts::PI;
                (0..=360)
                    .map(|d| {
                        let a = (d as f64).to_radians();
                        (r * a.cos(), r * a.sin())
                    })
                    .collect()
            }
            _ => vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)],
        };
        axes.push(Mark::Polygon {
            points,
            fill: self.style.ocean,
            edge,
        });
    }

    fn draw_grid(&self, axes: &mut Axes, (dlat, dlon): (f64, f64)) {
        let stroke = self.style.grid_stroke();
        let r = self.region;
        let ortho = matches!(self.projection, Projection::Orthographic { .. });
        let (lon_lo, lon_hi) = if ortho { (-180.0, 180.0) } else { (r.ll_lon, r.ur_lon) };
        let (lat_lo, lat_hi) = if ortho { (-90.0, 90.0) } else { (r.ll_lat, r.ur_lat) };
        const STEPS: usize = 120;
        let sample = |lo: f64, hi: f64| -> Vec<f64> {
            (0..=STEPS)
                .map(|i| lo + (hi - lo) * i as f64 / STEPS as f64)
                .collect()
        };

        if dlat > 0.0 {
            let mut lat = -180.0 + dlat;
            while lat < 180.0 - dlat {
                if (-90.0..=90.0).contains(&lat) {
                    let pts: Vec<(f64, f64)> =
                        sample(lon_lo, lon_hi).into_iter().map(|lon| (lat, lon)).collect();
                    axes.push(Mark::Line {
                        points: self.project_all(&pts),
                        stroke,
                    });
                }
                lat += dlat;
            }
        }
        if dlon > 0.0 {
            let mut m = 0.0;
            while m < 360.0 {
                // the meridian's representative inside the shown longitude range
                let mut lon = m;
                while lon > lon_lo + 360.0 {
                    lon -= 360.0;
                }
                while lon < lon_lo {
                    lon += 360.0;
                }
                if lon <= lon_hi {
                    let pts: Vec<(f64, f64)> =
                        sample(lat_lo, lat_hi).into_iter().map(|lat| (lat, lon)).collect();
                    axes.push(Mark::Line {
                        points: self.project_all(&pts),
                        stroke,
                    });
                }
                m += dlon;
            }
        }
    }
}

/// Draw a map backdrop for `params.region` onto `axes`.
///
/// Fails with `UnknownStyle` for an unknown preset and `Projection` when the
/// projection cannot show the region. Without `features` only the ocean and the grid
/// are drawn.
pub fn build_base_map(
    axes: &mut Axes,
    params: &BaseMapParams,
    features: Option<&MapFeatures>,
) -> Result<BaseMap> {
    let style = MapStyle::resolve(params.style.as_deref(), &params.overrides)?;
    params.projection.validate(&params.region)?;
    let extent = params.projection.extent(&params.region);
    let map = BaseMap {
        projection: params.projection,
        region: params.region,
        style,
        extent,
    };

    axes.x_limits = Limits::new(Some(extent.0), Some(extent.1));
    axes.y_limits = Limits::new(Some(extent.2), Some(extent.3));
    axes.aspect_equal = true;
    axes.axis_visible = false;

    map.draw_boundary(axes);
    if let Some(features) = features {
        let f = features.simplified(params.resolution.tolerance());
        let s = &map.style;
        map.fill_layer(axes, &f.land, s.continent);
        map.fill_layer(axes, &f.lakes, s.lake);
        if s.draw_river {
            map.line_layer(axes, &f.rivers, Stroke::solid(s.river, s.river_width));
        }
        if s.draw_coast {
            // land outlines stand in for missing coastline geometry
            let coast = if f.coastlines.is_empty() { &f.land } else { &f.coastlines };
            map.line_layer(axes, coast, Stroke::solid(s.coast, s.coast_width));
        }
        if s.draw_border {
            map.line_layer(axes, &f.borders, Stroke::solid(s.border, s.border_width));
        }
        if s.draw_region {
            map.line_layer(axes, &f.regions, Stroke::solid(s.region, s.region_width));
        }
        if s.draw_district {
            map.line_layer(axes, &f.districts, Stroke::solid(s.district, s.district_width));
        }
    }
    if map.style.draw_grid {
        map.draw_grid(axes, params.grid);
    }
    log::debug!(
        "base map {} on {} with {} marks",
        map.projection,
        map.region,
        axes.marks.len()
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlotError;
    use crate::figure::CellSpec;

    fn island() -> MapFeatures {
        MapFeatures {
            land: vec![vec![(5.0, 45.0), (15.0, 45.0), (15.0, 55.0), (5.0, 55.0), (5.0, 45.0)]],
            ..Default::default()
        }
    }

    #[test]
    fn draws_layers_in_order() {
        let mut ax = Axes::new(CellSpec::default());
        let mut params = BaseMapParams::new(Region::new(40.0, 0.0, 60.0, 20.0));
        params.grid = (10.0, 10.0);
        let map = build_base_map(&mut ax, &params, Some(&island())).unwrap();
        assert!(ax.aspect_equal);
        assert!(!ax.axis_visible);
        assert!(matches!(&ax.marks[0], Mark::Polygon { fill, .. } if *fill == map.style().ocean));
        assert!(matches!(&ax.marks[1], Mark::Polygon { fill, .. } if *fill == map.style().continent));
        // coastline from the land outline, then dashed grid lines
        assert!(matches!(&ax.marks[2], Mark::Line { stroke, .. } if stroke.dash.is_none()));
        assert!(ax.marks[3..]
            .iter()
            .all(|m| matches!(m, Mark::Line { stroke, .. } if stroke.dash == Some((4.0, 2.0)))));
        assert_eq!(ax.x_limits, Limits::new(Some(0.0), Some(20.0)));
    }

    #[test]
    fn grid_follows_spacing() {
        let mut ax = Axes::new(CellSpec::default());
        let mut params = BaseMapParams::new(Region::new(-10.0, -10.0, 10.0, 10.0));
        params.grid = (30.0, 60.0);
        params.overrides.draw_grid = Some(true);
        build_base_map(&mut ax, &params, None).unwrap();
        // parallels -150..=120 step 30 inside ±90: -90,-60,-30,0,30,60,90 -> 7;
        // meridians 0,60,..,300 whose representative falls in [-10, 10]: only 0 -> 1
        assert_eq!(ax.marks.len(), 1 + 7 + 1);
    }

    #[test]
    fn unknown_style_and_bad_region_fail() {
        let mut ax = Axes::new(CellSpec::default());
        let mut params = BaseMapParams::new(Region::new(40.0, 0.0, 60.0, 20.0));
        params.style = Some("sepia".into());
        assert!(matches!(
            build_base_map(&mut ax, &params, None),
            Err(PlotError::UnknownStyle(_))
        ));
        let mut params = BaseMapParams::new(Region::new(40.0, 0.0, 89.0, 20.0));
        params.projection = Projection::Mercator;
        assert!(matches!(
            build_base_map(&mut ax, &params, None),
            Err(PlotError::Projection(_))
        ));
    }

    #[test]
    fn projects_and_hides_points() {
        let mut ax = Axes::new(CellSpec::default());
        let mut params = BaseMapParams::new(Region::new(-20.0, -20.0, 20.0, 20.0));
        params.projection = Projection::Orthographic {
            lat_0: 0.0,
            lon_0: 0.0,
        };
        let map = build_base_map(&mut ax, &params, None).unwrap();
        assert!(map.project(0.0, 0.0).is_some());
        let pts = map.project_all(&[(0.0, 0.0), (0.0, 179.0)]);
        assert!(pts[1].0.is_nan());
    }
}
