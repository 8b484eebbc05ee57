//! Geographic backdrops for scatter maps.
//!
//! - `Region`: lower-left / upper-right corners in degrees
//! - `Projection`: `cyl`, `merc`, `mill`, `ortho`
//! - `MapStyle`: named presets (`default`, `gray`) merged with per-call overrides
//! - `MapFeatures`: land, lakes, coastlines, rivers, and borders loaded from GeoJSON
//! - `build_base_map`: draws the backdrop onto an axes and returns a `BaseMap` for
//!   projecting further coordinates

pub mod basemap;
pub mod features;
pub mod projection;
pub mod style;

pub use basemap::{BaseMap, BaseMapParams, build_base_map};
pub use features::{FeatureKind, MapFeatures};
pub use projection::Projection;
pub use style::{MapStyle, MapStyleOverrides};

use crate::error::{PlotError, Result};
use std::fmt;
use std::str::FromStr;

/// Mean earth radius used for great-circle computations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub ll_lat: f64,
    pub ll_lon: f64,
    pub ur_lat: f64,
    pub ur_lon: f64,
}

impl Region {
    pub fn new(ll_lat: f64, ll_lon: f64, ur_lat: f64, ur_lon: f64) -> Self {
        Self {
            ll_lat,
            ll_lon,
            ur_lat,
            ur_lon,
        }
    }

    /// The whole globe within Mercator's latitude limits.
    pub fn world() -> Self {
        let lat = projection::MERCATOR_MAX_LAT;
        Self::new(-lat, -180.0, lat, 180.0)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.ll_lat, self.ll_lon, self.ur_lat, self.ur_lon
        )
    }
}

/// Detail level of coastlines and borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapResolution {
    Crude,
    Low,
    #[default]
    Intermediate,
    High,
    Full,
}

impl MapResolution {
    /// Douglas–Peucker tolerance in degrees.
    pub fn tolerance(self) -> f64 {
        match self {
            MapResolution::Crude => 0.5,
            MapResolution::Low => 0.1,
            MapResolution::Intermediate => 0.02,
            MapResolution::High => 0.005,
            MapResolution::Full => 0.0,
        }
    }
}

impl FromStr for MapResolution {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "c" => Ok(MapResolution::Crude),
            "l" => Ok(MapResolution::Low),
            "i" => Ok(MapResolution::Intermediate),
            "h" => Ok(MapResolution::High),
            "f" => Ok(MapResolution::Full),
            other => Err(PlotError::invalid(format!(
                "unknown map resolution: {other} (expected c, l, i, h or f)"
            ))),
        }
    }
}

/// Region showing all `(lat, lon)` points with a 15% margin of the span on each side.
///
/// A latitude span above 180° after the margin swaps the south and north bounds; the
/// projections reject such a region.
pub fn autofit_region(points: &[(f64, f64)]) -> Result<Region> {
    let finite = points
        .iter()
        .filter(|(lat, lon)| lat.is_finite() && lon.is_finite());
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for &(lat, lon) in finite {
        bounds = Some(match bounds {
            None => (lat, lon, lat, lon),
            Some((a, b, c, d)) => (a.min(lat), b.min(lon), c.max(lat), d.max(lon)),
        });
    }
    let (min_lat, min_lon, max_lat, max_lon) =
        bounds.ok_or_else(|| PlotError::EmptyData("no coordinates to fit a region to".into()))?;
    let lat_margin = (max_lat - min_lat).abs() * 0.15;
    let lon_margin = (max_lon - min_lon).abs() * 0.15;
    let mut region = Region::new(
        min_lat - lat_margin,
        min_lon - lon_margin,
        max_lat + lat_margin,
        max_lon + lon_margin,
    );
    if region.ur_lat - region.ll_lat > 180.0 {
        std::mem::swap(&mut region.ll_lat, &mut region.ur_lat);
    }
    Ok(region)
}

/// Point reached from (`lat`, `lon`) after `distance_km` along the great circle
/// with initial bearing `azimuth_deg` (clockwise from north). Returns `(lat, lon)`
/// with the longitude normalized to `[-180, 180)`.
pub fn destination(lat: f64, lon: f64, azimuth_deg: f64, distance_km: f64) -> (f64, f64) {
    let phi1 = lat.to_radians();
    let theta = azimuth_deg.to_radians();
    let delta = distance_km / EARTH_RADIUS_KM;
    let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
    let lambda2 = lon.to_radians()
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());
    let lon2 = (lambda2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
    (phi2.to_degrees(), lon2)
}

/// Closed ring of `(lat, lon)` points at `radius_km` around a center, one per degree
/// of azimuth.
pub fn geodesic_circle(lat: f64, lon: f64, radius_km: f64) -> Vec<(f64, f64)> {
    let mut ring: Vec<(f64, f64)> = (0..360)
        .map(|az| destination(lat, lon, az as f64, radius_km))
        .collect();
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn autofit_adds_fifteen_percent() {
        let r = autofit_region(&[(50.0, 8.0), (52.0, 10.0), (51.0, 9.0)]).unwrap();
        assert_abs_diff_eq!(r.ll_lat, 49.7, epsilon = 1e-9);
        assert_abs_diff_eq!(r.ll_lon, 7.7, epsilon = 1e-9);
        assert_abs_diff_eq!(r.ur_lat, 52.3, epsilon = 1e-9);
        assert_abs_diff_eq!(r.ur_lon, 10.3, epsilon = 1e-9);
    }

    #[test]
    fn autofit_rejects_empty_input() {
        assert!(matches!(autofit_region(&[]), Err(PlotError::EmptyData(_))));
    }

    #[test]
    fn resolution_codes() {
        assert_eq!("c".parse::<MapResolution>().unwrap(), MapResolution::Crude);
        assert_eq!(MapResolution::default(), MapResolution::Intermediate);
        assert!("x".parse::<MapResolution>().is_err());
        assert_eq!(MapResolution::Full.tolerance(), 0.0);
    }

    #[test]
    fn destination_due_north() {
        // one degree of arc along a meridian
        let d = EARTH_RADIUS_KM * 1f64.to_radians();
        let (lat, lon) = destination(10.0, 20.0, 0.0, d);
        assert_abs_diff_eq!(lat, 11.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lon, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn circle_is_closed() {
        let ring = geodesic_circle(0.0, 0.0, 100.0);
        assert_eq!(ring.len(), 361);
        assert_eq!(ring[0], ring[360]);
    }
}
