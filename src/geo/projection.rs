//! Map projections from (lat, lon) in degrees to plot units.
//!
//! Plot units are degree-like: a point on the equator at longitude `x` maps to `x`
//! for the cylindrical projections.

use super::Region;
use crate::error::{PlotError, Result};
use std::f64::consts::{FRAC_PI_4, PI};
use std::fmt;
use std::str::FromStr;

/// Latitude limit of the Mercator projection.
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_78;

const DEG: f64 = 180.0 / PI;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Projection {
    /// Equirectangular (`cyl`).
    Cylindrical,
    /// `merc`
    #[default]
    Mercator,
    /// `mill`
    Miller,
    /// `ortho`, centered on (`lat_0`, `lon_0`).
    Orthographic { lat_0: f64, lon_0: f64 },
}

impl FromStr for Projection {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cyl" => Ok(Projection::Cylindrical),
            "merc" => Ok(Projection::Mercator),
            "mill" => Ok(Projection::Miller),
            "ortho" => Ok(Projection::Orthographic {
                lat_0: 0.0,
                lon_0: 0.0,
            }),
            other => Err(PlotError::Projection(format!("unknown projection: {other}"))),
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Cylindrical => f.write_str("cyl"),
            Projection::Mercator => f.write_str("merc"),
            Projection::Miller => f.write_str("mill"),
            Projection::Orthographic { .. } => f.write_str("ortho"),
        }
    }
}

impl Projection {
    /// Check that this projection can show `region`.
    pub fn validate(&self, region: &Region) -> Result<()> {
        let err = |m: String| Err(PlotError::Projection(m));
        let finite = [region.ll_lat, region.ll_lon, region.ur_lat, region.ur_lon]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return err(format!("region {region} has non-finite corners"));
        }
        if region.ll_lat < -90.0 || region.ur_lat > 90.0 {
            return err(format!("region {region} exceeds ±90° latitude"));
        }
        if region.ll_lat >= region.ur_lat || region.ll_lon >= region.ur_lon {
            return err(format!("region {region} is inverted or empty"));
        }
        if region.ur_lon - region.ll_lon > 360.0 {
            return err(format!("region {region} spans more than 360° longitude"));
        }
        match *self {
            Projection::Mercator => {
                if region.ll_lat < -MERCATOR_MAX_LAT || region.ur_lat > MERCATOR_MAX_LAT {
                    return err(format!(
                        "mercator cannot show latitudes beyond ±{MERCATOR_MAX_LAT:.2}°"
                    ));
                }
            }
            Projection::Orthographic { lat_0, lon_0 } => {
                if !(-90.0..=90.0).contains(&lat_0) || !(-180.0..=180.0).contains(&lon_0) {
                    return err(format!("orthographic center ({lat_0}, {lon_0}) is out of range"));
                }
                let corners = [
                    (region.ll_lat, region.ll_lon),
                    (region.ll_lat, region.ur_lon),
                    (region.ur_lat, region.ll_lon),
                    (region.ur_lat, region.ur_lon),
                ];
                if corners.iter().any(|(lat, lon)| self.project(*lat, *lon).is_none()) {
                    return err(format!(
                        "region {region} is not on the hemisphere facing ({lat_0}, {lon_0})"
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Forward projection; `None` for points the projection cannot show.
    pub fn project(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        let phi = lat.to_radians();
        match *self {
            Projection::Cylindrical => Some((lon, lat)),
            Projection::Mercator => {
                if lat.abs() > MERCATOR_MAX_LAT {
                    return None;
                }
                Some((lon, (FRAC_PI_4 + phi / 2.0).tan().ln() * DEG))
            }
            Projection::Miller => Some((lon, 1.25 * (FRAC_PI_4 + 0.4 * phi).tan().ln() * DEG)),
            Projection::Orthographic { lat_0, lon_0 } => {
                let phi0 = lat_0.to_radians();
                let dl = (lon - lon_0).to_radians();
                let cos_c = phi0.sin() * phi.sin() + phi0.cos() * phi.cos() * dl.cos();
                if cos_c < -1e-9 {
                    return None;
                }
                Some((
                    DEG * phi.cos() * dl.sin(),
                    DEG * (phi0.cos() * phi.sin() - phi0.sin() * phi.cos() * dl.cos()),
                ))
            }
        }
    }

    /// Bounding box `(x0, x1, y0, y1)` of `region` in plot units.
    pub fn extent(&self, region: &Region) -> (f64, f64, f64, f64) {
        let mut pts = Vec::new();
        const N: usize = 32;
        for i in 0..=N {
            let t = i as f64 / N as f64;
            let lat = region.ll_lat + t * (region.ur_lat - region.ll_lat);
            let lon = region.ll_lon + t * (region.ur_lon - region.ll_lon);
            pts.push(self.project(lat, region.ll_lon));
            pts.push(self.project(lat, region.ur_lon));
            pts.push(self.project(region.ll_lat, lon));
            pts.push(self.project(region.ur_lat, lon));
        }
        pts.into_iter().flatten().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(a, b, c, d), (x, y)| (a.min(x), b.max(x), c.min(y), d.max(y)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn region(ll_lat: f64, ll_lon: f64, ur_lat: f64, ur_lon: f64) -> Region {
        Region {
            ll_lat,
            ll_lon,
            ur_lat,
            ur_lon,
        }
    }

    #[test]
    fn parses_names() {
        assert_eq!("merc".parse::<Projection>().unwrap(), Projection::Mercator);
        assert_eq!("CYL".parse::<Projection>().unwrap(), Projection::Cylindrical);
        assert!(matches!("robin".parse::<Projection>(), Err(PlotError::Projection(_))));
    }

    #[test]
    fn mercator_equator_and_limit() {
        let (x, y) = Projection::Mercator.project(0.0, 10.0).unwrap();
        assert_abs_diff_eq!(x, 10.0);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-12);
        assert!(Projection::Mercator.project(89.0, 0.0).is_none());
        assert!(
            Projection::Mercator
                .validate(&region(-89.0, 0.0, 10.0, 10.0))
                .is_err()
        );
    }

    #[test]
    fn orthographic_hides_far_side() {
        let p = Projection::Orthographic {
            lat_0: 0.0,
            lon_0: 0.0,
        };
        assert!(p.project(0.0, 170.0).is_none());
        let (x, _) = p.project(0.0, 90.0).unwrap();
        assert_abs_diff_eq!(x, DEG, epsilon = 1e-9);
        assert!(p.validate(&region(-10.0, 100.0, 10.0, 120.0)).is_err());
        let bad = Projection::Orthographic {
            lat_0: 95.0,
            lon_0: 0.0,
        };
        assert!(matches!(
            bad.validate(&region(0.0, 0.0, 10.0, 10.0)),
            Err(PlotError::Projection(_))
        ));
    }

    #[test]
    fn inverted_region_is_rejected() {
        assert!(
            Projection::Cylindrical
                .validate(&region(50.0, 8.0, 40.0, 10.0))
                .is_err()
        );
    }
}
