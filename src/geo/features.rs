//! Map geometry from a GeoJSON `FeatureCollection`.
//!
//! Each feature names its layer in a `kind` property: `land`, `lake`, `coastline`,
//! `river`, `border`, `region`, or `district`. Coordinates are `[lon, lat]` pairs.
//! Holes of land polygons are read as lakes.

use crate::error::Result;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// A path or ring of `(lon, lat)` coordinates.
pub type GeoPath = Vec<(f64, f64)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Land,
    Lake,
    Coastline,
    River,
    Border,
    Region,
    District,
}

impl FeatureKind {
    pub fn parse(name: &str) -> Option<Self> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "land" => FeatureKind::Land,
            "lake" => FeatureKind::Lake,
            "coastline" => FeatureKind::Coastline,
            "river" => FeatureKind::River,
            "border" => FeatureKind::Border,
            "region" => FeatureKind::Region,
            "district" => FeatureKind::District,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Properties>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    kind: Option<String>,
}

type Ring = Vec<Vec<f64>>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    LineString { coordinates: Ring },
    MultiLineString { coordinates: Vec<Ring> },
    Polygon { coordinates: Vec<Ring> },
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
    #[serde(other)]
    Other,
}

/// Layers of map geometry, in drawing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapFeatures {
    pub land: Vec<GeoPath>,
    pub lakes: Vec<GeoPath>,
    pub coastlines: Vec<GeoPath>,
    pub rivers: Vec<GeoPath>,
    pub borders: Vec<GeoPath>,
    pub regions: Vec<GeoPath>,
    pub districts: Vec<GeoPath>,
}

fn to_path(ring: &[Vec<f64>]) -> GeoPath {
    ring.iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect()
}

impl MapFeatures {
    pub fn from_geojson_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path.as_ref())?;
        let features = Self::from_reader(BufReader::new(f))?;
        log::debug!(
            "loaded map geometry from {}: {} land, {} lake, {} line paths",
            path.as_ref().display(),
            features.land.len(),
            features.lakes.len(),
            features.coastlines.len() + features.rivers.len() + features.borders.len()
        );
        Ok(features)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let fc: FeatureCollection = serde_json::from_reader(reader)?;
        Ok(Self::from_collection(fc))
    }

    pub fn from_geojson_str(text: &str) -> Result<Self> {
        let fc: FeatureCollection = serde_json::from_str(text)?;
        Ok(Self::from_collection(fc))
    }

    fn from_collection(fc: FeatureCollection) -> Self {
        let mut out = MapFeatures::default();
        for feature in fc.features {
            let kind = feature
                .properties
                .and_then(|p| p.kind)
                .and_then(|k| FeatureKind::parse(&k));
            let (Some(kind), Some(geometry)) = (kind, feature.geometry) else {
                log::debug!("skipping map feature without a known kind or geometry");
                continue;
            };
            out.add(kind, geometry);
        }
        out
    }

    fn add(&mut self, kind: FeatureKind, geometry: Geometry) {
        let polygons: Vec<Vec<Ring>> = match geometry {
            Geometry::LineString { coordinates } => vec![vec![coordinates]],
            Geometry::MultiLineString { coordinates } => {
                coordinates.into_iter().map(|l| vec![l]).collect()
            }
            Geometry::Polygon { coordinates } => vec![coordinates],
            Geometry::MultiPolygon { coordinates } => coordinates,
            Geometry::Other => Vec::new(),
        };
        for rings in polygons {
            let mut rings = rings.iter().map(|r| to_path(r)).filter(|p| p.len() > 1);
            let Some(outer) = rings.next() else { continue };
            match kind {
                FeatureKind::Land => {
                    self.land.push(outer);
                    self.lakes.extend(rings);
                }
                FeatureKind::Lake => {
                    self.lakes.push(outer);
                }
                _ => {
                    let layer = self.lines_mut(kind);
                    layer.push(outer);
                    layer.extend(rings);
                }
            }
        }
    }

    fn lines_mut(&mut self, kind: FeatureKind) -> &mut Vec<GeoPath> {
        match kind {
            FeatureKind::Land => &mut self.land,
            FeatureKind::Lake => &mut self.lakes,
            FeatureKind::Coastline => &mut self.coastlines,
            FeatureKind::River => &mut self.rivers,
            FeatureKind::Border => &mut self.borders,
            FeatureKind::Region => &mut self.regions,
            FeatureKind::District => &mut self.districts,
        }
    }

    pub fn layer(&self, kind: FeatureKind) -> &[GeoPath] {
        match kind {
            FeatureKind::Land => &self.land,
            FeatureKind::Lake => &self.lakes,
            FeatureKind::Coastline => &self.coastlines,
            FeatureKind::River => &self.rivers,
            FeatureKind::Border => &self.borders,
            FeatureKind::Region => &self.regions,
            FeatureKind::District => &self.districts,
        }
    }

    /// Copy with every path simplified to `tolerance` degrees.
    pub fn simplified(&self, tolerance: f64) -> MapFeatures {
        let s = |paths: &[GeoPath]| -> Vec<GeoPath> {
            paths.iter().map(|p| simplify_path(p, tolerance)).collect()
        };
        MapFeatures {
            land: s(&self.land),
            lakes: s(&self.lakes),
            coastlines: s(&self.coastlines),
            rivers: s(&self.rivers),
            borders: s(&self.borders),
            regions: s(&self.regions),
            districts: s(&self.districts),
        }
    }
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return ((p.0 - a.0).powi(2) + (p.1 - a.1).powi(2)).sqrt();
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0);
    ((p.0 - a.0 - t * dx).powi(2) + (p.1 - a.1 - t * dy).powi(2)).sqrt()
}

/// Douglas–Peucker simplification; endpoints are always kept.
pub fn simplify_path(path: &[(f64, f64)], tolerance: f64) -> GeoPath {
    if tolerance <= 0.0 || path.len() < 3 {
        return path.to_vec();
    }
    let mut keep = vec![false; path.len()];
    keep[0] = true;
    keep[path.len() - 1] = true;
    let mut stack = vec![(0usize, path.len() - 1)];
    while let Some((first, last)) = stack.pop() {
        let mut worst = (0.0, first);
        for i in first + 1..last {
            let d = segment_distance(path[i], path[first], path[last]);
            if d > worst.0 {
                worst = (d, i);
            }
        }
        if worst.0 > tolerance {
            keep[worst.1] = true;
            stack.push((first, worst.1));
            stack.push((worst.1, last));
        }
    }
    path.iter()
        .zip(keep)
        .filter(|(_, k)| *k)
        .map(|(p, _)| *p)
        .collect()
}
