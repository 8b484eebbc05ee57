//! Chart renderers. Each is a `Session` method taking its data plus an options struct
//! and drawing through `Session::render_chart`, so it works the same standalone and
//! inside a multiplot.
//!
//! | Renderer | Method | Default size (in) |
//! |---|---|---|
//! | pie | `pie`, `pie_groups` | 4 × 4 |
//! | bar | `bar`, `bar_groups` | 10 × 4 |
//! | histogram | `hist` | 10 × 4 |
//! | 2D histogram | `hist2d` | 7.5 × 6 |
//! | scatter | `scatter` | 9.8 × 8 |
//! | map scatter | `scatter_map` | 10 × 10 |
//! | lines | `lines` | 10 × 5 |
//! | matrices | `scatter_matrix`, `hist2d_matrix` | N·2 × N·2 |

pub mod bar;
pub mod hist;
pub mod hist2d;
pub mod line;
pub mod matrix;
pub mod pie;
pub mod scatter;
pub mod scatter_map;

pub use bar::{BarOptions, GroupedBarOptions, GroupedBars, grouped_bar_layout};
pub use hist::{Bins, HistOptions, bin_counts, histogram_edges};
pub use hist2d::{Bins2d, Hist2dOptions, histogram2d};
pub use line::{Interpolation, InterpolationKind, LineOptions, interpolate, moving_average};
pub use matrix::MatrixOptions;
pub use pie::{PieOptions, PieSort, WedgeSpan, pie_wedges};
pub use scatter::{MarkerColor, ScatterOptions, SizeMode, marker_areas};
pub use scatter_map::ScatterMapOptions;

use crate::error::{PlotError, Result};
use crate::frame::Value;
use crate::style::{Rgba, palette_color};
use std::collections::BTreeMap;

/// Where slice, bar, or series colors come from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColorSpec {
    /// The auto-cycling palette.
    #[default]
    Auto,
    Single(Rgba),
    /// Cycled when shorter than the number of items.
    List(Vec<Rgba>),
    /// A column of color strings (`#RRGGBB`, names).
    Column(String),
    /// Colors by item label; unmapped labels take palette colors in order.
    Keyed(BTreeMap<String, Rgba>),
}

impl ColorSpec {
    pub fn column(&self) -> Option<&str> {
        match self {
            ColorSpec::Column(c) => Some(c),
            _ => None,
        }
    }

    /// One color per item. `keys` are the item labels; `column` holds the values of the
    /// color column (required for `ColorSpec::Column`).
    pub fn resolve(&self, keys: &[String], column: Option<&[Value]>) -> Result<Vec<Rgba>> {
        match self {
            ColorSpec::Auto => Ok((0..keys.len()).map(palette_color).collect()),
            ColorSpec::Single(c) => Ok(vec![*c; keys.len()]),
            ColorSpec::List(list) => {
                if list.is_empty() {
                    return Err(PlotError::invalid("empty color list"));
                }
                Ok((0..keys.len()).map(|i| list[i % list.len()]).collect())
            }
            ColorSpec::Column(name) => {
                let values = column.ok_or_else(|| {
                    PlotError::invalid(format!("color column {name} is not available here"))
                })?;
                values.iter().map(parse_color_value).collect()
            }
            ColorSpec::Keyed(map) => {
                let mut next = 0;
                Ok(keys
                    .iter()
                    .map(|k| match map.get(k) {
                        Some(c) => *c,
                        None => {
                            next += 1;
                            palette_color(next - 1)
                        }
                    })
                    .collect())
            }
        }
    }
}

pub(crate) fn parse_color_value(v: &Value) -> Result<Rgba> {
    match v {
        Value::Text(s) => Rgba::parse(s),
        other => Err(PlotError::InvalidColor(other.to_string())),
    }
}

/// Referenced column names, skipping the optional ones that are absent.
pub(crate) fn referenced<'a>(columns: &[Option<&'a str>]) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for c in columns.iter().flatten() {
        if !out.contains(c) {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keyed_colors_fall_back_to_palette() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Rgba::BLACK);
        let spec = ColorSpec::Keyed(map);
        let c = spec.resolve(&keys(&["a", "b", "c"]), None).unwrap();
        assert_eq!(c, vec![palette_color(0), Rgba::BLACK, palette_color(1)]);
    }

    #[test]
    fn list_cycles_and_column_parses() {
        let spec = ColorSpec::List(vec![Rgba::BLACK, Rgba::WHITE]);
        let c = spec.resolve(&keys(&["a", "b", "c"]), None).unwrap();
        assert_eq!(c[2], Rgba::BLACK);

        let spec = ColorSpec::Column("c".into());
        let vals = vec![Value::from("#FF0000"), Value::from("blue")];
        let c = spec.resolve(&keys(&["a", "b"]), Some(&vals)).unwrap();
        assert_eq!(c, vec![Rgba::rgb(255, 0, 0), Rgba::rgb(0, 0, 255)]);
        assert!(matches!(
            spec.resolve(&keys(&["a"]), Some(&[Value::Number(1.0)])),
            Err(PlotError::InvalidColor(_))
        ));
    }

    #[test]
    fn referenced_skips_absent_and_duplicates() {
        assert_eq!(referenced(&[Some("a"), None, Some("b"), Some("a")]), vec!["a", "b"]);
    }
}
