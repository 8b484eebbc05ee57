//! Named map style presets and caller overrides.

use crate::error::{PlotError, Result};
use crate::style::{Rgba, Stroke};

/// Colors, line widths (points), and layer switches of a base map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapStyle {
    pub ocean: Rgba,
    pub continent: Rgba,
    pub coast: Rgba,
    pub lake: Rgba,
    pub river: Rgba,
    pub border: Rgba,
    pub region: Rgba,
    pub district: Rgba,
    pub grid: Rgba,
    pub coast_width: f64,
    pub river_width: f64,
    pub border_width: f64,
    pub region_width: f64,
    pub district_width: f64,
    pub grid_width: f64,
    /// Dash pattern `(on, off)` in points.
    pub grid_dashes: (f64, f64),
    pub draw_coast: bool,
    pub draw_river: bool,
    pub draw_border: bool,
    pub draw_region: bool,
    pub draw_district: bool,
    pub draw_grid: bool,
}

const GRID: Rgba = Rgba::new(0, 0, 0, 0x20);

/// Names accepted by `MapStyle::preset`.
pub const PRESETS: &[&str] = &["default", "gray"];

impl MapStyle {
    pub fn preset(name: &str) -> Result<Self> {
        let style = match name {
            "default" => MapStyle {
                ocean: Rgba::rgb(0xD0, 0xE8, 0xFF),
                continent: Rgba::rgb(0xE0, 0xFF, 0xC0),
                coast: Rgba::rgb(0x60, 0xA0, 0xFF),
                lake: Rgba::rgb(0xD0, 0xE8, 0xFF),
                river: Rgba::rgb(0x60, 0xA0, 0xFF),
                border: Rgba::rgb(0xC0, 0x80, 0x80),
                region: Rgba::rgb(0xE0, 0xA0, 0xA0),
                district: Rgba::rgb(0xF0, 0xC0, 0xC0),
                grid: GRID,
                coast_width: 0.5,
                river_width: 0.3,
                border_width: 0.8,
                region_width: 0.4,
                district_width: 0.2,
                grid_width: 1.0,
                grid_dashes: (4.0, 2.0),
                draw_coast: true,
                draw_river: true,
                draw_border: true,
                draw_region: true,
                draw_district: true,
                draw_grid: true,
            },
            "gray" => MapStyle {
                ocean: Rgba::rgb(0xE0, 0xE0, 0xE0),
                continent: Rgba::WHITE,
                coast: Rgba::rgb(0xC0, 0xC0, 0xC0),
                lake: Rgba::rgb(0xD0, 0xD0, 0xD0),
                river: Rgba::rgb(0xD0, 0xD0, 0xD0),
                border: Rgba::rgb(0xA0, 0xA0, 0xA0),
                region: Rgba::rgb(0xC0, 0xC0, 0xC0),
                district: Rgba::rgb(0xE0, 0xE0, 0xE0),
                grid: GRID,
                coast_width: 0.8,
                river_width: 0.6,
                border_width: 1.1,
                region_width: 0.8,
                district_width: 0.2,
                grid_width: 1.0,
                grid_dashes: (4.0, 2.0),
                draw_coast: true,
                draw_river: true,
                draw_border: true,
                draw_region: true,
                draw_district: true,
                draw_grid: true,
            },
            other => return Err(PlotError::UnknownStyle(other.to_string())),
        };
        Ok(style)
    }

    /// Preset `name` (or `default`) with `overrides` applied on top.
    pub fn resolve(name: Option<&str>, overrides: &MapStyleOverrides) -> Result<Self> {
        Ok(Self::preset(name.unwrap_or("default"))?.merge(overrides))
    }

    pub fn merge(mut self, o: &MapStyleOverrides) -> Self {
        macro_rules! apply {
            ($($field:ident),*) => {
                $(if let Some(v) = o.$field { self.$field = v; })*
            };
        }
        apply!(
            ocean,
            continent,
            coast,
            lake,
            river,
            border,
            region,
            district,
            grid,
            coast_width,
            river_width,
            border_width,
            region_width,
            district_width,
            grid_width,
            grid_dashes,
            draw_coast,
            draw_river,
            draw_border,
            draw_region,
            draw_district,
            draw_grid
        );
        self
    }

    pub fn grid_stroke(&self) -> Stroke {
        Stroke::dashed(self.grid, self.grid_width, self.grid_dashes.0, self.grid_dashes.1)
    }
}

/// Per-call overrides; `None` keeps the preset value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MapStyleOverrides {
    pub ocean: Option<Rgba>,
    pub continent: Option<Rgba>,
    pub coast: Option<Rgba>,
    pub lake: Option<Rgba>,
    pub river: Option<Rgba>,
    pub border: Option<Rgba>,
    pub region: Option<Rgba>,
    pub district: Option<Rgba>,
    pub grid: Option<Rgba>,
    pub coast_width: Option<f64>,
    pub river_width: Option<f64>,
    pub border_width: Option<f64>,
    pub region_width: Option<f64>,
    pub district_width: Option<f64>,
    pub grid_width: Option<f64>,
    pub grid_dashes: Option<(f64, f64)>,
    pub draw_coast: Option<bool>,
    pub draw_river: Option<bool>,
    pub draw_border: Option<bool>,
    pub draw_region: Option<bool>,
    pub draw_district: Option<bool>,
    pub draw_grid: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_preset_is_an_error() {
        assert!(matches!(MapStyle::preset("neon"), Err(PlotError::UnknownStyle(s)) if s == "neon"));
    }

    #[test]
    fn overrides_win_over_preset() {
        let o = MapStyleOverrides {
            ocean: Some(Rgba::BLACK),
            draw_grid: Some(false),
            ..Default::default()
        };
        let s = MapStyle::resolve(Some("gray"), &o).unwrap();
        assert_eq!(s.ocean, Rgba::BLACK);
        assert!(!s.draw_grid);
        assert_eq!(s.coast_width, 0.8);
        assert_eq!(s.grid, Rgba::new(0, 0, 0, 0x20));
    }
}
