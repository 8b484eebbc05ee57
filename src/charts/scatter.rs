use super::{parse_color_value, referenced};
use crate::error::{PlotError, Result};
use crate::figure::{CellSurface, ColorBar, Limits, Mark};
use crate::frame::{DataFrame, Value};
use crate::labels::LabelTable;
use crate::session::{PlotFrame, Session};
use crate::style::{ColorScale, Rgba, palette_color};
use std::f64::consts::PI;

const SCATTER_SIZE: (f64, f64) = (9.8, 8.0);
/// Marker area in square points when no size column is given.
pub const DEFAULT_MARKER_SIZE: f64 = 20.0;

/// How size values become marker areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeMode {
    /// The value is the area.
    #[default]
    Area,
    /// The value is a radius; the area is `π·s²`.
    Radius,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum MarkerColor {
    /// First palette color.
    #[default]
    Default,
    Single(Rgba),
    /// A column of color strings, or of numbers mapped through the color scale.
    Column(String),
}

impl MarkerColor {
    pub fn column(&self) -> Option<&str> {
        match self {
            MarkerColor::Column(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterOptions {
    pub size_column: Option<String>,
    pub size_factor: f64,
    pub size_mode: SizeMode,
    pub color: MarkerColor,
    pub color_scale: String,
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub frame: PlotFrame,
}

impl Default for ScatterOptions {
    fn default() -> Self {
        Self {
            size_column: None,
            size_factor: 1.0,
            size_mode: SizeMode::Area,
            color: MarkerColor::Default,
            color_scale: "rainbow".to_string(),
            x_min: None,
            x_max: None,
            y_min: None,
            y_max: None,
            x_label: None,
            y_label: None,
            frame: PlotFrame::default(),
        }
    }
}

/// Marker areas: `(sizes or default) × factor`, squared times π in radius mode.
pub fn marker_areas(
    sizes: Option<&[f64]>,
    n: usize,
    default: f64,
    factor: f64,
    mode: SizeMode,
) -> Vec<f64> {
    let s: Vec<f64> = match sizes {
        Some(v) => v.iter().map(|s| s * factor).collect(),
        None => vec![default * factor; n],
    };
    match mode {
        SizeMode::Area => s,
        SizeMode::Radius => s.into_iter().map(|s| PI * s * s).collect(),
    }
}

/// Per-point marker colors, plus a color bar when a numeric column drives them.
pub(crate) struct MarkerColors {
    pub colors: Vec<Rgba>,
    pub colorbar: Option<ColorBar>,
}

/// Resolve `color` for the rows of `df`. Text columns are parsed as colors; numeric
/// columns go through `scale_name`.
pub(crate) fn marker_colors(
    df: &DataFrame,
    color: &MarkerColor,
    fallback: Rgba,
    scale_name: &str,
) -> Result<MarkerColors> {
    let column = match color {
        MarkerColor::Default => {
            return Ok(MarkerColors {
                colors: vec![fallback; df.len()],
                colorbar: None,
            });
        }
        MarkerColor::Single(c) => {
            return Ok(MarkerColors {
                colors: vec![*c; df.len()],
                colorbar: None,
            });
        }
        MarkerColor::Column(c) => c,
    };
    let values = df.column(column)?;
    if values.iter().all(|v| matches!(v, Value::Text(_))) {
        return Ok(MarkerColors {
            colors: values.iter().map(parse_color_value).collect::<Result<_>>()?,
            colorbar: None,
        });
    }
    let scale = ColorScale::named(scale_name)?;
    let numbers = df.numbers(column)?;
    let (min, max) = numbers
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), v| (a.min(*v), b.max(*v)));
    if !min.is_finite() {
        return Ok(MarkerColors {
            colors: Vec::new(),
            colorbar: None,
        });
    }
    Ok(MarkerColors {
        colors: numbers.iter().map(|v| scale.map(*v, min, max)).collect(),
        colorbar: Some(ColorBar {
            scale,
            min,
            max,
            label: None,
        }),
    })
}

/// Push one marker per point and attach the color bar (with the resolved column label).
pub(crate) fn draw_markers(
    surface: &mut CellSurface<'_>,
    points: &[(f64, f64)],
    areas: &[f64],
    colors: MarkerColors,
    color: &MarkerColor,
    labels: &LabelTable,
) {
    for ((&(x, y), &area), &c) in points.iter().zip(areas).zip(&colors.colors) {
        if x.is_finite() && y.is_finite() {
            surface.push(Mark::Marker {
                x,
                y,
                area,
                color: c,
            });
        }
    }
    if let Some(mut cb) = colors.colorbar {
        cb.label = color.column().map(|c| labels.resolve(None, c));
        surface.attach_colorbar(cb);
    }
}

impl Session {
    /// Scatter plot of `x_column` against `y_column`.
    pub fn scatter(
        &mut self,
        data: &DataFrame,
        x_column: &str,
        y_column: &str,
        opts: &ScatterOptions,
    ) -> Result<()> {
        if !(opts.size_factor.is_finite() && opts.size_factor >= 0.0) {
            return Err(PlotError::invalid(format!(
                "size factor must be non-negative, got {}",
                opts.size_factor
            )));
        }
        let size_column = opts.size_column.as_deref();
        let df = data.drop_missing(&referenced(&[
            Some(x_column),
            Some(y_column),
            size_column,
            opts.color.column(),
        ]))?;
        let xs = df.numbers(x_column)?;
        let ys = df.numbers(y_column)?;
        let sizes = size_column.map(|c| df.numbers(c)).transpose()?;
        let areas = marker_areas(
            sizes.as_deref(),
            df.len(),
            DEFAULT_MARKER_SIZE,
            opts.size_factor,
            opts.size_mode,
        );
        let colors = marker_colors(&df, &opts.color, palette_color(0), &opts.color_scale)?;
        let points: Vec<(f64, f64)> = xs.into_iter().zip(ys).collect();

        self.render_chart(&opts.frame, SCATTER_SIZE, |surface, labels| {
            draw_markers(surface, &points, &areas, colors, &opts.color, labels);
            surface.x_limits = Limits::new(opts.x_min, opts.x_max);
            surface.y_limits = Limits::new(opts.y_min, opts.y_max);
            surface.x_label = Some(labels.resolve(opts.x_label.as_deref(), x_column));
            surface.y_label = Some(labels.resolve(opts.y_label.as_deref(), y_column));
            Ok(())
        })
    }
}
