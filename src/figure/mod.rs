//! Rendering surface: a figure holding a grid of axes, each a retained list of marks.
//!
//! - A `Figure` is created either by one chart call (one-shot) or by a multiplot lifecycle
//! - Chart calls draw through a `CellSurface`, a handle on one axes of the figure
//! - Attaching a color bar raises the figure's layout-suppression flag
//! - `Figure::save` serializes the scene to SVG or a bitmap (see `export`)

pub mod clip;
pub mod export;
pub mod text;
pub mod ticks;

use crate::error::{PlotError, Result};
use crate::style::{ColorScale, Rgba, Stroke};
use std::ops::{Deref, DerefMut};

/// Default padding (in font-size units) of the automatic layout.
pub const DEFAULT_PAD: f64 = 1.08;

/// Rows × columns of a figure grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(PlotError::invalid(format!("grid {rows}x{cols} has no cells")));
        }
        Ok(Self { rows, cols })
    }

    pub fn single() -> Self {
        Self { rows: 1, cols: 1 }
    }

    pub fn contains(&self, cell: &CellSpec) -> bool {
        cell.row_span > 0
            && cell.col_span > 0
            && cell.row.checked_add(cell.row_span).is_some_and(|end| end <= self.rows)
            && cell.col.checked_add(cell.col_span).is_some_and(|end| end <= self.cols)
    }
}

/// A rectangular block of grid cells: top-left position plus spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpec {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
}

impl CellSpec {
    pub fn at(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            row_span: 1,
            col_span: 1,
        }
    }

    pub fn spanning(mut self, row_span: usize, col_span: usize) -> Self {
        self.row_span = row_span;
        self.col_span = col_span;
        self
    }
}

impl Default for CellSpec {
    fn default() -> Self {
        Self::at(0, 0)
    }
}

/// Requested layout padding in font-size units; `None` fields use the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub pad: Option<f64>,
    pub w_pad: Option<f64>,
    pub h_pad: Option<f64>,
}

impl Padding {
    pub fn is_requested(&self) -> bool {
        self.pad.is_some() || self.w_pad.is_some() || self.h_pad.is_some()
    }

    pub fn to_spacing(&self) -> Spacing {
        let pad = self.pad.unwrap_or(DEFAULT_PAD);
        Spacing {
            pad,
            w_pad: self.w_pad.unwrap_or(pad),
            h_pad: self.h_pad.unwrap_or(pad),
        }
    }
}

/// Resolved spacing of the automatic layout, in font-size units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    pub pad: f64,
    pub w_pad: f64,
    pub h_pad: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickFormat {
    #[default]
    Number,
    /// Values are seconds since the Unix epoch.
    Time,
}

/// Optional lower/upper bound of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Limits {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Limits {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub pos: f64,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgba,
}

/// Secondary axis showing a color scale next to its axes.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBar {
    pub scale: ColorScale,
    pub min: f64,
    pub max: f64,
    pub label: Option<String>,
}

/// A visual mark in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    /// Pie slice; angles in degrees, counter-clockwise from the positive x axis.
    Wedge {
        center: (f64, f64),
        radius: f64,
        start_deg: f64,
        end_deg: f64,
        color: Rgba,
        label: Option<String>,
        pct_label: Option<String>,
    },
    Rect {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        fill: Rgba,
        edge: Option<Rgba>,
    },
    Line {
        points: Vec<(f64, f64)>,
        stroke: Stroke,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        fill: Rgba,
        edge: Option<Stroke>,
    },
    /// Scatter marker; `area` in square points.
    Marker {
        x: f64,
        y: f64,
        area: f64,
        color: Rgba,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
    },
}

impl Mark {
    /// Bounding box `(x0, x1, y0, y1)` in data coordinates.
    pub fn extent(&self) -> Option<(f64, f64, f64, f64)> {
        match self {
            Mark::Wedge { center, radius, .. } => Some((
                center.0 - radius,
                center.0 + radius,
                center.1 - radius,
                center.1 + radius,
            )),
            Mark::Rect { x0, y0, x1, y1, .. } => {
                Some((x0.min(*x1), x0.max(*x1), y0.min(*y1), y0.max(*y1)))
            }
            Mark::Line { points, .. } | Mark::Polygon { points, .. } => bbox(points),
            Mark::Marker { x, y, .. } => Some((*x, *x, *y, *y)),
            Mark::Text { .. } => None,
        }
    }
}

fn bbox(points: &[(f64, f64)]) -> Option<(f64, f64, f64, f64)> {
    let finite = points.iter().filter(|(x, y)| x.is_finite() && y.is_finite());
    let mut out: Option<(f64, f64, f64, f64)> = None;
    for &(x, y) in finite {
        out = Some(match out {
            None => (x, x, y, y),
            Some((a, b, c, d)) => (a.min(x), b.max(x), c.min(y), d.max(y)),
        });
    }
    out
}

/// Visible data range of an axes. `y` is in log10 space for log-scaled axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

/// One sub-plot of a figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub cell: CellSpec,
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub x_limits: Limits,
    pub y_limits: Limits,
    pub x_ticks: Option<Vec<Tick>>,
    pub x_format: TickFormat,
    pub y_scale: AxisScale,
    /// One data unit has the same length on both axes.
    pub aspect_equal: bool,
    /// Frame, ticks, and tick labels are drawn.
    pub axis_visible: bool,
    pub marks: Vec<Mark>,
    pub legend: Vec<LegendEntry>,
    pub colorbar: Option<ColorBar>,
}

impl Axes {
    pub fn new(cell: CellSpec) -> Self {
        Self {
            cell,
            title: None,
            x_label: None,
            y_label: None,
            x_limits: Limits::default(),
            y_limits: Limits::default(),
            x_ticks: None,
            x_format: TickFormat::Number,
            y_scale: AxisScale::Linear,
            aspect_equal: false,
            axis_visible: true,
            marks: Vec::new(),
            legend: Vec::new(),
            colorbar: None,
        }
    }

    pub fn push(&mut self, mark: Mark) {
        self.marks.push(mark);
    }

    /// Data range shown by this axes: explicit limits, else the mark extent with a 5% margin.
    pub fn view(&self) -> View {
        let log = self.y_scale == AxisScale::Log;
        let mut ext: Option<(f64, f64, f64, f64)> = None;
        for m in &self.marks {
            let Some((x0, x1, mut y0, mut y1)) = m.extent() else {
                continue;
            };
            if log {
                // non-positive values have no position on a log axis
                if y1 <= 0.0 {
                    continue;
                }
                if y0 <= 0.0 {
                    y0 = y1;
                }
                y0 = y0.log10();
                y1 = y1.log10();
            }
            ext = Some(match ext {
                None => (x0, x1, y0, y1),
                Some((a, b, c, d)) => (a.min(x0), b.max(x1), c.min(y0), d.max(y1)),
            });
        }
        let (x0, x1, y0, y1) = ext.unwrap_or((0.0, 1.0, 0.0, 1.0));
        let y_limits = if log {
            Limits::new(
                self.y_limits.min.filter(|v| *v > 0.0).map(f64::log10),
                self.y_limits.max.filter(|v| *v > 0.0).map(f64::log10),
            )
        } else {
            self.y_limits
        };
        View {
            x: resolve_range(x0, x1, self.x_limits),
            y: resolve_range(y0, y1, y_limits),
        }
    }
}

fn resolve_range(lo: f64, hi: f64, limits: Limits) -> (f64, f64) {
    let margin = (hi - lo) * 0.05;
    let mut lo_out = limits.min.unwrap_or(lo - margin);
    let mut hi_out = limits.max.unwrap_or(hi + margin);
    if (hi_out - lo_out).abs() < f64::EPSILON {
        lo_out -= 1.0;
        hi_out += 1.0;
    }
    (lo_out, hi_out)
}

/// Handle of an axes within its figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxesId(usize);

/// A figure: size in inches, a grid, and the axes placed on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    size: (f64, f64),
    grid: GridShape,
    axes: Vec<Axes>,
    layout: Option<Spacing>,
    layout_suppressed: bool,
    locale: String,
}

impl Figure {
    pub fn new(size: (f64, f64), grid: GridShape) -> Self {
        Self {
            size,
            grid,
            axes: Vec::new(),
            layout: None,
            layout_suppressed: false,
            locale: "en".to_string(),
        }
    }

    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = locale.to_string();
        self
    }

    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    pub fn grid(&self) -> GridShape {
        self.grid
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Place a new axes on `cell`; fails with `CellOutOfGrid` if it does not fit.
    pub fn add_axes(&mut self, cell: CellSpec) -> Result<AxesId> {
        if !self.grid.contains(&cell) {
            return Err(PlotError::CellOutOfGrid {
                row: cell.row,
                col: cell.col,
                row_span: cell.row_span,
                col_span: cell.col_span,
                rows: self.grid.rows,
                cols: self.grid.cols,
            });
        }
        self.axes.push(Axes::new(cell));
        Ok(AxesId(self.axes.len() - 1))
    }

    pub fn axes(&self, id: AxesId) -> &Axes {
        &self.axes[id.0]
    }

    pub fn axes_mut(&mut self, id: AxesId) -> &mut Axes {
        &mut self.axes[id.0]
    }

    /// Drop the most recently added axes if it is `id` (a chart that failed to draw).
    pub(crate) fn discard_axes(&mut self, id: AxesId) {
        if id.0 + 1 == self.axes.len() {
            self.axes.pop();
        }
    }

    pub fn all_axes(&self) -> &[Axes] {
        &self.axes
    }

    pub fn suppress_layout(&mut self) {
        self.layout_suppressed = true;
    }

    pub fn is_layout_suppressed(&self) -> bool {
        self.layout_suppressed
    }

    /// Spread the axes evenly with the given spacing. No-op while layout is suppressed;
    /// returns whether the spacing was applied.
    pub fn apply_tight_layout(&mut self, spacing: Spacing) -> bool {
        if self.layout_suppressed {
            return false;
        }
        self.layout = Some(spacing);
        true
    }

    pub fn layout(&self) -> Option<Spacing> {
        self.layout
    }

    /// Serialize the figure; `.svg` writes a vector file, anything else a bitmap.
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P, dpi: u32) -> Result<()> {
        export::save_figure(self, path.as_ref(), dpi)
    }
}

/// Drawing handle on one axes of a figure, handed to chart renderers.
pub struct CellSurface<'a> {
    figure: &'a mut Figure,
    id: AxesId,
}

impl<'a> CellSurface<'a> {
    pub fn new(figure: &'a mut Figure, id: AxesId) -> Self {
        Self { figure, id }
    }

    pub fn id(&self) -> AxesId {
        self.id
    }

    /// Attach a color bar next to this axes; disables automatic layout for the figure.
    pub fn attach_colorbar(&mut self, colorbar: ColorBar) {
        self.figure.axes_mut(self.id).colorbar = Some(colorbar);
        self.figure.suppress_layout();
    }
}

impl Deref for CellSurface<'_> {
    type Target = Axes;

    fn deref(&self) -> &Axes {
        self.figure.axes(self.id)
    }
}

impl DerefMut for CellSurface<'_> {
    fn deref_mut(&mut self) -> &mut Axes {
        self.figure.axes_mut(self.id)
    }
}
