use crate::error::{PlotError, Result};
use crate::figure::{ColorBar, Limits, Mark};
use crate::frame::DataFrame;
use crate::session::{PlotFrame, Session};
use crate::style::ColorScale;

const HIST2D_SIZE: (f64, f64) = (7.5, 6.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bins2d {
    /// Same count on both axes.
    Count(usize),
    PerAxis(usize, usize),
}

impl Default for Bins2d {
    fn default() -> Self {
        Bins2d::Count(20)
    }
}

impl Bins2d {
    fn counts(self) -> (usize, usize) {
        match self {
            Bins2d::Count(n) => (n, n),
            Bins2d::PerAxis(nx, ny) => (nx, ny),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hist2dOptions {
    /// Inclusive lower x bound; also the left edge of the binned range.
    pub x_min: Option<f64>,
    /// Exclusive upper x bound.
    pub x_max: Option<f64>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub color_scale: String,
    pub bins: Bins2d,
    pub colorbar: bool,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub frame: PlotFrame,
}

impl Default for Hist2dOptions {
    fn default() -> Self {
        Self {
            x_min: None,
            x_max: None,
            y_min: None,
            y_max: None,
            color_scale: "Blues".to_string(),
            bins: Bins2d::default(),
            colorbar: true,
            x_label: None,
            y_label: None,
            frame: PlotFrame::default(),
        }
    }
}

/// Counts over `[x_range] × [y_range]` in `nx × ny` equal cells, `counts[ix][iy]`.
/// Both ranges are closed at the top so points on the upper edge land in the last cell.
pub fn histogram2d(
    xs: &[f64],
    ys: &[f64],
    x_range: (f64, f64),
    y_range: (f64, f64),
    (nx, ny): (usize, usize),
) -> Vec<Vec<u32>> {
    let mut counts = vec![vec![0u32; ny]; nx];
    if nx == 0 || ny == 0 {
        return counts;
    }
    let cell = |v: f64, (lo, hi): (f64, f64), n: usize| -> Option<usize> {
        if !(v >= lo && v <= hi) {
            return None;
        }
        if hi == lo {
            return Some(0);
        }
        Some((((v - lo) / (hi - lo) * n as f64) as usize).min(n - 1))
    };
    for (&x, &y) in xs.iter().zip(ys) {
        if let (Some(i), Some(j)) = (cell(x, x_range, nx), cell(y, y_range, ny)) {
            counts[i][j] += 1;
        }
    }
    counts
}

fn widen(lo: f64, hi: f64) -> (f64, f64) {
    if lo == hi { (lo - 0.5, hi + 0.5) } else { (lo, hi) }
}

impl Session {
    /// Heat map of point density over `x_column` × `y_column`. Cells without points are
    /// left empty. Returns without drawing when no point survives the bounds.
    pub fn hist2d(
        &mut self,
        data: &DataFrame,
        x_column: &str,
        y_column: &str,
        opts: &Hist2dOptions,
    ) -> Result<()> {
        let scale = ColorScale::named(&opts.color_scale)?;
        let (nx, ny) = opts.bins.counts();
        if nx == 0 || ny == 0 {
            return Err(PlotError::invalid("bin counts must be positive"));
        }
        let df = data.drop_missing(&[x_column, y_column])?;
        let (mut xs, mut ys) = (Vec::new(), Vec::new());
        for (x, y) in df.numbers(x_column)?.into_iter().zip(df.numbers(y_column)?) {
            let inside = opts.x_min.is_none_or(|v| x >= v)
                && opts.x_max.is_none_or(|v| x < v)
                && opts.y_min.is_none_or(|v| y >= v)
                && opts.y_max.is_none_or(|v| y < v);
            if inside {
                xs.push(x);
                ys.push(y);
            }
        }
        if xs.is_empty() {
            log::debug!("hist2d of {x_column} x {y_column}: nothing inside the bounds");
            return Ok(());
        }
        let extent = |v: &[f64]| {
            v.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), x| (a.min(*x), b.max(*x)))
        };
        let (dx0, dx1) = extent(&xs);
        let (dy0, dy1) = extent(&ys);
        let x_range = widen(opts.x_min.unwrap_or(dx0), opts.x_max.unwrap_or(dx1));
        let y_range = widen(opts.y_min.unwrap_or(dy0), opts.y_max.unwrap_or(dy1));
        let counts = histogram2d(&xs, &ys, x_range, y_range, (nx, ny));
        let max = counts.iter().flatten().copied().max().unwrap_or(1).max(1) as f64;

        self.render_chart(&opts.frame, HIST2D_SIZE, |surface, labels| {
            let w = (x_range.1 - x_range.0) / nx as f64;
            let h = (y_range.1 - y_range.0) / ny as f64;
            for (i, col) in counts.iter().enumerate() {
                for (j, &n) in col.iter().enumerate() {
                    if n < 1 {
                        continue;
                    }
                    let x0 = x_range.0 + w * i as f64;
                    let y0 = y_range.0 + h * j as f64;
                    surface.push(Mark::Rect {
                        x0,
                        y0,
                        x1: x0 + w,
                        y1: y0 + h,
                        fill: scale.map(n as f64, 1.0, max),
                        edge: None,
                    });
                }
            }
            surface.x_limits = Limits::new(Some(x_range.0), Some(x_range.1));
            surface.y_limits = Limits::new(Some(y_range.0), Some(y_range.1));
            surface.x_label = Some(labels.resolve(opts.x_label.as_deref(), x_column));
            surface.y_label = Some(labels.resolve(opts.y_label.as_deref(), y_column));
            if opts.colorbar {
                surface.attach_colorbar(ColorBar {
                    scale,
                    min: 1.0,
                    max,
                    label: None,
                });
            }
            Ok(())
        })
    }
}
