use super::referenced;
use crate::error::{PlotError, Result};
use crate::figure::{LegendEntry, Limits, Mark, TickFormat};
use crate::frame::{DataFrame, Value};
use crate::session::{PlotFrame, Session};
use crate::style::{Rgba, Stroke, palette_color};

const LINE_SIZE: (f64, f64) = (10.0, 5.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationKind {
    /// Quadratic interpolating spline with knots midway between the data points.
    #[default]
    Quadratic,
    /// Cubic interpolating spline with not-a-knot ends.
    Cubic,
}

/// Resample each line at a fixed x step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolation {
    pub step: f64,
    pub kind: InterpolationKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineOptions {
    /// Horizontal values; `None` uses the index.
    pub x_column: Option<String>,
    /// One line per distinct key.
    pub key_column: Option<String>,
    /// One color and legend entry per distinct label; lines inside a label are split by
    /// `key_column` (or by the label itself when no key column is given).
    pub label_column: Option<String>,
    /// Groups with fewer rows are not drawn.
    pub min_n: Option<usize>,
    /// Fixed line color; disables label coloring.
    pub color: Option<Rgba>,
    pub line_width: f64,
    /// Centered moving-average window.
    pub avg_window: Option<usize>,
    pub interpolation: Option<Interpolation>,
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub frame: PlotFrame,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            x_column: None,
            key_column: None,
            label_column: None,
            min_n: None,
            color: None,
            line_width: 2.0,
            avg_window: None,
            interpolation: None,
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

/// Centered moving average over `window` values.
///
/// Returns `n - window + 1` means, paired with the indices
/// `[floor(window / 2), n - ceil(window / 2)]`. Fewer than `window` values give nothing.
pub fn moving_average(
    indices: &[f64],
    values: &[f64],
    window: usize,
) -> Result<(Vec<f64>, Vec<f64>)> {
    if indices.len() != values.len() {
        return Err(PlotError::invalid(format!(
            "indices and values differ in length ({} vs {})",
            indices.len(),
            values.len()
        )));
    }
    if window == 0 {
        return Err(PlotError::invalid("moving average window must be positive"));
    }
    let n = values.len();
    if n < window {
        return Ok((Vec::new(), Vec::new()));
    }
    let means: Vec<f64> = values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect();
    let start = window / 2;
    let x = indices[start..start + means.len()].to_vec();
    Ok((x, means))
}

/// Resample `(x, y)` at `x0, x0 + step, …` strictly below the last x.
///
/// Points are sorted by x first; repeated x values are rejected. Quadratic needs three
/// points, cubic four.
pub fn interpolate(
    x: &[f64],
    y: &[f64],
    step: f64,
    kind: InterpolationKind,
) -> Result<(Vec<f64>, Vec<f64>)> {
    if x.len() != y.len() {
        return Err(PlotError::invalid("x and y differ in length"));
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(PlotError::invalid(format!(
            "interpolation step must be positive, got {step}"
        )));
    }
    let needed = match kind {
        InterpolationKind::Quadratic => 3,
        InterpolationKind::Cubic => 4,
    };
    if x.len() < needed {
        return Err(PlotError::invalid(format!(
            "{kind:?} interpolation needs at least {needed} points, got {}",
            x.len()
        )));
    }
    let mut pts: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
    pts.sort_by(|a, b| a.0.total_cmp(&b.0));
    if pts.windows(2).any(|w| !(w[0].0 < w[1].0)) {
        return Err(PlotError::invalid("interpolation needs distinct x values"));
    }
    let xs: Vec<f64> = pts.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = pts.iter().map(|p| p.1).collect();
    let spline = match kind {
        InterpolationKind::Quadratic => BSpline::interpolating(&xs, &ys, 2),
        InterpolationKind::Cubic => BSpline::interpolating(&xs, &ys, 3),
    };
    let (first, last) = (xs[0], xs[xs.len() - 1]);
    let count = ((last - first) / step).ceil() as usize;
    let out_x: Vec<f64> = (0..count)
        .map(|i| first + step * i as f64)
        .filter(|v| *v < last)
        .collect();
    let out_y = out_x.iter().map(|v| spline.eval(*v)).collect();
    Ok((out_x, out_y))
}

/// B-spline of degree `k` with clamped knots `t` and coefficients `c`.
struct BSpline {
    t: Vec<f64>,
    c: Vec<f64>,
    k: usize,
}

impl BSpline {
    /// Spline through every `(x_i, y_i)`; `x` is strictly increasing with more than `k`
    /// points. Degree 2 puts the inner knots halfway between data points (skipping the
    /// first and last gap), degree 3 uses the data points themselves minus the second
    /// and second-to-last (not-a-knot).
    fn interpolating(x: &[f64], y: &[f64], k: usize) -> Self {
        let n = x.len();
        let (first, last) = (x[0], x[n - 1]);
        let inner: Vec<f64> = if k == 2 {
            x.windows(2)
                .skip(1)
                .take(n - 3)
                .map(|w| (w[0] + w[1]) / 2.0)
                .collect()
        } else {
            x[2..n - 2].to_vec()
        };
        let mut t = vec![first; k + 1];
        t.extend(inner);
        t.extend(std::iter::repeat_n(last, k + 1));

        // banded collocation system, row i holds columns i-k..=i+k
        let width = 2 * k + 1;
        let at = |i: usize, col: usize| i * width + col + k - i;
        let mut a = vec![0.0; n * width];
        let mut rhs = y.to_vec();
        let mut spline = Self {
            t,
            c: Vec::new(),
            k,
        };
        for (i, &xi) in x.iter().enumerate() {
            let span = spline.span(xi, n);
            for (r, b) in spline.basis(span, xi).into_iter().enumerate() {
                a[at(i, span - k + r)] = b;
            }
        }
        // collocation matrices are totally positive, so no pivoting
        for j in 0..n {
            let hi = (j + k).min(n - 1);
            for i in j + 1..=hi {
                let f = a[at(i, j)] / a[at(j, j)];
                if f == 0.0 {
                    continue;
                }
                for col in j..=hi {
                    a[at(i, col)] -= f * a[at(j, col)];
                }
                rhs[i] -= f * rhs[j];
            }
        }
        let mut c = vec![0.0; n];
        for j in (0..n).rev() {
            let hi = (j + k).min(n - 1);
            let tail: f64 = (j + 1..=hi).map(|col| a[at(j, col)] * c[col]).sum();
            c[j] = (rhs[j] - tail) / a[at(j, j)];
        }
        spline.c = c;
        spline
    }

    /// Knot interval `l` with `t[l] <= u < t[l + 1]`, kept inside `k..n`.
    fn span(&self, u: f64, n: usize) -> usize {
        self.t
            .partition_point(|v| *v <= u)
            .saturating_sub(1)
            .clamp(self.k, n - 1)
    }

    /// The `k + 1` basis functions that are non-zero at `u` on knot interval `l`.
    fn basis(&self, l: usize, u: f64) -> Vec<f64> {
        let k = self.k;
        let mut out = vec![0.0; k + 1];
        let mut left = vec![0.0; k + 1];
        let mut right = vec![0.0; k + 1];
        out[0] = 1.0;
        for j in 1..=k {
            left[j] = u - self.t[l + 1 - j];
            right[j] = self.t[l + j] - u;
            let mut saved = 0.0;
            for r in 0..j {
                let tmp = out[r] / (right[r + 1] + left[j - r]);
                out[r] = saved + right[r + 1] * tmp;
                saved = left[j - r] * tmp;
            }
            out[j] = saved;
        }
        out
    }

    fn eval(&self, u: f64) -> f64 {
        let l = self.span(u, self.c.len());
        self.basis(l, u)
            .iter()
            .enumerate()
            .map(|(r, b)| b * self.c[l - self.k + r])
            .sum()
    }
}

struct Line {
    points: Vec<(f64, f64)>,
    color: Rgba,
}

impl Session {
    /// Line chart of `column`, optionally one line per key and one color per label.
    pub fn lines(&mut self, data: &DataFrame, column: &str, opts: &LineOptions) -> Result<()> {
        if !(opts.line_width.is_finite() && opts.line_width > 0.0) {
            return Err(PlotError::invalid(format!(
                "line width must be positive, got {}",
                opts.line_width
            )));
        }
        let x_column = opts.x_column.as_deref();
        let label_column = opts.label_column.as_deref();
        let key_column = opts.key_column.as_deref().or(label_column);
        let by_label = label_column.filter(|_| opts.color.is_none());
        let df = data.drop_missing(&referenced(&[Some(column), x_column, key_column, by_label]))?;

        let line_of = |d: &DataFrame, color: Rgba| -> Result<Option<Line>> {
            if opts.min_n.is_some_and(|n| d.len() < n) {
                return Ok(None);
            }
            let mut x = match x_column {
                Some(c) => d.numbers(c)?,
                None => d.index_numbers()?,
            };
            let mut y = d.numbers(column)?;
            if let Some(w) = opts.avg_window {
                (x, y) = moving_average(&x, &y, w)?;
            }
            if let Some(ip) = opts.interpolation {
                (x, y) = interpolate(&x, &y, ip.step, ip.kind)?;
            }
            Ok(Some(Line {
                points: x.into_iter().zip(y).collect(),
                color,
            }))
        };

        let mut lines = Vec::new();
        let mut legend = Vec::new();
        match (key_column, by_label) {
            (Some(key), Some(label)) => {
                for (i, (name, ldf)) in df.group_by(label)?.into_iter().enumerate() {
                    let color = palette_color(i);
                    legend.push(LegendEntry {
                        label: name.to_string(),
                        color,
                    });
                    for (_, kdf) in ldf.group_by(key)? {
                        lines.extend(line_of(&kdf, color)?);
                    }
                }
            }
            (Some(key), None) => {
                for (i, (_, kdf)) in df.group_by(key)?.into_iter().enumerate() {
                    lines.extend(line_of(&kdf, opts.color.unwrap_or_else(|| palette_color(i)))?);
                }
            }
            (None, _) => {
                lines.extend(line_of(&df, opts.color.unwrap_or_else(|| palette_color(0)))?);
            }
        }
        let temporal = match x_column {
            Some(c) => df.is_temporal(c)?,
            None => {
                !df.is_empty() && df.index().iter().all(|v| matches!(v, Value::Time(_)))
            }
        };
        log::debug!("lines of {column}: {} drawn", lines.len());

        self.render_chart(&opts.frame, LINE_SIZE, |surface, labels| {
            for line in lines {
                surface.push(Mark::Line {
                    points: line.points,
                    stroke: Stroke::solid(line.color, opts.line_width),
                });
            }
            surface.legend.extend(legend);
            if temporal {
                surface.x_format = TickFormat::Time;
            }
            surface.x_limits = Limits::new(opts.x_min, opts.x_max);
            surface.y_limits = Limits::new(opts.y_min, opts.y_max);
            surface.x_label = labels.resolve_opt(opts.x_label.as_deref(), x_column);
            surface.y_label = Some(labels.resolve(opts.y_label.as_deref(), column));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn moving_average_centers_the_window() {
        let (x, y) = moving_average(&[0.0, 1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert_eq!(x, vec![1.0, 2.0, 3.0]);
        assert_eq!(y, vec![2.0, 3.0, 4.0]);
        let (x, y) = moving_average(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0], 2).unwrap();
        assert_eq!(x, vec![1.0, 2.0, 3.0]);
        assert_eq!(y, vec![2.0, 4.0, 6.0]);
        let (x, _) = moving_average(&[0.0], &[1.0], 3).unwrap();
        assert!(x.is_empty());
    }

    #[test]
    fn splines_pass_through_knots() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 4.0, 9.0];
        for kind in [InterpolationKind::Quadratic, InterpolationKind::Cubic] {
            let (ox, oy) = interpolate(&x, &y, 0.5, kind).unwrap();
            assert_eq!(ox, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5]);
            assert_abs_diff_eq!(oy[2], 1.0, epsilon = 1e-9);
            assert_abs_diff_eq!(oy[4], 4.0, epsilon = 1e-9);
        }
        // a quadratic reproduces a parabola exactly
        let (_, oy) = interpolate(&x, &y, 0.5, InterpolationKind::Quadratic).unwrap();
        assert_abs_diff_eq!(oy[5], 6.25, epsilon = 1e-9);
    }

    #[test]
    fn cubic_reproduces_a_cubic() {
        let (ox, oy) = interpolate(
            &[0.0, 1.0, 2.0, 3.0],
            &[0.0, 1.0, 8.0, 27.0],
            0.5,
            InterpolationKind::Cubic,
        )
        .unwrap();
        for (x, y) in ox.iter().zip(&oy) {
            assert_abs_diff_eq!(*y, x * x * x, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(oy[1], 0.125, epsilon = 1e-12);

        // uneven spacing and more points than one polynomial piece
        let x = [0.0, 0.5, 1.5, 2.0, 3.5, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| v * v * v - 2.0 * v).collect();
        let (ox, oy) = interpolate(&x, &y, 0.25, InterpolationKind::Cubic).unwrap();
        for (x, y) in ox.iter().zip(&oy) {
            assert_abs_diff_eq!(*y, x * x * x - 2.0 * x, epsilon = 1e-9);
        }
    }

    #[test]
    fn quadratic_matches_midpoint_knot_spline() {
        // knots 0,0,0,1.5,3,3,3 through (0,0) (1,1) (2,0) (3,1)
        let (_, oy) = interpolate(
            &[0.0, 1.0, 2.0, 3.0],
            &[0.0, 1.0, 0.0, 1.0],
            0.5,
            InterpolationKind::Quadratic,
        )
        .unwrap();
        assert_abs_diff_eq!(oy[2], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(oy[4], 0.0, epsilon = 1e-12);
        // symmetric data gives a value symmetric about the middle knot
        assert_abs_diff_eq!(oy[3], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn interpolation_rejects_short_or_repeated_input() {
        assert!(interpolate(&[0.0, 1.0], &[0.0, 1.0], 0.1, InterpolationKind::Quadratic).is_err());
        assert!(
            interpolate(&[0.0, 1.0, 1.0], &[0.0, 1.0, 2.0], 0.1, InterpolationKind::Quadratic)
                .is_err()
        );
    }

    #[test]
    fn label_groups_share_color_and_legend_entry() {
        let mut s = Session::new();
        let df = DataFrame::builder()
            .column("v", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .column("run", [1.0, 1.0, 2.0, 2.0, 3.0, 3.0])
            .column("site", ["a", "a", "a", "a", "b", "b"])
            .build()
            .unwrap();
        let opts = LineOptions {
            key_column: Some("run".into()),
            label_column: Some("site".into()),
            ..Default::default()
        };
        s.lines(&df, "v", &opts).unwrap();
        let fig = s.last_figure().unwrap();
        let ax = &fig.all_axes()[0];
        assert_eq!(ax.marks.len(), 3);
        assert_eq!(ax.legend.len(), 2);
        let colors: Vec<Rgba> = ax
            .marks
            .iter()
            .filter_map(|m| match m {
                Mark::Line { stroke, .. } => Some(stroke.color),
                _ => None,
            })
            .collect();
        assert_eq!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
    }

    #[test]
    fn min_n_skips_small_groups() {
        let mut s = Session::new();
        let df = DataFrame::builder()
            .column("v", [1.0, 2.0, 3.0])
            .column("k", ["a", "a", "b"])
            .build()
            .unwrap();
        let opts = LineOptions {
            key_column: Some("k".into()),
            min_n: Some(2),
            ..Default::default()
        };
        s.lines(&df, "v", &opts).unwrap();
        assert_eq!(s.last_figure().unwrap().all_axes()[0].marks.len(), 1);
    }
}
