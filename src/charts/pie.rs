use super::{ColorSpec, referenced};
use crate::error::{PlotError, Result};
use crate::figure::{Limits, Mark};
use crate::frame::{ChartData, DataFrame, Key, Value};
use crate::session::{PlotFrame, Session};
use std::cmp::Ordering;

const PIE_SIZE: (f64, f64) = (4.0, 4.0);
const LIMIT: f64 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieSort {
    /// By label (label column or index).
    Label,
    /// By label, then by value descending.
    Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieOptions {
    /// Slice labels; `None` uses the index.
    pub label_column: Option<String>,
    pub sort: Option<PieSort>,
    /// Show percentages (`12.3%`) inside the slices.
    pub pct: bool,
    /// Angle of the first slice edge, degrees counter-clockwise from 3 o'clock.
    pub start_angle: f64,
    pub clockwise: bool,
    pub colors: ColorSpec,
    pub frame: PlotFrame,
}

impl Default for PieOptions {
    fn default() -> Self {
        Self {
            label_column: None,
            sort: None,
            pct: true,
            start_angle: 180.0,
            clockwise: true,
            colors: ColorSpec::Auto,
            frame: PlotFrame::default(),
        }
    }
}

/// Angular extent of one slice; `start_deg < end_deg`, counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WedgeSpan {
    pub start_deg: f64,
    pub end_deg: f64,
    pub fraction: f64,
}

/// Split the circle proportionally to `values`, beginning at `start_angle`.
pub fn pie_wedges(values: &[f64], start_angle: f64, clockwise: bool) -> Result<Vec<WedgeSpan>> {
    if let Some(v) = values.iter().find(|v| **v < 0.0 || !v.is_finite()) {
        return Err(PlotError::invalid(format!(
            "pie values must be finite and non-negative, got {v}"
        )));
    }
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Err(PlotError::EmptyData("pie values sum to zero".into()));
    }
    let mut acc = 0.0;
    Ok(values
        .iter()
        .map(|v| {
            let from = acc / total * 360.0;
            acc += v;
            let to = acc / total * 360.0;
            let (start_deg, end_deg) = if clockwise {
                (start_angle - to, start_angle - from)
            } else {
                (start_angle + from, start_angle + to)
            };
            WedgeSpan {
                start_deg,
                end_deg,
                fraction: v / total,
            }
        })
        .collect())
}

fn key_order(a: &Option<Key>, b: &Option<Key>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Row order for `sort`: stable by label, then (for `Value`) stable by value descending.
fn sorted_rows(
    df: &DataFrame,
    values: &[f64],
    label_column: Option<&str>,
    sort: PieSort,
) -> Result<Vec<usize>> {
    let labels: Vec<Option<Key>> = match label_column {
        Some(c) => df.column(c)?.iter().map(Value::key).collect(),
        None => df.index().iter().map(Value::key).collect(),
    };
    let mut rows: Vec<usize> = (0..df.len()).collect();
    rows.sort_by(|a, b| key_order(&labels[*a], &labels[*b]));
    if sort == PieSort::Value {
        rows.sort_by(|a, b| values[*b].total_cmp(&values[*a]));
    }
    Ok(rows)
}

impl Session {
    /// Pie chart of one value column (or a series), one slice per row.
    pub fn pie<'a>(&mut self, data: impl Into<ChartData<'a>>, opts: &PieOptions) -> Result<()> {
        let (frame, column) = data.into().resolve();
        let label_column = opts.label_column.as_deref();
        let used = referenced(&[Some(column), label_column, opts.colors.column()]);
        let mut df = frame.drop_missing(&used)?;
        if df.is_empty() {
            return Err(PlotError::EmptyData(format!("column {column} has no values")));
        }
        if let Some(sort) = opts.sort {
            let values = df.numbers(column)?;
            let rows = sorted_rows(&df, &values, label_column, sort)?;
            df = df.take(&rows);
        }
        let values = df.numbers(column)?;
        let labels = df.labels(label_column)?;
        let colors = match opts.colors.column() {
            Some(c) => opts.colors.resolve(&labels, Some(df.column(c)?))?,
            None => opts.colors.resolve(&labels, None)?,
        };
        let wedges = pie_wedges(&values, opts.start_angle, opts.clockwise)?;

        self.render_chart(&opts.frame, PIE_SIZE, |surface, _labels| {
            for ((w, label), color) in wedges.iter().zip(labels).zip(colors) {
                surface.push(Mark::Wedge {
                    center: (0.0, 0.0),
                    radius: 1.0,
                    start_deg: w.start_deg,
                    end_deg: w.end_deg,
                    color,
                    label: Some(label),
                    pct_label: opts.pct.then(|| format!("{:.1}%", w.fraction * 100.0)),
                });
            }
            surface.aspect_equal = true;
            surface.axis_visible = false;
            surface.x_limits = Limits::new(Some(-LIMIT), Some(LIMIT));
            surface.y_limits = Limits::new(Some(-LIMIT), Some(LIMIT));
            Ok(())
        })
    }

    /// Pie chart of row counts per distinct value of `column` (first-appearance order
    /// unless sorted). `opts.label_column` is ignored; the counted values label the slices.
    pub fn pie_groups(&mut self, data: &DataFrame, column: &str, opts: &PieOptions) -> Result<()> {
        let counts = data.value_counts(column)?;
        let grouped = DataFrame::builder()
            .column("value", counts.iter().map(|(_, n)| *n as f64))
            .index(counts.into_iter().map(|(k, _)| Value::from(k)))
            .build()?;
        let opts = PieOptions {
            label_column: None,
            ..opts.clone()
        };
        self.pie((&grouped, "value"), &opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn wedges_run_clockwise_from_start() {
        let w = pie_wedges(&[1.0, 3.0], 180.0, true).unwrap();
        assert_abs_diff_eq!(w[0].end_deg, 180.0);
        assert_abs_diff_eq!(w[0].start_deg, 90.0);
        assert_abs_diff_eq!(w[1].end_deg, 90.0);
        assert_abs_diff_eq!(w[1].start_deg, -180.0);
        assert_abs_diff_eq!(w[1].fraction, 0.75);
        let ccw = pie_wedges(&[1.0, 1.0], 0.0, false).unwrap();
        assert_abs_diff_eq!(ccw[1].start_deg, 180.0);
        assert_abs_diff_eq!(ccw[1].end_deg, 360.0);
    }

    #[test]
    fn wedges_reject_bad_values() {
        assert!(matches!(pie_wedges(&[1.0, -1.0], 0.0, true), Err(PlotError::InvalidArgument(_))));
        assert!(matches!(pie_wedges(&[0.0, 0.0], 0.0, true), Err(PlotError::EmptyData(_))));
    }

    #[test]
    fn value_sort_breaks_ties_by_label() {
        let df = DataFrame::builder()
            .column("v", [1.0, 5.0, 1.0, 3.0])
            .column("l", ["d", "c", "a", "b"])
            .build()
            .unwrap();
        let values = df.numbers("v").unwrap();
        let rows = sorted_rows(&df, &values, Some("l"), PieSort::Value).unwrap();
        assert_eq!(rows, vec![1, 3, 2, 0]);
        let rows = sorted_rows(&df, &values, Some("l"), PieSort::Label).unwrap();
        assert_eq!(rows, vec![2, 3, 1, 0]);
    }
}
