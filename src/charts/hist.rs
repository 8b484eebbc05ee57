use super::{ColorSpec, referenced};
use crate::error::{PlotError, Result};
use crate::figure::{AxisScale, LegendEntry, Limits, Mark, Tick};
use crate::frame::DataFrame;
use crate::session::{PlotFrame, Session};

const HIST_SIZE: (f64, f64) = (10.0, 4.0);

#[derive(Debug, Clone, PartialEq)]
pub enum Bins {
    /// Equal-width bins over the data range.
    Count(usize),
    /// Explicit, increasing bin edges.
    Edges(Vec<f64>),
}

impl Default for Bins {
    fn default() -> Self {
        Bins::Count(35)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistOptions {
    /// Split values into one series per distinct key.
    pub key_column: Option<String>,
    pub bins: Bins,
    /// Explicit x tick positions.
    pub ticks: Option<Vec<f64>>,
    /// Values below are dropped before binning.
    pub x_min: Option<f64>,
    /// Values above are dropped before binning.
    pub x_max: Option<f64>,
    pub y_log: bool,
    pub stacked: bool,
    pub cumulative: bool,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Colors by series key (the column name when ungrouped). A color column
    /// colors each series by its first row.
    pub colors: ColorSpec,
    pub frame: PlotFrame,
}

/// Bin edges for `series`: explicit edges as given, else `count` equal bins over the
/// combined range (a degenerate range is widened by 0.5 on each side, no data gives 0..1).
pub fn histogram_edges(series: &[Vec<f64>], bins: &Bins) -> Result<Vec<f64>> {
    match bins {
        Bins::Edges(edges) => {
            if edges.len() < 2 || edges.windows(2).any(|w| !(w[0] < w[1])) {
                return Err(PlotError::invalid("bin edges must be at least two increasing values"));
            }
            Ok(edges.clone())
        }
        Bins::Count(0) => Err(PlotError::invalid("bin count must be positive")),
        Bins::Count(n) => {
            let mut values = series.iter().flatten().copied();
            let (mut lo, mut hi) = match values.next() {
                Some(first) => values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))),
                None => (0.0, 1.0),
            };
            if lo == hi {
                lo -= 0.5;
                hi += 0.5;
            }
            let step = (hi - lo) / *n as f64;
            let mut edges: Vec<f64> = (0..*n).map(|i| lo + step * i as f64).collect();
            edges.push(hi);
            Ok(edges)
        }
    }
}

/// Count `values` per bin; bins are half-open except the last, which includes its
/// upper edge. Values outside the edges are not counted.
pub fn bin_counts(values: &[f64], edges: &[f64]) -> Vec<f64> {
    let nbins = edges.len().saturating_sub(1);
    let mut counts = vec![0.0; nbins];
    if nbins == 0 {
        return counts;
    }
    let (lo, hi) = (edges[0], edges[nbins]);
    for &v in values {
        if !(v >= lo && v <= hi) {
            continue;
        }
        let i = edges.partition_point(|e| *e <= v).saturating_sub(1).min(nbins - 1);
        counts[i] += 1.0;
    }
    counts
}

impl Session {
    /// Histogram of `column`, optionally one series per distinct value of `key_column`.
    pub fn hist(&mut self, data: &DataFrame, column: &str, opts: &HistOptions) -> Result<()> {
        let key_column = opts.key_column.as_deref();
        let color_column = opts.colors.column();
        let df = data.drop_missing(&referenced(&[Some(column), key_column, color_column]))?;
        let keep = |v: &f64| {
            opts.x_min.is_none_or(|lo| *v >= lo) && opts.x_max.is_none_or(|hi| *v <= hi)
        };
        let mut keys: Vec<String> = Vec::new();
        let mut series: Vec<Vec<f64>> = Vec::new();
        // a color column gives each series the color of its first row
        let mut first_colors = Vec::new();
        match key_column {
            Some(k) => {
                for (key, g) in df.group_by(k)? {
                    series.push(g.numbers(column)?.into_iter().filter(keep).collect());
                    keys.push(key.to_string());
                    if let Some(c) = color_column {
                        first_colors.push(g.column(c)?[0].clone());
                    }
                }
            }
            None => {
                series.push(df.numbers(column)?.into_iter().filter(keep).collect());
                keys.push(column.to_string());
                if let Some(c) = color_column {
                    first_colors.extend(df.column(c)?.first().cloned());
                }
            }
        }
        let edges = histogram_edges(&series, &opts.bins)?;
        let colors = opts
            .colors
            .resolve(&keys, color_column.map(|_| first_colors.as_slice()))?;
        let counts: Vec<Vec<f64>> = series
            .iter()
            .map(|s| {
                let mut c = bin_counts(s, &edges);
                if opts.cumulative {
                    let mut acc = 0.0;
                    for x in c.iter_mut() {
                        acc += *x;
                        *x = acc;
                    }
                }
                c
            })
            .collect();
        log::debug!(
            "hist of {column}: {} series, {} bins",
            counts.len(),
            edges.len() - 1
        );

        self.render_chart(&opts.frame, HIST_SIZE, |surface, labels| {
            let n = counts.len();
            let mut bottoms = vec![0.0; edges.len() - 1];
            for (k, (c, color)) in counts.iter().zip(&colors).enumerate() {
                for (i, count) in c.iter().enumerate() {
                    let (e0, e1) = (edges[i], edges[i + 1]);
                    let (x0, x1, y0) = if opts.stacked || n == 1 {
                        let y0 = bottoms[i];
                        bottoms[i] += count;
                        (e0, e1, y0)
                    } else {
                        let w = (e1 - e0) * 0.8 / n as f64;
                        let start = e0 + (e1 - e0) * 0.1 + w * k as f64;
                        (start, start + w, 0.0)
                    };
                    if *count > 0.0 {
                        surface.push(Mark::Rect {
                            x0,
                            y0,
                            x1,
                            y1: y0 + count,
                            fill: *color,
                            edge: None,
                        });
                    }
                }
                if key_column.is_some() {
                    surface.legend.push(LegendEntry {
                        label: keys[k].clone(),
                        color: *color,
                    });
                }
            }
            surface.x_limits = Limits::new(opts.x_min, opts.x_max);
            if let Some(ticks) = &opts.ticks {
                surface.x_ticks = Some(ticks.iter().map(|&pos| Tick { pos, label: None }).collect());
            }
            if opts.y_log {
                surface.y_scale = AxisScale::Log;
            }
            surface.x_label = Some(labels.resolve(opts.x_label.as_deref(), column));
            surface.y_label = Some(labels.resolve(opts.y_label.as_deref(), "count"));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_follow_data_range() {
        let e = histogram_edges(&[vec![0.0, 10.0], vec![5.0]], &Bins::Count(5)).unwrap();
        assert_eq!(e, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        let e = histogram_edges(&[vec![3.0, 3.0]], &Bins::Count(1)).unwrap();
        assert_eq!(e, vec![2.5, 3.5]);
        let e = histogram_edges(&[vec![]], &Bins::Count(2)).unwrap();
        assert_eq!(e, vec![0.0, 0.5, 1.0]);
        assert!(histogram_edges(&[], &Bins::Edges(vec![1.0, 1.0])).is_err());
    }

    #[test]
    fn last_bin_is_closed() {
        let c = bin_counts(&[0.0, 1.0, 1.5, 2.0, 2.5], &[0.0, 1.0, 2.0]);
        assert_eq!(c, vec![1.0, 3.0]);
    }

    #[test]
    fn bounds_filter_before_binning() {
        // with x_max = 4 the value 100 is gone, so the edges span 0..4
        let mut s = Session::new();
        let df = DataFrame::builder()
            .column("v", [0.0, 1.0, 4.0, 100.0])
            .build()
            .unwrap();
        let opts = HistOptions {
            bins: Bins::Count(4),
            x_max: Some(4.0),
            ..Default::default()
        };
        s.hist(&df, "v", &opts).unwrap();
        let fig = s.last_figure().unwrap();
        let ax = &fig.all_axes()[0];
        let widest = ax
            .marks
            .iter()
            .filter_map(|m| m.extent())
            .fold(f64::NEG_INFINITY, |acc, (_, x1, _, _)| acc.max(x1));
        assert_eq!(widest, 4.0);
        assert_eq!(ax.y_label.as_deref(), Some("count"));
    }

    fn rects(s: &Session) -> Vec<(f64, f64, f64, f64, crate::style::Rgba)> {
        s.last_figure().unwrap().all_axes()[0]
            .marks
            .iter()
            .filter_map(|m| match m {
                Mark::Rect {
                    x0, y0, x1, y1, fill, ..
                } => Some((*x0, *y0, *x1, *y1, *fill)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn cumulative_counts_are_running_sums() {
        let mut s = Session::new();
        let df = DataFrame::builder()
            .column("v", [0.5, 1.5, 1.6, 2.5])
            .build()
            .unwrap();
        let opts = HistOptions {
            bins: Bins::Edges(vec![0.0, 1.0, 2.0, 3.0]),
            cumulative: true,
            ..Default::default()
        };
        s.hist(&df, "v", &opts).unwrap();
        let tops: Vec<f64> = rects(&s).iter().map(|r| r.3).collect();
        assert_eq!(tops, vec![1.0, 3.0, 4.0]);
        assert!(rects(&s).iter().all(|r| r.1 == 0.0));
    }

    #[test]
    fn stacked_series_sit_on_each_other_per_bin() {
        let mut s = Session::new();
        let df = DataFrame::builder()
            .column("v", [0.5, 1.5, 0.5, 2.5])
            .column("g", ["a", "a", "b", "b"])
            .column("c", ["red", "red", "blue", "blue"])
            .build()
            .unwrap();
        let opts = HistOptions {
            key_column: Some("g".into()),
            bins: Bins::Edges(vec![0.0, 1.0, 2.0, 3.0]),
            stacked: true,
            colors: ColorSpec::Column("c".into()),
            ..Default::default()
        };
        s.hist(&df, "v", &opts).unwrap();
        let red = crate::style::Rgba::rgb(255, 0, 0);
        let blue = crate::style::Rgba::rgb(0, 0, 255);
        // group a fills bins 0 and 1, group b bins 0 and 2
        assert_eq!(
            rects(&s),
            vec![
                (0.0, 0.0, 1.0, 1.0, red),
                (1.0, 0.0, 2.0, 1.0, red),
                (0.0, 1.0, 1.0, 2.0, blue),
                (2.0, 0.0, 3.0, 1.0, blue),
            ]
        );
        let ax = &s.last_figure().unwrap().all_axes()[0];
        assert_eq!(ax.legend.len(), 2);
        assert_eq!(ax.legend[1].color, blue);
    }

    #[test]
    fn ungrouped_color_column_uses_first_row() {
        let mut s = Session::new();
        let df = DataFrame::builder()
            .column("v", [1.0, 2.0])
            .column("c", ["#00FF00", "red"])
            .build()
            .unwrap();
        let opts = HistOptions {
            bins: Bins::Count(2),
            colors: ColorSpec::Column("c".into()),
            ..Default::default()
        };
        s.hist(&df, "v", &opts).unwrap();
        assert!(rects(&s).iter().all(|r| r.4 == crate::style::Rgba::rgb(0, 255, 0)));
    }
}
