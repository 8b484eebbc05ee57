use super::{ColorSpec, referenced};
use crate::error::{PlotError, Result};
use crate::figure::{LegendEntry, Mark, Tick};
use crate::frame::DataFrame;
use crate::session::{PlotFrame, Session};
use crate::style::{Rgba, palette_color};

const BAR_SIZE: (f64, f64) = (10.0, 4.0);
/// Share of a position's slot covered by its bar(s).
const BAR_WIDTH: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarOptions {
    /// Bar labels; `None` uses the index.
    pub label_column: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// `None` uses the first palette color.
    pub color: Option<Rgba>,
    pub frame: PlotFrame,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupedBarOptions {
    /// Bar labels; `None` uses the index.
    pub label_column: Option<String>,
    /// Stack the groups on top of each other instead of side by side.
    pub stacked: bool,
    /// Show each value as a percentage of its position's total.
    pub relative: bool,
    /// Colors by group key.
    pub colors: ColorSpec,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub frame: PlotFrame,
}

/// One drawn bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSlot {
    pub center: f64,
    pub width: f64,
    pub bottom: f64,
    pub height: f64,
}

/// Bar geometry of several groups over shared positions `0..positions`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedBars {
    /// `bars[group][position]`; `None` where a group has no value at a position.
    pub bars: Vec<Vec<Option<BarSlot>>>,
    pub positions: usize,
}

impl GroupedBars {
    /// Heights of all groups at `pos` (0 where a group has no value).
    pub fn values_at(&self, pos: usize) -> Vec<f64> {
        self.bars
            .iter()
            .map(|g| g.get(pos).copied().flatten().map_or(0.0, |b| b.height))
            .collect()
    }
}

/// Lay out `groups[g][pos]` as bars.
///
/// - `relative`: each value becomes a percentage of its position's total
/// - `stacked`: groups share one bar per position, each starting on the previous top
/// - otherwise groups sit side by side within the position's slot
pub fn grouped_bar_layout(groups: &[Vec<f64>], stacked: bool, relative: bool) -> GroupedBars {
    let positions = groups.iter().map(Vec::len).max().unwrap_or(0);
    let n = groups.len().max(1) as f64;
    let totals: Vec<f64> = (0..positions)
        .map(|p| groups.iter().filter_map(|g| g.get(p)).sum())
        .collect();
    let mut bottoms = vec![0.0; positions];
    let bars = groups
        .iter()
        .enumerate()
        .map(|(k, g)| {
            g.iter()
                .enumerate()
                .map(|(p, v)| {
                    let height = if relative {
                        if totals[p] == 0.0 { 0.0 } else { v / totals[p] * 100.0 }
                    } else {
                        *v
                    };
                    let slot = if stacked {
                        let bottom = bottoms[p];
                        bottoms[p] += height;
                        BarSlot {
                            center: p as f64,
                            width: BAR_WIDTH,
                            bottom,
                            height,
                        }
                    } else {
                        let width = BAR_WIDTH / n;
                        BarSlot {
                            center: p as f64 - BAR_WIDTH / 2.0 + width * (k as f64 + 0.5),
                            width,
                            bottom: 0.0,
                            height,
                        }
                    };
                    Some(slot)
                })
                .collect()
        })
        .collect();
    GroupedBars { bars, positions }
}

/// Per position: one tick when every group present there carries the same label,
/// otherwise one tick under each group's bar.
pub fn grouped_bar_ticks(layout: &GroupedBars, labels: &[Vec<String>]) -> Vec<Tick> {
    let mut ticks = Vec::new();
    for p in 0..layout.positions {
        let mut at = labels.iter().filter_map(|l| l.get(p));
        let Some(first) = at.next() else {
            continue;
        };
        if at.all(|l| l == first) {
            ticks.push(Tick {
                pos: p as f64,
                label: Some(first.clone()),
            });
            continue;
        }
        for (g, group) in layout.bars.iter().enumerate() {
            let slot = group.get(p).and_then(Option::as_ref);
            if let (Some(slot), Some(label)) = (slot, labels.get(g).and_then(|l| l.get(p))) {
                ticks.push(Tick {
                    pos: slot.center,
                    label: Some(label.clone()),
                });
            }
        }
    }
    ticks.sort_by(|a, b| a.pos.total_cmp(&b.pos));
    ticks
}

fn push_bar(surface: &mut crate::figure::Axes, slot: &BarSlot, fill: Rgba) {
    surface.push(Mark::Rect {
        x0: slot.center - slot.width / 2.0,
        y0: slot.bottom,
        x1: slot.center + slot.width / 2.0,
        y1: slot.bottom + slot.height,
        fill,
        edge: None,
    });
}

impl Session {
    /// Bar chart: one bar per row of `value_column`, labelled by `label_column` or the index.
    pub fn bar(&mut self, data: &DataFrame, value_column: &str, opts: &BarOptions) -> Result<()> {
        let label_column = opts.label_column.as_deref();
        let df = data.drop_missing(&referenced(&[Some(value_column), label_column]))?;
        let values = df.numbers(value_column)?;
        let names = df.labels(label_column)?;
        let fill = opts.color.unwrap_or_else(|| palette_color(0));

        self.render_chart(&opts.frame, BAR_SIZE, |surface, labels| {
            let mut ticks = Vec::with_capacity(values.len());
            for (i, (v, name)) in values.iter().zip(names).enumerate() {
                let slot = BarSlot {
                    center: i as f64,
                    width: BAR_WIDTH,
                    bottom: 0.0,
                    height: *v,
                };
                push_bar(surface, &slot, fill);
                ticks.push(Tick {
                    pos: i as f64,
                    label: Some(name),
                });
            }
            surface.x_ticks = Some(ticks);
            surface.x_label = labels.resolve_opt(opts.x_label.as_deref(), label_column);
            surface.y_label = Some(labels.resolve(opts.y_label.as_deref(), value_column));
            Ok(())
        })
    }

    /// Grouped bar chart: rows are split by `key_column` (sorted keys), each group's rows
    /// occupy positions `0..len` in row order.
    pub fn bar_groups(
        &mut self,
        data: &DataFrame,
        value_column: &str,
        key_column: &str,
        opts: &GroupedBarOptions,
    ) -> Result<()> {
        let label_column = opts.label_column.as_deref();
        let df = data.drop_missing(&referenced(&[
            Some(value_column),
            Some(key_column),
            label_column,
            opts.colors.column(),
        ]))?;
        let groups = df.group_by(key_column)?;
        if groups.is_empty() {
            return Err(PlotError::EmptyData(format!(
                "no rows with both {value_column} and {key_column}"
            )));
        }
        let keys: Vec<String> = groups.iter().map(|(k, _)| k.to_string()).collect();
        let mut values = Vec::with_capacity(groups.len());
        let mut names = Vec::with_capacity(groups.len());
        let mut first_colors = Vec::new();
        for (_, g) in &groups {
            values.push(g.numbers(value_column)?);
            names.push(g.labels(label_column)?);
            if let Some(c) = opts.colors.column() {
                first_colors.push(g.column(c)?[0].clone());
            }
        }
        let colors = opts.colors.resolve(
            &keys,
            opts.colors.column().map(|_| first_colors.as_slice()),
        )?;
        let layout = grouped_bar_layout(&values, opts.stacked, opts.relative);
        let ticks = grouped_bar_ticks(&layout, &names);

        self.render_chart(&opts.frame, BAR_SIZE, |surface, labels| {
            for ((group, key), color) in layout.bars.iter().zip(&keys).zip(&colors) {
                for slot in group.iter().flatten() {
                    push_bar(surface, slot, *color);
                }
                surface.legend.push(LegendEntry {
                    label: key.clone(),
                    color: *color,
                });
            }
            surface.x_ticks = Some(ticks);
            surface.x_label = labels.resolve_opt(opts.x_label.as_deref(), label_column);
            let y = labels.resolve(opts.y_label.as_deref(), value_column);
            surface.y_label = Some(if opts.relative && opts.y_label.is_none() {
                format!("{y} (%)")
            } else {
                y
            });
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn relative_stacks_sum_to_hundred() {
        let layout = grouped_bar_layout(&[vec![2.0, 2.0], vec![2.0, 6.0]], true, true);
        assert_eq!(layout.values_at(0), vec![50.0, 50.0]);
        assert_eq!(layout.values_at(1), vec![25.0, 75.0]);
        let top = layout.bars[1][1].unwrap();
        assert_abs_diff_eq!(top.bottom, 25.0);
        assert_abs_diff_eq!(top.bottom + top.height, 100.0);
    }

    #[test]
    fn side_by_side_bars_split_the_slot() {
        let layout = grouped_bar_layout(&[vec![1.0], vec![2.0]], false, false);
        let a = layout.bars[0][0].unwrap();
        let b = layout.bars[1][0].unwrap();
        assert_abs_diff_eq!(a.width, 0.4);
        assert_abs_diff_eq!(a.center, -0.2);
        assert_abs_diff_eq!(b.center, 0.2);
        assert_eq!(layout.values_at(0), vec![1.0, 2.0]);
    }

    #[test]
    fn ticks_collapse_only_on_identical_labels() {
        let layout = grouped_bar_layout(&[vec![1.0, 1.0], vec![1.0, 1.0]], false, false);
        let same = vec![
            vec!["x".to_string(), "y".to_string()],
            vec!["x".to_string(), "y".to_string()],
        ];
        let ticks = grouped_bar_ticks(&layout, &same);
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[1].pos, 1.0);

        let differ = vec![
            vec!["x".to_string(), "y".to_string()],
            vec!["x".to_string(), "z".to_string()],
        ];
        let ticks = grouped_bar_ticks(&layout, &differ);
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[0].pos, 0.0);
        let labels: Vec<_> = ticks.iter().map(|t| t.label.clone().unwrap()).collect();
        assert_eq!(labels, vec!["x", "y", "z"]);
        assert!(ticks[1].pos < 1.0 && ticks[2].pos > 1.0);
    }
}
