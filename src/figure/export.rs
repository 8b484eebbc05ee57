//! Serialize a `Figure` with plotters: layout in pixels, then marks, frames, and text.
//!
//! Layout has two modes:
//! - default: fixed subplot margins (left .125, right .9, bottom .11, top .88, gaps .2)
//! - tight (after `Figure::apply_tight_layout`): outer pad and even gaps in font-size
//!   units, cells shrunk by the gutters their labels need
//!
//! Text is skipped on bitmap backends when no font could be registered.

use super::clip::{ClipRect, clip_polygon, clip_polyline, dash_polyline};
use super::text::{ensure_fonts_registered, estimate_text_width_px, truncate_to_width};
use super::ticks::{axis_ticks, numeric_ticks};
use super::{AxisScale, Axes, CellSpec, Figure, Mark, Spacing, TickFormat, View};
use crate::error::{PlotError, Result};
use crate::style::{Rgba, Stroke};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontFamily, FontTransform};
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::Path;

/// Base font size in points.
const FONT_PT: f64 = 10.0;
const FRAME_GRAY: Rgba = Rgba::rgb(0x40, 0x40, 0x40);

pub(crate) fn save_figure(fig: &Figure, path: &Path, dpi: u32) -> Result<()> {
    if dpi == 0 {
        return Err(PlotError::invalid("export resolution must be positive"));
    }
    let (w_in, h_in) = fig.size();
    if !(w_in > 0.0 && h_in > 0.0) {
        return Err(PlotError::invalid(format!(
            "figure size must be positive, got {w_in}x{h_in}"
        )));
    }
    let width = (w_in * dpi as f64).round().max(1.0) as u32;
    let height = (h_in * dpi as f64).round().max(1.0) as u32;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let is_svg = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        let root = SVGBackend::new(path, (width, height)).into_drawing_area();
        draw_figure(&root, fig, dpi, true)?;
        root.present().map_err(export_err)?;
    } else {
        let with_text = ensure_fonts_registered();
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        draw_figure(&root, fig, dpi, with_text)?;
        root.present().map_err(export_err)?;
    }
    log::debug!(
        "exported {}x{} px figure to {}",
        width,
        height,
        path.display()
    );
    Ok(())
}

fn export_err<E: std::fmt::Debug>(e: E) -> PlotError {
    PlotError::Export(format!("{e:?}"))
}

/// Pixel geometry of one axes: the data box and, if present, its color bar strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesLayout {
    pub data: ClipRect,
    pub colorbar: Option<ClipRect>,
}

struct Gutters {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

fn gutters(ax: &Axes, fs: f64, cell_w: f64) -> Gutters {
    let ticks = if ax.axis_visible { 1.0 } else { 0.0 };
    Gutters {
        left: ticks * 3.8 * fs + if ax.y_label.is_some() { 1.6 * fs } else { 0.0 },
        right: colorbar_width(ax, fs, cell_w) + 0.3 * fs,
        top: if ax.title.is_some() { 1.9 * fs } else { 0.4 * fs },
        bottom: ticks * 1.8 * fs + if ax.x_label.is_some() { 1.6 * fs } else { 0.0 },
    }
}

fn colorbar_width(ax: &Axes, fs: f64, cell_w: f64) -> f64 {
    match &ax.colorbar {
        Some(cb) => {
            0.12 * cell_w + 4.0 * fs + if cb.label.is_some() { 1.6 * fs } else { 0.0 }
        }
        None => 0.0,
    }
}

/// Split `[start, end]` into `n` slots separated by `gap`, return the span of `i..i+span`.
fn slot(start: f64, end: f64, n: usize, gap: f64, i: usize, span: usize) -> (f64, f64) {
    let size = ((end - start) - gap * (n as f64 - 1.0)) / n as f64;
    let a = start + i as f64 * (size + gap);
    (a, a + span as f64 * size + (span as f64 - 1.0) * gap)
}

fn cell_rect(
    cell: &CellSpec,
    rows: usize,
    cols: usize,
    area: ClipRect,
    w_gap: f64,
    h_gap: f64,
) -> ClipRect {
    let (x0, x1) = slot(area.x0, area.x1, cols, w_gap, cell.col, cell.col_span);
    let (y0, y1) = slot(area.y0, area.y1, rows, h_gap, cell.row, cell.row_span);
    ClipRect { x0, y0, x1, y1 }
}

/// Compute the pixel layout of every axes for a `width`×`height` canvas.
pub fn layout_axes(fig: &Figure, width: f64, height: f64, dpi: u32) -> Vec<AxesLayout> {
    let fs = FONT_PT * dpi as f64 / 72.0;
    let grid = fig.grid();
    let (area, w_gap, h_gap, tight) = match fig.layout() {
        Some(Spacing { pad, w_pad, h_pad }) => (
            ClipRect {
                x0: pad * fs,
                y0: pad * fs,
                x1: width - pad * fs,
                y1: height - pad * fs,
            },
            w_pad * fs,
            h_pad * fs,
            true,
        ),
        None => {
            let area = ClipRect {
                x0: 0.125 * width,
                y0: 0.12 * height,
                x1: 0.9 * width,
                y1: 0.89 * height,
            };
            let cols = grid.cols as f64;
            let rows = grid.rows as f64;
            let cw = (area.x1 - area.x0) / (cols + 0.2 * (cols - 1.0));
            let ch = (area.y1 - area.y0) / (rows + 0.2 * (rows - 1.0));
            (area, 0.2 * cw, 0.2 * ch, false)
        }
    };

    fig.all_axes()
        .iter()
        .map(|ax| {
            let cell = cell_rect(&ax.cell, grid.rows, grid.cols, area, w_gap, h_gap);
            let cell_w = cell.x1 - cell.x0;
            let mut data = if tight {
                let g = gutters(ax, fs, cell_w);
                ClipRect {
                    x0: cell.x0 + g.left,
                    y0: cell.y0 + g.top,
                    x1: cell.x1 - g.right,
                    y1: cell.y1 - g.bottom,
                }
            } else {
                ClipRect {
                    x1: cell.x1 - colorbar_width(ax, fs, cell_w),
                    ..cell
                }
            };
            if data.x1 - data.x0 < 1.0 {
                data.x1 = data.x0 + 1.0;
            }
            if data.y1 - data.y0 < 1.0 {
                data.y1 = data.y0 + 1.0;
            }
            if ax.aspect_equal {
                data = equalize(data, ax.view());
            }
            let colorbar = ax.colorbar.as_ref().map(|_| {
                let strip = (0.05 * cell_w).max(0.6 * fs);
                let x0 = data.x1 + 0.6 * fs;
                ClipRect {
                    x0,
                    y0: data.y0,
                    x1: x0 + strip,
                    y1: data.y1,
                }
            });
            AxesLayout { data, colorbar }
        })
        .collect()
}

/// Shrink `r` around its center so one data unit spans the same pixels on both axes.
fn equalize(r: ClipRect, view: View) -> ClipRect {
    let (w, h) = (r.x1 - r.x0, r.y1 - r.y0);
    let (dx, dy) = (view.x.1 - view.x.0, view.y.1 - view.y.0);
    if dx <= 0.0 || dy <= 0.0 {
        return r;
    }
    let s = (w / dx).min(h / dy);
    let (nw, nh) = (s * dx, s * dy);
    let (cx, cy) = ((r.x0 + r.x1) / 2.0, (r.y0 + r.y1) / 2.0);
    ClipRect {
        x0: cx - nw / 2.0,
        y0: cy - nh / 2.0,
        x1: cx + nw / 2.0,
        y1: cy + nh / 2.0,
    }
}

/// Drawing context for one canvas.
struct Painter<'a, DB: DrawingBackend> {
    area: &'a DrawingArea<DB, Shift>,
    /// pixels per point
    scale: f64,
    fs: f64,
    text: bool,
    locale: &'a str,
}

fn px(p: (f64, f64)) -> (i32, i32) {
    (p.0.round() as i32, p.1.round() as i32)
}

impl<DB: DrawingBackend> Painter<'_, DB> {
    fn fill_rect(&self, r: ClipRect, color: Rgba) -> Result<()> {
        let style = ShapeStyle {
            color: color.to_plotters(),
            filled: true,
            stroke_width: 0,
        };
        self.area
            .draw(&Rectangle::new([px((r.x0, r.y0)), px((r.x1, r.y1))], style))
            .map_err(export_err)
    }

    fn outline_rect(&self, r: ClipRect, color: Rgba, width_pt: f64) -> Result<()> {
        let ring = vec![
            (r.x0, r.y0),
            (r.x1, r.y0),
            (r.x1, r.y1),
            (r.x0, r.y1),
            (r.x0, r.y0),
        ];
        self.path(&ring, &Stroke::solid(color, width_pt))
    }

    fn path(&self, points: &[(f64, f64)], stroke: &Stroke) -> Result<()> {
        let style = ShapeStyle {
            color: stroke.color.to_plotters(),
            filled: false,
            stroke_width: (stroke.width * self.scale).round().max(1.0) as u32,
        };
        let pieces = match stroke.dash {
            Some((on, off)) => dash_polyline(points, on * self.scale, off * self.scale),
            None => vec![points.to_vec()],
        };
        for piece in pieces {
            let pts: Vec<(i32, i32)> = piece.into_iter().map(px).collect();
            self.area
                .draw(&PathElement::new(pts, style))
                .map_err(export_err)?;
        }
        Ok(())
    }

    fn polygon(&self, points: &[(f64, f64)], fill: Rgba) -> Result<()> {
        if points.len() < 3 {
            return Ok(());
        }
        let style = ShapeStyle {
            color: fill.to_plotters(),
            filled: true,
            stroke_width: 0,
        };
        let pts: Vec<(i32, i32)> = points.iter().copied().map(px).collect();
        self.area
            .draw(&Polygon::new(pts, style))
            .map_err(export_err)
    }

    fn circle(&self, center: (f64, f64), radius: f64, fill: Rgba) -> Result<()> {
        let style = ShapeStyle {
            color: fill.to_plotters(),
            filled: true,
            stroke_width: 0,
        };
        self.area
            .draw(&Circle::new(px(center), radius.round().max(1.0) as i32, style))
            .map_err(export_err)
    }

    fn text(&self, s: &str, at: (f64, f64), size: f64, pos: Pos, rotated: bool) -> Result<()> {
        if !self.text || s.is_empty() {
            return Ok(());
        }
        let mut font = FontDesc::from((FontFamily::SansSerif, size));
        if rotated {
            font = font.transform(FontTransform::Rotate270);
        }
        let black = Rgba::BLACK.to_plotters();
        let style = TextStyle::from(font)
            .color(&black)
            .pos(pos);
        self.area
            .draw(&Text::new(s.to_string(), px(at), style))
            .map_err(export_err)
    }
}

fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    fig: &Figure,
    dpi: u32,
    text: bool,
) -> Result<()> {
    root.fill(&WHITE).map_err(export_err)?;
    let (w, h) = root.dim_in_pixel();
    let scale = dpi as f64 / 72.0;
    let painter = Painter {
        area: root,
        scale,
        fs: FONT_PT * scale,
        text,
        locale: fig.locale(),
    };
    let layouts = layout_axes(fig, w as f64, h as f64, dpi);
    for (ax, layout) in fig.all_axes().iter().zip(layouts) {
        draw_axes(&painter, ax, &layout)?;
    }
    Ok(())
}

/// Data → pixel mapping of one axes.
struct Transform {
    view: View,
    r: ClipRect,
    log: bool,
}

impl Transform {
    fn x(&self, x: f64) -> f64 {
        self.r.x0 + (x - self.view.x.0) / (self.view.x.1 - self.view.x.0) * (self.r.x1 - self.r.x0)
    }

    /// `y` in data units; non-positive values on a log axis land below the box.
    fn y(&self, y: f64) -> f64 {
        let y = if self.log {
            if y > 0.0 {
                y.log10()
            } else {
                self.view.y.0 - (self.view.y.1 - self.view.y.0)
            }
        } else {
            y
        };
        self.y_view(y)
    }

    /// `y` already in view space (log10 for log axes).
    fn y_view(&self, y: f64) -> f64 {
        self.r.y1 - (y - self.view.y.0) / (self.view.y.1 - self.view.y.0) * (self.r.y1 - self.r.y0)
    }

    fn point(&self, p: (f64, f64)) -> (f64, f64) {
        (self.x(p.0), self.y(p.1))
    }
}

fn draw_axes<DB: DrawingBackend>(p: &Painter<'_, DB>, ax: &Axes, layout: &AxesLayout) -> Result<()> {
    let r = layout.data;
    let t = Transform {
        view: ax.view(),
        r,
        log: ax.y_scale == AxisScale::Log,
    };
    for mark in &ax.marks {
        draw_mark(p, &t, mark)?;
    }
    if ax.axis_visible {
        draw_frame(p, ax, &t)?;
    }
    if let Some(title) = &ax.title {
        p.text(
            title,
            ((r.x0 + r.x1) / 2.0, r.y0 - 0.5 * p.fs),
            1.2 * p.fs,
            Pos::new(HPos::Center, VPos::Bottom),
            false,
        )?;
    }
    let tick_room = if ax.axis_visible { 1.0 } else { 0.0 };
    if let Some(label) = &ax.x_label {
        p.text(
            label,
            ((r.x0 + r.x1) / 2.0, r.y1 + (0.3 + 1.5 * tick_room) * p.fs),
            p.fs,
            Pos::new(HPos::Center, VPos::Top),
            false,
        )?;
    }
    if let Some(label) = &ax.y_label {
        p.text(
            label,
            (r.x0 - (0.8 + 3.5 * tick_room) * p.fs, (r.y0 + r.y1) / 2.0),
            p.fs,
            Pos::new(HPos::Center, VPos::Center),
            true,
        )?;
    }
    if !ax.legend.is_empty() {
        draw_legend(p, ax, r)?;
    }
    if let (Some(cb), Some(strip)) = (&ax.colorbar, layout.colorbar) {
        draw_colorbar(p, cb, strip)?;
    }
    Ok(())
}

fn draw_mark<DB: DrawingBackend>(p: &Painter<'_, DB>, t: &Transform, mark: &Mark) -> Result<()> {
    let r = &t.r;
    match mark {
        Mark::Rect {
            x0,
            y0,
            x1,
            y1,
            fill,
            edge,
        } => {
            let (ax0, ay0) = t.point((*x0, *y0));
            let (ax1, ay1) = t.point((*x1, *y1));
            let clipped = ClipRect {
                x0: ax0.min(ax1).max(r.x0),
                y0: ay0.min(ay1).max(r.y0),
                x1: ax0.max(ax1).min(r.x1),
                y1: ay0.max(ay1).min(r.y1),
            };
            if clipped.x1 <= clipped.x0 || clipped.y1 <= clipped.y0 {
                return Ok(());
            }
            p.fill_rect(clipped, *fill)?;
            if let Some(edge) = edge {
                p.outline_rect(clipped, *edge, 0.5)?;
            }
        }
        Mark::Line { points, stroke } => {
            let pts: Vec<(f64, f64)> = points.iter().map(|q| t.point(*q)).collect();
            for run in clip_polyline(r, &pts) {
                p.path(&run, stroke)?;
            }
        }
        Mark::Polygon { points, fill, edge } => {
            let mut pts: Vec<(f64, f64)> = points.iter().map(|q| t.point(*q)).collect();
            p.polygon(&clip_polygon(r, &pts), *fill)?;
            if let (Some(edge), Some(first)) = (edge, pts.first().copied()) {
                pts.push(first);
                for run in clip_polyline(r, &pts) {
                    p.path(&run, edge)?;
                }
            }
        }
        Mark::Marker { x, y, area, color } => {
            let c = t.point((*x, *y));
            if r.contains(c) {
                // marker area is in square points; its diameter is sqrt(area)
                p.circle(c, area.max(0.0).sqrt() / 2.0 * p.scale, *color)?;
            }
        }
        Mark::Wedge {
            center,
            radius,
            start_deg,
            end_deg,
            color,
            label,
            pct_label,
        } => {
            let steps = (((end_deg - start_deg).abs() / 2.0).ceil() as usize).max(2);
            let mut ring = vec![t.point(*center)];
            for i in 0..=steps {
                let a = (start_deg + (end_deg - start_deg) * i as f64 / steps as f64).to_radians();
                ring.push(t.point((center.0 + radius * a.cos(), center.1 + radius * a.sin())));
            }
            p.polygon(&ring, *color)?;
            ring.push(ring[0]);
            p.path(&ring, &Stroke::solid(Rgba::WHITE, 0.5))?;

            let mid = ((start_deg + end_deg) / 2.0).to_radians();
            if let Some(pct) = pct_label {
                let at = t.point((
                    center.0 + 0.6 * radius * mid.cos(),
                    center.1 + 0.6 * radius * mid.sin(),
                ));
                p.text(pct, at, p.fs, Pos::new(HPos::Center, VPos::Center), false)?;
            }
            if let Some(label) = label {
                let at = t.point((
                    center.0 + 1.1 * radius * mid.cos(),
                    center.1 + 1.1 * radius * mid.sin(),
                ));
                let h = if mid.cos() >= 0.0 { HPos::Left } else { HPos::Right };
                p.text(label, at, p.fs, Pos::new(h, VPos::Center), false)?;
            }
        }
        Mark::Text { x, y, text } => {
            let at = t.point((*x, *y));
            p.text(text, at, p.fs, Pos::new(HPos::Center, VPos::Center), false)?;
        }
    }
    Ok(())
}

fn draw_frame<DB: DrawingBackend>(p: &Painter<'_, DB>, ax: &Axes, t: &Transform) -> Result<()> {
    let r = t.r;
    let (bw, bh) = (r.x1 - r.x0, r.y1 - r.y0);
    let tick_len = 3.5 * p.scale;
    let tick_stroke = Stroke::solid(FRAME_GRAY, 0.8);

    let max_x = ((bw / (p.fs * 6.0)) as usize).clamp(2, 10);
    let xticks = axis_ticks(
        ax.x_ticks.as_deref(),
        t.view.x,
        ax.x_format,
        AxisScale::Linear,
        max_x,
        p.locale,
    );
    let visible_x: Vec<&(f64, String)> = xticks
        .iter()
        .filter(|(v, _)| *v >= t.view.x.0 - 1e-9 && *v <= t.view.x.1 + 1e-9)
        .collect();
    let room = bw / visible_x.len().max(1) as f64;
    for (v, label) in visible_x {
        let x = t.x(*v);
        p.path(&[(x, r.y1), (x, r.y1 + tick_len)], &tick_stroke)?;
        let label = truncate_to_width(label, p.fs, room.max(p.fs));
        p.text(
            &label,
            (x, r.y1 + tick_len + 0.2 * p.fs),
            p.fs,
            Pos::new(HPos::Center, VPos::Top),
            false,
        )?;
    }

    let max_y = ((bh / (p.fs * 2.5)) as usize).clamp(2, 10);
    let yticks = axis_ticks(None, t.view.y, TickFormat::Number, ax.y_scale, max_y, p.locale);
    for (v, label) in yticks
        .iter()
        .filter(|(v, _)| *v >= t.view.y.0 - 1e-9 && *v <= t.view.y.1 + 1e-9)
    {
        let y = t.y_view(*v);
        p.path(&[(r.x0 - tick_len, y), (r.x0, y)], &tick_stroke)?;
        p.text(
            label,
            (r.x0 - tick_len - 0.2 * p.fs, y),
            p.fs,
            Pos::new(HPos::Right, VPos::Center),
            false,
        )?;
    }
    p.outline_rect(r, FRAME_GRAY, 0.8)
}

fn draw_legend<DB: DrawingBackend>(p: &Painter<'_, DB>, ax: &Axes, r: ClipRect) -> Result<()> {
    let fs = p.fs;
    let line_h = 1.4 * fs;
    let max_text = (r.x1 - r.x0) * 0.45;
    let labels: Vec<String> = ax
        .legend
        .iter()
        .map(|e| truncate_to_width(&e.label, fs, max_text))
        .collect();
    let text_w = labels
        .iter()
        .map(|l| estimate_text_width_px(l, fs))
        .fold(0.0, f64::max);
    let w = text_w + 2.4 * fs;
    let h = line_h * labels.len() as f64 + 0.6 * fs;
    let b = ClipRect {
        x0: r.x1 - 0.5 * fs - w,
        y0: r.y0 + 0.5 * fs,
        x1: r.x1 - 0.5 * fs,
        y1: r.y0 + 0.5 * fs + h,
    };
    p.fill_rect(b, Rgba::WHITE.with_alpha(220))?;
    p.outline_rect(b, Rgba::rgb(0xCC, 0xCC, 0xCC), 0.8)?;
    for (i, (entry, label)) in ax.legend.iter().zip(&labels).enumerate() {
        let cy = b.y0 + 0.3 * fs + line_h * (i as f64 + 0.5);
        let swatch = ClipRect {
            x0: b.x0 + 0.4 * fs,
            y0: cy - 0.4 * fs,
            x1: b.x0 + 1.2 * fs,
            y1: cy + 0.4 * fs,
        };
        p.fill_rect(swatch, entry.color)?;
        p.text(
            label,
            (b.x0 + 1.6 * fs, cy),
            fs,
            Pos::new(HPos::Left, VPos::Center),
            false,
        )?;
    }
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    p: &Painter<'_, DB>,
    cb: &super::ColorBar,
    strip: ClipRect,
) -> Result<()> {
    const STEPS: usize = 64;
    let h = strip.y1 - strip.y0;
    for i in 0..STEPS {
        let t0 = i as f64 / STEPS as f64;
        let t1 = (i + 1) as f64 / STEPS as f64;
        let band = ClipRect {
            x0: strip.x0,
            y0: strip.y1 - t1 * h,
            x1: strip.x1,
            y1: strip.y1 - t0 * h,
        };
        p.fill_rect(band, cb.scale.sample((t0 + t1) / 2.0))?;
    }
    p.outline_rect(strip, FRAME_GRAY, 0.8)?;

    let span = cb.max - cb.min;
    let mut label_w: f64 = 0.0;
    if span > 0.0 {
        let max_ticks = ((h / (p.fs * 2.5)) as usize).clamp(2, 8);
        for (v, label) in numeric_ticks(cb.min, cb.max, max_ticks, p.locale) {
            let y = strip.y1 - (v - cb.min) / span * h;
            p.path(
                &[(strip.x1, y), (strip.x1 + 3.5 * p.scale, y)],
                &Stroke::solid(FRAME_GRAY, 0.8),
            )?;
            p.text(
                &label,
                (strip.x1 + 3.5 * p.scale + 0.2 * p.fs, y),
                p.fs,
                Pos::new(HPos::Left, VPos::Center),
                false,
            )?;
            label_w = label_w.max(estimate_text_width_px(&label, p.fs));
        }
    }
    if let Some(label) = &cb.label {
        p.text(
            label,
            (strip.x1 + 3.5 * p.scale + label_w + 1.0 * p.fs, (strip.y0 + strip.y1) / 2.0),
            p.fs,
            Pos::new(HPos::Center, VPos::Center),
            true,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{ColorBar, GridShape, Padding};
    use crate::style::ColorScale;

    fn two_by_two() -> Figure {
        let mut fig = Figure::new((6.0, 4.0), GridShape::new(2, 2).unwrap());
        for (r, c) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            fig.add_axes(CellSpec::at(r, c)).unwrap();
        }
        fig
    }

    #[test]
    fn default_layout_uses_subplot_margins() {
        let fig = two_by_two();
        let l = layout_axes(&fig, 600.0, 400.0, 100);
        assert_eq!(l.len(), 4);
        assert!((l[0].data.x0 - 75.0).abs() < 1e-9);
        assert!((l[3].data.x1 - 540.0).abs() < 1e-9);
        // gap between columns is 20% of a cell
        let cw = l[0].data.x1 - l[0].data.x0;
        assert!(((l[1].data.x0 - l[0].data.x1) - 0.2 * cw).abs() < 1e-6);
    }

    #[test]
    fn tight_layout_honours_pad() {
        let mut fig = two_by_two();
        fig.apply_tight_layout(Padding::default().to_spacing());
        let l = layout_axes(&fig, 600.0, 400.0, 72);
        let fs = FONT_PT;
        // no labels: left gutter is tick room only
        assert!((l[0].data.x0 - (1.08 * fs + 3.8 * fs)).abs() < 1e-9);
    }

    #[test]
    fn colorbar_gets_a_strip_right_of_the_data() {
        let mut fig = Figure::new((6.0, 4.0), GridShape::single());
        let id = fig.add_axes(CellSpec::default()).unwrap();
        fig.axes_mut(id).colorbar = Some(ColorBar {
            scale: ColorScale::named("Blues").unwrap(),
            min: 0.0,
            max: 3.0,
            label: None,
        });
        let l = layout_axes(&fig, 600.0, 400.0, 72);
        let strip = l[0].colorbar.unwrap();
        assert!(strip.x0 > l[0].data.x1);
        assert!(strip.x1 < 600.0);
    }
}
