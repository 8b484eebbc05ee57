//! The plotting session: label table, multiplot lifecycle, and finish hook.
//!
//! States: closed → open (`begin`) → closed (`end`). While open, every chart call
//! draws into one cell of the shared figure; while closed, each chart call builds
//! and finishes its own one-shot figure.
//!
//! The finish hook runs once per finished figure (`is_subplot = false`) and once per
//! chart drawn inside an open lifecycle (`is_subplot = true`).

use crate::error::{PlotError, Result};
use crate::figure::{AxesId, CellSpec, CellSurface, Figure, GridShape, Padding};
use crate::labels::LabelTable;
use std::fmt;
use std::path::{Path, PathBuf};

/// Export resolution used when none is given.
pub const DEFAULT_DPI: u32 = 300;

/// Non-fatal usage problems. They are logged and collected, never returned as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageWarning {
    /// `begin` was called while a figure was open; the old one was closed first.
    FigureReopened,
    /// Padding was requested but layout is suppressed by a color bar.
    PaddingIgnored,
}

impl fmt::Display for UsageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageWarning::FigureReopened => {
                f.write_str("begin() called while a figure is open; closing it first")
            }
            UsageWarning::PaddingIgnored => {
                f.write_str("padding ignored: layout is suppressed by a color bar")
            }
        }
    }
}

fn record(warnings: &mut Vec<UsageWarning>, w: UsageWarning) {
    log::warn!("{w}");
    warnings.push(w);
}

/// File target of a finished figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub path: PathBuf,
    pub dpi: u32,
}

impl Export {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            dpi: DEFAULT_DPI,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }
}

/// Layout padding and export target applied when a figure is finished.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FinishOptions {
    pub padding: Padding,
    pub export: Option<Export>,
}

impl FinishOptions {
    pub fn export_to<P: AsRef<Path>>(path: P) -> Self {
        Self {
            padding: Padding::default(),
            export: Some(Export::new(path)),
        }
    }
}

/// Where a chart goes in an open multiplot; ignored for one-shot figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPlacement {
    pub pos: (usize, usize),
    pub row_span: usize,
    pub col_span: usize,
}

impl CellPlacement {
    pub fn at(row: usize, col: usize) -> Self {
        Self {
            pos: (row, col),
            ..Self::default()
        }
    }

    pub fn spec(&self) -> CellSpec {
        CellSpec::at(self.pos.0, self.pos.1).spanning(self.row_span, self.col_span)
    }
}

impl Default for CellPlacement {
    fn default() -> Self {
        Self {
            pos: (0, 0),
            row_span: 1,
            col_span: 1,
        }
    }
}

/// Options shared by every chart call: title, one-shot size, cell, and finishing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlotFrame {
    pub title: Option<String>,
    /// Figure size in inches for one-shot figures; each chart has its own default.
    pub size: Option<(f64, f64)>,
    pub cell: CellPlacement,
    pub finish: FinishOptions,
}

impl PlotFrame {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn in_cell(mut self, row: usize, col: usize) -> Self {
        self.cell = CellPlacement::at(row, col);
        self
    }

    pub fn export_to<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.finish.export = Some(Export::new(path));
        self
    }
}

/// Everything a finish hook may inspect or change.
pub struct FinishContext<'a> {
    pub is_subplot: bool,
    pub figure: &'a mut Figure,
    /// The chart's axes; `None` when a whole multiplot is finished.
    pub axes: Option<AxesId>,
    pub title: Option<&'a str>,
    pub padding: Padding,
    pub export: Option<&'a Export>,
    warnings: &'a mut Vec<UsageWarning>,
    shown: &'a mut Option<Figure>,
}

impl FinishContext<'_> {
    pub fn warn(&mut self, w: UsageWarning) {
        record(self.warnings, w);
    }

    /// Hand the figure to the session as its last displayed figure.
    pub fn display(&mut self) {
        *self.shown = Some(self.figure.clone());
    }
}

pub type FigureHandler = Box<dyn FnMut(&mut FinishContext<'_>) -> Result<()>>;

/// Built-in finish hook.
///
/// - sub-plot: set the title of the chart's axes
/// - finished figure: title, tight layout (unless suppressed), export, display
pub fn default_figure_handler(ctx: &mut FinishContext<'_>) -> Result<()> {
    if let (Some(id), Some(title)) = (ctx.axes, ctx.title) {
        ctx.figure.axes_mut(id).title = Some(title.to_string());
    }
    if ctx.is_subplot {
        return Ok(());
    }
    if ctx.figure.is_layout_suppressed() {
        if ctx.padding.is_requested() {
            ctx.warn(UsageWarning::PaddingIgnored);
        }
    } else {
        ctx.figure.apply_tight_layout(ctx.padding.to_spacing());
    }
    if let Some(export) = ctx.export {
        ctx.figure.save(&export.path, export.dpi)?;
    }
    ctx.display();
    Ok(())
}

fn invoke(handler: &mut Option<FigureHandler>, ctx: &mut FinishContext<'_>) -> Result<()> {
    match handler {
        Some(h) => h(ctx),
        None => default_figure_handler(ctx),
    }
}

#[derive(Debug)]
struct Lifecycle {
    figure: Figure,
}

/// Source of a chart's drawing region.
enum SurfaceProvider<'a> {
    /// A fresh single-cell figure owned by this call.
    Standalone(Figure),
    /// A cell of the open multiplot figure.
    SharedCell(&'a mut Figure),
}

impl SurfaceProvider<'_> {
    fn figure(&mut self) -> &mut Figure {
        match self {
            SurfaceProvider::Standalone(f) => f,
            SurfaceProvider::SharedCell(f) => &mut **f,
        }
    }

    fn is_shared(&self) -> bool {
        matches!(self, SurfaceProvider::SharedCell(_))
    }
}

/// Owns all plotting state; pass it (`&mut`) to every chart call.
pub struct Session {
    labels: LabelTable,
    lifecycle: Option<Lifecycle>,
    handler: Option<FigureHandler>,
    warnings: Vec<UsageWarning>,
    last_figure: Option<Figure>,
    locale: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("labels", &self.labels)
            .field("open", &self.lifecycle.is_some())
            .field("custom_handler", &self.handler.is_some())
            .field("warnings", &self.warnings)
            .field("locale", &self.locale)
            .finish()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            labels: LabelTable::new(),
            lifecycle: None,
            handler: None,
            warnings: Vec::new(),
            last_figure: None,
            locale: "en".to_string(),
        }
    }

    /// Locale tag for tick labels of figures created from now on (e.g. `de`).
    pub fn set_locale(&mut self, locale: &str) {
        self.locale = locale.to_string();
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn set_labels<I, K, V>(&mut self, mapping: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.labels.set_labels(mapping);
    }

    pub fn load_labels_from_config<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        self.labels.load_from_config(path)
    }

    pub fn resolve_label(&self, explicit: Option<&str>, column: &str) -> String {
        self.labels.resolve(explicit, column)
    }

    pub fn set_figure_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&mut FinishContext<'_>) -> Result<()> + 'static,
    {
        self.handler = Some(Box::new(handler));
    }

    pub fn reset_figure_handler(&mut self) {
        self.handler = None;
    }

    pub fn warnings(&self) -> &[UsageWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<UsageWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// The figure most recently displayed by the finish hook.
    pub fn last_figure(&self) -> Option<&Figure> {
        self.last_figure.as_ref()
    }

    pub fn take_last_figure(&mut self) -> Option<Figure> {
        self.last_figure.take()
    }

    pub fn is_open(&self) -> bool {
        self.lifecycle.is_some()
    }

    /// Open a multiplot figure of `size` inches with a `grid` of cells.
    ///
    /// An already open figure is closed first (no padding, no export) and
    /// `UsageWarning::FigureReopened` is recorded.
    pub fn begin(&mut self, size: (f64, f64), grid: GridShape) -> Result<()> {
        if !(size.0 > 0.0 && size.1 > 0.0) {
            return Err(PlotError::invalid(format!(
                "figure size must be positive, got {}x{}",
                size.0, size.1
            )));
        }
        let closed = match self.lifecycle.take() {
            Some(prev) => {
                record(&mut self.warnings, UsageWarning::FigureReopened);
                let mut figure = prev.figure;
                self.finish_figure(&mut figure, &FinishOptions::default())
            }
            None => Ok(()),
        };
        self.lifecycle = Some(Lifecycle {
            figure: Figure::new(size, grid).with_locale(&self.locale),
        });
        log::debug!(
            "opened {}x{} multiplot ({}x{} in)",
            grid.rows,
            grid.cols,
            size.0,
            size.1
        );
        closed
    }

    /// A drawing surface on one cell block of the open figure.
    pub fn request_cell(
        &mut self,
        pos: (usize, usize),
        row_span: usize,
        col_span: usize,
    ) -> Result<CellSurface<'_>> {
        let lifecycle = self.lifecycle.as_mut().ok_or(PlotError::NoActiveFigure)?;
        let cell = CellSpec::at(pos.0, pos.1).spanning(row_span, col_span);
        let id = lifecycle.figure.add_axes(cell)?;
        Ok(CellSurface::new(&mut lifecycle.figure, id))
    }

    /// Close the open figure: one finish-hook call with `is_subplot = false`.
    pub fn end(&mut self, options: &FinishOptions) -> Result<()> {
        let lifecycle = self.lifecycle.take().ok_or(PlotError::NoActiveFigure)?;
        let mut figure = lifecycle.figure;
        log::debug!("closing multiplot with {} axes", figure.all_axes().len());
        self.finish_figure(&mut figure, options)
    }

    /// Close the open figure without finishing it (used when a composite fails midway).
    pub(crate) fn abort(&mut self) {
        if self.lifecycle.take().is_some() {
            log::debug!("multiplot aborted");
        }
    }

    fn finish_figure(&mut self, figure: &mut Figure, options: &FinishOptions) -> Result<()> {
        let mut ctx = FinishContext {
            is_subplot: false,
            figure,
            axes: None,
            title: None,
            padding: options.padding,
            export: options.export.as_ref(),
            warnings: &mut self.warnings,
            shown: &mut self.last_figure,
        };
        invoke(&mut self.handler, &mut ctx)
    }

    /// Acquire a drawing region, draw, and finish: the one place where one-shot and
    /// multiplot rendering differ.
    pub(crate) fn render_chart<F>(
        &mut self,
        frame: &PlotFrame,
        default_size: (f64, f64),
        draw: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut CellSurface<'_>, &LabelTable) -> Result<()>,
    {
        let Session {
            labels,
            lifecycle,
            handler,
            warnings,
            last_figure,
            locale,
        } = self;
        let mut provider = match lifecycle.as_mut() {
            Some(lc) => SurfaceProvider::SharedCell(&mut lc.figure),
            None => {
                let size = frame.size.unwrap_or(default_size);
                if !(size.0 > 0.0 && size.1 > 0.0) {
                    return Err(PlotError::invalid(format!(
                        "figure size must be positive, got {}x{}",
                        size.0, size.1
                    )));
                }
                SurfaceProvider::Standalone(Figure::new(size, GridShape::single()).with_locale(locale))
            }
        };
        let is_subplot = provider.is_shared();
        let cell = if is_subplot {
            frame.cell.spec()
        } else {
            CellSpec::default()
        };
        let figure = provider.figure();
        let id = figure.add_axes(cell)?;
        let drawn = {
            let mut surface = CellSurface::new(figure, id);
            draw(&mut surface, labels)
        };
        if let Err(e) = drawn {
            figure.discard_axes(id);
            return Err(e);
        }
        let mut ctx = FinishContext {
            is_subplot,
            figure,
            axes: Some(id),
            title: frame.title.as_deref(),
            padding: frame.finish.padding,
            export: frame.finish.export.as_ref(),
            warnings,
            shown: last_figure,
        };
        invoke(handler, &mut ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_cell_requires_open_figure() {
        let mut s = Session::new();
        assert!(matches!(s.request_cell((0, 0), 1, 1), Err(PlotError::NoActiveFigure)));
        s.begin((6.0, 4.0), GridShape::new(2, 2).unwrap()).unwrap();
        for r in 0..2 {
            for c in 0..2 {
                assert!(s.request_cell((r, c), 1, 1).is_ok());
            }
        }
        s.end(&FinishOptions::default()).unwrap();
        assert!(matches!(s.request_cell((0, 0), 1, 1), Err(PlotError::NoActiveFigure)));
        assert!(matches!(s.end(&FinishOptions::default()), Err(PlotError::NoActiveFigure)));
    }

    #[test]
    fn reopening_warns_and_displays_previous() {
        let mut s = Session::new();
        s.begin((6.0, 4.0), GridShape::single()).unwrap();
        s.request_cell((0, 0), 1, 1).unwrap();
        s.begin((3.0, 3.0), GridShape::single()).unwrap();
        assert_eq!(s.warnings(), &[UsageWarning::FigureReopened]);
        assert_eq!(s.last_figure().map(|f| f.size()), Some((6.0, 4.0)));
        assert!(s.is_open());
    }

    #[test]
    fn failed_draw_leaves_no_axes_behind() {
        let mut s = Session::new();
        s.begin((6.0, 4.0), GridShape::single()).unwrap();
        let r = s.render_chart(&PlotFrame::default(), (4.0, 4.0), |_, _| {
            Err(PlotError::EmptyData("x".into()))
        });
        assert!(r.is_err());
        s.end(&FinishOptions::default()).unwrap();
        assert_eq!(s.last_figure().map(|f| f.all_axes().len()), Some(0));
    }
}
