//! Pairwise matrices: an N×N multiplot over N columns with histograms on the diagonal.

use super::hist::HistOptions;
use super::hist2d::Hist2dOptions;
use super::scatter::ScatterOptions;
use crate::error::{PlotError, Result};
use crate::figure::{GridShape, Padding};
use crate::frame::DataFrame;
use crate::session::{Export, FinishOptions, PlotFrame, Session};

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixOptions {
    /// Columns to pair; `None` takes every numeric column.
    pub columns: Option<Vec<String>>,
    /// Edge length of one cell in inches.
    pub subplot_size: f64,
    /// Color scale of the 2D histograms.
    pub color_scale: String,
    pub export: Option<Export>,
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            columns: None,
            subplot_size: 2.0,
            color_scale: "Blues".to_string(),
            export: None,
        }
    }
}

#[derive(Clone, Copy)]
enum OffDiagonal {
    Scatter,
    Hist2d,
}

/// Axis labels of cell `(row, col)`: y only in the first column, x only in the last row.
fn cell_labels(
    session: &Session,
    columns: &[String],
    row: usize,
    col: usize,
) -> (Option<String>, Option<String>) {
    let x = if row == columns.len() - 1 {
        session.resolve_label(None, &columns[col])
    } else {
        String::new()
    };
    let y = if col == 0 {
        session.resolve_label(None, &columns[row])
    } else {
        String::new()
    };
    (Some(x), Some(y))
}

impl Session {
    /// Scatter plots for every column pair, histograms on the diagonal.
    pub fn scatter_matrix(&mut self, data: &DataFrame, opts: &MatrixOptions) -> Result<()> {
        self.pair_matrix(data, opts, OffDiagonal::Scatter)
    }

    /// 2D histograms for every column pair, histograms on the diagonal.
    pub fn hist2d_matrix(&mut self, data: &DataFrame, opts: &MatrixOptions) -> Result<()> {
        self.pair_matrix(data, opts, OffDiagonal::Hist2d)
    }

    fn pair_matrix(&mut self, data: &DataFrame, opts: &MatrixOptions, kind: OffDiagonal) -> Result<()> {
        if self.is_open() {
            return Err(PlotError::FigureAlreadyOpen);
        }
        let columns: Vec<String> = match &opts.columns {
            Some(c) => c.clone(),
            None => data.numeric_columns().into_iter().map(str::to_string).collect(),
        };
        if columns.is_empty() {
            return Err(PlotError::EmptyData("no columns to pair".to_string()));
        }
        let refs: Vec<&str> = columns.iter().map(String::as_str).collect();
        data.require(&refs)?;
        if !(opts.subplot_size.is_finite() && opts.subplot_size > 0.0) {
            return Err(PlotError::invalid(format!(
                "subplot size must be positive, got {}",
                opts.subplot_size
            )));
        }
        let n = columns.len();
        let edge = n as f64 * opts.subplot_size;
        self.begin((edge, edge), GridShape::new(n, n)?)?;
        if let Err(e) = self.fill_matrix(data, &columns, opts, kind) {
            self.abort();
            return Err(e);
        }
        self.end(&FinishOptions {
            padding: Padding {
                pad: None,
                w_pad: Some(1.0),
                h_pad: Some(1.75),
            },
            export: opts.export.clone(),
        })
    }

    fn fill_matrix(
        &mut self,
        data: &DataFrame,
        columns: &[String],
        opts: &MatrixOptions,
        kind: OffDiagonal,
    ) -> Result<()> {
        for (row, cy) in columns.iter().enumerate() {
            for (col, cx) in columns.iter().enumerate() {
                let (x_label, y_label) = cell_labels(self, columns, row, col);
                let frame = PlotFrame::default().in_cell(row, col);
                if row == col {
                    let hist = HistOptions {
                        x_label,
                        y_label,
                        frame,
                        ..Default::default()
                    };
                    self.hist(data, cx, &hist)?;
                    continue;
                }
                match kind {
                    OffDiagonal::Scatter => {
                        let scatter = ScatterOptions {
                            x_label,
                            y_label,
                            frame,
                            ..Default::default()
                        };
                        self.scatter(data, cx, cy, &scatter)?;
                    }
                    OffDiagonal::Hist2d => {
                        let hist2d = Hist2dOptions {
                            color_scale: opts.color_scale.clone(),
                            colorbar: false,
                            x_label,
                            y_label,
                            frame,
                            ..Default::default()
                        };
                        self.hist2d(data, cx, cy, &hist2d)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::CellSpec;

    fn sample() -> DataFrame {
        DataFrame::builder()
            .column("a", [1.0, 2.0, 3.0, 4.0])
            .column("b", [2.0, 1.0, 4.0, 3.0])
            .column("name", ["w", "x", "y", "z"])
            .build()
            .unwrap()
    }

    #[test]
    fn matrix_uses_numeric_columns_and_edge_labels() {
        let mut s = Session::new();
        s.set_labels([("a", "Alpha")]);
        s.scatter_matrix(&sample(), &MatrixOptions::default()).unwrap();
        let fig = s.last_figure().unwrap();
        assert_eq!(fig.size(), (4.0, 4.0));
        assert_eq!(fig.all_axes().len(), 4);
        let at = |r, c| {
            fig.all_axes()
                .iter()
                .find(|a| a.cell == CellSpec::at(r, c))
                .unwrap()
        };
        assert_eq!(at(0, 0).y_label.as_deref(), Some("Alpha"));
        assert_eq!(at(0, 1).y_label.as_deref(), Some(""));
        assert_eq!(at(1, 0).x_label.as_deref(), Some("Alpha"));
        assert_eq!(at(0, 0).x_label.as_deref(), Some(""));
        assert!(!s.is_open());
    }

    #[test]
    fn refuses_to_nest() {
        let mut s = Session::new();
        s.begin((4.0, 4.0), GridShape::single()).unwrap();
        let r = s.hist2d_matrix(&sample(), &MatrixOptions::default());
        assert!(matches!(r, Err(PlotError::FigureAlreadyOpen)));
        assert!(s.is_open());
    }

    #[test]
    fn failure_midway_closes_the_figure() {
        let mut s = Session::new();
        let opts = MatrixOptions {
            columns: Some(vec!["a".into(), "name".into()]),
            ..Default::default()
        };
        assert!(s.scatter_matrix(&sample(), &opts).is_err());
        assert!(!s.is_open());
    }
}
