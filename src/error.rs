//! Error type shared by every fallible operation of the library.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("no active figure; call begin() first")]
    NoActiveFigure,

    #[error("a multiplot figure is already open; call end() first")]
    FigureAlreadyOpen,

    #[error("cell ({row}, {col}) spanning {row_span}x{col_span} does not fit a {rows}x{cols} grid")]
    CellOutOfGrid {
        row: usize,
        col: usize,
        row_span: usize,
        col_span: usize,
        rows: usize,
        cols: usize,
    },

    #[error("label config not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("label config {} is malformed: {reason}", .path.display())]
    ConfigParse { path: PathBuf, reason: String },

    #[error("unknown map style: {0}")]
    UnknownStyle(String),

    #[error("unknown color scale: {0}")]
    UnknownColorScale(String),

    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    #[error("projection error: {0}")]
    Projection(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no data to plot: {0}")]
    EmptyData(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PlotError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PlotError::InvalidArgument(msg.into())
    }
}
