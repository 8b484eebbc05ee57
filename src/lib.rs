//! dsplot
//!
//! Quick, low-boilerplate charts from tabular data: one call per chart, optionally
//! composed into a multiplot figure. Pairs with the `dsplot` CLI.
//!
//! ### Features
//! - Pie, bar (grouped, stacked, relative), histogram, 2D histogram, scatter, and line charts
//! - Scatter plots on a map backdrop with cylindrical, Mercator, Miller, or orthographic projection
//! - Scatter and 2D-histogram matrices over many columns
//! - Multiplot figures (`begin` / `end`) with cell placement and spans
//! - Axis labels resolved from a column-label table, loadable from an INI `[Columns]` section
//! - Export to SVG or PNG; HTML tables
//!
//! ### Example
//! ```no_run
//! use dsplot::{DataFrame, GridShape, Session};
//! use dsplot::charts::{HistOptions, ScatterOptions};
//! use dsplot::session::{FinishOptions, PlotFrame};
//!
//! let data = DataFrame::from_csv_path("measurements.csv")?;
//! let mut session = Session::new();
//! session.set_labels([("temp", "Temperature (°C)")]);
//!
//! session.begin((10.0, 4.0), GridShape::new(1, 2)?)?;
//! session.hist(&data, "temp", &HistOptions {
//!     frame: PlotFrame::default().in_cell(0, 0),
//!     ..Default::default()
//! })?;
//! session.scatter(&data, "temp", "pressure", &ScatterOptions {
//!     frame: PlotFrame::default().in_cell(0, 1),
//!     ..Default::default()
//! })?;
//! session.end(&FinishOptions::export_to("overview.svg"))?;
//! # Ok::<(), dsplot::PlotError>(())
//! ```

pub mod charts;
pub mod error;
pub mod figure;
pub mod frame;
pub mod geo;
pub mod labels;
pub mod session;
pub mod storage;
pub mod style;
pub mod table;

pub use error::{PlotError, Result};
pub use figure::{Figure, GridShape, Padding};
pub use frame::{ChartData, DataFrame, Key, Series, Value};
pub use labels::LabelTable;
pub use session::{Export, FinishContext, FinishOptions, PlotFrame, Session, UsageWarning};
pub use style::{ColorScale, Rgba};
pub use table::{TableOptions, html_table};
