use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dsplot::charts::{
    BarOptions, Bins, GroupedBarOptions, Hist2dOptions, HistOptions, Interpolation,
    InterpolationKind, LineOptions, MarkerColor, MatrixOptions, PieOptions, PieSort,
    ScatterOptions,
};
use dsplot::session::{Export, PlotFrame};
use dsplot::{DataFrame, Session, TableOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dsplot",
    version,
    about = "Plot charts and tables from CSV files"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Histogram of one column.
    Hist(HistArgs),
    /// Scatter plot of two columns.
    Scatter(ScatterArgs),
    /// Line chart of one column, optionally grouped.
    Lines(LinesArgs),
    /// Bar chart of one column, optionally grouped by a key column.
    Bar(BarArgs),
    /// Pie chart of one column, or of row counts per value with --count.
    Pie(PieArgs),
    /// 2D histogram of two columns.
    Hist2d(Hist2dArgs),
    /// Scatter or 2D-histogram matrix over several columns.
    Matrix(MatrixArgs),
    /// Print an HTML table to stdout.
    Table(TableArgs),
}

#[derive(Args, Debug)]
struct Common {
    /// Input CSV file with a header row.
    input: PathBuf,
    /// Output chart file (.svg or .png).
    #[arg(short, long)]
    out: PathBuf,
    /// INI file with a [Columns] section mapping column names to axis labels.
    #[arg(long)]
    labels: Option<PathBuf>,
    /// Chart title.
    #[arg(long)]
    title: Option<String>,
    /// Figure width in inches (each chart has its own default).
    #[arg(long, requires = "height")]
    width: Option<f64>,
    /// Figure height in inches.
    #[arg(long, requires = "width")]
    height: Option<f64>,
    /// Export resolution.
    #[arg(long, default_value_t = 100)]
    dpi: u32,
}

impl Common {
    fn frame(&self) -> PlotFrame {
        PlotFrame {
            title: self.title.clone(),
            size: self.width.zip(self.height),
            finish: dsplot::FinishOptions {
                export: Some(Export::new(&self.out).with_dpi(self.dpi)),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[derive(Args, Debug)]
struct HistArgs {
    #[command(flatten)]
    common: Common,
    column: String,
    /// One series per distinct value of this column.
    #[arg(long)]
    key: Option<String>,
    #[arg(long, default_value_t = 35)]
    bins: usize,
    #[arg(long)]
    stacked: bool,
    #[arg(long)]
    cumulative: bool,
    /// Logarithmic y axis.
    #[arg(long)]
    log: bool,
    #[arg(long)]
    x_min: Option<f64>,
    #[arg(long)]
    x_max: Option<f64>,
}

#[derive(Args, Debug)]
struct ScatterArgs {
    #[command(flatten)]
    common: Common,
    x: String,
    y: String,
    /// Column with marker sizes.
    #[arg(long)]
    size: Option<String>,
    /// Column with marker colors (color names or numbers).
    #[arg(long)]
    color: Option<String>,
    #[arg(long, default_value = "rainbow")]
    color_scale: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Quadratic,
    Cubic,
}

#[derive(Args, Debug)]
struct LinesArgs {
    #[command(flatten)]
    common: Common,
    column: String,
    /// Horizontal values (default: row number).
    #[arg(long)]
    x: Option<String>,
    /// One line per distinct value of this column.
    #[arg(long)]
    key: Option<String>,
    /// One color and legend entry per distinct value of this column.
    #[arg(long)]
    label: Option<String>,
    #[arg(long)]
    min_n: Option<usize>,
    /// Moving-average window.
    #[arg(long)]
    avg: Option<usize>,
    /// Interpolation step.
    #[arg(long)]
    step: Option<f64>,
    #[arg(long, value_enum, default_value_t = Kind::Quadratic)]
    kind: Kind,
}

#[derive(Args, Debug)]
struct BarArgs {
    #[command(flatten)]
    common: Common,
    column: String,
    /// Bar labels (default: row number).
    #[arg(long)]
    label: Option<String>,
    /// Group bars by this column.
    #[arg(long)]
    key: Option<String>,
    #[arg(long, requires = "key")]
    stacked: bool,
    #[arg(long, requires = "key")]
    relative: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortBy {
    Label,
    Value,
}

#[derive(Args, Debug)]
struct PieArgs {
    #[command(flatten)]
    common: Common,
    column: String,
    /// Slice labels (default: row number).
    #[arg(long)]
    label: Option<String>,
    /// Count rows per distinct value of the column instead of using its values.
    #[arg(long)]
    count: bool,
    #[arg(long, value_enum)]
    sort: Option<SortBy>,
}

#[derive(Args, Debug)]
struct Hist2dArgs {
    #[command(flatten)]
    common: Common,
    x: String,
    y: String,
    #[arg(long, default_value_t = 20)]
    bins: usize,
    #[arg(long, default_value = "Blues")]
    color_scale: String,
}

#[derive(Args, Debug)]
struct MatrixArgs {
    /// Input CSV file with a header row.
    input: PathBuf,
    #[arg(short, long)]
    out: PathBuf,
    #[arg(long)]
    labels: Option<PathBuf>,
    /// Columns to pair, separated by comma (default: all numeric columns).
    #[arg(long)]
    columns: Option<String>,
    /// Draw 2D histograms instead of scatter plots.
    #[arg(long)]
    hist2d: bool,
    #[arg(long, default_value_t = 2.0)]
    subplot_size: f64,
    #[arg(long, default_value_t = 100)]
    dpi: u32,
}

#[derive(Args, Debug)]
struct TableArgs {
    input: PathBuf,
    #[arg(long)]
    labels: Option<PathBuf>,
    /// Columns to show, separated by comma.
    #[arg(long)]
    columns: Option<String>,
    #[arg(long)]
    no_index: bool,
    #[arg(long)]
    limit: Option<usize>,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn open(input: &PathBuf, labels: Option<&PathBuf>) -> Result<(DataFrame, Session)> {
    let data = DataFrame::from_csv_path(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let mut session = Session::new();
    if let Some(path) = labels {
        session.load_labels_from_config(path)?;
    }
    Ok((data, session))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Hist(args) => cmd_hist(args),
        Command::Scatter(args) => cmd_scatter(args),
        Command::Lines(args) => cmd_lines(args),
        Command::Bar(args) => cmd_bar(args),
        Command::Pie(args) => cmd_pie(args),
        Command::Hist2d(args) => cmd_hist2d(args),
        Command::Matrix(args) => cmd_matrix(args),
        Command::Table(args) => cmd_table(args),
    }
}

fn done(out: &std::path::Path) {
    eprintln!("Wrote chart to {}", out.display());
}

fn cmd_hist(args: HistArgs) -> Result<()> {
    let (data, mut session) = open(&args.common.input, args.common.labels.as_ref())?;
    let opts = HistOptions {
        key_column: args.key,
        bins: Bins::Count(args.bins),
        stacked: args.stacked,
        cumulative: args.cumulative,
        y_log: args.log,
        x_min: args.x_min,
        x_max: args.x_max,
        frame: args.common.frame(),
        ..Default::default()
    };
    session.hist(&data, &args.column, &opts)?;
    done(&args.common.out);
    Ok(())
}

fn cmd_scatter(args: ScatterArgs) -> Result<()> {
    let (data, mut session) = open(&args.common.input, args.common.labels.as_ref())?;
    let opts = ScatterOptions {
        size_column: args.size,
        color: args.color.map_or(MarkerColor::Default, MarkerColor::Column),
        color_scale: args.color_scale,
        frame: args.common.frame(),
        ..Default::default()
    };
    session.scatter(&data, &args.x, &args.y, &opts)?;
    done(&args.common.out);
    Ok(())
}

fn cmd_lines(args: LinesArgs) -> Result<()> {
    let (data, mut session) = open(&args.common.input, args.common.labels.as_ref())?;
    let kind = match args.kind {
        Kind::Quadratic => InterpolationKind::Quadratic,
        Kind::Cubic => InterpolationKind::Cubic,
    };
    let opts = LineOptions {
        x_column: args.x,
        key_column: args.key,
        label_column: args.label,
        min_n: args.min_n,
        avg_window: args.avg,
        interpolation: args.step.map(|step| Interpolation { step, kind }),
        frame: args.common.frame(),
        ..Default::default()
    };
    session.lines(&data, &args.column, &opts)?;
    done(&args.common.out);
    Ok(())
}

fn cmd_bar(args: BarArgs) -> Result<()> {
    let (data, mut session) = open(&args.common.input, args.common.labels.as_ref())?;
    match args.key {
        Some(key) => {
            let opts = GroupedBarOptions {
                label_column: args.label,
                stacked: args.stacked,
                relative: args.relative,
                frame: args.common.frame(),
                ..Default::default()
            };
            session.bar_groups(&data, &args.column, &key, &opts)?;
        }
        None => {
            let opts = BarOptions {
                label_column: args.label,
                frame: args.common.frame(),
                ..Default::default()
            };
            session.bar(&data, &args.column, &opts)?;
        }
    }
    done(&args.common.out);
    Ok(())
}

fn cmd_pie(args: PieArgs) -> Result<()> {
    let (data, mut session) = open(&args.common.input, args.common.labels.as_ref())?;
    let opts = PieOptions {
        label_column: args.label,
        sort: args.sort.map(|s| match s {
            SortBy::Label => PieSort::Label,
            SortBy::Value => PieSort::Value,
        }),
        frame: args.common.frame(),
        ..Default::default()
    };
    if args.count {
        session.pie_groups(&data, &args.column, &opts)?;
    } else {
        session.pie((&data, args.column.as_str()), &opts)?;
    }
    done(&args.common.out);
    Ok(())
}

fn cmd_hist2d(args: Hist2dArgs) -> Result<()> {
    let (data, mut session) = open(&args.common.input, args.common.labels.as_ref())?;
    let opts = Hist2dOptions {
        bins: dsplot::charts::Bins2d::Count(args.bins),
        color_scale: args.color_scale,
        frame: args.common.frame(),
        ..Default::default()
    };
    session.hist2d(&data, &args.x, &args.y, &opts)?;
    if session.last_figure().is_none() {
        anyhow::bail!("no points inside the bounds; nothing written");
    }
    done(&args.common.out);
    Ok(())
}

fn cmd_matrix(args: MatrixArgs) -> Result<()> {
    let (data, mut session) = open(&args.input, args.labels.as_ref())?;
    let opts = MatrixOptions {
        columns: args.columns.as_deref().map(parse_list),
        subplot_size: args.subplot_size,
        export: Some(Export::new(&args.out).with_dpi(args.dpi)),
        ..Default::default()
    };
    if args.hist2d {
        session.hist2d_matrix(&data, &opts)?;
    } else {
        session.scatter_matrix(&data, &opts)?;
    }
    done(&args.out);
    Ok(())
}

fn cmd_table(args: TableArgs) -> Result<()> {
    let (data, session) = open(&args.input, args.labels.as_ref())?;
    let opts = TableOptions {
        columns: args.columns.as_deref().map(parse_list),
        with_index: !args.no_index,
        limit: args.limit,
        ..Default::default()
    };
    println!("{}", session.table(&data, &opts)?);
    Ok(())
}
