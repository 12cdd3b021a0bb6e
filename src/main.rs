use anyhow::{Context, Result};
use chartprep::history::{ChartRecord, HistoryStore, InMemoryHistory};
use chartprep::synthesize::{self, MapProjection};
use chartprep::{export, graph, insights, session};
use chartprep::{prepare, ChartSpec, ChartType, OutputFormat, PreparedSeries, RenderOptions, Table};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "chartprep")]
#[command(about = "Prepare chart series from CSV or JSON tables on stdin", long_about = None)]
struct Cli {
    /// Input is a JSON array of objects instead of CSV
    #[arg(long, global = true)]
    json: bool,

    /// More log output on stderr (repeatable); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prepare the series for one chart
    Prepare(PrepareArgs),
    /// Place rows on the map by location name
    Geo(GeoArgs),
    /// Suggest a chart type from the column names
    Suggest,
    /// Summarize a numeric column
    Insights(InsightsArgs),
    /// Write the input table back out as CSV
    Export,
    /// Saved chart history (mock accounts)
    History(HistoryArgs),
}

#[derive(Args, Debug)]
struct ChartArgs {
    #[arg(long = "type", help = "Chart type (bar, line, pie, scatter, area, bubble, column3d, bar3d, surface3d, map3d, terrain3d, bubble3d)")]
    chart_type: ChartType,

    #[arg(short = 'x', long = "x", help = "X-axis (or location) column")]
    x_field: String,

    #[arg(short = 'y', long = "y", help = "Y-axis (or value) column")]
    y_field: String,

    #[arg(short = 'z', long = "z", help = "Z-axis column for 3D charts")]
    z_field: Option<String>,

    #[arg(long, default_value = "", help = "Chart title")]
    title: String,
}

impl ChartArgs {
    fn spec(&self) -> ChartSpec {
        let spec = ChartSpec::new(
            self.title.clone(),
            self.chart_type,
            self.x_field.clone(),
            self.y_field.clone(),
        );
        match &self.z_field {
            Some(z) => spec.with_z(z.clone()),
            None => spec,
        }
    }
}

#[derive(Args, Debug)]
struct PrepareArgs {
    #[command(flatten)]
    chart: ChartArgs,

    #[arg(long, default_value = "", help = r#"Render options as JSON, e.g. '{"type": "png", "width": 640}'"#)]
    options: String,

    #[arg(short, long, help = "Write to a file instead of stdout")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GeoArgs {
    #[arg(long, help = "Column holding place names")]
    location: String,

    #[arg(long, help = "Column holding the value to size and color by")]
    value: String,

    #[arg(long, help = "Column holding a time key for animation frames")]
    time: Option<String>,

    #[arg(long, requires = "time", help = "Only emit points of this time key")]
    frame: Option<String>,

    #[arg(long, default_value = "globe", help = "Screen projection (globe or flat)")]
    projection: MapProjection,
}

#[derive(Args, Debug)]
struct InsightsArgs {
    #[arg(short = 'y', long = "y", help = "Column to summarize")]
    y_field: String,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    #[arg(long, help = "History JSON file (created on first save)")]
    store: PathBuf,

    #[arg(long)]
    email: String,

    #[arg(long)]
    password: String,

    #[command(subcommand)]
    action: HistoryAction,
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    /// Prepare a chart from stdin and save it
    Save {
        #[command(flatten)]
        chart: ChartArgs,

        #[arg(long, default_value = "stdin", help = "Identifier of the source file")]
        file_id: String,
    },
    /// List saved charts, newest first
    List,
    /// Delete a saved chart
    Delete { id: String },
}

#[derive(Serialize)]
struct PreparedChart<'a> {
    #[serde(flatten)]
    spec: &'a ChartSpec,
    series: &'a PreparedSeries,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Prepare(args) => run_prepare(args, cli.json),
        Command::Geo(args) => run_geo(args, cli.json),
        Command::Suggest => {
            let table = read_table(cli.json)?;
            write_json(&insights::suggest_chart(&table.columns), None)
        }
        Command::Insights(args) => {
            let table = read_table(cli.json)?;
            write_json(&insights::summarize(&table.rows, &args.y_field), None)
        }
        Command::Export => {
            let table = read_table(cli.json)?;
            let stdout = io::stdout();
            export::write_csv(&table, stdout.lock()).context("Failed to write CSV to stdout")
        }
        Command::History(args) => run_history(args, cli.json),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Keep a subscriber that is already installed.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .ok();
}

fn read_table(json: bool) -> Result<Table> {
    let stdin = io::stdin();
    let handle = stdin.lock();
    if json {
        Table::from_json_reader(handle).context("Failed to read JSON from stdin")
    } else {
        Table::from_csv(handle).context("Failed to read CSV from stdin")
    }
}

fn prepare_from(table: &Table, spec: &ChartSpec) -> PreparedSeries {
    for warning in spec.field_warnings(&table.columns) {
        warn!("{}", warning);
    }
    prepare(&table.rows, spec)
}

fn run_prepare(args: PrepareArgs, json: bool) -> Result<()> {
    let options = RenderOptions::from_json_str(&args.options)?;
    let table = read_table(json)?;
    let spec = args.chart.spec();
    let series = prepare_from(&table, &spec);

    match options.format {
        OutputFormat::Json => write_json(
            &PreparedChart {
                spec: &spec,
                series: &series,
            },
            args.output.as_deref(),
        ),
        OutputFormat::Png => {
            let png_bytes = graph::render_preview(&spec, &series, &options)
                .context("Failed to render chart")?;
            write_output(&png_bytes, args.output.as_deref())
        }
    }
}

fn run_geo(args: GeoArgs, json: bool) -> Result<()> {
    let table = read_table(json)?;
    let (mut points, frames) = match &args.time {
        Some(time) => (
            synthesize::synthesize_geography_over_time(&table.rows, &args.location, &args.value, time),
            synthesize::time_frames(&table.rows, time),
        ),
        None => (
            synthesize::synthesize_geography(&table.rows, &args.location, &args.value),
            Vec::new(),
        ),
    };

    if let Some(key) = &args.frame {
        points = synthesize::frame(&points, key).cloned().collect();
    }

    let placed: Vec<serde_json::Value> = points
        .iter()
        .map(|p| {
            let (x, y) = synthesize::project(p, args.projection);
            json!({ "point": p, "screen": { "x": x, "y": y } })
        })
        .collect();

    write_json(
        &json!({ "projection": args.projection, "frames": frames, "points": placed }),
        None,
    )
}

fn run_history(args: HistoryArgs, json: bool) -> Result<()> {
    let session = session::login(&args.email, &args.password)?;
    let mut store = InMemoryHistory::load(&args.store)
        .with_context(|| format!("Failed to load history from {}", args.store.display()))?;

    match args.action {
        HistoryAction::Save { chart, file_id } => {
            let table = read_table(json)?;
            let spec = chart.spec();
            let series = prepare_from(&table, &spec);
            let record = ChartRecord::from_series(&spec, &series);
            let saved = store.save(&session, &file_id, &spec.title, record)?;
            store
                .persist(&args.store)
                .with_context(|| format!("Failed to write history to {}", args.store.display()))?;
            write_json(&saved, None)
        }
        HistoryAction::List => write_json(&store.list(&session), None),
        HistoryAction::Delete { id } => {
            store.delete(&session, &id)?;
            store
                .persist(&args.store)
                .with_context(|| format!("Failed to write history to {}", args.store.display()))?;
            info!(%id, "chart deleted");
            Ok(())
        }
    }
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value).context("Failed to serialize output")?;
    bytes.push(b'\n');
    write_output(&bytes, output)
}

fn write_output(bytes: &[u8], output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        return std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()));
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(bytes)
        .context("Failed to write output to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
