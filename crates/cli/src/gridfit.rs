//! gridfit - rebuild a grid from a segmentation result
//!
//! Reads a JSON document holding the source image size and a list of
//! labelled rectangles, runs one reconstruction pass (append, sort, prune)
//! and writes the grid as JSON or text.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use rostergrid_core::{
    CollisionPolicy, LayoutExpectation, Matrix, MatrixParams, PruneOptions, PruneReport, RowItem,
    Segment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// Rebuild a rows x columns grid from unordered bounding boxes.
#[derive(Parser, Debug)]
#[command(name = "gridfit")]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
struct Args {
    /// Segmentation result as JSON, or "-" for stdin
    #[arg(default_value = "-")]
    input: String,

    /// Print version information
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: (),

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    // === Row assignment ===
    /// Fraction of the row height a box must overlap to join the row
    #[arg(short = 's', long = "spacing-percent", default_value = "0.5")]
    spacing_percent: f64,

    /// Keep boxes whose merge was rejected as new items instead of dropping them
    #[arg(long = "insert-rejected", action = ArgAction::SetTrue)]
    insert_rejected: bool,

    /// Skip collision detection while appending
    #[arg(long = "no-collision", action = ArgAction::SetTrue)]
    no_collision: bool,

    // === Pruning ===
    /// Rows with fewer items than this are filled or removed
    #[arg(short = 't', long)]
    threshold: Option<usize>,

    /// Rows this short are removed even when filling is on
    #[arg(long = "hard-threshold", default_value = "1")]
    hard_threshold: usize,

    /// Remove short rows instead of inferring their missing cells
    #[arg(long = "no-fill", action = ArgAction::SetTrue)]
    no_fill: bool,

    // === Validation ===
    /// Expected number of rows
    #[arg(long = "rows", requires = "columns")]
    rows: Option<usize>,

    /// Expected number of columns
    #[arg(long = "columns")]
    columns: Option<usize>,

    /// The last row may be shorter than --columns
    #[arg(long = "partial-last-row", action = ArgAction::SetTrue)]
    partial_last_row: bool,

    // === Output ===
    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Type of output to generate
    #[arg(short = 'f', long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Deserialize)]
struct InputDocument {
    source_width: f64,
    source_height: f64,
    segments: Vec<Segment>,
}

#[derive(Debug, Serialize)]
struct OutputDocument<'a> {
    rows: Vec<&'a [RowItem]>,
}

fn matrix_params(args: &Args) -> Result<MatrixParams> {
    if !(0.0..1.0).contains(&args.spacing_percent) {
        bail!(
            "--spacing-percent must be in [0, 1), got {}",
            args.spacing_percent
        );
    }
    let policy = if args.insert_rejected {
        CollisionPolicy::InsertAsNew
    } else {
        CollisionPolicy::Drop
    };
    Ok(MatrixParams::default()
        .with_spacing_percent(args.spacing_percent)
        .with_collision_policy(policy))
}

fn layout_expectation(args: &Args) -> Option<LayoutExpectation> {
    let (rows, columns) = (args.rows?, args.columns?);
    let expected = LayoutExpectation::new(rows, columns);
    Some(if args.partial_last_row {
        expected.with_partial_last_row()
    } else {
        expected
    })
}

fn read_input(path: &str) -> Result<InputDocument> {
    let mut reader: Box<dyn Read> = if path == "-" {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(path).with_context(|| format!("failed to open {path}"))?;
        Box::new(BufReader::new(file))
    };
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .with_context(|| format!("failed to read {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("{path} is not a segmentation document"))
}

/// Runs the full pass and returns the grid with what pruning changed.
fn reconstruct(args: &Args, input: InputDocument) -> Result<(Matrix, PruneReport)> {
    let mut matrix = Matrix::with_params(
        input.source_height,
        input.source_width,
        matrix_params(args)?,
    );
    let detect_collision = !args.no_collision;
    for segment in input.segments {
        matrix.auto_append(segment.rectangle, segment.label, detect_collision)?;
    }
    matrix.sort();
    debug!(rows = matrix.len(), items = matrix.item_count(), "rows assigned");

    // Without an explicit threshold, the widest row sets the expected width.
    let threshold = args
        .threshold
        .or(args.columns)
        .unwrap_or_else(|| matrix.row_lengths().into_iter().max().unwrap_or(0));
    let options = PruneOptions::new(threshold)
        .fill_missing(!args.no_fill)
        .hard_threshold(args.hard_threshold);
    let report = matrix.prune(options)?;
    info!(
        removed = report.removed.len(),
        filled = report.filled.len(),
        aborted = report.aborted.len(),
        "pruned grid"
    );

    if let Some(expected) = layout_expectation(args) {
        matrix.check_layout(&expected)?;
    }
    Ok((matrix, report))
}

fn write_output<W: Write>(out: &mut W, matrix: &Matrix, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let doc = OutputDocument {
                rows: matrix.iter().map(|row| row.items()).collect(),
            };
            serde_json::to_writer_pretty(&mut *out, &doc)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for (n, row) in matrix.iter().enumerate() {
                writeln!(out, "row {n} ({} items)", row.len())?;
                for item in row {
                    let marker = if item.is_inferred() { "*" } else { " " };
                    writeln!(out, "  {marker} {:<16} {}", item.label(), item.rectangle())?;
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();

    let input = read_input(&args.input)?;
    let (matrix, _report) = reconstruct(&args, input)?;

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("failed to create output file {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };
    write_output(&mut output, &matrix, args.format)?;
    output.flush()?;
    Ok(())
}
