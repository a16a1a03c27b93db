use anyhow::Context;
use clap::{Parser, Subcommand};
use kmertab_lib::call_filter::{filter_calls, read_calls};
use kmertab_lib::table::reader::parse_tuples;
use kmertab_lib::{CountTuple, IdentifierPolicy, MatrixTable, MatrixTableBuilder, TableConfiguration};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "kmertab")]
#[command(version = "0.1.0")]
#[command(about = "Dense count tables from sparse (entity, feature, count) tuples", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a dense CSV table from tuple files
    Table {
        /// Tab-separated tuple files (entity, feature, count); `-` for stdin
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Header label of the row-key column
        #[arg(short, long, default_value = kmertab_lib::constants::DEFAULT_ROW_KEY_LABEL)]
        label: String,

        /// Quote identifiers containing commas, quotes or line breaks instead of failing
        #[arg(long, default_value = "false")]
        quote: bool,

        /// Ingest tuples in parallel
        #[arg(long, default_value = "false")]
        parallel: bool,

        /// Number of threads for parallel ingestion (0 = all available cores)
        #[arg(short = 't', long, default_value = "0")]
        threads: usize,

        /// Warn when rows x columns exceeds this many cells (0 = never)
        #[arg(long, default_value_t = kmertab_lib::constants::DEFAULT_SCALE_WARNING_CELLS)]
        scale_warning_cells: u64,
    },

    /// Print the samples whose genotype reaches a minimum allele index
    FilterCalls {
        /// Tab-separated calls (sample, genotype such as 0/1); `-` for stdin
        #[arg(short, long)]
        input: PathBuf,

        /// Minimum allele index a sample must carry
        #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
        min_genotype: i32,
    },

    /// Report table dimensions without rendering rows
    Inspect {
        /// Tab-separated tuple files (entity, feature, count); `-` for stdin
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Accept identifiers containing commas, quotes or line breaks
        #[arg(long, default_value = "false")]
        quote: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing: use RUST_LOG if set, otherwise default to info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Table { input, output, label, quote, parallel, threads, scale_warning_cells } => {
            table_command(input, output, label, quote, parallel, threads, scale_warning_cells)?;
        }
        Commands::FilterCalls { input, min_genotype } => {
            filter_calls_command(input, min_genotype)?;
        }
        Commands::Inspect { input, quote } => {
            inspect_command(input, quote)?;
        }
    }

    Ok(())
}

/// Build a dense table from tuple files and write it as CSV
#[allow(clippy::too_many_arguments)]
fn table_command(
    input: Vec<PathBuf>,
    output: Option<PathBuf>,
    label: String,
    quote: bool,
    parallel: bool,
    threads: usize,
    scale_warning_cells: u64,
) -> anyhow::Result<()> {
    let mut config = TableConfiguration::new(label)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    config.identifier_policy = identifier_policy(quote);
    config.num_threads = threads;
    config.scale_warning_cells = scale_warning_cells;
    config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
    config.print();

    let table = if parallel {
        let tuples = read_all_tuples(&input)?;
        MatrixTableBuilder::build_parallel(config, &tuples)?
    } else {
        // Stream records straight into the builder
        let mut builder = MatrixTableBuilder::new(config)?;
        for path in &input {
            info!("Reading tuples from {}", path.display());
            parse_tuples(path, |tuple| Ok(builder.ingest(&tuple)?))?;
        }
        builder.finish()
    };

    match output {
        Some(path) => {
            info!("Writing table to {}...", path.display());
            let file = File::create(&path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_table(&table, BufWriter::new(file))?;
        }
        None => {
            let stdout = io::stdout();
            write_table(&table, BufWriter::new(stdout.lock()))?;
        }
    }

    info!("Table written: {} rows x {} columns", table.num_rows(), table.num_columns());
    Ok(())
}

fn identifier_policy(quote: bool) -> IdentifierPolicy {
    if quote {
        IdentifierPolicy::Quote
    } else {
        IdentifierPolicy::Reject
    }
}

fn write_table<W: Write>(table: &MatrixTable, writer: W) -> anyhow::Result<()> {
    table.write_to(writer)?;
    Ok(())
}

/// Filter per-sample calls by minimum genotype and print the passing samples
fn filter_calls_command(input: PathBuf, min_genotype: i32) -> anyhow::Result<()> {
    let source = input.display().to_string();
    let calls = if input.as_os_str() == "-" {
        read_calls(io::stdin().lock(), &source)?
    } else {
        let file = File::open(&input)
            .with_context(|| format!("Failed to open call file: {}", input.display()))?;
        read_calls(BufReader::new(file), &source)?
    };
    info!("Loaded {} calls from {}", calls.len(), source);

    let kept = filter_calls(&calls, min_genotype);
    info!("  {} of {} samples have a genotype >= {}", kept.len(), calls.len(), min_genotype);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for call in kept {
        writeln!(out, "{}", call.call_set_name)?;
    }
    out.flush()?;
    Ok(())
}

/// Report entity, feature and pair counts without rendering the table
fn inspect_command(input: Vec<PathBuf>, quote: bool) -> anyhow::Result<()> {
    let config = TableConfiguration {
        identifier_policy: identifier_policy(quote),
        ..TableConfiguration::default()
    };
    let mut builder = MatrixTableBuilder::new(config)?;
    for path in &input {
        parse_tuples(path, |tuple| Ok(builder.ingest(&tuple)?))?;
    }

    let dense_cells = (builder.num_entities() as u64).saturating_mul(builder.num_features() as u64);
    println!("\n=== Table Summary ===");
    println!("  Tuples: {}", builder.num_tuples());
    println!("  Overwritten duplicates: {}", builder.num_overwrites());
    println!("  Rows (entities): {}", builder.num_entities());
    println!("  Columns (features): {}", builder.num_features());
    println!("  Observed pairs: {}", builder.num_observed_pairs());
    println!("  Dense cells: {}", dense_cells);
    if dense_cells > 0 {
        println!(
            "  Fill rate: {:.2}%",
            (builder.num_observed_pairs() as f64 / dense_cells as f64) * 100.0
        );
    }
    Ok(())
}

/// Read every tuple of every input into memory
fn read_all_tuples(input: &[PathBuf]) -> anyhow::Result<Vec<CountTuple>> {
    let mut tuples = Vec::new();
    for path in input {
        info!("Reading tuples from {}", path.display());
        tuples.extend(kmertab_lib::table::read_tuple_file(path)?);
    }
    info!("  Loaded {} tuples", tuples.len());
    Ok(tuples)
}
