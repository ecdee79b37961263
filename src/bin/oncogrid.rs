use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use oncogrid::config::OncoConfig;
use oncogrid::matrix::MultiMode;
use oncogrid::output::{OUTPUT_SUFFIX, OncoplotOutput};
use oncogrid::pipeline::OncoplotRunner;
use oncogrid::table::{DataTable, Table};
use oncogrid::utils::bed::read_locations;

#[derive(Parser)]
#[command(name = "oncogrid")]
#[command(
    about = "Oncoplot matrix builder",
    long_about = "Builds gene or genomic-location by sample mutation matrices with marginal summaries, memo-sort ordering, legends and clinical tracks, and writes them as JSON."
)]
struct Cli {
    /// Log verbosity level
    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,
    /// Write log output to a file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<String>,
    /// Append to log file instead of truncating
    #[arg(long, global = true)]
    append_log: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Options shared by the matrix-building commands.
#[derive(Args)]
struct PlotArgs {
    /// Tab-delimited mutation table with a header line.
    #[arg(long, required = true)]
    mutations: String,
    /// Tab-delimited clinical table; first column is the sample id, every other column a track.
    #[arg(long)]
    clinical: Option<String>,
    /// JSON configuration (column names, plot order, aliases, colors).
    #[arg(long)]
    config: Option<String>,
    /// Prefix for output files. Output is written to `<prefix>.oncoplot.json`.
    #[arg(long, required = true)]
    out_prefix: String,
    /// How multi-event cells contribute to the marginals (overrides the config).
    #[arg(long)]
    multi: Option<MultiMode>,
    /// Keep construction order instead of memo sort.
    #[arg(long)]
    no_sort: bool,
    /// Keep samples without any event.
    #[arg(long)]
    keep_empty: bool,
    /// Overwrite existing output files.
    #[arg(long, short)]
    force: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Gene by sample oncoplot from gene and type columns
    Genes {
        #[command(flatten)]
        args: PlotArgs,
    },
    /// Genomic location by sample oncoplot from coordinates and alleles
    Regions {
        #[command(flatten)]
        args: PlotArgs,
        /// BED file or list of chr:start-end locations; file order is the row order.
        #[arg(long, required = true)]
        locations: String,
    },
    /// Print JSON Schema for the oncoplot output format
    Schema {
        /// Write schema to file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },
}

// Helper to check output paths and create directories
fn check_output_paths(prefix: &str, suffixes: &[&str], force: bool) -> Result<()> {
    let path = Path::new(prefix);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        info!("Creating output directory: {:?}", parent);
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create output directory {:?}", parent))?;
    }

    if !force {
        for suffix in suffixes {
            let p = format!("{}{}", prefix, suffix);
            if Path::new(&p).exists() {
                bail!("Output file {} already exists. Use --force to overwrite.", p);
            }
        }
    }

    Ok(())
}

/// Config file (or defaults) with command line overrides applied.
fn load_config(args: &PlotArgs) -> Result<OncoConfig> {
    let mut config = match &args.config {
        Some(path) => OncoConfig::load(path)
            .with_context(|| format!("Error loading config {}", path))?,
        None => OncoConfig::default(),
    };
    if let Some(multi) = args.multi {
        config.multi = multi;
    }
    if args.no_sort {
        config.sort = false;
    }
    if args.keep_empty {
        config.remove_empty = false;
    }
    Ok(config)
}

fn read_table(path: &str) -> Result<DataTable> {
    let table =
        DataTable::read(path).with_context(|| format!("Error reading table {}", path))?;
    info!(
        "Read {} rows x {} columns from {}",
        table.n_rows(),
        table.n_cols(),
        path
    );
    Ok(table)
}

fn run_plot(args: &PlotArgs, locations: Option<&str>) -> Result<()> {
    check_output_paths(&args.out_prefix, &[OUTPUT_SUFFIX], args.force)?;

    let config = load_config(args)?;
    let mutations = read_table(&args.mutations)?;
    let clinical = args.clinical.as_deref().map(read_table).transpose()?;

    let locations = match locations {
        Some(path) => {
            let locs = read_locations(path)
                .with_context(|| format!("Error reading locations {}", path))?;
            info!("Loaded {} locations from {}", locs.len(), path);
            Some(locs)
        }
        None => None,
    };

    let mut runner = OncoplotRunner::new(&config)
        .with_clinical(clinical.as_ref().map(|t| t as &dyn Table));
    if let Some(locs) = &locations {
        runner = runner.with_locations(locs);
    }

    let plot = runner.run(&mutations)?;
    let output = OncoplotOutput::from_oncoplot(&plot, &config.aliases);
    let path = output
        .write_to_prefix(&args.out_prefix)
        .context("Error writing output")?;
    info!("Wrote {} cells to {}", output.n_cells(), path);
    Ok(())
}

fn run_schema(output: Option<&str>) -> Result<()> {
    let schema = oncogrid::output::schema::schema_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, &schema)
                .with_context(|| format!("Error writing schema {}", path))?;
            info!("Schema written to {}", path);
        }
        None => println!("{}", schema),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_builder = env_logger::Builder::from_default_env();
    log_builder
        .filter_level(cli.log_level.to_level_filter())
        .format_module_path(false);
    if let Some(ref path) = cli.log_file {
        let file = if cli.append_log {
            std::fs::File::options().create(true).append(true).open(path)
        } else {
            std::fs::File::create(path)
        };
        match file {
            Ok(file) => {
                log_builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!("Could not open log file '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        }
    }
    log_builder.init();

    let result = match &cli.command {
        Commands::Genes { args } => run_plot(args, None),
        Commands::Regions { args, locations } => run_plot(args, Some(locations)),
        Commands::Schema { output } => run_schema(output.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
