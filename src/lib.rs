//! hubdata: read hubverse modeling hubs.
//!
//! A modeling hub is a directory with a `hub-config/` folder of JSON
//! configuration and a `model-output/` folder holding one subdirectory of
//! forecast files (CSV, Parquet or Arrow IPC) per model. This crate loads
//! the configuration, derives the Arrow schema shared by all model-output
//! files, and exposes those files as one queryable dataset.
//!
//! # Modules
//!
//! - [`config`]: Loading `tasks.json`, `admin.json` and `model-metadata-schema.json`
//! - [`schema`]: Deriving the hub schema from `tasks.json`
//! - [`dataset`]: The unioned model-output dataset, scans and filters
//! - [`inspect`]: Human-readable and JSON summaries
//! - [`error`]: Error types for hubdata operations
//!
//! # Example
//!
//! ```no_run
//! use hubdata::connect_hub;
//! use hubdata::dataset::{Predicate, ScanOptions};
//!
//! let hub = connect_hub("hubs/example-complex-forecast-hub")?;
//! let dataset = hub.get_dataset()?;
//! let table = dataset.to_table(
//!     &ScanOptions::new()
//!         .with_columns(["model_id", "location", "value"])
//!         .with_predicate(Predicate::eq("location", "US")),
//! )?;
//! println!("{} US rows", table.num_rows());
//! # Ok::<(), hubdata::HubError>(())
//! ```

pub mod config;
pub mod connection;
pub mod dataset;
pub mod error;
pub mod inspect;
pub mod logging;
pub mod schema;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use connection::{connect_hub, HubConnection};
pub use error::HubError;

/// The hubdata CLI application.
#[derive(Parser)]
#[command(name = "hubdata")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log discovery and read details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the schema derived from a hub's tasks.json.
    Schema(SchemaArgs),
    /// Print the schema plus model-output file and row counts.
    Dataset(DatasetArgs),
}

/// Arguments for the schema subcommand.
#[derive(clap::Args)]
struct SchemaArgs {
    /// Path to the hub's root directory.
    hub_path: PathBuf,

    /// Output format for the report ('text' or 'json').
    #[arg(long, env = "HUBDATA_OUTPUT", default_value = "text", value_parser = ["text", "json"])]
    output: String,
}

/// Arguments for the dataset subcommand.
#[derive(clap::Args)]
struct DatasetArgs {
    /// Path to the hub's root directory.
    hub_path: PathBuf,

    /// Output format for the report ('text' or 'json').
    #[arg(long, env = "HUBDATA_OUTPUT", default_value = "text", value_parser = ["text", "json"])]
    output: String,

    /// Only count rows where COLUMN equals VALUE (comma-separate several
    /// values to match any). Repeat to combine filters.
    #[arg(long = "filter", value_name = "COLUMN=VALUE")]
    filters: Vec<String>,
}

/// Run the hubdata CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), HubError> {
    let cli = Cli::parse();
    logging::init_cli_logger(cli.verbose);

    match cli.command {
        Some(Commands::Schema(args)) => run_schema(args),
        Some(Commands::Dataset(args)) => run_dataset(args),
        None => {
            println!("hubdata {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Read hubverse modeling hubs.");
            println!();
            println!("Run 'hubdata --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the schema subcommand.
fn run_schema(args: SchemaArgs) -> Result<(), HubError> {
    let hub = connect_hub(&args.hub_path)?;
    let report = inspect::schema_report(&hub);
    print_report(&report, &args.output)
}

/// Execute the dataset subcommand.
fn run_dataset(args: DatasetArgs) -> Result<(), HubError> {
    let hub = connect_hub(&args.hub_path)?;

    let predicates = args
        .filters
        .iter()
        .map(|filter| filter.parse())
        .collect::<Result<Vec<dataset::Predicate>, HubError>>()?;
    let predicate = dataset::Predicate::all(predicates);

    let dataset = hub.get_dataset()?;
    let report = inspect::dataset_report(&hub, &dataset, predicate.as_ref())?;
    print_report(&report, &args.output)
}

fn print_report<R>(report: &R, output: &str) -> Result<(), HubError>
where
    R: std::fmt::Display + serde::Serialize,
{
    match output {
        "json" => {
            let json = serde_json::to_string_pretty(report)?;
            println!("{json}");
        }
        _ => print!("{report}"),
    }
    Ok(())
}
