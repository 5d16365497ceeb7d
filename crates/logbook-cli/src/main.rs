//! Logbook CLI - read, write and query a CSV-backed logbook

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use logbook::prelude::*;
use logbook_csv::CsvClient;
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "logbook")]
#[command(author, version, about = "Run-keyed access to an experiment logbook")]
struct Cli {
    /// Directory holding logbook documents
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Document to open (overrides the config file)
    #[arg(short, long)]
    document: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print warnings (-v) or debug output (-vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value of a field for a run
    Get {
        field: String,
        run: RunNumber,

        #[arg(short, long, value_enum, default_value = "source")]
        sheet: SheetArg,
    },

    /// Print the unit of a field
    Unit {
        field: String,

        #[arg(short, long, value_enum, default_value = "source")]
        sheet: SheetArg,
    },

    /// Write a value into a field of a run
    Write {
        field: String,
        value: String,
        run: RunNumber,

        #[arg(short, long, value_enum, default_value = "write")]
        sheet: SheetArg,

        /// Append the field as a new column if it does not exist
        #[arg(long)]
        new_field: bool,

        /// Replace a non-empty cell
        #[arg(long)]
        overwrite: bool,
    },

    /// List runs matching all filters
    Query {
        /// `field=value`, `field=a,b,c` or `field=low..high`
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Sort ascending by this field
        #[arg(long)]
        sort: Option<String>,

        #[arg(short, long, value_enum, default_value = "source")]
        sheet: SheetArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SheetArg {
    Source,
    Write,
}

impl From<SheetArg> for Sheet {
    fn from(arg: SheetArg) -> Self {
        match arg {
            SheetArg::Source => Sheet::Source,
            SheetArg::Write => Sheet::Write,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "error",
        1 => "warn",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = load_config(cli.config.as_deref(), cli.document)?;
    let verbose = cli.verbose > 0;
    let mut book = Logbook::new(CsvClient::new(cli.root), config);

    match cli.command {
        Commands::Get { field, run, sheet } => {
            let value = book.get_value(&field, run, sheet.into(), verbose)?;
            print_json(&json!({ "run": run, "field": field, "value": value }))
        }
        Commands::Unit { field, sheet } => {
            let unit = book.get_unit(&field, sheet.into(), verbose)?;
            print_json(&json!({ "field": field, "unit": unit }))
        }
        Commands::Write {
            field,
            value,
            run,
            sheet,
            new_field,
            overwrite,
        } => {
            let options = WriteOptions {
                sheet: sheet.into(),
                allow_new_field: new_field,
                overwrite,
            };
            let outcome = book.write(&field, value.as_str(), run, options, verbose)?;
            print_json(&serde_json::to_value(&outcome)?)?;
            if !outcome.is_written() {
                bail!("nothing written for '{field}' of run {run}");
            }
            Ok(())
        }
        Commands::Query {
            filters,
            sort,
            sheet,
        } => {
            let filter = parse_filters(&filters)?;
            let result = book.query(sheet.into(), &filter, sort.as_deref(), verbose)?;
            let rows: Vec<_> = result
                .iter()
                .map(|row| {
                    let values: serde_json::Map<_, _> = row
                        .values
                        .iter()
                        .map(|(field, value)| (field.clone(), json!(value)))
                        .collect();
                    json!({ "run": row.run, "values": values })
                })
                .collect();
            print_json(&serde_json::Value::Array(rows))
        }
    }
}

fn load_config(path: Option<&Path>, document: Option<String>) -> Result<LogbookConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid configuration in '{}'", path.display()))?
        }
        None => LogbookConfig::default(),
    };

    if let Some(document) = document {
        config.document_name = document;
    }
    if config.document_name.is_empty() {
        bail!("no document given; pass --document or set document_name in the config file");
    }
    Ok(config)
}

/// Parse `field=spec` arguments into a filter
fn parse_filters(args: &[String]) -> Result<Filter> {
    let mut filter = Filter::new();

    for arg in args {
        let Some((field, spec)) = arg.split_once('=') else {
            bail!("filter '{arg}' is not of the form field=value");
        };
        let field = field.trim();

        filter = if let Some((low, high)) = spec.split_once("..") {
            filter.between(field, filter_value(low), filter_value(high))
        } else if spec.contains(',') {
            filter.one_of(field, spec.split(',').map(filter_value))
        } else {
            filter.eq(field, filter_value(spec))
        };
    }

    Ok(filter)
}

fn filter_value(raw: &str) -> FilterValue {
    let raw = raw.trim();
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => FilterValue::Number(n),
        _ => FilterValue::Text(raw.to_string()),
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
