pub mod apply;
pub mod cli;
pub mod dedup;
pub mod error;
pub mod id_card;
pub mod io_utils;
pub mod mapping;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod row;
pub mod source;
pub mod store;
pub mod validate;

use std::{env, fs, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands},
    pipeline::ImportPolicy,
    store::MemoryStore,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("roster_import", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Import(args) => handle_import(&args),
        Commands::Validate(args) => handle_validate(&args),
    }
}

fn handle_import(args: &cli::ImportArgs) -> Result<()> {
    info!(
        "Importing '{}' into store {:?}",
        args.input.display(),
        args.store
    );
    let rows = source::read_rows(&args.input, args.delimiter, args.input_encoding.as_deref())
        .with_context(|| format!("Reading rows from {:?}", args.input))?;

    let mut store = if args.store.exists() {
        MemoryStore::load(&args.store)
            .with_context(|| format!("Loading store from {:?}", args.store))?
    } else {
        MemoryStore::new()
    };

    let policy = ImportPolicy {
        skip_duplicates: !args.fail_duplicates,
    };
    let report = pipeline::ingest(rows, &policy, &mut store);

    store
        .save(&args.store)
        .with_context(|| format!("Writing store to {:?}", args.store))?;

    if let Some(path) = &args.report_json {
        let json = serde_json::to_string_pretty(&report).context("Serializing outcome report")?;
        fs::write(path, json).with_context(|| format!("Writing report to {path:?}"))?;
    }

    println!("{}", report.summary());
    for item in &report.failed_items {
        println!("row {}: {}", item.row_index, item.reason);
    }
    for item in &report.duplicate_items {
        println!("row {}: {}", item.row_index, item.reason);
    }
    Ok(())
}

fn handle_validate(args: &cli::ValidateArgs) -> Result<()> {
    info!("Validating '{}'", args.input.display());
    let rows = source::read_rows(&args.input, args.delimiter, args.input_encoding.as_deref())
        .with_context(|| format!("Reading rows from {:?}", args.input))?;
    source::enforce_dry_run_limit(rows.len())?;

    let outcome = pipeline::validate_only(rows);
    println!(
        "{} valid row(s), {} invalid",
        outcome.valid.len(),
        outcome.invalid.len()
    );
    for row in &outcome.invalid {
        for reason in &row.reasons {
            println!("row {}: {}", row.row_index, reason);
        }
    }
    Ok(())
}
