pub mod audit;
pub mod classify;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod io_utils;
pub mod plan;
pub mod report;
pub mod sample;
pub mod sampler;
pub mod schema_diff;
pub mod snapshot;
pub mod table;
pub mod tables;
pub mod value;

use std::{env, fs, path::Path, process::ExitCode, sync::OnceLock};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use itertools::Itertools;
use log::{LevelFilter, debug, info};

use crate::{
    audit::DEFAULT_MAX_RECORDS,
    cli::{AuditArgs, Cli, Commands, CompareArgs, DashboardArgs, PlanArgs, TablesArgs},
    config::AuditConfig,
    sampler::DirectorySampler,
    snapshot::SchemaSnapshot,
};

static LOGGER: OnceLock<()> = OnceLock::new();

pub const DEFAULT_OUTPUT_DIR: &str = "formula-audit-output";

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("formula_audit", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Audit(args) => handle_audit(&args),
        Commands::Plan(args) => handle_plan(&args),
        Commands::Compare(args) => handle_compare(&args),
        Commands::Tables(args) => handle_tables(&args),
        Commands::Dashboard(args) => handle_dashboard(&args),
    }
}

fn load_config(args: &AuditArgs) -> Result<AuditConfig> {
    let Some(path) = &args.config else {
        return Ok(AuditConfig::default());
    };
    let config = AuditConfig::load(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(config.relative_to(base))
}

/// Trimmed, non-empty table names, first occurrence kept.
fn distinct_tables(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .unique()
        .map(str::to_string)
        .collect()
}

fn resolve_tables(
    args: &AuditArgs,
    config: &AuditConfig,
    sampler: &DirectorySampler,
) -> Result<Vec<String>> {
    let explicit = distinct_tables(&args.tables);
    if !explicit.is_empty() {
        return Ok(explicit);
    }
    let configured = distinct_tables(&config.tables);
    if !configured.is_empty() {
        return Ok(configured);
    }
    if let Some(schema_path) = args.schema.as_ref().or(config.schema.as_ref()) {
        let snapshot = SchemaSnapshot::load(schema_path)?;
        info!(
            "Discovered {} table(s) from {schema_path:?}",
            snapshot.tables.len()
        );
        return Ok(snapshot.table_names());
    }
    let names = sampler
        .table_names()
        .with_context(|| format!("Listing samples in {:?}", sampler.root()))?;
    info!(
        "Discovered {} table(s) in {:?}",
        names.len(),
        sampler.root()
    );
    Ok(names)
}

fn handle_audit(args: &AuditArgs) -> Result<ExitCode> {
    let config = load_config(args)?;
    let Some(samples_dir) = args.samples.clone().or_else(|| config.samples_dir.clone()) else {
        bail!("No samples directory given; pass --samples or set samples_dir in the config");
    };
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let sampler = DirectorySampler::new(samples_dir)
        .with_delimiter(args.delimiter)
        .with_encoding(encoding);

    let tables = resolve_tables(args, &config, &sampler)?;
    if tables.is_empty() {
        bail!("No tables to audit in {:?}", sampler.root());
    }
    let max_records = args
        .max_records
        .or(config.max_records)
        .unwrap_or(DEFAULT_MAX_RECORDS);
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.into());
    debug!("Auditing {tables:?} with up to {max_records} record(s) each");

    let outcome = audit::audit_base(&sampler, &tables, max_records);
    print!("{}", plan::render_plan(&outcome.classifications));
    report::export(&output_dir, &outcome.classifications)?;
    info!(
        "Audit complete: {} computed field(s) across {} table(s), {} skipped",
        outcome.computed_field_count(),
        outcome.classifications.len(),
        outcome.issues.len()
    );
    Ok(ExitCode::SUCCESS)
}

fn handle_plan(args: &PlanArgs) -> Result<ExitCode> {
    let base = report::load_classification(&args.report)?;
    print!("{}", plan::render_plan(&base));
    if let Some(sql_path) = &args.sql {
        io_utils::write_text(sql_path, &plan::render_sql(&base))?;
        info!("SQL template saved: {sql_path:?}");
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_compare(args: &CompareArgs) -> Result<ExitCode> {
    let old = SchemaSnapshot::load(&args.old)?;
    let new = SchemaSnapshot::load(&args.new)?;
    let changes = schema_diff::compare(&old, &new);
    if changes.is_empty() {
        println!("No schema changes detected");
        return Ok(ExitCode::SUCCESS);
    }
    for change in &changes {
        println!("{change}");
    }
    Ok(ExitCode::from(1))
}

fn handle_tables(args: &TablesArgs) -> Result<ExitCode> {
    let snapshot = SchemaSnapshot::load(&args.schema)?;
    if args.detailed {
        print!("{}", tables::render_detailed(&snapshot));
    } else {
        print!("{}", tables::render_listing(&snapshot));
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_dashboard(args: &DashboardArgs) -> Result<ExitCode> {
    let base = dashboard::load_report(&args.report)?;
    let history = dashboard::load_sync_history(args.sync_history.as_deref())?;
    let schema_changes = match (&args.old_schema, &args.new_schema) {
        (Some(old), Some(new)) => {
            let old = SchemaSnapshot::load(old)?;
            let new = SchemaSnapshot::load(new)?;
            schema_diff::compare(&old, &new)
                .iter()
                .map(|change| change.to_string().trim().to_string())
                .collect()
        }
        _ => Vec::new(),
    };
    let data = dashboard::build(&base, history, schema_changes, Utc::now());
    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Creating output directory {parent:?}"))?;
    }
    io_utils::write_json_pretty(&args.output, &data)?;
    info!(
        "Exported dashboard data to {:?}: {} formula(s) across {} table(s), {} sync run(s)",
        args.output,
        data.stats.formula_count,
        data.stats.total_tables,
        data.sync_history.len()
    );
    Ok(ExitCode::SUCCESS)
}
