use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Detect formula fields in sampled table data and draft PostgreSQL conversions",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify fields of sampled tables and write the report, plan and SQL
    Audit(AuditArgs),
    /// Re-render the conversion plan from an existing report
    Plan(PlanArgs),
    /// Compare two schema snapshots; exits 1 when anything changed
    Compare(CompareArgs),
    /// List the tables (and optionally fields) of a schema snapshot
    Tables(TablesArgs),
    /// Export dashboard data from an existing report
    Dashboard(DashboardArgs),
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Directory holding one <table>.json or <table>.csv sample per table
    #[arg(short = 's', long = "samples")]
    pub samples: Option<PathBuf>,
    /// Tables to audit (repeatable or comma-separated)
    #[arg(short = 't', long = "table", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub tables: Vec<String>,
    /// Schema snapshot used to discover table names
    #[arg(long)]
    pub schema: Option<PathBuf>,
    /// Maximum records sampled per table (0 means all) [default: 50]
    #[arg(long = "max-records")]
    pub max_records: Option<usize>,
    /// Directory receiving formulas.json, conversion_plan.txt and formula_conversion.sql
    /// [default: formula-audit-output]
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// YAML configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
    /// CSV delimiter character for CSV samples (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of CSV samples (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Classification report written by `audit`
    #[arg(short = 'r', long = "report")]
    pub report: PathBuf,
    /// Also write the SQL template to this path
    #[arg(long)]
    pub sql: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Previous schema snapshot
    pub old: PathBuf,
    /// Current schema snapshot
    pub new: PathBuf,
}

#[derive(Debug, Args)]
pub struct TablesArgs {
    /// Schema snapshot to list
    #[arg(long)]
    pub schema: PathBuf,
    /// Show every field with its type and computed/linked marker
    #[arg(long)]
    pub detailed: bool,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Classification report written by `audit` (missing file is tolerated)
    #[arg(short = 'r', long = "report", default_value = "formula-audit-output/formulas.json")]
    pub report: PathBuf,
    /// JSON array of sync runs, most recent first
    #[arg(long = "sync-history")]
    pub sync_history: Option<PathBuf>,
    /// Previous schema snapshot for the schema_changes section
    #[arg(long = "old-schema", requires = "new_schema")]
    pub old_schema: Option<PathBuf>,
    /// Current schema snapshot for the schema_changes section
    #[arg(long = "new-schema", requires = "old_schema")]
    pub new_schema: Option<PathBuf>,
    /// Destination JSON file
    #[arg(short = 'o', long, default_value = "./dashboard-data.json")]
    pub output: PathBuf,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
