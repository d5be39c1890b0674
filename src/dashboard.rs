//! Reshapes a persisted classification report into a flat document for the
//! monitoring dashboard.

use std::{collections::BTreeSet, path::Path};

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    audit::BaseClassification,
    io_utils,
    value::{PREVIEW_CHARS, truncate_chars},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardFormula {
    pub table: String,
    pub field: String,
    #[serde(rename = "type")]
    pub category: String,
    pub pattern: String,
    pub sample: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRun {
    pub date: String,
    pub records: u64,
    pub mode: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_tables: usize,
    pub formula_count: usize,
    pub last_sync_records: u64,
    pub last_sync_date: Option<String>,
    pub sync_status: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub formulas: Vec<DashboardFormula>,
    pub sync_history: Vec<SyncRun>,
    pub schema_changes: Vec<String>,
    pub last_updated: String,
}

pub fn flatten(base: &BaseClassification) -> Vec<DashboardFormula> {
    base.iter()
        .flat_map(|(table, fields)| {
            fields.iter().map(move |(field, verdict)| DashboardFormula {
                table: table.clone(),
                field: field.clone(),
                category: verdict.category.to_string(),
                pattern: verdict.rationale.clone(),
                sample: truncate_chars(
                    verdict.sample_value.as_deref().unwrap_or_default(),
                    PREVIEW_CHARS,
                ),
            })
        })
        .collect()
}

/// Builds the dashboard document. The most recent sync run is the first
/// entry of `sync_history`.
pub fn build(
    base: &BaseClassification,
    sync_history: Vec<SyncRun>,
    schema_changes: Vec<String>,
    now: DateTime<Utc>,
) -> DashboardData {
    let formulas = flatten(base);
    let total_tables = formulas
        .iter()
        .map(|formula| formula.table.as_str())
        .collect::<BTreeSet<_>>()
        .len();
    let last_updated = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    let latest = sync_history.first();
    let stats = DashboardStats {
        total_tables,
        formula_count: formulas.len(),
        last_sync_records: latest.map_or(0, |run| run.records),
        last_sync_date: latest.map(|run| run.date.clone()),
        sync_status: latest.map_or_else(|| "unknown".to_string(), |run| run.status.clone()),
        last_updated: last_updated.clone(),
    };
    DashboardData {
        stats,
        formulas,
        sync_history,
        schema_changes,
        last_updated,
    }
}

/// Loads the classification report, treating a missing file as empty.
pub fn load_report(path: &Path) -> Result<BaseClassification> {
    match io_utils::read_json_if_exists(path)? {
        Some(base) => Ok(base),
        None => {
            warn!("No audit data found at {path:?}");
            Ok(BaseClassification::new())
        }
    }
}

pub fn load_sync_history(path: Option<&Path>) -> Result<Vec<SyncRun>> {
    match path {
        Some(path) => io_utils::read_json(path),
        None => Ok(Vec::new()),
    }
}
