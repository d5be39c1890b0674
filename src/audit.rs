use indexmap::IndexMap;
use log::{info, warn};

use crate::{
    classify::{Verdict, classify},
    sample::{FieldSamples, collect_field_samples},
    sampler::{SampleError, Sampler},
};

/// Default number of records sampled per table.
pub const DEFAULT_MAX_RECORDS: usize = 50;

/// Computed fields of one table, keyed by field name in sample order.
pub type TableClassification = IndexMap<String, Verdict>;

/// Table name to its computed fields, in audit order.
pub type BaseClassification = IndexMap<String, TableClassification>;

/// Why a table contributed nothing to the audit.
#[derive(Debug)]
pub enum TableIssue {
    Fault { table: String, error: SampleError },
    Empty { table: String },
}

impl TableIssue {
    pub fn table(&self) -> &str {
        match self {
            TableIssue::Fault { table, .. } | TableIssue::Empty { table } => table,
        }
    }
}

#[derive(Debug, Default)]
pub struct AuditOutcome {
    pub classifications: BaseClassification,
    pub issues: Vec<TableIssue>,
}

impl AuditOutcome {
    pub fn computed_field_count(&self) -> usize {
        self.classifications.values().map(|fields| fields.len()).sum()
    }

    fn record(&mut self, table: &str, result: TableResult) {
        let fields = match result {
            TableResult::Classified(fields) => fields,
            TableResult::Skipped(issue) => {
                self.issues.push(issue);
                TableClassification::new()
            }
        };
        self.classifications.insert(table.to_string(), fields);
    }
}

enum TableResult {
    Classified(TableClassification),
    Skipped(TableIssue),
}

/// Classifies every sampled field of `table`, keeping computed ones only.
pub fn audit_table(table: &str, samples: &FieldSamples) -> TableClassification {
    let mut computed = TableClassification::new();
    for (name, sample) in samples {
        let verdict = classify(name, &sample.values);
        if !verdict.is_computed {
            continue;
        }
        info!(
            "[{table}] {name:30} → {:20} | {}",
            verdict.category.as_str(),
            verdict.rationale
        );
        computed.insert(name.clone(), verdict);
    }
    computed
}

/// Samples and audits each table in turn.
///
/// A sampler fault or an empty sample leaves that table with no computed
/// fields and an entry in [`AuditOutcome::issues`]; the remaining tables are
/// still audited.
pub fn audit_base<S>(sampler: &S, tables: &[String], max_records: usize) -> AuditOutcome
where
    S: Sampler + ?Sized,
{
    tables
        .iter()
        .fold(AuditOutcome::default(), |mut outcome, table| {
            info!("Analyzing table: {table}");
            let result = audit_sampled_table(sampler, table, max_records);
            outcome.record(table, result);
            outcome
        })
}

fn audit_sampled_table<S>(sampler: &S, table: &str, max_records: usize) -> TableResult
where
    S: Sampler + ?Sized,
{
    let records = match sampler.fetch_sample(table, max_records) {
        Ok(records) => records,
        Err(error) => {
            warn!("Error fetching records for '{table}': {error}");
            return TableResult::Skipped(TableIssue::Fault {
                table: table.to_string(),
                error,
            });
        }
    };
    if records.is_empty() {
        warn!("No records found in '{table}'");
        return TableResult::Skipped(TableIssue::Empty {
            table: table.to_string(),
        });
    }
    let samples = collect_field_samples(&records);
    let computed = audit_table(table, &samples);
    if computed.is_empty() {
        info!("No computed fields detected in '{table}'");
    } else {
        info!("Found {} computed field(s) in '{table}'", computed.len());
    }
    TableResult::Classified(computed)
}
