//! Listing of the tables and fields in a schema snapshot.

use std::fmt::Write as _;

use crate::{
    snapshot::{FieldSchema, SchemaSnapshot},
    table::{Align, render_table},
    value::truncate_chars,
};

const FORMULA_PREVIEW_CHARS: usize = 100;

/// Marker shown next to field types that are computed or linked.
pub fn field_marker(field_type: &str) -> Option<&'static str> {
    match field_type {
        "formula" => Some("FORMULA"),
        "rollup" => Some("ROLLUP"),
        "lookup" => Some("LOOKUP"),
        "multipleRecordLinks" => Some("LINKED"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub name: String,
    pub id: String,
    pub field_count: usize,
}

/// Tables of `snapshot` in snapshot order.
pub fn list(snapshot: &SchemaSnapshot) -> Vec<TableSummary> {
    snapshot
        .tables
        .iter()
        .map(|table| TableSummary {
            name: table.name.clone(),
            id: table.id.clone(),
            field_count: table.fields.len(),
        })
        .collect()
}

/// One row per table: position, name, field count and id.
pub fn render_listing(snapshot: &SchemaSnapshot) -> String {
    let headers = ["#", "table", "fields", "id"]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let summaries = list(snapshot);
    let rows = summaries
        .iter()
        .enumerate()
        .map(|(idx, summary)| {
            vec![
                (idx + 1).to_string(),
                summary.name.clone(),
                summary.field_count.to_string(),
                summary.id.clone(),
            ]
        })
        .collect::<Vec<_>>();
    let mut out = format!("Found {} table(s)\n\n", summaries.len());
    out.push_str(&render_table(
        &headers,
        &rows,
        &[Align::Right, Align::Left, Align::Right, Align::Left],
    ));
    out
}

/// Every table with its fields, types and markers, plus formula previews
/// where the snapshot carries them.
pub fn render_detailed(snapshot: &SchemaSnapshot) -> String {
    let mut out = String::new();
    for table in &snapshot.tables {
        let _ = writeln!(out, "{} (ID: {})", table.name, table.id);
        if let Some(description) = table.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "Description: {description}");
        }
        let _ = writeln!(out, "Fields ({}):", table.fields.len());
        let headers = vec!["field".to_string(), "type".to_string(), "kind".to_string()];
        let rows = table.fields.iter().map(field_row).collect::<Vec<_>>();
        out.push_str(&render_table(&headers, &rows, &[]));
        for field in &table.fields {
            if field.field_type == "formula"
                && let Some(formula) = field.formula()
            {
                let _ = writeln!(
                    out,
                    "  {} = {}...",
                    field.name,
                    truncate_chars(formula, FORMULA_PREVIEW_CHARS)
                );
            }
        }
        let _ = writeln!(out);
    }
    out
}

fn field_row(field: &FieldSchema) -> Vec<String> {
    vec![
        field.name.clone(),
        field.field_type.clone(),
        field_marker(&field.field_type).unwrap_or("").to_string(),
    ]
}
