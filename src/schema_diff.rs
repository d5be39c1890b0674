//! Identifier-keyed comparison of two schema snapshots.

use std::fmt;

use indexmap::IndexMap;

use crate::snapshot::{FieldSchema, SchemaSnapshot, TableSchema};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaChange {
    TableAdded {
        table: String,
    },
    TableRemoved {
        table: String,
    },
    FieldAdded {
        table: String,
        field: String,
        field_type: String,
    },
    FieldRemoved {
        table: String,
        field: String,
    },
    FieldTypeChanged {
        table: String,
        field: String,
        from: String,
        to: String,
    },
}

impl fmt::Display for SchemaChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaChange::TableAdded { table } => write!(f, "+ NEW TABLE: {table}"),
            SchemaChange::TableRemoved { table } => write!(f, "- REMOVED TABLE: {table}"),
            SchemaChange::FieldAdded {
                table,
                field,
                field_type,
            } => write!(f, "   + {table}: New field '{field}' ({field_type})"),
            SchemaChange::FieldRemoved { table, field } => {
                write!(f, "   - {table}: Removed field '{field}'")
            }
            SchemaChange::FieldTypeChanged {
                table,
                field,
                from,
                to,
            } => write!(f, "   ~ {table}: '{field}' type changed: {from} -> {to}"),
        }
    }
}

fn tables_by_id(snapshot: &SchemaSnapshot) -> IndexMap<&str, &TableSchema> {
    snapshot
        .tables
        .iter()
        .map(|table| (table.id.as_str(), table))
        .collect()
}

fn fields_by_id(table: &TableSchema) -> IndexMap<&str, &FieldSchema> {
    table
        .fields
        .iter()
        .map(|field| (field.id.as_str(), field))
        .collect()
}

/// Changes from `old` to `new`: added tables, removed tables, then per
/// surviving table (in `new` order) added fields, removed fields and type
/// changes. Tables and fields are matched by id, so renames are not changes.
pub fn compare(old: &SchemaSnapshot, new: &SchemaSnapshot) -> Vec<SchemaChange> {
    let old_tables = tables_by_id(old);
    let new_tables = tables_by_id(new);
    let mut changes = Vec::new();

    for (id, table) in &new_tables {
        if !old_tables.contains_key(id) {
            changes.push(SchemaChange::TableAdded {
                table: table.name.clone(),
            });
        }
    }
    for (id, table) in &old_tables {
        if !new_tables.contains_key(id) {
            changes.push(SchemaChange::TableRemoved {
                table: table.name.clone(),
            });
        }
    }

    for (id, new_table) in &new_tables {
        let Some(old_table) = old_tables.get(id) else {
            continue;
        };
        changes.extend(compare_fields(old_table, new_table));
    }
    changes
}

fn compare_fields(old: &TableSchema, new: &TableSchema) -> Vec<SchemaChange> {
    let old_fields = fields_by_id(old);
    let new_fields = fields_by_id(new);
    let table = &new.name;
    let mut changes = Vec::new();

    for (id, field) in &new_fields {
        if !old_fields.contains_key(id) {
            changes.push(SchemaChange::FieldAdded {
                table: table.clone(),
                field: field.name.clone(),
                field_type: field.field_type.clone(),
            });
        }
    }
    for (id, field) in &old_fields {
        if !new_fields.contains_key(id) {
            changes.push(SchemaChange::FieldRemoved {
                table: table.clone(),
                field: field.name.clone(),
            });
        }
    }
    for (id, new_field) in &new_fields {
        if let Some(old_field) = old_fields.get(id)
            && old_field.field_type != new_field.field_type
        {
            changes.push(SchemaChange::FieldTypeChanged {
                table: table.clone(),
                field: new_field.name.clone(),
                from: old_field.field_type.clone(),
                to: new_field.field_type.clone(),
            });
        }
    }
    changes
}
