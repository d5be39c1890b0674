mod common;

use formula_audit::schema_diff::{SchemaChange, compare};
use formula_audit::snapshot::SchemaSnapshot;

use common::fixture_path;

fn load(name: &str) -> SchemaSnapshot {
    SchemaSnapshot::load(&fixture_path(name)).expect("load snapshot")
}

#[test]
fn identical_snapshots_have_no_changes() {
    let snapshot = load("schema_new.json");
    assert!(compare(&snapshot, &snapshot).is_empty());
}

#[test]
fn changes_are_reported_tables_first_then_fields() {
    let rendered = compare(&load("schema_old.json"), &load("schema_new.json"))
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    assert_eq!(
        rendered,
        vec![
            "+ NEW TABLE: Guests",
            "- REMOVED TABLE: Legacy",
            "   + Bookings: New field 'Guests' (multipleRecordLinks)",
            "   + Bookings: New field 'Guest Count' (rollup)",
            "   - Bookings: Removed field 'Notes'",
            "   ~ Bookings: 'Nights' type changed: number -> formula",
        ]
    );
}

#[test]
fn renamed_table_is_not_a_change() {
    let old = load("schema_new.json");
    let mut new = old.clone();
    new.tables[0].name = "Stays".to_string();
    assert!(compare(&old, &new).is_empty());
}

#[test]
fn reversed_comparison_swaps_additions_and_removals() {
    let changes = compare(&load("schema_new.json"), &load("schema_old.json"));
    assert!(changes.contains(&SchemaChange::TableAdded {
        table: "Legacy".to_string()
    }));
    assert!(changes.contains(&SchemaChange::TableRemoved {
        table: "Guests".to_string()
    }));
    assert!(changes.contains(&SchemaChange::FieldTypeChanged {
        table: "Bookings".to_string(),
        field: "Nights".to_string(),
        from: "formula".to_string(),
        to: "number".to_string(),
    }));
}
