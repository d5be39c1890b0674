//! Conversion planning: PostgreSQL snippets for classified fields, plus the
//! human-readable plan and SQL documents built from a whole audit.
//!
//! Templates are plain data keyed by [`Category`]. Adding a category with a
//! conversion means adding one [`Template`] entry; nothing else dispatches on
//! categories here.

use std::{collections::BTreeMap, fmt::Write as _};

use itertools::Itertools;

use crate::{
    audit::BaseClassification,
    classify::{Category, TargetStrategy, Verdict},
};

const RULE_WIDTH: usize = 80;
const SQL_RULE_WIDTH: usize = 60;
const MANUAL_REVIEW: &str = "manual_review";

pub struct Template {
    pub category: Category,
    pub strategy: TargetStrategy,
    /// SQL text with `{table}` and `{field}` placeholders.
    pub body: &'static str,
}

pub const TEMPLATES: &[Template] = &[
    Template {
        category: Category::DateDiff,
        strategy: TargetStrategy::GeneratedColumn,
        body: "ALTER TABLE {table}
     ADD COLUMN {field} integer
     GENERATED ALWAYS AS (
       EXTRACT(DAY FROM check_out - check_in)
     ) STORED;",
    },
    Template {
        category: Category::RollupCount,
        strategy: TargetStrategy::ViewWithCount,
        body: "CREATE VIEW {table}_with_metrics AS
   SELECT
     t.*,
     COUNT(linked.id) as {field}
   FROM {table} t
   LEFT JOIN linked_table linked ON linked.{table}_id = t.id
   GROUP BY t.id;",
    },
    Template {
        category: Category::RollupSum,
        strategy: TargetStrategy::ViewWithAggregate,
        body: "CREATE VIEW {table}_with_metrics AS
   SELECT
     t.*,
     COALESCE(SUM(linked.amount), 0) as {field}
   FROM {table} t
   LEFT JOIN linked_table linked ON linked.{table}_id = t.id
   GROUP BY t.id;",
    },
    Template {
        category: Category::ConditionalLabel,
        strategy: TargetStrategy::GeneratedColumn,
        body: "ALTER TABLE {table}
     ADD COLUMN {field} text
     GENERATED ALWAYS AS (
       CASE
         WHEN status = 'confirmed' THEN '✅ Confirmed'
         WHEN status = 'pending' THEN '⏳ Pending'
         ELSE '❌ Other'
       END
     ) STORED;",
    },
    Template {
        category: Category::Concatenation,
        strategy: TargetStrategy::GeneratedColumn,
        body: "ALTER TABLE {table}
     ADD COLUMN {field} text
     GENERATED ALWAYS AS (
       field1 || ' - ' || field2
     ) STORED;",
    },
    Template {
        category: Category::BooleanFormula,
        strategy: TargetStrategy::GeneratedColumn,
        body: "ALTER TABLE {table}
     ADD COLUMN {field} boolean
     GENERATED ALWAYS AS (
       field1 IS NOT NULL
     ) STORED;",
    },
];

pub fn template_for(category: Category) -> Option<&'static Template> {
    TEMPLATES
        .iter()
        .find(|template| template.category == category)
}

/// Target table identifier: the source name lower-cased.
pub fn target_table(name: &str) -> String {
    name.to_lowercase()
}

/// Target column identifier: lower-cased, spaces to `_`, `#` to `num`.
pub fn target_field(name: &str) -> String {
    name.to_lowercase().replace(' ', "_").replace('#', "num")
}

/// Substitutes placeholders in one left-to-right pass, so text coming from
/// `table` or `field` is never itself expanded.
pub fn render(body: &str, table: &str, field: &str) -> String {
    let mut out = String::with_capacity(body.len() + table.len() + field.len());
    let mut rest = body;
    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("{table}") {
            out.push_str(table);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{field}") {
            out.push_str(field);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// SQL suggestion for one verdict.
///
/// `None` means the field needs manual review: no strategy was assigned, the
/// category has no template, or the recorded strategy is not the one the
/// category's template implements.
pub fn snippet(table: &str, field: &str, verdict: &Verdict) -> Option<String> {
    let strategy = verdict.target_strategy?;
    let template = template_for(verdict.category)?;
    if template.strategy != strategy {
        return None;
    }
    Some(render(
        template.body,
        &target_table(table),
        &target_field(field),
    ))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    /// Category name to field count, sorted by name.
    pub by_category: BTreeMap<&'static str, usize>,
}

impl Summary {
    pub fn from_base(base: &BaseClassification) -> Self {
        let by_category = base
            .values()
            .flat_map(|fields| fields.values())
            .map(|verdict| verdict.category.as_str())
            .counts()
            .into_iter()
            .collect::<BTreeMap<_, _>>();
        Self {
            total: by_category.values().sum(),
            by_category,
        }
    }
}

fn push_banner(out: &mut String, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{rule}");
}

/// The plain-text conversion plan.
pub fn render_plan(base: &BaseClassification) -> String {
    let summary = Summary::from_base(base);
    let mut out = String::new();

    push_banner(&mut out, "FORMULA CONVERSION PLAN");
    let _ = writeln!(out);
    let _ = writeln!(out, "SUMMARY:");
    let _ = writeln!(out, "   Total computed fields: {}", summary.total);
    for (category, count) in &summary.by_category {
        let _ = writeln!(out, "   - {category}: {count}");
    }

    for (table, fields) in base {
        if fields.is_empty() {
            continue;
        }
        let _ = writeln!(out);
        push_banner(&mut out, &format!("TABLE: {table}"));

        for (field, verdict) in fields {
            let _ = writeln!(out);
            let _ = writeln!(out, "* {field}");
            let _ = writeln!(out, "   Type: {}", verdict.category);
            let _ = writeln!(out, "   Pattern: {}", verdict.rationale);
            let _ = writeln!(
                out,
                "   Sample: {}",
                verdict.sample_value.as_deref().unwrap_or("(none)")
            );
            let strategy = verdict
                .target_strategy
                .map_or(MANUAL_REVIEW, TargetStrategy::as_str);
            let _ = writeln!(out, "   Strategy: {strategy}");

            if let Some(sql) = snippet(table, field, verdict) {
                let _ = writeln!(out);
                let _ = writeln!(out, "   SQL Suggestion:");
                for line in sql.lines() {
                    let _ = writeln!(out, "   {line}");
                }
            } else {
                let _ = writeln!(out, "   Note: no template, {MANUAL_REVIEW} required");
            }
        }
    }

    let _ = writeln!(out);
    push_banner(&mut out, "ACTION ITEMS:");
    let _ = writeln!(out);
    for (idx, item) in [
        "REVIEW: Manually verify detected formulas in the source base",
        "MIGRATE: Store computed values during initial migration",
        "IMPLEMENT: Add PostgreSQL generated columns/views",
        "VERIFY: Compare source and PostgreSQL results",
        "CLEANUP: Remove snapshot fields once verified",
    ]
    .iter()
    .enumerate()
    {
        let _ = writeln!(out, "{}. {item}", idx + 1);
    }
    out
}

/// Every available snippet grouped by table, each introduced by a comment
/// naming its source field.
pub fn render_sql(base: &BaseClassification) -> String {
    let mut sections = vec![
        "-- Formula conversion SQL".to_string(),
        "-- Generated automatically - REVIEW BEFORE RUNNING".to_string(),
    ];
    for (table, fields) in base {
        sections.push(String::new());
        sections.push(format!("-- {table}"));
        sections.push("-".repeat(SQL_RULE_WIDTH));
        for (field, verdict) in fields {
            if let Some(sql) = snippet(table, field, verdict) {
                sections.push(String::new());
                sections.push(format!("-- {field}"));
                sections.push(sql);
            }
        }
    }
    let mut document = sections.into_iter().join("\n");
    document.push('\n');
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::value::FieldValue;

    #[test]
    fn target_field_replaces_spaces_and_hash() {
        assert_eq!(target_field("Room #"), "room_num");
        assert_eq!(target_field("Guest Count"), "guest_count");
        assert_eq!(target_table("Bookings"), "bookings");
    }

    #[test]
    fn render_does_not_expand_substituted_text() {
        let rendered = render("{table}.{field} {other}", "{field}", "x");
        assert_eq!(rendered, "{field}.x {other}");
    }

    #[test]
    fn every_template_matches_its_category_strategy() {
        for template in TEMPLATES {
            assert_eq!(
                template.category.target_strategy(),
                Some(template.strategy),
                "{}",
                template.category
            );
        }
    }

    #[test]
    fn mismatched_strategy_needs_manual_review() {
        let mut verdict = classify("Nights", &[FieldValue::Integer(2)]);
        verdict.target_strategy = Some(TargetStrategy::ViewWithCount);
        assert!(snippet("Bookings", "Nights", &verdict).is_none());
        verdict.target_strategy = None;
        assert!(snippet("Bookings", "Nights", &verdict).is_none());
    }
}
