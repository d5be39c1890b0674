//! Rule-based detection of computed fields from sampled values.
//!
//! Classification never sees formula definitions. It looks at the first
//! observed value of a field (and, for counts, at every observation) together
//! with the field name, and walks [`RULES`] in order; the first rule whose
//! predicate holds decides the [`Category`]. Falling through every rule yields
//! [`Category::RegularField`].
//!
//! The result is a hint for a reviewer. Names such as "Total Count" satisfy
//! both rollup rules and resolve to [`Category::RollupCount`] purely because
//! that rule is listed first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

const RECORD_ID_PREFIX: &str = "rec";
const COUNT_TOKENS: &[&str] = &["count", "total", "number", "qty", "quantity"];
const SUM_TOKENS: &[&str] = &["total", "sum", "revenue", "amount", "avg", "average"];
const DATE_DIFF_NAMES: &[&str] = &["nights", "days", "duration", "length"];
const CONCAT_SEPARATORS: &[&str] = &[" - ", " | "];
const STATUS_GLYPHS: &[&str] = &["✅", "❌", "⏳", "🔴", "🟢", "🟡"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Unknown,
    LinkedRecord,
    RollupCount,
    RollupSum,
    DateDiff,
    Concatenation,
    ConditionalLabel,
    BooleanFormula,
    RegularField,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Unknown => "unknown",
            Category::LinkedRecord => "linked_record",
            Category::RollupCount => "rollup_count",
            Category::RollupSum => "rollup_sum",
            Category::DateDiff => "date_diff",
            Category::Concatenation => "concatenation",
            Category::ConditionalLabel => "conditional_label",
            Category::BooleanFormula => "boolean_formula",
            Category::RegularField => "regular_field",
        }
    }

    /// Linked records are relationships, not derived values.
    pub fn is_computed(self) -> bool {
        !matches!(
            self,
            Category::Unknown | Category::LinkedRecord | Category::RegularField
        )
    }

    pub fn rationale(self) -> &'static str {
        match self {
            Category::LinkedRecord => "Linked records (many-to-many)",
            Category::RollupCount => "COUNT of linked records",
            Category::RollupSum => "SUM/AVG of linked records",
            Category::DateDiff => "DATETIME_DIFF calculation",
            Category::Concatenation => "String concatenation",
            Category::ConditionalLabel => "IF/SWITCH conditional",
            Category::BooleanFormula => "Boolean calculation",
            Category::Unknown | Category::RegularField => "",
        }
    }

    pub fn target_strategy(self) -> Option<TargetStrategy> {
        match self {
            Category::RollupCount => Some(TargetStrategy::ViewWithCount),
            Category::RollupSum => Some(TargetStrategy::ViewWithAggregate),
            Category::DateDiff
            | Category::Concatenation
            | Category::ConditionalLabel
            | Category::BooleanFormula => Some(TargetStrategy::GeneratedColumn),
            Category::Unknown | Category::LinkedRecord | Category::RegularField => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target-schema construct that replaces a computed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStrategy {
    ViewWithCount,
    ViewWithAggregate,
    GeneratedColumn,
}

impl TargetStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetStrategy::ViewWithCount => "view_with_count",
            TargetStrategy::ViewWithAggregate => "view_with_aggregate",
            TargetStrategy::GeneratedColumn => "generated_column",
        }
    }
}

impl fmt::Display for TargetStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_computed: bool,
    pub category: Category,
    pub rationale: String,
    pub sample_value: Option<String>,
    pub target_strategy: Option<TargetStrategy>,
}

impl Verdict {
    fn from_category(category: Category, sample_value: Option<String>) -> Self {
        Self {
            is_computed: category.is_computed(),
            category,
            rationale: category.rationale().to_string(),
            sample_value,
            target_strategy: category.target_strategy(),
        }
    }
}

/// What a rule predicate gets to look at.
pub struct Observation<'a> {
    pub name: String,
    pub first: &'a FieldValue,
    pub values: &'a [FieldValue],
}

impl Observation<'_> {
    fn name_contains_any(&self, tokens: &[&str]) -> bool {
        tokens.iter().any(|token| self.name.contains(token))
    }

    fn first_str_contains_any(&self, needles: &[&str]) -> bool {
        self.first
            .as_str()
            .is_some_and(|s| needles.iter().any(|needle| s.contains(needle)))
    }
}

pub struct Rule {
    pub category: Category,
    pub matches: fn(&Observation<'_>) -> bool,
}

/// Detection rules in precedence order.
pub const RULES: &[Rule] = &[
    Rule {
        category: Category::LinkedRecord,
        matches: is_linked_record,
    },
    Rule {
        category: Category::RollupCount,
        matches: is_rollup_count,
    },
    Rule {
        category: Category::RollupSum,
        matches: is_rollup_sum,
    },
    Rule {
        category: Category::DateDiff,
        matches: is_date_diff,
    },
    Rule {
        category: Category::Concatenation,
        matches: is_concatenation,
    },
    Rule {
        category: Category::ConditionalLabel,
        matches: is_conditional_label,
    },
    Rule {
        category: Category::BooleanFormula,
        matches: is_boolean_formula,
    },
];

fn is_linked_record(obs: &Observation<'_>) -> bool {
    match obs.first {
        FieldValue::List(items) => items
            .first()
            .is_some_and(|item| item.starts_with(RECORD_ID_PREFIX)),
        _ => false,
    }
}

fn is_rollup_count(obs: &Observation<'_>) -> bool {
    obs.first.is_numeric()
        && obs
            .values
            .iter()
            .all(|value| matches!(value, FieldValue::Integer(_)))
        && obs.name_contains_any(COUNT_TOKENS)
}

fn is_rollup_sum(obs: &Observation<'_>) -> bool {
    obs.first.is_numeric() && obs.name_contains_any(SUM_TOKENS)
}

fn is_date_diff(obs: &Observation<'_>) -> bool {
    DATE_DIFF_NAMES.contains(&obs.name.as_str())
}

fn is_concatenation(obs: &Observation<'_>) -> bool {
    obs.first_str_contains_any(CONCAT_SEPARATORS)
}

fn is_conditional_label(obs: &Observation<'_>) -> bool {
    obs.first_str_contains_any(STATUS_GLYPHS)
}

fn is_boolean_formula(obs: &Observation<'_>) -> bool {
    matches!(obs.first, FieldValue::Boolean(_))
}

/// Categories in the order their rules are tried, default last.
pub fn rule_order() -> Vec<Category> {
    RULES
        .iter()
        .map(|rule| rule.category)
        .chain(std::iter::once(Category::RegularField))
        .collect()
}

/// Classifies one field from its non-null observations.
pub fn classify(field_name: &str, values: &[FieldValue]) -> Verdict {
    let Some(first) = values.first() else {
        return Verdict::from_category(Category::Unknown, None);
    };
    let observation = Observation {
        name: field_name.to_lowercase(),
        first,
        values,
    };
    let category = RULES
        .iter()
        .find(|rule| (rule.matches)(&observation))
        .map_or(Category::RegularField, |rule| rule.category);
    Verdict::from_category(category, Some(first.preview()))
}
