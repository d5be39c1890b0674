use formula_audit::classify::{Category, TargetStrategy, classify};
use formula_audit::value::FieldValue;

fn ints(values: &[i64]) -> Vec<FieldValue> {
    values.iter().copied().map(FieldValue::Integer).collect()
}

fn text(value: &str) -> Vec<FieldValue> {
    vec![FieldValue::String(value.to_string())]
}

#[test]
fn nights_is_a_generated_date_difference() {
    let verdict = classify("Nights", &ints(&[3, 5, 2]));
    assert!(verdict.is_computed);
    assert_eq!(verdict.category, Category::DateDiff);
    assert_eq!(verdict.target_strategy, Some(TargetStrategy::GeneratedColumn));
    assert_eq!(verdict.rationale, "DATETIME_DIFF calculation");
    assert_eq!(verdict.sample_value.as_deref(), Some("3"));
}

#[test]
fn booking_fields_resolve_to_expected_categories() {
    assert_eq!(
        classify("Guest Count", &ints(&[1, 2, 4])).category,
        Category::RollupCount
    );
    assert_eq!(
        classify("Guest Summary", &text("Jane - Doe")).category,
        Category::Concatenation
    );
    assert_eq!(
        classify("Status", &text("✅ Confirmed")).category,
        Category::ConditionalLabel
    );
    let notes = classify("Notes", &text("hello"));
    assert_eq!(notes.category, Category::RegularField);
    assert!(!notes.is_computed);
    assert!(notes.target_strategy.is_none());
}

#[test]
fn linked_records_are_relationships_not_formulas() {
    let verdict = classify(
        "Guests",
        &[FieldValue::List(vec!["recG000000000001".to_string()])],
    );
    assert_eq!(verdict.category, Category::LinkedRecord);
    assert!(!verdict.is_computed);
    assert!(verdict.target_strategy.is_none());
}

#[test]
fn record_links_win_over_name_based_rules() {
    let links = vec![FieldValue::List(vec!["recG000000000001".to_string()])];
    for name in ["Nights", "Guest Count", "Total Revenue", "Duration"] {
        assert_eq!(
            classify(name, &links).category,
            Category::LinkedRecord,
            "{name}"
        );
    }
}

#[test]
fn mixed_numeric_count_falls_through_to_sum_or_default() {
    let mixed = vec![FieldValue::Integer(3), FieldValue::Float(2.5)];
    assert_eq!(classify("Total Nights", &mixed).category, Category::RollupSum);
    assert_eq!(classify("Visit Count", &mixed).category, Category::RegularField);
}

#[test]
fn total_count_is_ambiguous_and_resolves_by_rule_order() {
    // Both rollup rules accept this name; the count rule is tried first.
    let verdict = classify("Total Count", &ints(&[4, 7]));
    assert_eq!(verdict.category, Category::RollupCount);
    assert_eq!(verdict.target_strategy, Some(TargetStrategy::ViewWithCount));
}

#[test]
fn float_revenue_reads_as_aggregate() {
    let verdict = classify("Revenue", &[FieldValue::Float(350.5)]);
    assert_eq!(verdict.category, Category::RollupSum);
    assert_eq!(verdict.target_strategy, Some(TargetStrategy::ViewWithAggregate));
    assert_eq!(verdict.sample_value.as_deref(), Some("350.5"));
}

#[test]
fn long_sample_is_truncated_to_one_hundred_chars() {
    let long = format!("{} - tail", "x".repeat(150));
    let verdict = classify("Label", &text(&long));
    assert_eq!(verdict.category, Category::Concatenation);
    assert_eq!(verdict.sample_value.map(|s| s.chars().count()), Some(100));
}

#[test]
fn falsy_first_value_still_produces_a_sample() {
    let verdict = classify("Is Active", &[FieldValue::Boolean(false)]);
    assert_eq!(verdict.category, Category::BooleanFormula);
    assert_eq!(verdict.sample_value.as_deref(), Some("false"));

    let zero = classify("Line Amount", &ints(&[0]));
    assert_eq!(zero.category, Category::RollupSum);
    assert_eq!(zero.sample_value.as_deref(), Some("0"));
}

#[test]
fn verdict_serializes_with_snake_case_tags() {
    let verdict = classify("Guest Count", &ints(&[2]));
    let json = serde_json::to_value(&verdict).expect("serialize verdict");
    assert_eq!(json["category"], "rollup_count");
    assert_eq!(json["target_strategy"], "view_with_count");
    assert_eq!(json["is_computed"], true);
    assert_eq!(json["rationale"], "COUNT of linked records");
}
