//! Sampled records and the per-field observation sequences built from them.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::value::FieldValue;

/// One sampled record: field name to value, absent fields omitted.
pub type Record = IndexMap<String, FieldValue>;

/// Field samples of one table keyed by field name, in first-record order.
pub type FieldSamples = IndexMap<String, FieldSample>;

/// The non-null observations of a single field across a table's sample.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSample {
    pub name: String,
    pub values: Vec<FieldValue>,
}

impl FieldSample {
    pub fn new(name: impl Into<String>, values: Vec<FieldValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Groups the values of `records` by field.
///
/// The field set and its order come from the first record; values for those
/// fields are gathered from every record. A field missing from the first
/// record is not sampled.
pub fn collect_field_samples(records: &[Record]) -> FieldSamples {
    let Some(first) = records.first() else {
        return FieldSamples::new();
    };
    first
        .keys()
        .map(|name| {
            let values = records
                .iter()
                .filter_map(|record| record.get(name).cloned())
                .collect();
            (name.clone(), FieldSample::new(name.clone(), values))
        })
        .collect()
}

/// Builds a record from a JSON object.
///
/// Accepts both a flat `{field: value}` object and the exported
/// `{"id": .., "fields": {..}}` shape. Returns `None` for non-objects.
pub fn record_from_json(value: &JsonValue) -> Option<Record> {
    let object = value.as_object()?;
    let fields = match object.get("fields") {
        Some(JsonValue::Object(fields)) => fields,
        _ => object,
    };
    let record = fields
        .iter()
        .filter_map(|(name, raw)| FieldValue::from_json(raw).map(|v| (name.clone(), v)))
        .collect();
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collect_field_samples_takes_fields_from_first_record() {
        let records = vec![
            record_from_json(&json!({"Name": "a", "Nights": null, "Guest Count": 1})).unwrap(),
            record_from_json(&json!({"Guest Count": 2, "Status": "✅ Confirmed", "Name": "b"}))
                .unwrap(),
        ];
        let samples = collect_field_samples(&records);
        let names = samples.keys().cloned().collect::<Vec<_>>();
        assert_eq!(names, vec!["Name", "Guest Count"]);
        assert_eq!(
            samples["Guest Count"].values,
            vec![FieldValue::Integer(1), FieldValue::Integer(2)]
        );
        assert_eq!(samples["Name"].values.len(), 2);
    }

    #[test]
    fn collect_field_samples_of_no_records_is_empty() {
        assert!(collect_field_samples(&[]).is_empty());
    }

    #[test]
    fn record_from_json_unwraps_fields_envelope() {
        let record = record_from_json(&json!({
            "id": "recAAAAAAAAAAAAAA",
            "createdTime": "2024-01-01T00:00:00.000Z",
            "fields": {"Guest Count": 2}
        }))
        .unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record["Guest Count"], FieldValue::Integer(2));
    }

    #[test]
    fn record_from_json_rejects_non_objects() {
        assert!(record_from_json(&json!([1, 2])).is_none());
    }
}
