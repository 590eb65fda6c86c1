//! Batch classification over tabular records.
//!
//! Each record is a JSON object keyed by arbitrary column names. Output rows
//! keep every input column and gain the ranked label and score columns.
//! Rows are independent: no row's result depends on another.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use spicesense_core::Taxonomy;
use tracing::debug;

use crate::classifier::SpicesClassifier;

/// A single tabular record.
pub type Record = Map<String, Value>;

/// Column holding ranked category names.
pub const SPICES_COLUMN: &str = "SPICES";

/// Column holding ranked scores, parallel to [`SPICES_COLUMN`].
pub const SCORES_COLUMN: &str = "SPICES_scores";

/// Options for [`SpicesClassifier::classify_batch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    pub title_field: String,
    pub description_field: String,
    /// Also emit one `SPICES_<Category>` 0/1 column per taxonomy category.
    pub indicator_columns: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            title_field: "Title".into(),
            description_field: "Description".into(),
            indicator_columns: false,
        }
    }
}

/// Text of a record field; missing or null fields read as empty.
fn field_text(record: &Record, field: &str) -> String {
    match record.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl SpicesClassifier {
    /// Classify each record, appending `SPICES` and `SPICES_scores`.
    /// Output order and length match the input.
    pub fn classify_records(
        &self,
        records: &[Record],
        title_field: &str,
        description_field: &str,
    ) -> Vec<Record> {
        self.classify_batch(
            records,
            &BatchOptions {
                title_field: title_field.to_string(),
                description_field: description_field.to_string(),
                indicator_columns: false,
            },
        )
    }

    pub fn classify_batch(&self, records: &[Record], options: &BatchOptions) -> Vec<Record> {
        debug!(
            "Classifying batch of {} records (title={}, description={})",
            records.len(),
            options.title_field,
            options.description_field
        );

        records
            .iter()
            .map(|record| self.classify_record(record, options))
            .collect()
    }

    fn classify_record(&self, record: &Record, options: &BatchOptions) -> Record {
        let title = field_text(record, &options.title_field);
        let description = field_text(record, &options.description_field);
        let scores = self.classify(&title, &description);

        let mut row = record.clone();
        row.insert(SPICES_COLUMN.into(), Value::String(scores.labels()));
        row.insert(SCORES_COLUMN.into(), Value::String(scores.formatted_scores()));

        if options.indicator_columns {
            for name in self.taxonomy().names() {
                let flag = u8::from(scores.contains(name));
                row.insert(Taxonomy::indicator_column(name), Value::from(flag));
            }
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("record must be an object"),
        }
    }

    #[test]
    fn test_appends_columns_and_keeps_fields() {
        let classifier = SpicesClassifier::default();
        let input = vec![record(json!({
            "Title": "Resume Workshop",
            "Description": "Bring your CV",
            "Room": 204,
        }))];

        let output = classifier.classify_records(&input, "Title", "Description");
        assert_eq!(output.len(), 1);
        let row = &output[0];
        assert_eq!(row["Room"], json!(204));
        assert_eq!(
            row[SPICES_COLUMN],
            json!("Professional Development; Intellectual Achievement; Skill Development")
        );
        assert_eq!(row[SCORES_COLUMN], json!("1.000; 1.000; 1.000"));
    }

    #[test]
    fn test_missing_and_null_fields_are_empty() {
        let classifier = SpicesClassifier::default();
        let input = vec![
            record(json!({"Title": null})),
            record(json!({})),
        ];
        let output = classifier.classify_records(&input, "Title", "Description");
        for row in output {
            assert_eq!(row[SPICES_COLUMN], json!("Uncategorized"));
            assert_eq!(row[SCORES_COLUMN], json!("0.000"));
        }
    }

    #[test]
    fn test_custom_field_names() {
        let classifier = SpicesClassifier::default();
        let input = vec![record(json!({"Event Title": "Heritage Festival", "Notes": ""}))];
        let output = classifier.classify_records(&input, "Event Title", "Notes");
        assert_eq!(output[0][SPICES_COLUMN], json!("Cultural Exploration"));
    }

    #[test]
    fn test_non_string_fields_are_stringified() {
        assert_eq!(field_text(&record(json!({"n": 3})), "n"), "3");
        assert_eq!(field_text(&record(json!({"b": true})), "b"), "true");
    }

    #[test]
    fn test_indicator_columns() {
        let classifier = SpicesClassifier::default();
        let input = vec![record(json!({"Title": "Yoga night", "Description": "wellness"}))];
        let options = BatchOptions {
            indicator_columns: true,
            ..Default::default()
        };
        let row = &classifier.classify_batch(&input, &options)[0];
        assert_eq!(row["SPICES_Engaged_Living"], json!(1));
        assert_eq!(row["SPICES_Service"], json!(0));
        assert_eq!(row["SPICES_Skill_Development"], json!(0));
    }
}
