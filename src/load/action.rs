//! Building write actions from raw records

use super::schema::Schema;
use super::types::LoadError;
use indexmap::IndexMap;

/// One bulk `index` action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Per-job identity, used to match rejections back to this action
    pub id: String,
    /// Target index
    pub index: String,
    /// Document kind tag
    pub doc_type: String,
    /// Document body in schema order; `None` serializes as null
    pub source: IndexMap<String, Option<String>>,
}

/// A group of actions submitted together
pub type Batch = Vec<Action>;

/// Builds actions for one job from its schema
#[derive(Debug, Clone)]
pub struct ActionBuilder {
    schema: Schema,
    /// Per schema position: empty values become null
    null_if_empty: Vec<bool>,
    index: String,
    doc_type: String,
    delimiter: char,
}

impl ActionBuilder {
    pub fn new(
        schema: Schema,
        index: impl Into<String>,
        doc_type: impl Into<String>,
        delimiter: char,
        date_field_marker: &str,
    ) -> Self {
        let null_if_empty = schema
            .fields()
            .iter()
            .map(|field| is_date_field(field, date_field_marker))
            .collect();

        Self {
            schema,
            null_if_empty,
            index: index.into(),
            doc_type: doc_type.into(),
            delimiter,
        }
    }

    /// Build the action for one record, taking `next_id` as its identity.
    ///
    /// `line_number` is only used for error reporting. Records with fewer
    /// fields than the schema are a fatal mismatch; extra fields are ignored.
    pub fn build(
        &self,
        record: &str,
        line_number: usize,
        next_id: &mut u64,
    ) -> Result<Action, LoadError> {
        let delimiter = self.delimiter;
        let record = record.trim_matches(|c: char| c.is_whitespace() && c != delimiter);

        let mut values = record.split(delimiter);
        let mut source = IndexMap::with_capacity(self.schema.len());

        for (position, field) in self.schema.fields().iter().enumerate() {
            let Some(value) = values.next() else {
                return Err(LoadError::SchemaMismatch {
                    line: line_number,
                    expected: self.schema.len(),
                    found: position,
                });
            };

            let value = if value.is_empty() && self.null_if_empty[position] {
                None
            } else {
                Some(value.to_string())
            };
            source.insert(field.clone(), value);
        }

        let id = next_id.to_string();
        *next_id += 1;

        Ok(Action {
            id,
            index: self.index.clone(),
            doc_type: self.doc_type.clone(),
            source,
        })
    }
}

/// Date fields carry the marker somewhere after their first character
pub fn is_date_field(field: &str, marker: &str) -> bool {
    field.find(marker).is_some_and(|pos| pos > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(fields: &[&str]) -> ActionBuilder {
        ActionBuilder::new(
            Schema::new(fields.iter().copied()),
            "test-weird",
            "default",
            ',',
            "_date",
        )
    }

    #[test]
    fn test_build_maps_fields_by_position() {
        let builder = builder(&["id", "name", "created_date"]);
        let mut next_id = 0;

        let action = builder.build("1,Alice,2020-01-01\n", 1, &mut next_id).unwrap();

        assert_eq!(action.id, "0");
        assert_eq!(action.index, "test-weird");
        assert_eq!(action.doc_type, "default");
        assert_eq!(action.source["id"], Some("1".to_string()));
        assert_eq!(action.source["name"], Some("Alice".to_string()));
        assert_eq!(action.source["created_date"], Some("2020-01-01".to_string()));
        assert_eq!(next_id, 1);
    }

    #[test]
    fn test_empty_date_becomes_null_anywhere() {
        let builder = builder(&["opening_date", "name", "closing_date"]);
        let mut next_id = 0;

        let action = builder.build(",Bob,", 1, &mut next_id).unwrap();

        assert_eq!(action.source["opening_date"], None);
        assert_eq!(action.source["name"], Some("Bob".to_string()));
        assert_eq!(action.source["closing_date"], None);
    }

    #[test]
    fn test_empty_non_date_stays_empty_string() {
        let builder = builder(&["id", "name"]);
        let mut next_id = 0;

        let action = builder.build("1,", 1, &mut next_id).unwrap();
        assert_eq!(action.source["name"], Some(String::new()));
    }

    #[test]
    fn test_values_are_not_trimmed_or_converted() {
        let builder = builder(&["id", "amount"]);
        let mut next_id = 0;

        let action = builder.build("  007 , 12.50  \r\n", 1, &mut next_id).unwrap();
        assert_eq!(action.source["id"], Some("007 ".to_string()));
        assert_eq!(action.source["amount"], Some(" 12.50".to_string()));
    }

    #[test]
    fn test_identities_increase() {
        let builder = builder(&["id"]);
        let mut next_id = 41;

        let first = builder.build("a", 1, &mut next_id).unwrap();
        let second = builder.build("b", 2, &mut next_id).unwrap();
        assert_eq!(first.id, "41");
        assert_eq!(second.id, "42");
        assert_eq!(next_id, 43);
    }

    #[test]
    fn test_short_record_is_schema_mismatch() {
        let builder = builder(&["id", "name", "created_date"]);
        let mut next_id = 5;

        let err = builder.build("1,Alice", 12, &mut next_id).unwrap_err();
        match err {
            LoadError::SchemaMismatch {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 12);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("Expected SchemaMismatch, got {:?}", other),
        }
        assert_eq!(next_id, 5, "failed records must not consume an identity");
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let builder = builder(&["id", "name"]);
        let mut next_id = 0;

        let action = builder.build("1,Alice,extra,more", 1, &mut next_id).unwrap();
        assert_eq!(action.source.len(), 2);
    }

    #[test]
    fn test_tab_delimiter_keeps_trailing_empty_fields() {
        let builder = ActionBuilder::new(
            Schema::new(["id", "name", "closing_date"]),
            "test-tabs",
            "default",
            '\t',
            "_date",
        );
        let mut next_id = 0;

        let action = builder.build("1\tAlice\t\n", 1, &mut next_id).unwrap();
        assert_eq!(action.source["name"], Some("Alice".to_string()));
        assert_eq!(action.source["closing_date"], None);
    }

    #[test]
    fn test_date_field_convention() {
        assert!(is_date_field("created_date", "_date"));
        assert!(is_date_field("x_date_of_birth", "_date"));
        assert!(!is_date_field("_date", "_date"));
        assert!(!is_date_field("date", "_date"));
        assert!(!is_date_field("updated", "_date"));
    }
}
