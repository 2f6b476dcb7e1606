//! Positional schema loaded from a JSON mapping file

use super::types::LoadError;
use indexmap::IndexMap;
use std::path::Path;

/// Ordered field names; position `i` maps to column `i` of the data file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Load the schema from a mapping file. Only the key order is used.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_mapping(&content).map_err(|reason| LoadError::Mapping {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse the mapping JSON object, keeping its key order
    pub fn from_mapping(json: &str) -> Result<Self, String> {
        let mapping: IndexMap<String, serde_json::Value> =
            serde_json::from_str(json).map_err(|e| e.to_string())?;
        if mapping.is_empty() {
            return Err("mapping defines no fields".to_string());
        }
        Ok(Self {
            fields: mapping.into_keys().collect(),
        })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_key_order_is_kept() {
        let schema = Schema::from_mapping(
            r#"{"zeta": {"type": "keyword"}, "alpha": null, "created_date": "date"}"#,
        )
        .unwrap();
        assert_eq!(schema.fields(), &["zeta", "alpha", "created_date"]);
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn test_empty_mapping_is_rejected() {
        assert!(Schema::from_mapping("{}").is_err());
    }

    #[test]
    fn test_non_object_mapping_is_rejected() {
        assert!(Schema::from_mapping(r#"["id", "name"]"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Schema::load(Path::new("/nonexistent/map.json")).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Schema::load(&path).unwrap_err();
        assert!(matches!(err, LoadError::Mapping { .. }));
    }
}
