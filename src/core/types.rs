use serde::{Serialize, Deserialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use crate::core::error::{Error, Result};

/// Document identifier, assigned in ingestion order starting at 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u32);

impl DocId {
    pub fn new(id: u32) -> Self {
        DocId(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for DocId {
    fn from(id: u32) -> Self {
        DocId(id)
    }
}

/// Flat, ordered mapping of field name to raw string value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Record { fields: Vec::new() }
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Accepts a JSON object whose values are strings (or null, treated as empty)
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Error::ingestion(format!("expected a flat object, got {}", json_kind(value)))
        })?;

        let mut fields = Vec::with_capacity(object.len());
        for (name, value) in object {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => String::new(),
                other => {
                    return Err(Error::ingestion(format!(
                        "field '{}' holds {} instead of a string",
                        name,
                        json_kind(other)
                    )))
                }
            };
            fields.push((name.clone(), text));
        }

        Ok(Record { fields })
    }

    /// Rejects empty and duplicate field names
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (name, _) in &self.fields {
            if name.trim().is_empty() {
                return Err(Error::ingestion("record has an empty field name"));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::ingestion(format!("duplicate field '{}'", name)));
            }
        }
        Ok(())
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Anything the index builder can ingest as a record
pub trait IntoRecord {
    fn into_record(self) -> Result<Record>;
}

impl IntoRecord for Record {
    fn into_record(self) -> Result<Record> {
        self.validate()?;
        Ok(self)
    }
}

impl IntoRecord for serde_json::Value {
    fn into_record(self) -> Result<Record> {
        let record = Record::from_json(&self)?;
        record.validate()?;
        Ok(record)
    }
}

impl IntoRecord for Vec<(String, String)> {
    fn into_record(self) -> Result<Record> {
        Record { fields: self }.into_record()
    }
}

impl IntoRecord for HashMap<String, String> {
    fn into_record(self) -> Result<Record> {
        // Sorted so that equal maps always produce equal records
        let sorted: BTreeMap<String, String> = self.into_iter().collect();
        Record { fields: sorted.into_iter().collect() }.into_record()
    }
}

/// Field values kept for one document, in record order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: DocId,
    pub fields: Vec<(String, String)>,
}

impl StoredDocument {
    pub fn new(id: DocId) -> Self {
        StoredDocument {
            id,
            fields: Vec::new(),
        }
    }

    pub fn add_field(&mut self, name: String, value: String) {
        self.fields.push((name, value));
    }

    pub fn get_field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_record_from_json_object() {
        let record = Record::from_json(&json!({"name": "Triceratops", "area": null})).unwrap();
        assert_eq!(record.get("name"), Some("Triceratops"));
        assert_eq!(record.get("area"), Some(""));
    }

    #[test]
    fn test_record_from_json_rejects_nested_values() {
        let err = Record::from_json(&json!({"name": {"first": "Tri"}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Ingestion);

        let err = Record::from_json(&json!(["name", "Triceratops"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Ingestion);
    }

    #[test]
    fn test_duplicate_field_is_malformed() {
        let record = Record::new().with("name", "a").with("name", "b");
        assert_eq!(record.into_record().unwrap_err().kind(), ErrorKind::Ingestion);
    }

    #[test]
    fn test_hash_map_records_are_ordered() {
        let map: HashMap<String, String> = [("b", "2"), ("a", "1")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let record = map.into_record().unwrap();
        assert_eq!(record.fields[0].0, "a");
        assert_eq!(record.fields[1].0, "b");
    }

    #[test]
    fn test_hash_map_with_empty_field_name_is_malformed() {
        let mut map = HashMap::new();
        map.insert("name".to_string(), "Iguanodon".to_string());
        map.insert("  ".to_string(), "Europe".to_string());
        assert_eq!(map.into_record().unwrap_err().kind(), ErrorKind::Ingestion);
    }
}
