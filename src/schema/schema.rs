use std::collections::HashSet;
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

/// Per-field indexing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldPolicy {
    /// Trimmed value indexed as one verbatim term
    Exact,
    /// Value tokenized by the analyzer, each token indexed
    Analyzed,
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub policy: FieldPolicy,
}

/// Ordered field → policy assignments, fixed for one generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Schema { fields: Vec::new() }
    }

    pub fn add_field(mut self, name: &str, policy: FieldPolicy) -> Self {
        self.fields.push(FieldDefinition {
            name: name.to_string(),
            policy,
        });
        self
    }

    pub fn exact_field(self, name: &str) -> Self {
        self.add_field(name, FieldPolicy::Exact)
    }

    pub fn analyzed_field(self, name: &str) -> Self {
        self.add_field(name, FieldPolicy::Analyzed)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let schema: Schema = serde_json::from_str(text)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn policy(&self, name: &str) -> Option<FieldPolicy> {
        self.get_field(name).map(|f| f.policy)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    pub fn analyzed_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.policy == FieldPolicy::Analyzed)
            .map(|f| f.name.as_str())
    }

    /// Checked once before a build starts
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput, "schema has no fields".to_string()));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    "schema field with empty name".to_string(),
                ));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("field '{}' declared twice", field.name),
                ));
            }
        }
        Ok(())
    }
}
