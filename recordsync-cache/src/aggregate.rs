use crate::error::{CacheError, CacheResult};
use recordsync_types::SubKey;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A cached aggregate: one shared sub-object per sub-key.
///
/// Equality is deep equality of the sub-objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    sections: BTreeMap<SubKey, Arc<Value>>,
}

impl Aggregate {
    /// Creates an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an aggregate from a fetched JSON object.
    pub fn from_value(value: Value) -> CacheResult<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(CacheError::NotAnObject {
                    found: json_kind(&other),
                });
            }
        };
        let mut sections = BTreeMap::new();
        for (key, section) in map {
            sections.insert(SubKey::parse(&key)?, Arc::new(section));
        }
        Ok(Self { sections })
    }

    /// Renders the aggregate back into a JSON object.
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .sections
            .iter()
            .map(|(k, v)| (k.to_string(), Value::clone(v)))
            .collect();
        Value::Object(map)
    }

    /// The sub-object stored under `sub_key`.
    pub fn get(&self, sub_key: &SubKey) -> Option<&Arc<Value>> {
        self.sections.get(sub_key)
    }

    /// Sub-keys in sorted order.
    pub fn sub_keys(&self) -> impl Iterator<Item = &SubKey> {
        self.sections.keys()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// A copy with `sub_key` replaced. Every other sub-object is shared
    /// with `self`, not cloned.
    pub fn with_section(&self, sub_key: SubKey, value: Value) -> Self {
        let mut sections = self.sections.clone();
        sections.insert(sub_key, Arc::new(value));
        Self { sections }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
