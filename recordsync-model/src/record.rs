use crate::error::{ModelError, ModelResult, json_kind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The fields of one editable section.
///
/// Records are plain JSON objects. Equality is deep equality of the
/// underlying object, which is what the session uses to decide whether a
/// draft differs from the last persisted value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Converts a JSON value into a record. Only objects are accepted.
    pub fn from_value(value: Value) -> ModelResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ModelError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    /// Converts the record back into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// The top-level fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up a value by dotted path (e.g. `"gateway.config.API_KEY"`).
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Extract a string value by dotted path.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    /// Extract a boolean value by dotted path.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.as_bool())
    }

    /// Extract a numeric value by dotted path.
    pub fn get_number(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(|v| v.as_f64())
    }

    /// Inserts a top-level field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Writes a value at a dotted path, creating intermediate objects.
    ///
    /// A `null` intermediate is replaced by an object; any other
    /// non-object intermediate is an error and leaves the record unchanged.
    pub fn set_path(&mut self, path: &str, value: Value) -> ModelResult<()> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ModelError::InvalidPath(path.to_string()));
        }
        let Some((last, parents)) = segments.split_last() else {
            return Err(ModelError::InvalidPath(path.to_string()));
        };

        // Check the whole chain first so a failed write leaves no partial objects behind.
        let mut probe = Some(&self.0);
        for (i, segment) in parents.iter().enumerate() {
            match probe.and_then(|map| map.get(*segment)) {
                Some(Value::Object(map)) => probe = Some(map),
                Some(Value::Null) | None => probe = None,
                Some(_) => return Err(ModelError::NotAnObjectAt(parents[..=i].join("."))),
            }
        }

        let mut current = &mut self.0;
        for segment in parents {
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if slot.is_null() {
                *slot = Value::Object(Map::new());
            }
            current = match slot {
                Value::Object(map) => map,
                _ => return Err(ModelError::NotAnObjectAt(segment.to_string())),
            };
        }
        current.insert(last.to_string(), value);
        Ok(())
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = ModelError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}
