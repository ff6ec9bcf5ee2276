//! Schema validation.
//!
//! Validation is synchronous, side-effect free and total. It collects every
//! violation rather than stopping at the first, so a form can show all
//! field errors at once.

use crate::{FieldRule, FieldType, ProviderConfig, ProviderKind, Record, RecordSchema};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted field path, e.g. `title` or `gateway.config.API_KEY`.
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// A record that passed [`SchemaValidator::validate`].
///
/// Holds only the fields the schema declares. There is no public
/// constructor: the only way to obtain one is through validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidRecord(Record);

impl ValidRecord {
    /// The validated fields.
    pub fn as_record(&self) -> &Record {
        &self.0
    }

    /// Consumes the wrapper, returning the validated fields.
    pub fn into_record(self) -> Record {
        self.0
    }
}

/// Validates drafts against a [`RecordSchema`].
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    schema: Arc<RecordSchema>,
}

impl SchemaValidator {
    pub fn new(schema: RecordSchema) -> Self {
        Self {
            schema: Arc::new(schema),
        }
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Validates `draft`, returning the cleaned payload or every violation.
    pub fn validate(&self, draft: &Record) -> Result<ValidRecord, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut cleaned = Record::new();

        for rule in &self.schema.fields {
            if let Some(value) = check_field(rule, draft.get(&rule.field_path), &mut errors) {
                if let Err(e) = cleaned.set_path(&rule.field_path, value) {
                    errors.push(ValidationError::new(&rule.field_path, e.to_string()));
                }
            }
        }

        for rule in self.schema.rules() {
            errors.extend(rule.check(draft));
        }

        if errors.is_empty() {
            Ok(ValidRecord(cleaned))
        } else {
            Err(errors)
        }
    }
}

/// Checks one field. Returns the value to carry into the cleaned payload,
/// or `None` when the field is absent or invalid.
fn check_field(
    rule: &FieldRule,
    value: Option<&Value>,
    errors: &mut Vec<ValidationError>,
) -> Option<Value> {
    let path = rule.field_path.as_str();
    let value = match value {
        None | Some(Value::Null) => {
            if rule.required {
                errors.push(ValidationError::new(path, "required"));
            }
            return None;
        }
        Some(v) => v,
    };

    match rule.field_type {
        FieldType::Text => {
            let Some(s) = value.as_str() else {
                errors.push(ValidationError::new(path, "expected text"));
                return None;
            };
            check_text(rule, s, errors).then(|| value.clone())
        }
        FieldType::RichText => {
            let Some(s) = value.as_str() else {
                errors.push(ValidationError::new(path, "expected text"));
                return None;
            };
            let visible = visible_text(s);
            check_text(rule, &visible, errors).then(|| value.clone())
        }
        FieldType::Number => {
            if value.as_f64().is_none() {
                errors.push(ValidationError::new(path, "expected a number"));
                return None;
            }
            Some(value.clone())
        }
        FieldType::Bool => {
            if !value.is_boolean() {
                errors.push(ValidationError::new(path, "expected a boolean"));
                return None;
            }
            Some(value.clone())
        }
        FieldType::Enum => {
            let Some(s) = value.as_str() else {
                errors.push(ValidationError::new(path, "expected text"));
                return None;
            };
            if s.is_empty() {
                return blank(rule, value, errors);
            }
            let options = rule.enum_options.as_deref().unwrap_or_default();
            if !options.iter().any(|o| o == s) {
                errors.push(ValidationError::new(
                    path,
                    format!("must be one of: {}", options.join(", ")),
                ));
                return None;
            }
            Some(value.clone())
        }
        FieldType::FileRef => {
            let Some(s) = value.as_str() else {
                errors.push(ValidationError::new(
                    path,
                    "must be a non-empty file identifier",
                ));
                return None;
            };
            if s.trim().is_empty() {
                return blank(rule, value, errors);
            }
            Some(value.clone())
        }
        FieldType::ProviderConfig => check_provider_config(path, value, errors),
    }
}

/// Handles an empty textual value: an error when required, passed through otherwise.
fn blank(rule: &FieldRule, value: &Value, errors: &mut Vec<ValidationError>) -> Option<Value> {
    if rule.required {
        errors.push(ValidationError::new(&rule.field_path, "required"));
        None
    } else {
        Some(value.clone())
    }
}

/// Checks required-ness and length bounds of a textual field against the
/// text the user sees.
fn check_text(rule: &FieldRule, visible: &str, errors: &mut Vec<ValidationError>) -> bool {
    let path = rule.field_path.as_str();
    if visible.trim().is_empty() {
        if rule.required {
            errors.push(ValidationError::new(path, "required"));
            return false;
        }
        // An empty optional field skips its length bounds.
        return true;
    }

    let len = visible.chars().count();
    let mut ok = true;
    if let Some(min) = rule.min_len {
        if len < min {
            errors.push(ValidationError::new(
                path,
                format!("must be at least {min} characters"),
            ));
            ok = false;
        }
    }
    if let Some(max) = rule.max_len {
        if len > max {
            errors.push(ValidationError::new(
                path,
                format!("must be at most {max} characters"),
            ));
            ok = false;
        }
    }
    ok
}

fn check_provider_config(
    path: &str,
    value: &Value,
    errors: &mut Vec<ValidationError>,
) -> Option<Value> {
    let Some(block) = value.as_object() else {
        errors.push(ValidationError::new(path, "expected a provider config block"));
        return None;
    };
    let Some(provider) = block
        .get("provider")
        .and_then(Value::as_str)
        .and_then(ProviderKind::from_id)
    else {
        errors.push(ValidationError::new(format!("{path}.provider"), "unknown provider"));
        return None;
    };

    // Non-string values are treated as missing and surface as "required".
    let mut config = ProviderConfig::blank(provider);
    if let Some(raw) = block.get("config").and_then(Value::as_object) {
        for key in provider.descriptor().config {
            if let Some(s) = raw.get(key.key).and_then(Value::as_str) {
                config.set(key.key, s);
            }
        }
    }

    let found = config.validate(path);
    if !found.is_empty() {
        errors.extend(found);
        return None;
    }
    serde_json::to_value(config.normalized()).ok()
}

/// The user-visible text of an HTML fragment.
///
/// Tags are removed and character entities decoded, with `&nbsp;` as a
/// plain space. A `<` that does not open a tag is kept as text, as is an
/// unrecognized entity.
pub fn visible_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(c) = rest.chars().next() {
        match c {
            '<' if opens_tag(&rest[1..]) => {
                if let Some(end) = rest.find('>') {
                    rest = &rest[end + 1..];
                    continue;
                }
            }
            '&' => {
                if let Some((decoded, len)) = decode_entity(rest) {
                    out.push(decoded);
                    rest = &rest[len..];
                    continue;
                }
            }
            _ => {}
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

fn opens_tag(after: &str) -> bool {
    after
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
}

/// Decodes the entity at the start of `s`, returning the character and the
/// entity's byte length.
fn decode_entity(s: &str) -> Option<(char, usize)> {
    let (semi, _) = s.char_indices().take(12).find(|&(_, c)| c == ';')?;
    let decoded = match &s[1..semi] {
        "nbsp" => ' ',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        name => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            match char::from_u32(value)? {
                '\u{a0}' => ' ',
                c => c,
            }
        }
    };
    Some((decoded, semi + 1))
}
