//! Record model and schema validation for recordsync.
//!
//! Defines the types every edit session is built on:
//! - [`Record`]: one section's fields, held as a JSON object
//! - [`RecordSchema`] / [`FieldRule`]: the declared shape of a record
//! - [`SchemaValidator`]: the pure gate that turns a draft into a [`ValidRecord`]
//! - [`ProviderKind`] / [`ProviderConfig`]: per-provider configuration blocks
//! - [`RecordRule`]: optional cross-field checks attached to a schema
//!
//! A [`ValidRecord`] can only be produced by [`SchemaValidator::validate`],
//! so anything that accepts one is guaranteed to run after validation.

mod error;
mod provider;
mod record;
mod rule;
mod schema;
mod validator;

pub use error::{ModelError, ModelResult};
pub use provider::{ConfigKey, ProviderConfig, ProviderDescriptor, ProviderKind};
pub use record::Record;
pub use rule::RecordRule;
pub use schema::{FieldRule, FieldType, RecordSchema};
pub use validator::{SchemaValidator, ValidRecord, ValidationError, visible_text};
