//! Shared fixtures for session tests.

#![allow(dead_code)]

use recordsync_cache::{Aggregate, CacheStore};
use recordsync_model::{FieldRule, Record, RecordSchema, SchemaValidator};
use recordsync_rpc::Procedure;
use recordsync_rpc::mock::MockProcedureClient;
use recordsync_session::{EditSession, SectionSpec, SessionConfig};
use recordsync_types::{QueryKey, SubKey};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Routes session logs to the test harness. Set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn page_key() -> QueryKey {
    QueryKey::parse("pages.aboutUs.getRecord").unwrap()
}

pub fn read_procedure() -> Procedure {
    Procedure::parse("pages.aboutUs.getRecord").unwrap()
}

pub fn mission() -> SubKey {
    SubKey::parse("ourMission").unwrap()
}

pub fn vision() -> SubKey {
    SubKey::parse("ourVision").unwrap()
}

pub fn update_mission() -> Procedure {
    Procedure::parse("pages.aboutUs.updateOurMission").unwrap()
}

pub fn update_vision() -> Procedure {
    Procedure::parse("pages.aboutUs.updateOurVision").unwrap()
}

/// Title plus rich-text description, both required.
pub fn section_schema(name: &str) -> RecordSchema {
    RecordSchema::new(
        name,
        vec![
            FieldRule::text("title").max_len(80),
            FieldRule::rich_text("description"),
            FieldRule::file_ref("image").optional(),
        ],
    )
}

pub fn about_us() -> Value {
    json!({
        "ourMission": { "title": "A", "description": "<p>Mission</p>", "image": "" },
        "ourVision": { "title": "B", "description": "<p>Vision</p>", "image": "" }
    })
}

pub fn record(value: Value) -> Record {
    Record::from_value(value).unwrap()
}

/// A cache already holding [`about_us`].
pub fn seeded_cache() -> CacheStore {
    let cache = CacheStore::new();
    cache.populate(page_key(), Aggregate::from_value(about_us()).unwrap());
    cache
}

pub fn mission_spec() -> SectionSpec {
    SectionSpec {
        query_key: page_key(),
        query: read_procedure(),
        sub_key: mission(),
        mutation: update_mission(),
        validator: SchemaValidator::new(section_schema("ourMission")),
    }
}

pub fn mission_session(
    mock: &Arc<MockProcedureClient>,
    cache: &CacheStore,
    config: SessionConfig,
) -> EditSession {
    EditSession::new(mission_spec(), mock.clone(), cache.clone(), config)
}
