use pretty_assertions::assert_eq;
use recordsync_model::{FieldRule, FieldType, ProviderKind, RecordSchema};
use serde_json::json;

fn about_us_schema() -> RecordSchema {
    RecordSchema::new(
        "ourMission",
        vec![
            FieldRule::text("title").max_len(120),
            FieldRule::text("description"),
            FieldRule::file_ref("image"),
        ],
    )
}

// ── FieldRule constructors ───────────────────────────────────────

#[test]
fn fields_are_required_by_default() {
    let f = FieldRule::text("title");
    assert_eq!(f.field_path, "title");
    assert_eq!(f.field_type, FieldType::Text);
    assert!(f.required);
}

#[test]
fn optional_builder() {
    let f = FieldRule::rich_text("body").optional();
    assert_eq!(f.field_type, FieldType::RichText);
    assert!(!f.required);
    assert!(f.clone().required().required);
}

#[test]
fn length_builders() {
    let f = FieldRule::text("title").min_len(3).max_len(10);
    assert_eq!(f.min_len, Some(3));
    assert_eq!(f.max_len, Some(10));
}

#[test]
fn enumeration_carries_options() {
    let f = FieldRule::enumeration("status", vec!["draft".into(), "live".into()]);
    assert_eq!(f.field_type, FieldType::Enum);
    assert_eq!(f.enum_options, Some(vec!["draft".to_string(), "live".to_string()]));
}

#[test]
fn provider_config_carries_default_provider() {
    let f = FieldRule::provider_config("gateway", ProviderKind::Coingate);
    assert_eq!(f.field_type, FieldType::ProviderConfig);
    assert_eq!(f.provider, Some(ProviderKind::Coingate));
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn field_type_serializes_snake_case() {
    assert_eq!(serde_json::to_value(FieldType::RichText).unwrap(), json!("rich_text"));
    assert_eq!(serde_json::to_value(FieldType::FileRef).unwrap(), json!("file_ref"));
}

#[test]
fn field_rule_accepts_options_alias() {
    let f: FieldRule = serde_json::from_value(json!({
        "field_path": "env",
        "field_type": "enum",
        "required": true,
        "options": ["test", "production"]
    }))
    .unwrap();
    assert_eq!(f.enum_options.unwrap().len(), 2);
}

#[test]
fn field_rule_skips_unset_options() {
    let json = serde_json::to_value(FieldRule::text("title")).unwrap();
    assert!(json.get("min_len").is_none());
    assert!(json.get("enum_options").is_none());
}

// ── RecordSchema ─────────────────────────────────────────────────

#[test]
fn field_lookup() {
    let s = about_us_schema();
    assert_eq!(s.field("image").unwrap().field_type, FieldType::FileRef);
    assert!(s.field("missing").is_none());
}

#[test]
fn default_record_matches_blank_form() {
    let s = about_us_schema();
    assert_eq!(
        s.default_record().into_value(),
        json!({ "title": "", "description": "", "image": "" })
    );
}

#[test]
fn default_record_for_mixed_types() {
    let s = RecordSchema::new(
        "deposit",
        vec![
            FieldRule::number("minimum"),
            FieldRule::bool("enabled"),
            FieldRule::provider_config("gateway", ProviderKind::Coinbase),
        ],
    );
    assert_eq!(
        s.default_record().into_value(),
        json!({
            "minimum": 0,
            "enabled": false,
            "gateway": { "provider": "coinbase", "config": { "API_KEY": "", "WEBHOOK_SECRET": "" } }
        })
    );
}

#[test]
fn debug_reports_rule_count() {
    let s = about_us_schema();
    let debug = format!("{s:?}");
    assert!(debug.contains("ourMission"));
    assert!(debug.contains("rules: 0"));
}
