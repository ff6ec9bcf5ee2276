use pretty_assertions::assert_eq;
use proptest::prelude::*;
use recordsync_model::{
    FieldRule, ProviderKind, Record, RecordSchema, SchemaValidator, ValidationError, visible_text,
};
use serde_json::{Value, json};
use std::sync::Arc;

fn record(value: Value) -> Record {
    Record::from_value(value).unwrap()
}

fn mission_validator() -> SchemaValidator {
    SchemaValidator::new(RecordSchema::new(
        "ourMission",
        vec![
            FieldRule::text("title").max_len(20),
            FieldRule::text("description"),
            FieldRule::file_ref("image"),
        ],
    ))
}

fn terms_validator() -> SchemaValidator {
    SchemaValidator::new(RecordSchema::new(
        "termsConditions",
        vec![FieldRule::text("title"), FieldRule::rich_text("description")],
    ))
}

// ── Success ──────────────────────────────────────────────────────

#[test]
fn valid_draft_passes() {
    let draft = record(json!({ "title": "A", "description": "B", "image": "img_1" }));
    let valid = mission_validator().validate(&draft).unwrap();
    assert_eq!(valid.as_record(), &draft);
}

#[test]
fn unknown_fields_are_dropped() {
    let draft = record(json!({
        "title": "A",
        "description": "B",
        "image": "img_1",
        "updatedAt": "2024-01-01T00:00:00Z"
    }));
    let valid = mission_validator().validate(&draft).unwrap();
    assert_eq!(valid.as_record().get("updatedAt"), None);
    assert_eq!(valid.into_record().len(), 3);
}

#[test]
fn valid_record_serializes_as_plain_object() {
    let draft = record(json!({ "title": "A", "description": "B", "image": "img_1" }));
    let valid = mission_validator().validate(&draft).unwrap();
    assert_eq!(
        serde_json::to_value(&valid).unwrap(),
        json!({ "title": "A", "description": "B", "image": "img_1" })
    );
}

// ── Failure collection ───────────────────────────────────────────

#[test]
fn cleared_required_title_reads_required() {
    let draft = record(json!({ "title": "", "description": "B", "image": "img_1" }));
    let errors = mission_validator().validate(&draft).unwrap_err();
    assert_eq!(errors, vec![ValidationError::new("title", "required")]);
}

#[test]
fn whitespace_only_is_empty() {
    let draft = record(json!({ "title": "   ", "description": "B", "image": "img_1" }));
    let errors = mission_validator().validate(&draft).unwrap_err();
    assert_eq!(errors[0].message, "required");
}

#[test]
fn every_violation_is_reported() {
    let draft = record(json!({
        "title": "this title is far too long for the limit",
        "description": 7,
    }));
    let errors = mission_validator().validate(&draft).unwrap_err();
    assert_eq!(
        errors,
        vec![
            ValidationError::new("title", "must be at most 20 characters"),
            ValidationError::new("description", "expected text"),
            ValidationError::new("image", "required"),
        ]
    );
}

#[test]
fn min_len_counts_characters() {
    let validator = SchemaValidator::new(RecordSchema::new(
        "s",
        vec![FieldRule::text("code").min_len(3)],
    ));
    assert!(validator.validate(&record(json!({ "code": "ab" }))).is_err());
    assert!(validator.validate(&record(json!({ "code": "äöü" }))).is_ok());
}

#[test]
fn null_is_missing() {
    let draft = record(json!({ "title": null, "description": "B", "image": "i" }));
    let errors = mission_validator().validate(&draft).unwrap_err();
    assert_eq!(errors, vec![ValidationError::new("title", "required")]);
}

// ── Optional fields ──────────────────────────────────────────────

#[test]
fn optional_fields_may_be_absent_or_empty() {
    let validator = SchemaValidator::new(RecordSchema::new(
        "s",
        vec![
            FieldRule::text("subtitle").optional().min_len(5),
            FieldRule::file_ref("banner").optional(),
        ],
    ));
    assert!(validator.validate(&record(json!({}))).is_ok());
    let valid = validator
        .validate(&record(json!({ "subtitle": "", "banner": "" })))
        .unwrap();
    assert_eq!(valid.as_record().get_str("subtitle"), Some(""));
}

#[test]
fn optional_fields_still_type_checked() {
    let validator = SchemaValidator::new(RecordSchema::new(
        "s",
        vec![FieldRule::number("order").optional()],
    ));
    let errors = validator.validate(&record(json!({ "order": "two" }))).unwrap_err();
    assert_eq!(errors, vec![ValidationError::new("order", "expected a number")]);
}

// ── Rich text ────────────────────────────────────────────────────

#[test]
fn empty_markup_is_required_error() {
    let draft = record(json!({ "title": "Terms", "description": "<p><br></p>" }));
    let errors = terms_validator().validate(&draft).unwrap_err();
    assert_eq!(errors, vec![ValidationError::new("description", "required")]);
}

#[test]
fn nbsp_only_markup_is_empty() {
    let draft = record(json!({ "title": "Terms", "description": "<p>&nbsp;</p>" }));
    assert!(terms_validator().validate(&draft).is_err());
}

#[test]
fn rich_text_keeps_markup_in_payload() {
    let draft = record(json!({ "title": "Terms", "description": "<p>Be <b>nice</b></p>" }));
    let valid = terms_validator().validate(&draft).unwrap();
    assert_eq!(
        valid.as_record().get_str("description"),
        Some("<p>Be <b>nice</b></p>")
    );
}

#[test]
fn rich_text_length_counts_visible_text() {
    let validator = SchemaValidator::new(RecordSchema::new(
        "s",
        vec![FieldRule::rich_text("body").max_len(5)],
    ));
    assert!(validator.validate(&record(json!({ "body": "<p><em>hello</em></p>" }))).is_ok());
    assert!(validator.validate(&record(json!({ "body": "<p>hello!</p>" }))).is_err());
}

#[test]
fn visible_text_strips_tags() {
    assert_eq!(visible_text("<h1>Title</h1><p>a&nbsp;b</p>"), "Titlea b");
    assert_eq!(visible_text("1 > 0"), "1 > 0");
}

#[test]
fn visible_text_keeps_bare_angle_brackets() {
    assert_eq!(visible_text("<p>a < b</p>"), "a < b");
    assert_eq!(visible_text("x<1 and y<"), "x<1 and y<");
    assert_eq!(visible_text("unclosed <b"), "unclosed <b");
}

#[test]
fn visible_text_decodes_entities() {
    assert_eq!(visible_text("Fish &amp; Chips"), "Fish & Chips");
    assert_eq!(visible_text("&lt;tag&gt; &quot;q&quot; it&#39;s &#x41;"), "<tag> \"q\" it's A");
    assert_eq!(visible_text("a&#160;b"), "a b");
    assert_eq!(visible_text("AT&T &bogus; &"), "AT&T &bogus; &");
}

#[test]
fn rich_text_length_counts_decoded_entities() {
    let validator = SchemaValidator::new(RecordSchema::new(
        "s",
        vec![FieldRule::rich_text("body").max_len(5)],
    ));
    assert!(validator.validate(&record(json!({ "body": "<p>a &amp; b</p>" }))).is_ok());
    assert!(validator.validate(&record(json!({ "body": "<p>2 < 3 ok</p>" }))).is_err());
}

// ── Other types ──────────────────────────────────────────────────

#[test]
fn enum_membership() {
    let validator = SchemaValidator::new(RecordSchema::new(
        "s",
        vec![FieldRule::enumeration("status", vec!["draft".into(), "live".into()])],
    ));
    assert!(validator.validate(&record(json!({ "status": "live" }))).is_ok());
    assert_eq!(
        validator.validate(&record(json!({ "status": "gone" }))).unwrap_err(),
        vec![ValidationError::new("status", "must be one of: draft, live")]
    );
    assert_eq!(
        validator.validate(&record(json!({ "status": "" }))).unwrap_err(),
        vec![ValidationError::new("status", "required")]
    );
}

#[test]
fn bool_type() {
    let validator = SchemaValidator::new(RecordSchema::new("s", vec![FieldRule::bool("on")]));
    assert!(validator.validate(&record(json!({ "on": false }))).is_ok());
    assert_eq!(
        validator.validate(&record(json!({ "on": "yes" }))).unwrap_err(),
        vec![ValidationError::new("on", "expected a boolean")]
    );
}

#[test]
fn file_ref_must_be_identifier() {
    let validator = mission_validator();
    let draft = record(json!({ "title": "A", "description": "B", "image": 12 }));
    assert_eq!(
        validator.validate(&draft).unwrap_err(),
        vec![ValidationError::new("image", "must be a non-empty file identifier")]
    );
}

// ── Provider config blocks ───────────────────────────────────────

fn deposit_validator() -> SchemaValidator {
    SchemaValidator::new(RecordSchema::new(
        "instantDeposit",
        vec![FieldRule::provider_config("gateway", ProviderKind::Coinbase)],
    ))
}

#[test]
fn provider_block_requires_declared_keys() {
    let draft = record(json!({
        "gateway": { "provider": "coingate", "config": { "AUTH_TOKEN": "tok" } }
    }));
    assert_eq!(
        deposit_validator().validate(&draft).unwrap_err(),
        vec![ValidationError::new("gateway.config.ENVIRONMENT", "required")]
    );
}

#[test]
fn provider_block_normalizes_payload() {
    let draft = record(json!({
        "gateway": {
            "provider": "coingate",
            "config": { "AUTH_TOKEN": "tok", "ENVIRONMENT": "test", "STALE": "x" }
        }
    }));
    let valid = deposit_validator().validate(&draft).unwrap();
    assert_eq!(
        valid.into_record().into_value(),
        json!({
            "gateway": { "provider": "coingate", "config": { "AUTH_TOKEN": "tok", "ENVIRONMENT": "test" } }
        })
    );
}

#[test]
fn provider_block_unknown_provider() {
    let draft = record(json!({ "gateway": { "provider": "paypal", "config": {} } }));
    assert_eq!(
        deposit_validator().validate(&draft).unwrap_err(),
        vec![ValidationError::new("gateway.provider", "unknown provider")]
    );
}

#[test]
fn provider_block_must_be_object() {
    let draft = record(json!({ "gateway": "coinbase" }));
    assert_eq!(
        deposit_validator().validate(&draft).unwrap_err(),
        vec![ValidationError::new("gateway", "expected a provider config block")]
    );
}

// ── Cross-field rules ────────────────────────────────────────────

#[test]
fn record_rules_run_after_field_rules() {
    let schema = RecordSchema::new(
        "banner",
        vec![
            FieldRule::text("caption").optional(),
            FieldRule::file_ref("image").optional(),
        ],
    )
    .with_rule(Arc::new(|r: &Record| {
        let has_caption = r.get_str("caption").is_some_and(|c| !c.is_empty());
        let has_image = r.get_str("image").is_some_and(|i| !i.is_empty());
        if has_caption && !has_image {
            vec![ValidationError::new("image", "required when a caption is set")]
        } else {
            Vec::new()
        }
    }));
    let validator = SchemaValidator::new(schema);

    assert!(validator.validate(&record(json!({}))).is_ok());
    assert_eq!(
        validator
            .validate(&record(json!({ "caption": "Hi" })))
            .unwrap_err(),
        vec![ValidationError::new("image", "required when a caption is set")]
    );
}

#[test]
fn validation_error_display() {
    assert_eq!(ValidationError::new("title", "required").to_string(), "title: required");
}

// ── Totality ─────────────────────────────────────────────────────

fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        "[a-z<>/ ]{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    })
}

proptest! {
    /// Validation terminates on arbitrary drafts and either passes with only
    /// declared fields or reports at least one error.
    #[test]
    fn validation_is_total(
        title in json_strategy(),
        description in json_strategy(),
        image in json_strategy(),
        extra in json_strategy(),
    ) {
        let draft = record(json!({
            "title": title,
            "description": description,
            "image": image,
            "extra": extra,
        }));
        match mission_validator().validate(&draft) {
            Ok(valid) => prop_assert!(valid.as_record().get("extra").is_none()),
            Err(errors) => prop_assert!(!errors.is_empty()),
        }
    }
}
