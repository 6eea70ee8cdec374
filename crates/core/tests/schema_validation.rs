//! Validates the JSON this crate emits against the formal schemas in
//! schema/submission-schema.json and schema/question-schema.json.

use std::path::Path;

use canvass_core::{Answer, Catalog, Question, QuestionPayload, SubmissionRecord};
use time::macros::datetime;

fn validator(name: &str) -> jsonschema::Validator {
    let schema_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../schema")
        .join(name);
    let schema_src = std::fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
    let schema_value: serde_json::Value = serde_json::from_str(&schema_src).unwrap();
    jsonschema::validator_for(&schema_value)
        .unwrap_or_else(|e| panic!("Failed to compile schema: {}", e))
}

#[test]
fn default_catalog_matches_question_schema() {
    let validator = validator("question-schema.json");
    let catalog = serde_json::to_value(Catalog::default_questions()).unwrap();
    let mut failures = Vec::new();
    for question in catalog.as_array().unwrap() {
        if let Err(error) = validator.validate(question) {
            failures.push(format!("{}: {}", question, error));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn scale_without_options_fails_question_schema() {
    let validator = validator("question-schema.json");
    let instance = serde_json::json!({"id": 3, "type": "emoji_scale", "text": "Rate us"});
    assert!(validator.validate(&instance).is_err());

    // The typed payload agrees with the schema.
    let payload: QuestionPayload = serde_json::from_value(instance).unwrap();
    assert!(Question::try_from(payload).is_err());
}

#[test]
fn submission_record_matches_submission_schema() {
    let validator = validator("submission-schema.json");
    let record = SubmissionRecord::new(
        "Team A",
        vec![Answer::new(1, 4), Answer::new(2, "more pairing")],
        datetime!(2025-06-01 09:30 UTC),
    )
    .unwrap();
    let instance = serde_json::to_value(&record).unwrap();
    if let Err(error) = validator.validate(&instance) {
        panic!("schema validation failed: {}", error);
    }
}

#[test]
fn submission_schema_rejects_empty_answers() {
    let validator = validator("submission-schema.json");
    let instance = serde_json::json!({
        "submissionId": "x",
        "groupId": "G1",
        "answers": [],
        "timestamp": "2025-06-01T09:30:00Z"
    });
    assert!(validator.validate(&instance).is_err());
    assert!(canvass_core::payload::submission_from_value(&instance).is_err());
}
