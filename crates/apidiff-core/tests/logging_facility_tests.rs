#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use apidiff_core::errors::{ApiDiffError, ExError, ExErrorKind};
use apidiff_core::logging_facility::test_capture::init_test_capture;
use apidiff_core::{build_canonical_spec, compare_specs, log_op_end, log_op_error, log_op_start};
use apidiff_core::{EngineConfig, NoopSchemaDiffer};
use apidiff_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_BREAKING_COUNT, FIELD_COMPONENT,
    FIELD_DURATION_MS, FIELD_ENTRY_COUNT, FIELD_ERR_CODE, FIELD_ERR_KIND, FIELD_PATH_COUNT,
    FIELD_SPEC_FORMAT, FIELD_SPEC_LOCATION,
};
use serde_json::json;

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    capture.assert_event_exists(op_name, EVENT_START);
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].fields.get(FIELD_DURATION_MS), Some(&"42".to_string()));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ApiDiffError::CircularReference {
        reference: "#/definitions/A".to_string(),
        chain: vec!["#/definitions/A".to_string(), "#/definitions/A".to_string()],
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let error_event = capture
        .events_for_op(op_name)
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event");

    assert_eq!(
        error_event.fields.get(FIELD_ERR_CODE),
        Some(&"ERR_CIRCULAR_REFERENCE".to_string())
    );
    assert_eq!(
        error_event.fields.get(FIELD_ERR_KIND),
        Some(&"CircularReference".to_string())
    );
}

#[test]
fn test_log_macros_with_multiple_fields() {
    let capture = init_test_capture();
    let op_name = "test_log_macros_fields_unique_4";

    log_op_start!(op_name, source = "specs/v1.yaml", destination = "specs/v2.yaml");

    let start_event = capture
        .events_for_op(op_name)
        .into_iter()
        .next()
        .expect("Should have start event");

    assert_eq!(
        start_event.fields.get("source"),
        Some(&"specs/v1.yaml".to_string())
    );
    assert_eq!(
        start_event.fields.get("destination"),
        Some(&"specs/v2.yaml".to_string())
    );
}

#[test]
fn test_canonical_build_logs_document_summary() {
    let capture = init_test_capture();
    let document = common::json_doc(
        "logging-unique-build.json",
        json!({"swagger": "2.0", "paths": {"/a": {}, "/b": {}}}),
    );

    build_canonical_spec(&document, &EngineConfig::default()).unwrap();

    let built = capture
        .events()
        .into_iter()
        .find(|e| {
            e.fields.get(FIELD_SPEC_LOCATION).map(String::as_str) == Some("logging-unique-build.json")
        })
        .expect("Should have a build summary event");
    assert_eq!(built.fields.get(FIELD_SPEC_FORMAT), Some(&"swagger2".to_string()));
    assert_eq!(built.fields.get(FIELD_PATH_COUNT), Some(&"2".to_string()));
    assert!(built.fields.contains_key(FIELD_COMPONENT));
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_capture_assert_event_exists_fails() {
    let capture = init_test_capture();
    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}

#[test]
fn test_compare_emits_correlated_start_and_end() {
    let capture = init_test_capture();
    let source = common::json_doc(
        "logging-unique-source.json",
        json!({"swagger": "2.0", "basePath": "/v1", "paths": {}}),
    );
    let destination = common::json_doc(
        "logging-unique-destination.json",
        json!({"swagger": "2.0", "basePath": "/v2", "paths": {}}),
    );

    compare_specs(
        &source,
        &destination,
        &NoopSchemaDiffer,
        &EngineConfig::default(),
    )
    .unwrap();

    let events = capture.events_for_op("compare_specs");
    let start = events
        .iter()
        .find(|e| {
            e.event.as_deref() == Some(EVENT_START)
                && e.fields.get("source").map(String::as_str) == Some("logging-unique-source.json")
        })
        .expect("Should have start event for this comparison");
    let run_id = start.run_id.clone().expect("start event carries run_id");

    let end = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END) && e.run_id.as_deref() == Some(run_id.as_str()))
        .expect("Should have end event with the same run_id");
    assert_eq!(end.fields.get(FIELD_ENTRY_COUNT), Some(&"2".to_string()));
    assert_eq!(end.fields.get(FIELD_BREAKING_COUNT), Some(&"2".to_string()));
}

#[test]
fn test_failed_compare_emits_error_event() {
    let capture = init_test_capture();
    let source = common::json_doc(
        "logging-unique-cycle.json",
        json!({
            "swagger": "2.0",
            "paths": {"/a": {"$ref": "#/paths/~1b"}, "/b": {"$ref": "#/paths/~1a"}}
        }),
    );

    let err: ExError = compare_specs(&source, &source, &NoopSchemaDiffer, &EngineConfig::default())
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::CircularReference);

    let events = capture.events_for_op("compare_specs");
    let start = events
        .iter()
        .find(|e| {
            e.event.as_deref() == Some(EVENT_START)
                && e.fields.get("source").map(String::as_str) == Some("logging-unique-cycle.json")
        })
        .expect("Should have start event");
    let run_id = start.run_id.clone().unwrap();
    let failure = events
        .iter()
        .find(|e| {
            e.event.as_deref() == Some(EVENT_END_ERROR) && e.run_id.as_deref() == Some(run_id.as_str())
        })
        .expect("Should have error event");
    assert_eq!(
        failure.fields.get(FIELD_ERR_CODE),
        Some(&"ERR_CIRCULAR_REFERENCE".to_string())
    );
}
