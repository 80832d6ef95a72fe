use crate::{
    CoreError,
    transcribe::{ResponseFormat, error_for_status, parse_success_body},
};

/// WHAT: 401 and 403 map to the auth error variant
/// WHY: Auth failures get distinct user messaging and are never retried
#[test]
fn given_auth_statuses_when_classified_then_auth_error_with_status() {
    for status in [401u16, 403] {
        let err = error_for_status(status, "denied");
        assert!(matches!(
            err,
            CoreError::TranscriptionAuth { status: s, .. } if s == status
        ));
    }
}

/// WHAT: Other non-success statuses map to an API error with a body snippet
/// WHY: The status and a bounded body excerpt are what ends up in the log
#[test]
fn given_server_error_when_classified_then_api_error_with_snippet() {
    let long_body = "x".repeat(1000);

    let err = error_for_status(500, &long_body);
    assert!(matches!(
        err,
        CoreError::TranscriptionApi { status: 500, ref body, .. } if body.len() == 300
    ));
}

/// WHAT: Plain-text responses are trimmed and returned as-is
/// WHY: Whisper-style APIs emit a leading space as a tokenization artifact
#[test]
#[allow(clippy::unwrap_used)]
fn given_text_format_when_parsing_then_body_is_trimmed() {
    let text = parse_success_body(ResponseFormat::Text, " hello world\n").unwrap();
    assert_eq!(text, "hello world");
}

/// WHAT: verbose_json responses yield the `text` field
/// WHY: Timestamps and segments are ignored; only the text is injected
#[test]
#[allow(clippy::unwrap_used)]
fn given_verbose_json_when_parsing_then_text_field_extracted() {
    let body = r#"{"text": " hello world", "duration": 1.5, "segments": []}"#;

    let text = parse_success_body(ResponseFormat::VerboseJson, body).unwrap();

    assert_eq!(text, "hello world");
}

/// WHAT: Malformed or text-less JSON is an InvalidResponse error
/// WHY: A missing field must surface as a session error, not a panic
#[test]
fn given_bad_json_when_parsing_then_invalid_response() {
    assert!(matches!(
        parse_success_body(ResponseFormat::VerboseJson, "not json"),
        Err(CoreError::InvalidResponse { .. })
    ));
    assert!(matches!(
        parse_success_body(ResponseFormat::VerboseJson, r#"{"duration": 1.5}"#),
        Err(CoreError::InvalidResponse { .. })
    ));
}

/// WHAT: Response-format selectors serialize to the documented wire values
/// WHY: The form field value is part of the external interface
#[test]
fn given_formats_when_serialized_then_wire_values_match() {
    assert_eq!(ResponseFormat::Text.as_str(), "text");
    assert_eq!(ResponseFormat::VerboseJson.as_str(), "verbose_json");
}
