//! Unit and behavioural tests for the validation worker.


use std::io::Cursor;

use mockall::mock;
use rstest::rstest;
use serde_json::{Value, json};
use strudel_transpiler::{
    Loc, LocationRange, StrudelTranspiler, Transpile, TranspileError, TranspileOptions, Transpiled,
};

use crate::{Shutdown, VALIDATION_OPTIONS, Worker, serve};

mock! {
    pub Transpiler {}
    impl Transpile for Transpiler {
        fn transpile(
            &mut self,
            code: &str,
            options: &TranspileOptions,
        ) -> Result<Transpiled, TranspileError>;
    }
}

/// Runs the worker over `input` and returns the decoded output lines.
pub(crate) fn run_lines<T: Transpile>(transpiler: T, input: &str) -> (Shutdown, Vec<Value>) {
    let mut output = Vec::new();
    let shutdown = serve(
        || Ok::<_, String>(transpiler),
        Cursor::new(input.as_bytes().to_vec()),
        &mut output,
    )
    .expect("serve");
    (shutdown, decode_lines(&output))
}

pub(crate) fn decode_lines(output: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(output)
        .lines()
        .map(|line| serde_json::from_str(line).expect("response line is JSON"))
        .collect()
}

fn untouched_transpiler() -> MockTranspiler {
    let mut transpiler = MockTranspiler::new();
    transpiler.expect_transpile().never();
    transpiler
}

#[rstest]
#[case(json!({"type": "validate", "id": 2, "code": ""}))]
#[case(json!({"type": "validate", "id": 2, "code": null}))]
#[case(json!({"type": "validate", "id": 2}))]
#[case(json!({"type": "validate", "id": 2, "code": 42}))]
#[case(json!({"type": "validate", "id": 2, "code": ["s(\"bd\")"]}))]
fn unusable_code_is_rejected_without_compiling(#[case] request: Value) {
    let mut worker = Worker::new(untouched_transpiler());
    let response = worker.handle_line(&request.to_string());

    assert_eq!(
        serde_json::to_value(&response).expect("serialise"),
        json!({"id": 2, "valid": false, "error": "Empty or invalid code"})
    );
}

#[test]
fn validation_passes_fixed_options_and_the_snippet() {
    let mut transpiler = MockTranspiler::new();
    transpiler
        .expect_transpile()
        .withf(|code, options| code == "s(\"bd sd\")" && *options == VALIDATION_OPTIONS)
        .once()
        .returning(|_, _| Ok(Transpiled::new("")));

    let mut worker = Worker::new(transpiler);
    let response = worker.handle_line(r#"{"type":"validate","id":3,"code":"s(\"bd sd\")"}"#);

    assert_eq!(
        serde_json::to_value(&response).expect("serialise"),
        json!({"id": 3, "valid": true})
    );
}

#[rstest]
#[case::flat(TranspileError::at("Unexpected token (2:4)", Loc::new(2, 4)), json!(2), json!(4))]
#[case::nested(
    TranspileError::spanning(
        "unclosed \"[\" in mini-notation",
        LocationRange::new(Loc::new(1, 7), Loc::new(1, 8)),
    ),
    json!(1),
    json!(7)
)]
#[case::none(TranspileError::new("opaque failure"), Value::Null, Value::Null)]
fn compile_errors_surface_message_and_location(
    #[case] failure: TranspileError,
    #[case] line: Value,
    #[case] column: Value,
) {
    let message = failure.message().to_owned();
    let mut transpiler = MockTranspiler::new();
    transpiler
        .expect_transpile()
        .once()
        .returning(move |_, _| Err(failure.clone()));

    let mut worker = Worker::new(transpiler);
    let response = worker.handle_line(r#"{"type":"validate","id":"v","code":"x"}"#);

    assert_eq!(
        serde_json::to_value(&response).expect("serialise"),
        json!({
            "id": "v",
            "valid": false,
            "error": message,
            "line": line,
            "column": column,
        })
    );
}

#[rstest]
#[case(r#"{"type":"ping","id":1}"#, json!({"id": 1, "pong": true}))]
#[case(r#"{"type":"ping","id":1,"code":"s(\"bd\")"}"#, json!({"id": 1, "pong": true}))]
#[case(r#"{"type":"explode","id":5}"#, json!({"id": 5, "error": "unknown request type"}))]
#[case(r#"{"id":6}"#, json!({"id": 6, "error": "unknown request type"}))]
#[case(r#"{"type":"ping"}"#, json!({"pong": true}))]
fn non_validation_requests_never_compile(#[case] line: &str, #[case] expected: Value) {
    let mut worker = Worker::new(untouched_transpiler());
    let response = worker.handle_line(line);
    assert_eq!(serde_json::to_value(&response).expect("serialise"), expected);
}

#[rstest]
#[case("not json")]
#[case("")]
#[case("[1,2,3]")]
#[case("null")]
fn malformed_lines_get_an_error_without_id(#[case] line: &str) {
    let mut worker = Worker::new(untouched_transpiler());
    let response = serde_json::to_value(worker.handle_line(line)).expect("serialise");

    let Value::Object(fields) = response else {
        panic!("response should be an object");
    };
    assert!(!fields.contains_key("id"));
    let error = fields
        .get("error")
        .and_then(Value::as_str)
        .expect("error text");
    assert!(error.starts_with("parse error: "), "got {error}");
}

#[test]
fn readiness_precedes_every_response() {
    let input = "{\"type\":\"ping\",\"id\":1}\nnot json\n{\"type\":\"ping\",\"id\":2}\n";
    let (shutdown, lines) = run_lines(untouched_transpiler(), input);

    assert_eq!(shutdown, Shutdown::InputClosed);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines.first(), Some(&json!({"ready": true})));
    assert_eq!(lines.get(1), Some(&json!({"id": 1, "pong": true})));
    assert_eq!(lines.get(3), Some(&json!({"id": 2, "pong": true})));
}

#[test]
fn final_line_without_newline_is_answered() {
    let (_, lines) = run_lines(untouched_transpiler(), "{\"type\":\"ping\",\"id\":9}");
    assert_eq!(lines.last(), Some(&json!({"id": 9, "pong": true})));
}

#[test]
fn crlf_and_invalid_utf8_lines_are_answered() {
    let mut input = b"{\"type\":\"ping\",\"id\":1}\r\n".to_vec();
    input.extend_from_slice(b"\xff\xfe\n");

    let mut output = Vec::new();
    serve(
        || Ok::<_, String>(untouched_transpiler()),
        Cursor::new(input),
        &mut output,
    )
    .expect("serve");
    let lines = decode_lines(&output);

    assert_eq!(lines.len(), 3);
    assert_eq!(lines.get(1), Some(&json!({"id": 1, "pong": true})));
    assert!(lines.get(2).and_then(|line| line.get("error")).is_some());
}

#[test]
fn load_failure_emits_only_a_fatal_line() {
    let mut output = Vec::new();
    let shutdown = serve(
        || Err::<MockTranspiler, _>("incompatible grammar ABI"),
        Cursor::new(b"{\"type\":\"ping\",\"id\":1}\n".to_vec()),
        &mut output,
    )
    .expect("serve");

    assert_eq!(shutdown, Shutdown::LoadFailed);
    assert_eq!(
        decode_lines(&output),
        vec![json!({
            "error": "failed to load transpiler: incompatible grammar ABI",
            "fatal": true,
        })]
    );
}

#[test]
fn real_transpiler_answers_the_documented_scenarios() {
    let transpiler = StrudelTranspiler::load().expect("grammar loads");
    let input = concat!(
        "{\"type\":\"ping\",\"id\":1}\n",
        "{\"type\":\"validate\",\"id\":2,\"code\":\"\"}\n",
        "{\"type\":\"validate\",\"id\":3,\"code\":\"s(\\\"bd sd\\\")\"}\n",
        "not json\n",
        "{\"type\":\"explode\",\"id\":5}\n",
    );

    let (shutdown, lines) = run_lines(transpiler, input);

    assert_eq!(shutdown, Shutdown::InputClosed);
    assert_eq!(lines.len(), 6);
    assert_eq!(lines.first(), Some(&json!({"ready": true})));
    assert_eq!(lines.get(1), Some(&json!({"id": 1, "pong": true})));
    assert_eq!(
        lines.get(2),
        Some(&json!({"id": 2, "valid": false, "error": "Empty or invalid code"}))
    );
    assert_eq!(lines.get(3), Some(&json!({"id": 3, "valid": true})));
    assert_eq!(
        lines.get(5),
        Some(&json!({"id": 5, "error": "unknown request type"}))
    );

    let parse_error = lines
        .get(4)
        .and_then(|line| line.get("error"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    assert!(parse_error.starts_with("parse error: "), "got {parse_error}");
    assert!(lines.get(4).and_then(|line| line.get("id")).is_none());
}

#[test]
fn real_transpiler_reports_both_coordinates_or_neither() {
    let transpiler = StrudelTranspiler::load().expect("grammar loads");
    let input = concat!(
        "{\"type\":\"validate\",\"id\":1,\"code\":\"s(\\\"bd sd\\\"\"}\n",
        "{\"type\":\"validate\",\"id\":2,\"code\":\"note(\\\"<c e\\\")\"}\n",
    );

    let (_, lines) = run_lines(transpiler, input);

    for response in lines.iter().skip(1) {
        assert_eq!(response.get("valid"), Some(&json!(false)));
        let error = response.get("error").and_then(Value::as_str).unwrap_or_default();
        assert!(!error.is_empty());
        let line = response.get("line").expect("line key");
        let column = response.get("column").expect("column key");
        assert_eq!(line.is_u64(), column.is_u64());
    }
}

#[rstest]
#[case::unclosed_call("s(\"bd sd\"", "Expected \")\" (1:9)", 1, 9)]
#[case::unclosed_stack("stack(\n  s(\"bd\"),\n  s(\"hh\"\n", "Expected \")\" (3:8)", 3, 8)]
#[case::extra_paren("note(\"c e g\").sound(\"piano\"))", "Unexpected token (1:28)", 1, 28)]
#[case::trailing_method("s(\"bd\").fast(", "Expected \")\" (1:13)", 1, 13)]
#[case::type_annotation("const x: number = 1\nx", "Unexpected token (1:7)", 1, 7)]
fn real_transpiler_locates_common_mistakes(
    #[case] code: &str,
    #[case] message: &str,
    #[case] line: u32,
    #[case] column: u32,
) {
    let transpiler = StrudelTranspiler::load().expect("grammar loads");
    let request = json!({"type": "validate", "id": 1, "code": code});

    let (_, lines) = run_lines(transpiler, &format!("{request}\n"));

    assert_eq!(
        lines.get(1),
        Some(&json!({
            "id": 1,
            "valid": false,
            "error": message,
            "line": line,
            "column": column,
        }))
    );
}
