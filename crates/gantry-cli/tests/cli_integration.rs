use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A trace file on disk plus the temp dir that owns it.
struct TraceFixture {
    _temp_dir: TempDir,
    trace_path: PathBuf,
}

impl TraceFixture {
    fn new(contents: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let trace_path = temp_dir.path().join("trace.jsonl");
        fs::write(&trace_path, contents).expect("Failed to write trace");
        Self {
            _temp_dir: temp_dir,
            trace_path,
        }
    }

    fn path(&self) -> &PathBuf {
        &self.trace_path
    }

    fn sibling(&self, name: &str) -> PathBuf {
        self._temp_dir.path().join(name)
    }
}

fn mixed_trace() -> &'static str {
    concat!(
        r#"{"timestamp":"2024-05-01T10:00:00Z","type":"llm_call","event":"start","data":{"id":"m1","model":"gemini-2.5-flash","status":"started","startTime":1000,"requestText":"[{\"role\":\"user\",\"parts\":[{\"text\":\"find TODOs\"}]}]"}}"#,
        "\n",
        r#"{"timestamp":"2024-05-01T10:00:02Z","type":"llm_call","event":"end","data":{"id":"m1","status":"completed","endTime":3000,"duration":2000,"totalTokens":120}}"#,
        "\n",
        r#"{"timestamp":"2024-05-01T10:00:02.100Z","type":"tool_call","event":"completed","data":{"id":"t1","toolName":"grep","startTime":3100,"endTime":3400,"duration":300,"args":{"pattern":"TODO"},"resultDisplay":"3 matches"}}"#,
        "\n",
        r#"{"timestamp":"2024-05-01T10:00:03Z","type":"user_confirmation","event":"approval_requested","data":{"id":"c1","toolCallId":"t2","confirmationType":"exec"}}"#,
        "\n",
        r#"{"timestamp":"2024-05-01T10:00:05Z","type":"tool_call","event":"completed","data":{"id":"t2","toolName":"write_file","startTime":3500,"endTime":6000,"duration":2500,"awaitingApprovalDuration":1800}}"#,
        "\n",
        r#"{"timestamp":"2024-05-01T10:00:06Z","type":"embedding_call","event":"completed","data":{"id":"e1","model":"text-embedding-004","startTime":6100,"endTime":6200,"duration":100,"textCount":4,"dimensions":768}}"#,
        "\n",
    )
}

fn gantry() -> Command {
    Command::cargo_bin("gantry").expect("Failed to find gantry binary")
}

#[test]
fn bare_invocation_shows_guidance() {
    gantry()
        .assert()
        .success()
        .stdout(predicate::str::contains("agent runtime trace analyzer"))
        .stdout(predicate::str::contains("gantry summary"));
}

#[test]
fn summary_prints_category_counts() {
    let fixture = TraceFixture::new(mixed_trace());
    gantry()
        .arg("summary")
        .arg(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("LLM calls"))
        .stdout(predicate::str::contains(
            "total 1 | completed 1 | errors 0 | cancelled 0 | in-flight 0",
        ))
        .stdout(predicate::str::contains("Tool calls"))
        .stdout(predicate::str::contains(
            "total 2 | completed 2 | errors 0 | cancelled 0 | in-flight 0",
        ))
        .stdout(predicate::str::contains("tokens: 120 total"))
        .stdout(predicate::str::contains("Approval waits"))
        .stdout(predicate::str::contains("write_file"))
        .stdout(predicate::str::contains("Embedding calls"))
        .stdout(predicate::str::contains("Recent events"));
}

#[test]
fn summary_json_is_parseable() {
    let fixture = TraceFixture::new(mixed_trace());
    let output = gantry()
        .arg("summary")
        .arg(fixture.path())
        .arg("--format")
        .arg("json")
        .output()
        .expect("Failed to run gantry");
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    assert_eq!(report["stats"]["events_seen"], 6);
    assert_eq!(report["stats"]["model"]["total_tokens"], 120);
    assert_eq!(report["stats"]["tool"]["calls"]["completed"], 2);
    assert_eq!(report["stats"]["tool"]["approval"]["count"], 1);
    assert_eq!(report["stats"]["unresolved_confirmations"], 0);
}

#[test]
fn chart_writes_self_contained_html() {
    let fixture = TraceFixture::new(mixed_trace());
    let chart_path = fixture.sibling("out.html");

    gantry()
        .arg("chart")
        .arg(fixture.path())
        .arg("-o")
        .arg(&chart_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 segments"));

    let html = fs::read_to_string(&chart_path).expect("chart file missing");
    assert!(html.contains("<!DOCTYPE html>"));
    assert_eq!(html.matches("class=\"bar\"").count(), 4);
    assert!(html.contains("Grep"));
    assert!(html.contains("Write File"));
}

#[test]
fn chart_on_dangling_only_trace_warns() {
    let fixture = TraceFixture::new(
        "{\"timestamp\":1,\"type\":\"llm_call\",\"event\":\"start\",\"data\":{\"id\":\"m1\",\"startTime\":0}}\n",
    );
    let chart_path = fixture.sibling("out.html");

    gantry()
        .arg("chart")
        .arg(fixture.path())
        .arg("-o")
        .arg(&chart_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("no timeline-eligible calls"));

    let html = fs::read_to_string(&chart_path).expect("chart file missing");
    assert!(html.contains("No timeline-eligible calls"));
}

#[test]
fn extract_writes_full_records() {
    let fixture = TraceFixture::new(mixed_trace());
    let out_path = fixture.sibling("parsed.json");

    gantry()
        .arg("extract")
        .arg(fixture.path())
        .arg("-o")
        .arg(&out_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsed 6 records"))
        .stdout(predicate::str::contains("llm_call.start"));

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    let records = parsed.as_array().unwrap();
    assert_eq!(records.len(), 6);
    // Nested JSON string was expanded into raw + parsed
    assert_eq!(records[0]["data"]["requestText"]["type"], "json_string");
}

#[test]
fn extract_projects_requested_fields() {
    let fixture = TraceFixture::new(mixed_trace());
    let out_path = fixture.sibling("fields.json");

    gantry()
        .arg("extract")
        .arg(fixture.path())
        .arg("-o")
        .arg(&out_path)
        .arg("--fields")
        .arg("id")
        .arg("event")
        .assert()
        .success();

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    let records = parsed.as_array().unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[0]["id"], "m1");
    assert_eq!(records[0]["event"], "start");
    assert!(records[0].get("data").is_none());
}

#[test]
fn fusion_reports_savings() {
    let fixture = TraceFixture::new(mixed_trace());
    gantry()
        .arg("fusion")
        .arg(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("unique calls:     5"))
        .stdout(predicate::str::contains("llm_call:completed"))
        .stdout(predicate::str::contains("Savings: 1 events"));
}

#[test]
fn malformed_lines_are_diagnosed_not_fatal() {
    let mut contents = String::from("this is not json\n\n");
    contents.push_str(mixed_trace());
    let fixture = TraceFixture::new(&contents);

    gantry()
        .arg("summary")
        .arg(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("6 decoded, 1 lines skipped"));
}

#[test]
fn missing_trace_file_is_fatal() {
    gantry()
        .arg("summary")
        .arg("/nonexistent/trace.jsonl")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
