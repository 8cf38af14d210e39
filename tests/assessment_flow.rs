use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_scsd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn scsd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn setup(prefix: &str) -> (Child, ChildStdin, BufReader<ChildStdout>, PathBuf, String) {
    let workspace = temp_dir(prefix);
    let (child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "w",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let created = request_ok(
        &mut stdin,
        &mut reader,
        "s",
        "students.create",
        json!({
            "name": "เด็กหญิงประเมิน ครบถ้วน",
            "grade": "ป.3",
            "room": "2",
            "teacherId": "T001"
        }),
    );
    let student_id = created
        .get("studentId")
        .and_then(|v| v.as_str())
        .expect("studentId")
        .to_string();
    (child, stdin, reader, workspace, student_id)
}

fn fetch_student(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    student_id: &str,
) -> serde_json::Value {
    let listed = request_ok(stdin, reader, id, "students.list", json!({}));
    listed
        .get("students")
        .and_then(|v| v.as_array())
        .expect("students")
        .iter()
        .find(|s| s.get("id").and_then(|v| v.as_str()) == Some(student_id))
        .cloned()
        .expect("student present")
}

#[test]
fn full_sdq_submission_scores_and_merges_into_student() {
    let (mut child, mut stdin, mut reader, workspace, student_id) = setup("scs-sdq-full");

    // Raw 2 everywhere: the five reversed questions flip to 0, so each
    // difficulty sub-scale holds one reversed item except emotional.
    let answers: serde_json::Map<String, serde_json::Value> = (1..=25)
        .map(|i: u8| (i.to_string(), json!(2)))
        .collect();
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "assessments.submitSdq",
        json!({ "studentId": student_id, "answers": answers }),
    );
    let sdq = result.get("sdq").expect("sdq result");
    assert_eq!(sdq.get("emotional").and_then(|v| v.as_u64()), Some(10));
    assert_eq!(sdq.get("conduct").and_then(|v| v.as_u64()), Some(8));
    assert_eq!(sdq.get("hyperactivity").and_then(|v| v.as_u64()), Some(6));
    assert_eq!(sdq.get("peer").and_then(|v| v.as_u64()), Some(6));
    assert_eq!(sdq.get("prosocial").and_then(|v| v.as_u64()), Some(10));
    assert_eq!(sdq.get("totalDifficulties").and_then(|v| v.as_u64()), Some(30));
    assert_eq!(sdq.get("status").and_then(|v| v.as_str()), Some("PROBLEM"));

    let student = fetch_student(&mut stdin, &mut reader, "2", &student_id);
    assert_eq!(
        student
            .get("sdq")
            .and_then(|r| r.get("totalDifficulties"))
            .and_then(|v| v.as_u64()),
        Some(30)
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn incomplete_sdq_submission_is_rejected_and_nothing_is_stored() {
    let (mut child, mut stdin, mut reader, workspace, student_id) = setup("scs-sdq-partial");

    let answers: serde_json::Map<String, serde_json::Value> = (1..=24)
        .map(|i: u8| (i.to_string(), json!(1)))
        .collect();
    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "assessments.submitSdq",
        json!({ "studentId": student_id, "answers": answers }),
    );
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        resp.get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("incomplete_input")
    );

    let student = fetch_student(&mut stdin, &mut reader, "2", &student_id);
    assert!(student.get("sdq").is_none(), "rejected submission must not mutate");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn sdq_for_unknown_student_is_not_found() {
    let (mut child, mut stdin, mut reader, workspace, _student_id) = setup("scs-sdq-unknown");

    let answers: serde_json::Map<String, serde_json::Value> = (1..=25)
        .map(|i: u8| (i.to_string(), json!(1)))
        .collect();
    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "assessments.submitSdq",
        json!({ "studentId": "ghost", "answers": answers }),
    );
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        resp.get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("not_found")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn eq_submission_classifies_with_default_thresholds() {
    let (mut child, mut stdin, mut reader, workspace, student_id) = setup("scs-eq");

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "assessments.submitEq",
        json!({ "studentId": student_id, "good": 4, "smart": 4, "happy": 4 }),
    );
    let eq = result.get("eq").expect("eq result");
    assert_eq!(eq.get("total").and_then(|v| v.as_u64()), Some(12));
    assert_eq!(eq.get("level").and_then(|v| v.as_str()), Some("สูงกว่าปกติ"));

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "assessments.submitEq",
        json!({ "studentId": student_id, "good": 2, "smart": 2, "happy": 2 }),
    );
    let eq = result.get("eq").expect("eq result");
    assert_eq!(eq.get("total").and_then(|v| v.as_u64()), Some(6));
    assert_eq!(eq.get("level").and_then(|v| v.as_str()), Some("ปรับปรุง"));

    let student = fetch_student(&mut stdin, &mut reader, "3", &student_id);
    assert_eq!(
        student.get("eq").and_then(|r| r.get("total")).and_then(|v| v.as_u64()),
        Some(6),
        "latest submission replaces the stored result"
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn risk_submission_counts_flags_and_accepts_partial_checklists() {
    let (mut child, mut stdin, mut reader, workspace, student_id) = setup("scs-risk");

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "assessments.submitRisk",
        json!({ "studentId": student_id, "flags": {
            "academic": true, "economy": true, "protection": true
        }}),
    );
    let risk = result.get("risk").expect("risk result");
    assert_eq!(risk.get("status").and_then(|v| v.as_str()), Some("PROBLEM"));
    assert_eq!(risk.get("academic").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(risk.get("health").and_then(|v| v.as_bool()), Some(false));

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "assessments.submitRisk",
        json!({ "studentId": student_id, "flags": {} }),
    );
    assert_eq!(
        result
            .get("risk")
            .and_then(|r| r.get("status"))
            .and_then(|v| v.as_str()),
        Some("NORMAL")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn counseling_log_prepends_newest_first() {
    let (mut child, mut stdin, mut reader, workspace, student_id) = setup("scs-counseling");

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "counseling.add",
        json!({ "studentId": student_id, "topic": "ครั้งแรก", "detail": "-", "result": "-" }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "counseling.add",
        json!({ "studentId": student_id, "topic": "ครั้งที่สอง", "detail": "-", "result": "-" }),
    );

    let student = fetch_student(&mut stdin, &mut reader, "3", &student_id);
    let log = student
        .get("counseling")
        .and_then(|v| v.as_array())
        .expect("counseling log");
    assert_eq!(log.len(), 2);
    assert_eq!(
        log[0].get("topic").and_then(|v| v.as_str()),
        Some("ครั้งที่สอง"),
        "newest record first"
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
