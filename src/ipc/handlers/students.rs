use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::ipc::error::ok;
use crate::ipc::helpers::{get_optional_str, get_required_str, require_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{CounselingRecord, HomeVisit, Student};
use crate::store::Store;

fn parse_new_student(params: &serde_json::Value) -> Result<Student, HandlerErr> {
    Ok(Student {
        id: Uuid::new_v4().to_string(),
        name: get_required_str(params, "name")?,
        nickname: get_optional_str(params, "nickname").unwrap_or_default(),
        grade: get_required_str(params, "grade")?,
        room: get_required_str(params, "room")?,
        teacher_id: get_required_str(params, "teacherId")?,
        sdq: None,
        eq: None,
        risk: None,
        home_visit: None,
        counseling: None,
    })
}

fn handle_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let students = Store::new(conn).students()?;
    Ok(json!({ "students": serde_json::to_value(students).map_err(anyhow::Error::from)? }))
}

fn handle_create(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let student = parse_new_student(params)?;
    let student_id = student.id.clone();
    Store::new(conn).add_student(student)?;
    Ok(json!({ "studentId": student_id }))
}

fn handle_bulk_create(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let Some(entries) = params.get("students").and_then(|v| v.as_array()) else {
        return Err(HandlerErr::new("bad_params", "missing params.students"));
    };

    let mut batch = Vec::with_capacity(entries.len());
    for entry in entries {
        batch.push(parse_new_student(entry)?);
    }
    let student_ids: Vec<String> = batch.iter().map(|s| s.id.clone()).collect();
    Store::new(conn).bulk_add_students(batch)?;
    Ok(json!({ "studentIds": student_ids }))
}

/// Whole-record replace; the caller sends the complete student back.
fn handle_update(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let Some(raw) = params.get("student") else {
        return Err(HandlerErr::new("bad_params", "missing params.student"));
    };
    let student: Student = serde_json::from_value(raw.clone())
        .map_err(|e| HandlerErr::new("bad_params", format!("invalid student record: {}", e)))?;
    let updated = Store::new(conn).update_student(student)?;
    Ok(json!({ "updated": updated }))
}

fn handle_delete(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let student_id = get_required_str(params, "studentId")?;
    Store::new(conn).delete_student(&student_id)?;
    Ok(json!({}))
}

fn find_student(store: &Store, student_id: &str) -> Result<Student, HandlerErr> {
    store
        .students()?
        .into_iter()
        .find(|s| s.id == student_id)
        .ok_or_else(|| HandlerErr::new("not_found", format!("student '{}' not found", student_id)))
}

fn handle_home_visit_save(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let student_id = get_required_str(params, "studentId")?;
    let Some(raw) = params.get("visit") else {
        return Err(HandlerErr::new("bad_params", "missing params.visit"));
    };
    let visit: HomeVisit = serde_json::from_value(raw.clone())
        .map_err(|e| HandlerErr::new("bad_params", format!("invalid home visit: {}", e)))?;

    let store = Store::new(conn);
    let mut student = find_student(&store, &student_id)?;
    student.home_visit = Some(visit);
    store.update_student(student)?;
    Ok(json!({}))
}

fn handle_counseling_add(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let student_id = get_required_str(params, "studentId")?;
    let record = CounselingRecord {
        id: Uuid::new_v4().to_string(),
        date: Utc::now().to_rfc3339(),
        topic: get_required_str(params, "topic")?,
        detail: get_required_str(params, "detail")?,
        result: get_required_str(params, "result")?,
    };

    let store = Store::new(conn);
    let mut student = find_student(&store, &student_id)?;
    let record_id = record.id.clone();
    // Newest entry first, the order the follow-up timeline renders in.
    let mut log = vec![record];
    log.extend(student.counseling.take().unwrap_or_default());
    student.counseling = Some(log);
    store.update_student(student)?;
    Ok(json!({ "recordId": record_id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => handle_list(state),
        "students.create" => handle_create(state, &req.params),
        "students.bulkCreate" => handle_bulk_create(state, &req.params),
        "students.update" => handle_update(state, &req.params),
        "students.delete" => handle_delete(state, &req.params),
        "homeVisit.save" => handle_home_visit_save(state, &req.params),
        "counseling.add" => handle_counseling_add(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
