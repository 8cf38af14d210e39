use serde_json::json;

use crate::auth::TEACHER_ID_PREFIX;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, require_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::Teacher;
use crate::store::Store;

fn parse_teacher(params: &serde_json::Value) -> Result<Teacher, HandlerErr> {
    Ok(Teacher {
        id: get_required_str(params, "id")?,
        name: get_required_str(params, "name")?,
        subject: get_required_str(params, "subject")?,
    })
}

fn handle_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let teachers = Store::new(conn).teachers()?;
    Ok(json!({ "teachers": serde_json::to_value(teachers).map_err(anyhow::Error::from)? }))
}

/// Teacher ids come from the outside (they double as login names), so this
/// is the one create path that checks identity rules: the fixed prefix and
/// uniqueness among teachers. The store itself stays append-only.
fn handle_create(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let teacher = parse_teacher(params)?;

    if !teacher.id.starts_with(TEACHER_ID_PREFIX) {
        return Err(HandlerErr::new(
            "bad_params",
            format!("teacher id must start with '{}'", TEACHER_ID_PREFIX),
        ));
    }

    let store = Store::new(conn);
    if store.teachers()?.iter().any(|t| t.id == teacher.id) {
        return Err(HandlerErr::new(
            "duplicate_id",
            format!("teacher id '{}' already exists", teacher.id),
        ));
    }

    let teacher_id = teacher.id.clone();
    store.add_teacher(teacher)?;
    Ok(json!({ "teacherId": teacher_id }))
}

fn handle_update(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let teacher = parse_teacher(params)?;
    let updated = Store::new(conn).update_teacher(teacher)?;
    Ok(json!({ "updated": updated }))
}

fn handle_delete(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let teacher_id = get_required_str(params, "teacherId")?;
    // No cascade: students keep their (now dangling) teacherId reference.
    Store::new(conn).delete_teacher(&teacher_id)?;
    Ok(json!({}))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "teachers.list" => handle_list(state),
        "teachers.create" => handle_create(state, &req.params),
        "teachers.update" => handle_update(state, &req.params),
        "teachers.delete" => handle_delete(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
