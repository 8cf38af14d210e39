use std::collections::HashMap;

use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, get_required_u32, require_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{RiskFlags, Student};
use crate::scoring::{self, EqThresholds};
use crate::store::Store;

fn find_student(store: &Store, student_id: &str) -> Result<Student, HandlerErr> {
    store
        .students()?
        .into_iter()
        .find(|s| s.id == student_id)
        .ok_or_else(|| HandlerErr::new("not_found", format!("student '{}' not found", student_id)))
}

fn parse_answers(params: &serde_json::Value) -> Result<HashMap<u8, u8>, HandlerErr> {
    let Some(obj) = params.get("answers").and_then(|v| v.as_object()) else {
        return Err(HandlerErr::new("bad_params", "missing params.answers"));
    };
    let mut answers = HashMap::with_capacity(obj.len());
    for (key, value) in obj {
        let id: u8 = key
            .parse()
            .map_err(|_| HandlerErr::new("bad_params", format!("bad question id '{}'", key)))?;
        let level = value
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .ok_or_else(|| {
                HandlerErr::new("bad_params", format!("bad response for question {}", id))
            })?;
        answers.insert(id, level);
    }
    Ok(answers)
}

fn handle_submit_sdq(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let student_id = get_required_str(params, "studentId")?;
    let answers = parse_answers(params)?;

    let store = Store::new(conn);
    let mut student = find_student(&store, &student_id)?;
    // Scoring validates completeness; on rejection nothing has been written.
    let result = scoring::score_sdq(&answers)?;
    student.sdq = Some(result.clone());
    store.update_student(student)?;
    Ok(json!({ "sdq": serde_json::to_value(result).map_err(anyhow::Error::from)? }))
}

fn handle_submit_eq(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let student_id = get_required_str(params, "studentId")?;
    let good = get_required_u32(params, "good")?;
    let smart = get_required_u32(params, "smart")?;
    let happy = get_required_u32(params, "happy")?;

    let store = Store::new(conn);
    let mut student = find_student(&store, &student_id)?;
    let result = scoring::score_eq(good, smart, happy, &EqThresholds::default());
    student.eq = Some(result.clone());
    store.update_student(student)?;
    Ok(json!({ "eq": serde_json::to_value(result).map_err(anyhow::Error::from)? }))
}

fn handle_submit_risk(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let student_id = get_required_str(params, "studentId")?;
    let Some(raw) = params.get("flags") else {
        return Err(HandlerErr::new("bad_params", "missing params.flags"));
    };
    let flags: RiskFlags = serde_json::from_value(raw.clone())
        .map_err(|e| HandlerErr::new("bad_params", format!("invalid risk flags: {}", e)))?;

    let store = Store::new(conn);
    let mut student = find_student(&store, &student_id)?;
    let result = scoring::score_risk(flags);
    student.risk = Some(result.clone());
    store.update_student(student)?;
    Ok(json!({ "risk": serde_json::to_value(result).map_err(anyhow::Error::from)? }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "assessments.submitSdq" => handle_submit_sdq(state, &req.params),
        "assessments.submitEq" => handle_submit_eq(state, &req.params),
        "assessments.submitRisk" => handle_submit_risk(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
