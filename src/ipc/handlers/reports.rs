use std::path::PathBuf;

use serde_json::json;

use crate::export;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_optional_str, get_required_str, require_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;

/// Writes the summary CSV for all students, or for one grade/room group when
/// the filters are given. An empty selection is refused, mirroring the
/// report page's behaviour.
fn handle_export_csv(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let out_path = PathBuf::from(get_required_str(params, "outPath")?);
    let grade = get_optional_str(params, "grade");
    let room = get_optional_str(params, "room");

    let mut students = Store::new(conn).students()?;
    if let Some(g) = &grade {
        students.retain(|s| s.grade == *g);
    }
    if let Some(r) = &room {
        students.retain(|s| s.room == *r);
    }
    if students.is_empty() {
        return Err(HandlerErr::new(
            "not_found",
            "no students match the selected group",
        ));
    }

    export::write_students_summary_csv(&out_path, &students)
        .map_err(|e| HandlerErr::new("export_failed", format!("{e:?}")))?;
    Ok(json!({
        "outPath": out_path.to_string_lossy(),
        "rows": students.len(),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "reports.exportCsv" => handle_export_csv(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
