use serde_json::json;

use crate::auth;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, require_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;

fn handle_login(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let username = get_required_str(params, "username")?;
    let password = get_required_str(params, "password")?;

    let Some(user) = auth::authenticate(&username, &password) else {
        return Err(HandlerErr::new(
            "auth_failed",
            "invalid username or password",
        ));
    };

    let store = Store::new(conn);
    store.set_current_user(Some(&user))?;
    Ok(json!({ "user": serde_json::to_value(&user).map_err(anyhow::Error::from)? }))
}

fn handle_logout(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    Store::new(conn).set_current_user(None)?;
    Ok(json!({}))
}

fn handle_current(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let user = Store::new(conn).current_user()?;
    Ok(json!({ "user": serde_json::to_value(&user).map_err(anyhow::Error::from)? }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "auth.login" => handle_login(state, &req.params),
        "auth.logout" => handle_logout(state),
        "auth.current" => handle_current(state),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
