use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

/// Opens (creating if needed) the workspace database.
///
/// The persisted layout mirrors the web app this replaces: each logical
/// collection is one independently-keyed JSON document in a single
/// key/value table, read and written whole.
pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("scs.sqlite3");
    let conn = Connection::open(db_path)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

pub fn ensure_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS collections(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

pub fn collection_get_json(
    conn: &Connection,
    key: &str,
) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM collections WHERE key = ?", [key], |r| {
            r.get(0)
        })
        .optional()?;
    match raw {
        Some(s) => {
            // Stored documents are never repaired; a malformed one is an error.
            let value = serde_json::from_str(&s)
                .with_context(|| format!("stored collection '{}' is not valid JSON", key))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

pub fn collection_set_json(
    conn: &Connection,
    key: &str,
    value: &serde_json::Value,
) -> anyhow::Result<()> {
    let raw = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO collections(key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = ?2",
        (key, raw),
    )?;
    Ok(())
}

pub fn collection_remove(conn: &Connection, key: &str) -> anyhow::Result<()> {
    conn.execute("DELETE FROM collections WHERE key = ?", [key])?;
    Ok(())
}
