use crate::common::events::VigilEvent;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use serde::Serialize;

/// 事件存档行（payload 为序列化后的 JSON 文本）
#[derive(Debug, Clone, Serialize)]
pub struct StoredEvent {
    pub id: String,
    pub project_id: i64,
    pub kind: String,
    pub platform: Option<String>,
    pub payload: String,
    pub received_at: String,
}

pub(crate) fn insert_event(
    pool: &Pool<SqliteConnectionManager>,
    event: &VigilEvent,
) -> anyhow::Result<()> {
    let conn = pool.get()?;
    let payload = serde_json::to_string(&event.payload)?;
    conn.execute(
        "INSERT INTO events (id, project_id, kind, platform, payload)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            event.id,
            event.project_id,
            event.kind.as_str(),
            event.platform,
            payload
        ],
    )?;
    Ok(())
}

pub(crate) fn count_for_project(
    pool: &Pool<SqliteConnectionManager>,
    project_id: i64,
) -> anyhow::Result<i64> {
    let conn = pool.get()?;
    let count = conn.query_row(
        "SELECT COUNT(*) FROM events WHERE project_id = ?1",
        params![project_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub(crate) fn list_recent(
    pool: &Pool<SqliteConnectionManager>,
    project_id: i64,
    limit: i64,
) -> anyhow::Result<Vec<StoredEvent>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare_cached(
        "SELECT id, project_id, kind, platform, payload, received_at
         FROM events WHERE project_id = ?1
         ORDER BY rowid DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![project_id, limit], |row| {
        Ok(StoredEvent {
            id: row.get(0)?,
            project_id: row.get(1)?,
            kind: row.get(2)?,
            platform: row.get(3)?,
            payload: row.get(4)?,
            received_at: row.get(5)?,
        })
    })?;

    let mut results = Vec::new();
    for event in rows {
        results.push(event?);
    }
    Ok(results)
}
