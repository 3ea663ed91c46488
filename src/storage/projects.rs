use bitflags::bitflags;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

bitflags! {
    /// 项目状态位域
    ///
    /// 所有状态位均为单向转移：只置位，从不清除。
    /// 数据库中可能存在本版本未定义的位，读取时原样保留。
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ProjectFlags: i64 {
        /// 项目是否收到过 transaction 类型事件
        const HAS_TRANSACTIONS = 1 << 0;
        /// 项目是否创建过 Release
        const HAS_RELEASES = 1 << 1;
    }
}

#[derive(Debug, Clone)]
pub struct ProjectRecord {
    pub id: i64,
    pub organization_id: i64,
    pub slug: String,
    pub platform: Option<String>,
    pub flags: ProjectFlags,
    pub created_at: String,
}

fn row_to_record(row: &Row) -> rusqlite::Result<ProjectRecord> {
    Ok(ProjectRecord {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        slug: row.get(2)?,
        platform: row.get(3)?,
        flags: ProjectFlags::from_bits_retain(row.get(4)?),
        created_at: row.get(5)?,
    })
}

const PROJECT_COLUMNS: &str = "id, organization_id, slug, platform, flags, created_at";

/// 创建项目（slug 全局唯一）
pub(crate) fn create_project(
    pool: &Pool<SqliteConnectionManager>,
    organization_id: i64,
    slug: &str,
    platform: Option<&str>,
) -> anyhow::Result<ProjectRecord> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO projects (organization_id, slug, platform) VALUES (?1, ?2, ?3)",
        params![organization_id, slug, platform],
    )?;
    let id = conn.last_insert_rowid();
    info!("[Projects] Created project '{}' (id={})", slug, id);

    let record = conn.query_row(
        &format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS),
        params![id],
        row_to_record,
    )?;
    Ok(record)
}

pub(crate) fn get_project(
    pool: &Pool<SqliteConnectionManager>,
    id: i64,
) -> anyhow::Result<Option<ProjectRecord>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM projects WHERE id = ?1",
        PROJECT_COLUMNS
    ))?;
    let record = stmt.query_row(params![id], row_to_record).optional()?;
    Ok(record)
}

pub(crate) fn get_project_by_slug(
    pool: &Pool<SqliteConnectionManager>,
    slug: &str,
) -> anyhow::Result<Option<ProjectRecord>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM projects WHERE slug = ?1",
        PROJECT_COLUMNS
    ))?;
    let record = stmt.query_row(params![slug], row_to_record).optional()?;
    Ok(record)
}

pub(crate) fn list_projects(
    pool: &Pool<SqliteConnectionManager>,
) -> anyhow::Result<Vec<ProjectRecord>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM projects ORDER BY id",
        PROJECT_COLUMNS
    ))?;
    let rows = stmt.query_map([], row_to_record)?;

    let mut results = Vec::new();
    for record in rows {
        results.push(record?);
    }
    Ok(results)
}

/// 在存储层以位或方式置位项目标志
///
/// 位或在 SQL 表达式内完成，不经过内存读改写，
/// 并发置位不同标志位时互不覆盖。
pub(crate) fn set_flags(
    pool: &Pool<SqliteConnectionManager>,
    project_id: i64,
    bits: ProjectFlags,
) -> anyhow::Result<()> {
    let conn = pool.get()?;
    conn.execute(
        "UPDATE projects SET flags = flags | ?1 WHERE id = ?2",
        params![bits.bits(), project_id],
    )?;
    Ok(())
}
