use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite_migration::{Migrations, M};
use tracing::info;

/// 初始化数据库连接池并执行迁移
pub(crate) fn initialize_pool(
    db_path: &str,
    max_connections: u32,
) -> anyhow::Result<Pool<SqliteConnectionManager>> {
    let manager = SqliteConnectionManager::file(db_path);

    // 显式配置连接池，防止高并发下资源耗尽
    let pool = Pool::builder()
        .max_size(max_connections)
        .connection_timeout(std::time::Duration::from_secs(5))
        .build(manager)
        .map_err(|e| anyhow::anyhow!("Failed to initialize DB pool: {}", e))?;

    let mut conn = pool
        .get()
        .map_err(|e| anyhow::anyhow!("Failed to acquire init connection: {}", e))?;

    // 定义迁移脚本
    let migrations = Migrations::new(vec![
        // M1: 项目表
        // flags 为位域字段，置位只通过 SQL 表达式级位或完成
        M::up(
            "CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                organization_id INTEGER NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                platform TEXT,
                flags INTEGER NOT NULL DEFAULT 0,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            );",
        ),
        // M2: 事件存档表
        M::up(
            "CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                project_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                platform TEXT,
                payload TEXT NOT NULL,
                received_at TEXT DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_events_project ON events(project_id);",
        ),
    ]);

    if let Err(e) = migrations.to_latest(&mut conn) {
        return Err(anyhow::anyhow!("Failed to apply database migrations: {}", e));
    }

    // 优化 SQLite 性能参数
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA temp_store = MEMORY;
         PRAGMA foreign_keys = ON;",
    )?;

    // 执行健康检查
    match conn.execute("CREATE TEMPORARY TABLE health_check (id INTEGER)", []) {
        Ok(_) => {
            let _ = conn.execute("DROP TABLE health_check", []);
        }
        Err(e) => return Err(anyhow::anyhow!("Database health check failed: {}", e)),
    }

    info!(
        "[Database] SQLite connection initialized at: {} (Pool size: {})",
        db_path, max_connections
    );
    Ok(pool)
}
