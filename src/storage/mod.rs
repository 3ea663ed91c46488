pub mod database;
pub mod events;
pub mod projects;

use crate::common::events::VigilEvent;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

pub use events::StoredEvent;
pub use projects::{ProjectFlags, ProjectRecord};

/// 注册中心：统一管理数据库访问，供接入层与监听器使用
#[derive(Clone)]
pub struct ProjectRegistry {
    /// SQLite 连接池（共享给子模块）
    pub(crate) pool: Pool<SqliteConnectionManager>,
}

impl ProjectRegistry {
    /// 创建注册中心并初始化数据库连接池
    ///
    /// # Parameters
    /// - `db_path`: 数据库文件路径
    /// - `max_connections`: 最大连接数
    pub fn new(db_path: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = database::initialize_pool(db_path, max_connections)?;
        Ok(Self { pool })
    }

    // ===============================
    // 项目管理相关（代理调用）
    // ===============================

    /// 创建项目记录
    pub fn create_project(
        &self,
        organization_id: i64,
        slug: &str,
        platform: Option<&str>,
    ) -> anyhow::Result<ProjectRecord> {
        projects::create_project(&self.pool, organization_id, slug, platform)
    }

    /// 按 ID 查询项目
    pub fn get_project(&self, id: i64) -> anyhow::Result<Option<ProjectRecord>> {
        projects::get_project(&self.pool, id)
    }

    /// 按 slug 查询项目
    pub fn get_project_by_slug(&self, slug: &str) -> anyhow::Result<Option<ProjectRecord>> {
        projects::get_project_by_slug(&self.pool, slug)
    }

    /// 查询所有项目
    pub fn list_projects(&self) -> anyhow::Result<Vec<ProjectRecord>> {
        projects::list_projects(&self.pool)
    }

    /// 以存储层位或方式置位项目标志（原子、不回退）
    pub fn set_project_flags(&self, project_id: i64, bits: ProjectFlags) -> anyhow::Result<()> {
        projects::set_flags(&self.pool, project_id, bits)
    }

    // ===============================
    // 事件存档相关（代理调用）
    // ===============================

    pub fn insert_event(&self, event: &VigilEvent) -> anyhow::Result<()> {
        events::insert_event(&self.pool, event)
    }

    pub fn count_events(&self, project_id: i64) -> anyhow::Result<i64> {
        events::count_for_project(&self.pool, project_id)
    }

    pub fn list_recent_events(
        &self,
        project_id: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<StoredEvent>> {
        events::list_recent(&self.pool, project_id, limit)
    }

    // ===============================
    // 高级控制（不推荐常规使用）
    // ===============================

    /// 获取底层数据库连接（用于自定义事务或原始访问）
    pub fn get_conn(&self) -> anyhow::Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }
}
