use config::{Config, Environment, File};
use serde::Deserialize;

/// 应用配置总结构
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub admin: AdminSettings,
    pub analytics: AnalyticsSettings,
}

/// 服务相关配置（监听地址、端口）
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// 数据库配置（SQLite 文件路径与连接池大小）
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

/// 管理接口配置
#[derive(Debug, Deserialize, Clone)]
pub struct AdminSettings {
    /// 管理接口的 Bearer Token
    /// 未设置时管理接口不做鉴权，仅适用于本地开发
    pub auth_token: Option<String>,
}

/// 分析上报配置
///
/// sink 可选值：`log`（结构化日志输出）、`http`（异步投递到
/// endpoint 指定的采集地址）、`none`（丢弃）。
#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsSettings {
    pub sink: String,
    pub endpoint: Option<String>,
    /// 投递队列容量，队列满时直接丢弃记录
    pub queue_capacity: usize,
}

impl Settings {
    /// 加载配置：支持默认值、可选配置文件、环境变量覆盖
    pub fn new() -> anyhow::Result<Self> {
        let builder = Config::builder()
            // 默认值（代码内硬编码）
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "vigil.db")?
            .set_default("database.max_connections", 8)?
            .set_default::<&str, Option<String>>("admin.auth_token", None)?
            .set_default("analytics.sink", "log")?
            .set_default::<&str, Option<String>>("analytics.endpoint", None)?
            .set_default("analytics.queue_capacity", 256)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("VIGIL").separator("__"));

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
