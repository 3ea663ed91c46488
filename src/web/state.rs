use crate::config::Settings;
use crate::dispatch::EventProcessedHub;
use crate::storage::ProjectRegistry;
use std::sync::Arc;

/// Web 应用全局状态
///
/// 职责：包含所有跨请求共享的重资源对象，通过 Arc 注入到 Axum 的 Handler 中。
#[derive(Clone)]
pub struct AppState {
    pub registry: ProjectRegistry,
    pub hub: Arc<EventProcessedHub>,
    pub settings: Settings,
}
