pub mod http;
pub mod log;
pub mod memory;

use crate::config::AnalyticsSettings;
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub use http::HttpRecorder;
pub use log::LogRecorder;
pub use memory::MemoryRecorder;

/// 单条分析记录
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsEvent {
    pub name: String,
    pub attributes: serde_json::Value,
    pub recorded_at: u64,
}

impl AnalyticsEvent {
    pub fn new(name: &str, attributes: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            attributes,
            recorded_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
        }
    }
}

/// 分析上报接口
///
/// 上报为尽力而为：投递失败由各实现自行消化，
/// 永远不向调用方返回错误。
pub trait AnalyticsRecorder: Send + Sync {
    fn record(&self, event: AnalyticsEvent);
}

/// 丢弃所有记录的空实现
pub struct NullRecorder;

impl AnalyticsRecorder for NullRecorder {
    fn record(&self, _event: AnalyticsEvent) {}
}

/// 根据配置构造上报通道
pub fn build_recorder(settings: &AnalyticsSettings) -> anyhow::Result<Arc<dyn AnalyticsRecorder>> {
    match settings.sink.as_str() {
        "log" => Ok(Arc::new(LogRecorder)),
        "http" => {
            let endpoint = settings
                .endpoint
                .clone()
                .ok_or_else(|| anyhow::anyhow!("analytics.endpoint is required for http sink"))?;
            Ok(Arc::new(HttpRecorder::spawn(
                endpoint,
                settings.queue_capacity,
            )))
        }
        "none" => Ok(Arc::new(NullRecorder)),
        other => Err(anyhow::anyhow!("Unknown analytics sink: {}", other)),
    }
}
