use super::{AnalyticsEvent, AnalyticsRecorder};
use tracing::info;

/// 结构化日志上报：每条记录打一行 info 日志
pub struct LogRecorder;

impl AnalyticsRecorder for LogRecorder {
    fn record(&self, event: AnalyticsEvent) {
        info!(
            "[Analytics] {} attributes={} recorded_at={}",
            event.name, event.attributes, event.recorded_at
        );
    }
}
