use super::{AnalyticsEvent, AnalyticsRecorder};
use std::sync::Mutex;

/// 内存上报通道，测试中用于断言上报次数与字段
#[derive(Default)]
pub struct MemoryRecorder {
    records: Mutex<Vec<AnalyticsEvent>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前已收到的全部记录快照
    pub fn snapshot(&self) -> Vec<AnalyticsEvent> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl AnalyticsRecorder for MemoryRecorder {
    fn record(&self, event: AnalyticsEvent) {
        // 锁中毒时丢弃该条记录，上报本身是尽力而为的
        if let Ok(mut records) = self.records.lock() {
            records.push(event);
        }
    }
}
