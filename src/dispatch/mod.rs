use crate::common::events::VigilEvent;
use crate::storage::ProjectRecord;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error};

/// 事件处理完成通知的监听器接口
///
/// `extra` 为派发方附带的扩展字段袋：监听器必须接受该参数，
/// 不关心的字段直接忽略，保证与派发方的前后向兼容。
pub trait EventProcessedListener: Send + Sync {
    fn name(&self) -> &'static str;

    fn on_event_processed(
        &self,
        project: &ProjectRecord,
        event: &VigilEvent,
        extra: &Map<String, Value>,
    ) -> anyhow::Result<()>;
}

/// 监听器注册中心
///
/// 替代隐式的信号接线：处理管线在事件落库后显式调用 `notify`，
/// 监听器按注册顺序同步执行。
#[derive(Default)]
pub struct EventProcessedHub {
    listeners: Vec<Arc<dyn EventProcessedListener>>,
}

impl EventProcessedHub {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn register(&mut self, listener: Arc<dyn EventProcessedListener>) {
        debug!("[Dispatch] Listener registered: {}", listener.name());
        self.listeners.push(listener);
    }

    /// 依次通知所有监听器
    ///
    /// 任一监听器报错即中断后续监听器，错误原样向上传播；
    /// 本层不做重试，也不吞错。
    pub fn notify(
        &self,
        project: &ProjectRecord,
        event: &VigilEvent,
        extra: &Map<String, Value>,
    ) -> anyhow::Result<()> {
        for listener in &self.listeners {
            listener
                .on_event_processed(project, event, extra)
                .map_err(|e| {
                    error!("[Dispatch] Listener '{}' failed: {}", listener.name(), e);
                    e
                })?;
        }
        Ok(())
    }
}
