use crate::analytics::{AnalyticsEvent, AnalyticsRecorder};
use crate::common::events::{EventKind, VigilEvent};
use crate::dispatch::EventProcessedListener;
use crate::storage::{ProjectFlags, ProjectRecord, ProjectRegistry};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

/// 首笔事务标记监听器
///
/// 项目收到第一条 transaction 类型事件时，在项目标志位上
/// 置位 HAS_TRANSACTIONS（单向转移，置位后不再回退），
/// 并上报一条 `first_transaction.sent` 分析记录。
pub struct FirstTransactionRecorder {
    registry: ProjectRegistry,
    analytics: Arc<dyn AnalyticsRecorder>,
}

impl FirstTransactionRecorder {
    pub fn new(registry: ProjectRegistry, analytics: Arc<dyn AnalyticsRecorder>) -> Self {
        Self {
            registry,
            analytics,
        }
    }
}

impl EventProcessedListener for FirstTransactionRecorder {
    fn name(&self) -> &'static str {
        "first_transaction"
    }

    fn on_event_processed(
        &self,
        project: &ProjectRecord,
        event: &VigilEvent,
        _extra: &Map<String, Value>,
    ) -> anyhow::Result<()> {
        if event.kind != EventKind::Transaction {
            return Ok(());
        }
        // 幂等保护：已标记的项目不再写库、不再上报
        if project.flags.contains(ProjectFlags::HAS_TRANSACTIONS) {
            return Ok(());
        }

        // 置位由存储层以位或完成；存储错误原样向上传播
        self.registry
            .set_project_flags(project.id, ProjectFlags::HAS_TRANSACTIONS)?;

        info!(
            "[FirstTransaction] Project {} received its first transaction",
            project.id
        );
        self.analytics.record(AnalyticsEvent::new(
            "first_transaction.sent",
            json!({
                "project_id": project.id,
                "organization_id": project.organization_id,
                "platform": project.platform,
            }),
        ));
        Ok(())
    }
}
