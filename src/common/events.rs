use serde::{Deserialize, Serialize};

/// 事件分类标签
///
/// 与上游采集端的分类约定保持一致，接入层直接按字面值反序列化，
/// 未知标签在入口处即被拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Error,
    Transaction,
    Csp,
    Default,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Error => "error",
            EventKind::Transaction => "transaction",
            EventKind::Csp => "csp",
            EventKind::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventContext {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub request_id: Option<String>,
}

/// 单条已接入的遥测事件，对监听器只读
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VigilEvent {
    pub id: String,
    pub project_id: i64,
    pub kind: EventKind,
    pub platform: Option<String>,
    pub payload: serde_json::Value,
    pub context: EventContext,
    pub occurred_at: u64,
}
