use crate::common::events::{EventContext, EventKind, VigilEvent};
use crate::web::state::AppState;
use crate::web::utils::errors;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json as AxumJson,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// 事件接入信封
#[derive(Deserialize)]
pub struct IngestRequest {
    pub kind: EventKind,
    pub platform: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub context: EventContext,
    /// 派发方附带的扩展字段，原样传递给监听器
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// 事件接入接口
///
/// 事件落库后触发 event_processed 派发。监听器报错时
/// 本次接入判定失败，错误不做重试。
pub async fn ingest_handler(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
    Json(request): Json<IngestRequest>,
) -> impl IntoResponse {
    let registry = state.registry.clone();
    let hub = state.hub.clone();

    // 查询、落库、派发均为阻塞数据库调用，移入阻塞线程执行
    let outcome = tokio::task::spawn_blocking(move || -> anyhow::Result<Option<String>> {
        let Some(project) = registry.get_project(project_id)? else {
            return Ok(None);
        };

        let extra = request.extra;
        let event = VigilEvent {
            id: Uuid::new_v4().to_string(),
            project_id: project.id,
            kind: request.kind,
            platform: request.platform,
            payload: request.payload,
            context: request.context,
            occurred_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
        };

        registry.insert_event(&event)?;
        hub.notify(&project, &event, &extra)?;
        Ok(Some(event.id))
    })
    .await;

    match outcome {
        Ok(Ok(Some(event_id))) => AxumJson(serde_json::json!({
            "status": "success",
            "event_id": event_id,
            "project_id": project_id
        }))
        .into_response(),
        Ok(Ok(None)) => (
            StatusCode::NOT_FOUND,
            AxumJson(errors::ingest_not_found_json(&format!(
                "Unknown project: {}",
                project_id
            ))),
        )
            .into_response(),
        Ok(Err(e)) => {
            tracing::error!("[Ingest] Event processing failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                AxumJson(errors::ingest_internal_error_json(&e.to_string())),
            )
                .into_response()
        }
        Err(join_err) => {
            tracing::error!("[Ingest] Worker thread failed: {}", join_err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                AxumJson(errors::internal_error_json("Worker thread failed")),
            )
                .into_response()
        }
    }
}
