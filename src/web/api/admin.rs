use crate::storage::{ProjectFlags, ProjectRecord};
use crate::web::state::AppState;
use crate::web::utils::errors;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json as AxumJson,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub organization_id: i64,
    pub slug: String,
    pub platform: Option<String>,
}

#[derive(Deserialize)]
pub struct RecentEventsParams {
    pub limit: Option<i64>,
}

fn project_json(project: &ProjectRecord) -> serde_json::Value {
    serde_json::json!({
        "id": project.id,
        "organization_id": project.organization_id,
        "slug": project.slug,
        "platform": project.platform,
        "flags": {
            "bits": project.flags.bits(),
            "has_transactions": project.flags.contains(ProjectFlags::HAS_TRANSACTIONS),
            "has_releases": project.flags.contains(ProjectFlags::HAS_RELEASES),
        },
        "created_at": project.created_at,
    })
}

/// 创建项目接口
///
/// 项目生命周期归项目管理方，这里只提供最小管理入口。
pub async fn create_project_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    match state.registry.create_project(
        payload.organization_id,
        &payload.slug,
        payload.platform.as_deref(),
    ) {
        Ok(project) => AxumJson(serde_json::json!({
            "status": "success",
            "data": project_json(&project)
        }))
        .into_response(),
        Err(e) => {
            let details = e.to_string();
            if details.contains("UNIQUE constraint failed") {
                tracing::warn!("[Admin] Duplicate project slug: {}", payload.slug);
                (
                    StatusCode::CONFLICT,
                    AxumJson(errors::admin_conflict_json(&format!(
                        "Project slug already exists: {}",
                        payload.slug
                    ))),
                )
                    .into_response()
            } else {
                tracing::error!("[Admin] Create project failed: {}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    AxumJson(errors::admin_internal_error_json(&details)),
                )
                    .into_response()
            }
        }
    }
}

/// 项目列表接口
pub async fn list_projects_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.registry.list_projects() {
        Ok(projects) => AxumJson(serde_json::json!({
            "status": "success",
            "count": projects.len(),
            "data": projects.iter().map(project_json).collect::<Vec<_>>()
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("[Admin] List projects failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                AxumJson(errors::admin_internal_error_json(&e.to_string())),
            )
                .into_response()
        }
    }
}

/// 项目详情接口（含事件计数）
pub async fn get_project_handler(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
) -> impl IntoResponse {
    let project = match state.registry.get_project(project_id) {
        Ok(Some(project)) => project,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                AxumJson(errors::admin_not_found_json(&format!(
                    "Unknown project: {}",
                    project_id
                ))),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("[Admin] Get project failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                AxumJson(errors::admin_internal_error_json(&e.to_string())),
            )
                .into_response();
        }
    };

    let event_count = state.registry.count_events(project_id).unwrap_or(0);
    let mut body = project_json(&project);
    if let Some(map) = body.as_object_mut() {
        map.insert("event_count".to_string(), serde_json::json!(event_count));
    }
    AxumJson(serde_json::json!({ "status": "success", "data": body })).into_response()
}

/// 项目近期事件列表接口
pub async fn list_project_events_handler(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<i64>,
    Query(params): Query<RecentEventsParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(50).clamp(1, 500);
    match state.registry.list_recent_events(project_id, limit) {
        Ok(events) => AxumJson(serde_json::json!({
            "status": "success",
            "count": events.len(),
            "data": events
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("[Admin] List events failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                AxumJson(errors::admin_internal_error_json(&e.to_string())),
            )
                .into_response()
        }
    }
}
