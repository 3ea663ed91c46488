use crate::web::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// 管理接口鉴权中间件
///
/// 职责：校验 `Authorization: Bearer <token>` 与配置是否一致。
/// 未配置 token 时直接放行（开发模式），启动阶段已有告警。
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.settings.admin.auth_token.as_deref() else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string());

    match provided.as_deref() {
        Some(token) if token == expected => Ok(next.run(req).await),
        Some(_) => {
            tracing::warn!("[Auth] Denied: token mismatch");
            Err(StatusCode::FORBIDDEN)
        }
        None => {
            tracing::warn!("[Auth] Denied: missing bearer token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
