use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use vigil_core::analytics;
use vigil_core::config::Settings;
use vigil_core::dispatch::EventProcessedHub;
use vigil_core::receivers::FirstTransactionRecorder;
use vigil_core::storage::ProjectRegistry;
use vigil_core::web::{
    api::{admin, ingest},
    middleware::auth::auth_middleware,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vigil_core=info".parse().unwrap())
                .add_directive("tower_http=debug".parse().unwrap()),
        )
        .init();

    info!("[Startup] vigil Core initializing...");

    let settings = Settings::new().expect("Failed to load config");
    info!(
        "[Config] Binding at {}:{}",
        settings.server.host, settings.server.port
    );
    if settings.admin.auth_token.is_none() {
        warn!("[Config] Admin auth token not set, admin API is open");
    }

    // 基础设施初始化
    let registry = ProjectRegistry::new(&settings.database.url, settings.database.max_connections)?;
    let recorder = analytics::build_recorder(&settings.analytics)?;

    // 注册 event_processed 监听器
    let mut hub = EventProcessedHub::new();
    hub.register(Arc::new(FirstTransactionRecorder::new(
        registry.clone(),
        recorder,
    )));

    // 构造全局状态
    let state = Arc::new(AppState {
        registry,
        hub: Arc::new(hub),
        settings: settings.clone(),
    });

    // 路由定义
    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest(
            "/admin",
            Router::new()
                .route(
                    "/projects",
                    post(admin::create_project_handler).get(admin::list_projects_handler),
                )
                .route("/projects/:id", get(admin::get_project_handler))
                .route(
                    "/projects/:id/events",
                    get(admin::list_project_events_handler),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        .route("/api/ingest/:project_id", post(ingest::ingest_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("[Startup] Service ready at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
