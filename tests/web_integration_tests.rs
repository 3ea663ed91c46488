use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::{get, post},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::tempdir;
use tower::util::ServiceExt;
use vigil_core::analytics::MemoryRecorder;
use vigil_core::config::{AdminSettings, AnalyticsSettings, DatabaseSettings, ServerSettings, Settings};
use vigil_core::dispatch::EventProcessedHub;
use vigil_core::receivers::FirstTransactionRecorder;
use vigil_core::storage::{ProjectFlags, ProjectRegistry};
use vigil_core::web::{
    api::{admin, ingest},
    middleware::auth::auth_middleware,
    state::AppState,
};

fn test_settings(auth_token: Option<String>) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseSettings {
            url: "unused".to_string(),
            max_connections: 1,
        },
        admin: AdminSettings { auth_token },
        analytics: AnalyticsSettings {
            sink: "none".to_string(),
            endpoint: None,
            queue_capacity: 16,
        },
    }
}

fn make_app(
    auth_token: Option<String>,
) -> (Router, ProjectRegistry, Arc<MemoryRecorder>, tempfile::TempDir) {
    let temp_dir = tempdir().expect("tempdir");
    let db_path = temp_dir.path().join("vigil.db");
    let registry = ProjectRegistry::new(db_path.to_string_lossy().as_ref(), 4).expect("registry");
    let analytics = Arc::new(MemoryRecorder::new());

    let mut hub = EventProcessedHub::new();
    hub.register(Arc::new(FirstTransactionRecorder::new(
        registry.clone(),
        analytics.clone(),
    )));

    let state = Arc::new(AppState {
        registry: registry.clone(),
        hub: Arc::new(hub),
        settings: test_settings(auth_token),
    });

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
        .with_state(state);

    (app, registry, analytics, temp_dir)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("body")))
        .expect("request")
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value: Value = serde_json::from_slice(&body).expect("json");
    (status, value)
}

#[tokio::test]
async fn health_route_returns_ok() {
    let (app, _registry, _analytics, _temp_dir) = make_app(None);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    assert_eq!(body.as_ref(), b"OK");
}

#[tokio::test]
async fn ingest_first_transaction_flips_flag_and_emits() {
    let (app, registry, analytics, _temp_dir) = make_app(None);
    let project = registry
        .create_project(42, "backend", Some("rust"))
        .expect("project");

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/ingest/{}", project.id),
            json!({"kind": "transaction", "platform": "rust", "payload": {"spans": []}}),
        ))
        .await
        .expect("response");
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["project_id"], project.id);

    let updated = registry
        .get_project(project.id)
        .expect("get")
        .expect("project");
    assert!(updated.flags.contains(ProjectFlags::HAS_TRANSACTIONS));
    assert_eq!(registry.count_events(project.id).expect("count"), 1);

    let records = analytics.snapshot();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "first_transaction.sent");
    assert_eq!(records[0].attributes["organization_id"], 42);
    assert_eq!(records[0].attributes["platform"], "rust");
}

#[tokio::test]
async fn ingest_error_event_is_a_silent_noop() {
    let (app, registry, analytics, _temp_dir) = make_app(None);
    let project = registry
        .create_project(42, "backend", Some("rust"))
        .expect("project");

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/ingest/{}", project.id),
            json!({"kind": "error", "payload": {"message": "boom"}}),
        ))
        .await
        .expect("response");
    let (status, _body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);

    let updated = registry
        .get_project(project.id)
        .expect("get")
        .expect("project");
    assert!(!updated.flags.contains(ProjectFlags::HAS_TRANSACTIONS));
    assert!(analytics.snapshot().is_empty());
    // 事件本身仍然归档
    assert_eq!(registry.count_events(project.id).expect("count"), 1);
}

#[tokio::test]
async fn ingest_unknown_project_returns_404() {
    let (app, _registry, _analytics, _temp_dir) = make_app(None);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/ingest/9999",
            json!({"kind": "transaction"}),
        ))
        .await
        .expect("response");
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "VGL-ING-404");
}

#[tokio::test]
async fn repeated_transaction_ingest_emits_once() {
    let (app, registry, analytics, _temp_dir) = make_app(None);
    let project = registry
        .create_project(42, "backend", Some("rust"))
        .expect("project");

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/ingest/{}", project.id),
                json!({"kind": "transaction"}),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(analytics.snapshot().len(), 1);
    assert_eq!(registry.count_events(project.id).expect("count"), 3);
}

#[tokio::test]
async fn admin_project_flow() {
    let (app, _registry, _analytics, _temp_dir) = make_app(None);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/admin/projects",
            json!({"organization_id": 7, "slug": "backend", "platform": "rust"}),
        ))
        .await
        .expect("response");
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    let project_id = body["data"]["id"].as_i64().expect("id");
    assert_eq!(body["data"]["flags"]["has_transactions"], false);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/projects")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/admin/projects/{}", project_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "backend");
    assert_eq!(body["data"]["event_count"], 0);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/projects/9999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "VGL-ADM-404");
}

#[tokio::test]
async fn admin_duplicate_slug_returns_conflict() {
    let (app, registry, _analytics, _temp_dir) = make_app(None);
    registry.create_project(1, "backend", None).expect("seed");

    let response = app
        .oneshot(json_request(
            "POST",
            "/admin/projects",
            json!({"organization_id": 2, "slug": "backend"}),
        ))
        .await
        .expect("response");
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "VGL-ADM-409");
}

#[tokio::test]
async fn admin_events_listing_returns_recent_events() {
    let (app, registry, _analytics, _temp_dir) = make_app(None);
    let project = registry
        .create_project(1, "backend", None)
        .expect("project");

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/ingest/{}", project.id),
                json!({"kind": "error"}),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/admin/projects/{}/events?limit=2", project.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["kind"], "error");
}

#[tokio::test]
async fn admin_requires_bearer_token_when_configured() {
    let (app, _registry, _analytics, _temp_dir) = make_app(Some("secret".to_string()));

    // 缺失凭证
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/projects")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 错误凭证
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/projects")
                .header(header::AUTHORIZATION, "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // 正确凭证
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/projects")
                .header(header::AUTHORIZATION, "Bearer secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    // 接入接口不受管理鉴权影响
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/ingest/1",
            json!({"kind": "error"}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
