//! HTTP server for the launcher.
//!
//! Provides endpoints for:
//! - Manual launch (`/start/{timestamp}`)
//! - Task update notifications (`/notifications/task-updated`)
//! - Health check (`/health`)

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod handlers;
pub mod responses;

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/start/:timestamp", post(handlers::start_task))
        .route("/notifications/task-updated", post(handlers::task_updated))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use gridrun_core::{FileType, TaskStatus};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use crate::testing::{ready_task, Harness};

    fn app(harness: &Harness) -> (Router, mpsc::Receiver<gridrun_core::Task>) {
        let (tx, rx) = mpsc::channel(4);
        let state = Arc::new(AppState::new(harness.manual.clone(), tx));
        (create_router(state), rx)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _rx) = app(&Harness::new());
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_start_without_body() {
        let harness = Harness::new();
        harness.tasks.put(ready_task("2024-06-18T09:30Z"));
        let (router, _rx) = app(&harness);

        let response = router
            .oneshot(Request::post("/start/2024-06-18T09:30Z").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let request = harness.compute.next_request().await;
        let json = body_json(response).await;
        assert_eq!(json["outcome"], "dispatched");
        assert_eq!(json["runId"], request.run_id.as_str());
    }

    #[tokio::test]
    async fn test_start_with_parameters() {
        let harness = Harness::new();
        harness.tasks.put(ready_task("2024-06-18T09:30Z"));
        let (router, _rx) = app(&harness);

        let body = r#"[{"id": "USE_DC_CGM_INPUT", "parameterType": "BOOLEAN", "value": "true"}]"#;
        let response = router
            .oneshot(post_json("/start/2024-06-18T09:30Z", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let parameters = harness.compute.next_request().await.task_parameter_list.unwrap();
        assert_eq!(parameters[0].id, "USE_DC_CGM_INPUT");
    }

    #[tokio::test]
    async fn test_start_status_codes() {
        let harness = Harness::new();
        let mut missing_file = ready_task("2024-06-18T09:30Z");
        missing_file.inputs.retain(|f| !f.is_type(FileType::VirtualHub));
        harness.tasks.put(missing_file);
        harness.tasks.put(ready_task("2024-06-18T10:30Z"));
        let mut not_ready = ready_task("2024-06-18T11:30Z");
        not_ready.status = TaskStatus::Running;
        harness.tasks.put(not_ready);
        let (router, _rx) = app(&harness);

        for (uri, expected) in [
            ("/start/2024-06-18T08:30Z", StatusCode::NOT_FOUND),
            ("/start/not-a-date", StatusCode::BAD_REQUEST),
            ("/start/2024-06-18T09:30Z", StatusCode::BAD_REQUEST),
            ("/start/2024-06-18T10:30Z", StatusCode::BAD_REQUEST),
            ("/start/2024-06-18T11:30Z", StatusCode::OK),
        ] {
            let response = router
                .clone()
                .oneshot(Request::post(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), expected, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_start_with_reference_request_outside_whitelist() {
        let harness = Harness::with_whitelist(&["http://minio:9000/"]);
        harness.tasks.put(ready_task("2024-06-18T09:30Z"));
        let (router, _rx) = app(&harness);

        let response = router
            .oneshot(Request::post("/start/2024-06-18T09:30Z").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        let error = json["error"].as_str().unwrap();
        assert!(error.contains("is not part of application's whitelisted urls: http://minio:9000/"));
        assert!(harness.compute.requests().is_empty());
    }

    #[tokio::test]
    async fn test_task_updated_is_queued() {
        let harness = Harness::new();
        let (router, mut rx) = app(&harness);
        let task = ready_task("2024-06-18T09:30Z");

        let response = router
            .oneshot(post_json(
                "/notifications/task-updated",
                &serde_json::to_string(&task).unwrap(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(rx.recv().await, Some(task));
    }
}
