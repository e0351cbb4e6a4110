pub mod health_routes;
pub mod task_routes;

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::app_state::SharedState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Fresh UUID v4 for requests that arrive without an `x-request-id`.
#[derive(Clone, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

pub fn map_routes(app_state: SharedState) -> Router {
    Router::new()
        .merge(health_routes::get_router(app_state.clone()))
        .merge(task_routes::get_router(app_state))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app_state::AppState,
        data_access::data_context::DataContext,
        test_support::{settings_for, spawn_completion_stub, CompletionStub, StubReply, TEST_TOKEN},
    };
    use axum::http::{header, Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        stub: CompletionStub,
        _dir: TempDir,
    }

    async fn test_app(reply: StubReply) -> TestApp {
        let stub = spawn_completion_stub(reply).await;
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(dir.path(), &stub.base_url);
        let data_context = DataContext::open(&settings.database_path).unwrap();
        let state = AppState::build(settings, data_context, "sk-test".into()).unwrap();
        TestApp {
            router: map_routes(state),
            stub,
            _dir: dir,
        }
    }

    async fn send(
        app: &TestApp,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn authed(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        send(app, method, uri, Some(TEST_TOKEN), body).await
    }

    mod health_endpoints {
        use super::*;

        #[tokio::test]
        async fn root_needs_no_token() {
            let app = test_app(StubReply::Text("unused".into())).await;
            let (status, body) = send(&app, Method::GET, "/", None, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["message"], "Welcome to the Task Management API!");
        }

        #[tokio::test]
        async fn health_reports_store_and_secrets() {
            let app = test_app(StubReply::Text("unused".into())).await;
            let (status, body) = send(&app, Method::GET, "/health", None, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "ok");
            assert_eq!(body["database"], "connected");
            assert_eq!(body["auth_token_loaded"], true);
            assert_eq!(body["completion_key_loaded"], true);
        }

        #[tokio::test]
        async fn responses_carry_a_request_id() {
            let app = test_app(StubReply::Text("unused".into())).await;

            let response = app
                .router
                .clone()
                .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
                .await
                .unwrap();
            let generated = response.headers().get(REQUEST_ID_HEADER).unwrap();
            assert!(Uuid::parse_str(generated.to_str().unwrap()).is_ok());

            let response = app
                .router
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/health")
                        .header(REQUEST_ID_HEADER, "abc-123")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "abc-123");
        }
    }

    mod authentication {
        use super::*;

        #[tokio::test]
        async fn every_task_route_rejects_missing_token() {
            let app = test_app(StubReply::Text("unused".into())).await;
            let cases = [
                (Method::GET, "/tasks"),
                (Method::GET, "/tasks/"),
                (Method::POST, "/tasks/"),
                (Method::GET, "/tasks/1"),
                (Method::PUT, "/tasks/1"),
                (Method::DELETE, "/tasks/1"),
                (Method::POST, "/tasks/1/suggestions"),
            ];

            for (method, uri) in cases {
                let (status, body) =
                    send(&app, method.clone(), uri, None, Some(json!({"title": 5}))).await;
                assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
                assert_eq!(body["kind"], "unauthorized");
                assert_eq!(body["message"], "Authorization header missing");
            }
            assert_eq!(app.stub.request_count(), 0);
        }

        #[tokio::test]
        async fn wrong_token_is_rejected_before_body_parsing() {
            let app = test_app(StubReply::Text("unused".into())).await;
            let (status, body) =
                send(&app, Method::POST, "/tasks/", Some("nope"), Some(json!({}))).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["message"], "Invalid token");
        }
    }

    mod task_endpoints {
        use super::*;

        #[tokio::test]
        async fn readme_task_lifecycle() {
            let app = test_app(StubReply::Text("unused".into())).await;

            let (status, created) = authed(
                &app,
                Method::POST,
                "/tasks/",
                Some(json!({
                    "title": "Setup Project Readme",
                    "description": "Create a comprehensive README file",
                    "assignee_id": 1
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(created["id"], 1);
            assert_eq!(created["status"], "pending");
            assert_eq!(created["assignee_id"], 1);
            assert_eq!(created["suggestions"], json!([]));

            let (status, updated) = authed(
                &app,
                Method::PUT,
                "/tasks/1",
                Some(json!({"status": "in_progress", "description": "..."})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(updated["status"], "in_progress");
            assert_eq!(updated["description"], "...");
            assert_eq!(updated["title"], "Setup Project Readme");
            assert_eq!(updated["created_at"], created["created_at"]);

            let (status, body) = authed(&app, Method::DELETE, "/tasks/1", None).await;
            assert_eq!(status, StatusCode::NO_CONTENT);
            assert_eq!(body, Value::Null);

            let (status, body) = authed(&app, Method::GET, "/tasks/1", None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["kind"], "not_found");

            let (status, _) = authed(&app, Method::DELETE, "/tasks/1", None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }

        #[tokio::test]
        async fn invalid_bodies_are_unprocessable() {
            let app = test_app(StubReply::Text("unused".into())).await;

            let (status, body) =
                authed(&app, Method::POST, "/tasks/", Some(json!({"description": "no title"}))).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(body["kind"], "validation_error");

            let (status, _) = authed(&app, Method::POST, "/tasks/", Some(json!({"title": ""}))).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

            authed(&app, Method::POST, "/tasks", Some(json!({"title": "real"}))).await;
            let (status, body) =
                authed(&app, Method::PUT, "/tasks/1", Some(json!({"status": "archived"}))).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(body["kind"], "validation_error");

            let (status, _) = authed(&app, Method::GET, "/tasks/not-a-number", None).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        }

        #[tokio::test]
        async fn update_of_missing_task_is_not_found() {
            let app = test_app(StubReply::Text("unused".into())).await;
            let (status, _) =
                authed(&app, Method::PUT, "/tasks/42", Some(json!({"title": "ghost"}))).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }

        #[tokio::test]
        async fn listing_pages_in_id_order() {
            let app = test_app(StubReply::Text("unused".into())).await;
            for i in 1..=4 {
                authed(&app, Method::POST, "/tasks/", Some(json!({"title": format!("task {i}")}))).await;
            }

            let (status, body) = authed(&app, Method::GET, "/tasks/?offset=1&limit=2", None).await;
            assert_eq!(status, StatusCode::OK);
            let ids: Vec<u64> = body
                .as_array()
                .unwrap()
                .iter()
                .map(|task| task["id"].as_u64().unwrap())
                .collect();
            assert_eq!(ids, vec![2, 3]);

            let (_, body) = authed(&app, Method::GET, "/tasks", None).await;
            assert_eq!(body.as_array().unwrap().len(), 4);

            let (status, _) = authed(&app, Method::GET, "/tasks/?limit=-1", None).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    mod suggestion_endpoints {
        use super::*;

        #[tokio::test]
        async fn suggestion_is_created_and_listed_with_task() {
            let app = test_app(StubReply::Text(" Add a license section. ".into())).await;
            authed(&app, Method::POST, "/tasks/", Some(json!({"title": "Setup Project Readme"}))).await;

            let (status, suggestion) =
                authed(&app, Method::POST, "/tasks/1/suggestions", None).await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(suggestion["task_id"], 1);
            assert_eq!(suggestion["content"], "Add a license section.");

            let (_, task) = authed(&app, Method::GET, "/tasks/1", None).await;
            assert_eq!(task["suggestions"].as_array().unwrap().len(), 1);
            assert_eq!(task["suggestions"][0]["id"], suggestion["id"]);
        }

        #[tokio::test]
        async fn missing_task_is_not_found_without_upstream_call() {
            let app = test_app(StubReply::Text("unused".into())).await;
            let (status, body) = authed(&app, Method::POST, "/tasks/9/suggestions", None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["kind"], "not_found");
            assert_eq!(app.stub.request_count(), 0);
        }

        #[tokio::test]
        async fn upstream_failure_is_bad_gateway() {
            let app = test_app(StubReply::Status(503)).await;
            authed(&app, Method::POST, "/tasks/", Some(json!({"title": "flaky"}))).await;

            let (status, body) = authed(&app, Method::POST, "/tasks/1/suggestions", None).await;
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert_eq!(body["kind"], "upstream_error");

            let (_, task) = authed(&app, Method::GET, "/tasks/1", None).await;
            assert_eq!(task["suggestions"], json!([]));
        }
    }
}
