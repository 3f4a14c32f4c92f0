pub mod ado_routes;
pub mod ai_routes;
pub mod authentication_routes;
pub mod health_routes;
pub mod task_routes;
pub mod user_routes;

use axum::{
    body::Body,
    extract::OriginalUri,
    http::{header, HeaderValue, Method, Request},
    middleware, Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{app_error::AppError, app_state::SharedState, web_api::rate_limit::api_rate_limit};

pub const API_PREFIX: &str = "/api/v1";

/// Every route, without the HTTP middleware stack.
pub fn map_routes(app_state: SharedState) -> Router {
    let api = Router::new()
        .merge(health_routes::get_router(app_state.clone()))
        .merge(authentication_routes::get_router(app_state.clone()))
        .merge(user_routes::get_router(app_state.clone()))
        .merge(task_routes::get_router(app_state.clone()))
        .merge(ado_routes::get_router(app_state.clone()))
        .merge(ai_routes::get_router(app_state.clone()))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(app_state.clone(), api_rate_limit));

    let router = Router::new()
        .merge(health_routes::get_router(app_state.clone()))
        .nest(API_PREFIX, api);

    match app_state.settings.static_dir.as_deref() {
        Some(dir) => router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => router.fallback(not_found),
    }
}

/// The served application: routes plus CORS, request ids and request tracing.
pub fn build_app(app_state: SharedState) -> Router {
    let cors = cors_layer(&app_state.settings.cors_origins);

    map_routes(app_state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!("http", method = %request.method(), uri = %request.uri(), request_id)
        }))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(allowed)).allow_credentials(true)
}

async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound {
        code: "NOT_FOUND",
        message: format!("Route {method} {uri} not found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app_state::AppState, data_access::data_context::DataContext, settings::Settings};
    use axum::{body::to_bytes, http::StatusCode};
    use mockito::{Matcher, Server};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app(configure: impl FnOnce(&mut Settings)) -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings {
            db_path: dir.path().join("routes_test.redb").to_string_lossy().into_owned(),
            jwt_secret: "test-secret".to_string(),
            ..Settings::default()
        };
        configure(&mut settings);
        let data_context = DataContext::new(&settings.db_path).unwrap();
        let state = AppState::build(settings, data_context).unwrap();
        (build_app(state), dir)
    }

    fn with_ado(url: String) -> impl FnOnce(&mut Settings) {
        move |s: &mut Settings| {
            s.ado.organization = Some("contoso".into());
            s.ado.personal_access_token = Some("test-pat".into());
            s.ado.base_url = Some(url);
        }
    }

    async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    async fn register(app: &Router, email: &str) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({"name": "Ada", "email": email, "password": "correct horse"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_served_at_both_paths() {
        let (app, _dir) = test_app(|_| {});
        for path in ["/health", "/api/v1/health"] {
            let (status, body) = send(&app, "GET", path, None, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["success"], true);
            assert_eq!(body["data"]["status"], "healthy");
            assert_eq!(body["data"]["ado"]["configured"], false);
        }
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let (app, _dir) = test_app(|_| {});
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn unknown_routes_are_json_404() {
        let (app, _dir) = test_app(|_| {});
        let (status, body) = send(&app, "GET", "/api/v1/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Route GET /api/v1/nope not found");

        let (status, _) = send(&app, "GET", "/elsewhere", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_backlog_returns_zero_items() {
        let mut server = Server::new_async().await;
        let wiql = server
            .mock("POST", "/_apis/wit/wiql")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r"\[System\.WorkItemType\] IN \('Bug'\)".into()),
                Matcher::Regex(r"\[System\.State\] IN \('Active'\)".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"workItems":[]}"#)
            .create_async()
            .await;
        let (app, _dir) = test_app(with_ado(server.url()));

        let (status, body) =
            send(&app, "GET", "/api/v1/ado/backlog/Contoso?states=Active&types=Bug&top=5", None, None).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["backlogItems"], json!([]));
        assert_eq!(body["data"]["totalCount"], 0);
        assert_eq!(body["data"]["projectId"], "Contoso");
        assert_eq!(body["data"]["top"], 5);
        wiql.assert_async().await;
    }

    #[tokio::test]
    async fn ado_routes_need_configuration() {
        let (app, _dir) = test_app(|s| s.ado.organization = Some("contoso".into()));
        let (status, body) = send(&app, "GET", "/api/v1/ado/projects", None, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "PAT_NOT_CONFIGURED");

        let (app, _dir) = test_app(|s| s.ado.personal_access_token = Some("pat".into()));
        let (_, body) = send(&app, "GET", "/api/v1/ado/projects", None, None).await;
        assert_eq!(body["error"]["code"], "ORGANIZATION_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn backlog_rejects_bad_query_before_calling_ado() {
        let mut server = Server::new_async().await;
        let wiql = server.mock("POST", "/_apis/wit/wiql").expect(0).create_async().await;
        let (app, _dir) = test_app(with_ado(server.url()));

        let (status, body) = send(&app, "GET", "/api/v1/ado/backlog/P?top=99", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"][0]["field"], "top");
        wiql.assert_async().await;
    }

    #[tokio::test]
    async fn projects_include_total_count() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/_apis/projects")
            .with_status(200)
            .with_body(r#"{"count":1,"value":[{"id":"p1","name":"Contoso Web"}]}"#)
            .create_async()
            .await;
        let (app, _dir) = test_app(with_ado(server.url()));

        let (status, body) = send(&app, "GET", "/api/v1/ado/projects", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalCount"], 1);
        assert_eq!(body["data"][0]["name"], "Contoso Web");
    }

    #[tokio::test]
    async fn upstream_auth_failure_is_401() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/_apis/wit/workitems/7")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message":"Access denied"}"#)
            .create_async()
            .await;
        let (app, _dir) = test_app(with_ado(server.url()));

        let (status, body) = send(&app, "GET", "/api/v1/ado/workitem/7", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "ADO_AUTHENTICATION_FAILED");
        assert_eq!(body["error"]["message"], "Failed to fetch work item: Access denied");

        let (status, body) = send(&app, "GET", "/api/v1/ado/workitem/abc", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"][0]["field"], "workItemId");
    }

    #[tokio::test]
    async fn initialize_validates_then_tests_connection() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/_apis/projects")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer bad-token")
            .with_status(401)
            .create_async()
            .await;
        let (app, _dir) = test_app(|s| s.ado.base_url = Some(server.url()));

        let (status, body) = send(&app, "POST", "/api/v1/ado/initialize", None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"].as_array().unwrap().len(), 2);

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/ado/initialize",
            None,
            Some(json!({"organization": "contoso", "accessToken": "bad-token"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "ADO_CONNECTION_FAILED");
    }

    #[tokio::test]
    async fn tasks_require_a_token() {
        let (app, _dir) = test_app(|_| {});
        let (status, body) = send(&app, "GET", "/api/v1/tasks", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let (status, _) = send(&app, "GET", "/api/v1/tasks", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn task_lifecycle() {
        let (app, _dir) = test_app(|_| {});
        let token = register(&app, "ada@example.com").await;
        let token = Some(token.as_str());

        let (status, body) = send(&app, "POST", "/api/v1/tasks", token, Some(json!({"description": "no title"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"][0]["field"], "title");

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/tasks",
            token,
            Some(json!({"title": "Ship it", "priority": "high", "complexity": "simple"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let task = &body["data"]["task"];
        assert_eq!(task["status"], "todo");
        assert_eq!(task["user"]["email"], "ada@example.com");
        assert!(task["aiPriorityScore"].as_f64().unwrap() > 0.8);
        let id = task["id"].as_str().unwrap().to_string();

        let (_, body) = send(&app, "GET", "/api/v1/tasks?status=todo", token, None).await;
        assert_eq!(body["data"]["pagination"]["total"], 1);
        assert_eq!(body["data"]["pagination"]["hasMore"], false);

        let (status, body) = send(&app, "GET", "/api/v1/tasks?offset=18446744073709551615", token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tasks"], json!([]));
        assert_eq!(body["data"]["pagination"]["hasMore"], false);

        let (status, body) = send(&app, "POST", &format!("/api/v1/tasks/{id}/start"), token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["task"]["status"], "in_progress");
        assert_eq!(body["data"]["message"], "Task started successfully");

        let (status, body) = send(&app, "POST", &format!("/api/v1/tasks/{id}/start"), token, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "INVALID_STATUS_TRANSITION");

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/tasks/{id}/complete"),
            token,
            Some(json!({"actualHours": 2.5})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["task"]["status"], "done");
        assert_eq!(body["data"]["task"]["actualHours"], 2.5);

        let (status, _) = send(&app, "DELETE", &format!("/api/v1/tasks/{id}"), token, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, "GET", &format!("/api/v1/tasks/{id}"), token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "TASK_NOT_FOUND");
    }

    #[tokio::test]
    async fn other_users_tasks_are_invisible() {
        let (app, _dir) = test_app(|_| {});
        let owner = register(&app, "owner@example.com").await;
        let other = register(&app, "other@example.com").await;

        let (_, body) = send(&app, "POST", "/api/v1/tasks", Some(&owner), Some(json!({"title": "mine"}))).await;
        let id = body["data"]["task"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, "GET", &format!("/api/v1/tasks/{id}"), Some(&other), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "GET", "/api/v1/tasks/not-a-uuid", Some(&other), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_and_profile() {
        let (app, _dir) = test_app(|_| {});
        register(&app, "ada@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "wrong password"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "ADA@example.com", "password": "correct horse"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "PUT",
            "/api/v1/users/profile",
            Some(&token),
            Some(json!({"name": "Ada L.", "preferences": {"theme": "dark"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user"]["name"], "Ada L.");

        let (_, body) = send(&app, "GET", "/api/v1/users/profile", Some(&token), None).await;
        assert_eq!(body["data"]["user"]["preferences"]["theme"], "dark");
        assert!(body["data"]["user"].get("passwordHash").is_none());
        assert!(body["data"]["user"].get("password_hash").is_none());

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({"name": "Dup", "email": "ada@example.com", "password": "another one"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "EMAIL_TAKEN");
    }

    #[tokio::test]
    async fn ai_endpoints() {
        let (app, _dir) = test_app(|_| {});
        let token = register(&app, "ada@example.com").await;
        let token = Some(token.as_str());

        for (title, priority) in [("low one", "low"), ("critical one", "critical")] {
            send(&app, "POST", "/api/v1/tasks", token, Some(json!({"title": title, "priority": priority}))).await;
        }

        let (status, body) = send(&app, "GET", "/api/v1/ai/recommendations?type=unknown&limit=1", token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["type"], "priority");
        let recs = body["data"]["recommendations"].as_array().unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0]["task"]["title"], "critical one");

        let (status, body) = send(&app, "POST", "/api/v1/ai/analyze-task", token, Some(json!({"title": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "MISSING_TITLE");

        let (_, body) = send(&app, "GET", "/api/v1/ai/insights", token, None).await;
        assert_eq!(body["data"]["insights"]["summary"]["totalTasks"], 2);
    }

    #[tokio::test]
    async fn api_rate_limit_applies() {
        let (app, _dir) = test_app(|s| s.rate_limit_max = 2);
        for _ in 0..2 {
            let (status, _) = send(&app, "GET", "/api/v1/health", None, None).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) = send(&app, "GET", "/api/v1/health", None, None).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["code"], "RATE_LIMIT_EXCEEDED");

        // Root health sits outside /api.
        let (status, _) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
