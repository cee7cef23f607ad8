//! HTTP API for Ultimate Tracker.
//!
//! Every `/api/*` route is scoped to the caller named by the signed bearer
//! token (see [`auth::Caller`]). Errors are returned as
//! `{ "message": ..., "retryable": bool }`, with storage outages reported as
//! `503` and `retryable: true`.

use anyhow::Context;
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, patch, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::Config;
use routes::{habits, money};
use state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root_handler))
        .route("/health", get(routes::health_handler))
        .route(
            "/api/habits",
            get(habits::list_habits).post(habits::create_habit),
        )
        .route(
            "/api/habits/{id}",
            get(habits::get_habit)
                .put(habits::update_habit)
                .delete(habits::delete_habit),
        )
        .route("/api/habits/{id}/toggle", patch(habits::toggle_today))
        .route(
            "/api/habits/{id}/month-progress",
            patch(habits::set_month_day),
        )
        .route("/api/money", get(money::overview))
        .route("/api/money/transactions", post(money::add_transaction))
        .route(
            "/api/money/transactions/{id}",
            delete(money::delete_transaction),
        )
        .route("/api/money/budgets", post(money::create_budget))
        .route("/api/money/goals", post(money::create_goal))
        .with_state(state)
}

fn cors(client_url: &str) -> anyhow::Result<CorsLayer> {
    let origin: HeaderValue = client_url
        .parse()
        .with_context(|| format!("Invalid CLIENT_URL: {client_url}"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]))
}

pub async fn start_server(config: Config) -> anyhow::Result<()> {
    info!("Initializing state...");
    let state = AppState::open(&config).await?;

    let app = router(state)
        .layer(cors(&config.client_url)?)
        .layer(TraceLayer::new_for_http());

    let address = config.address();
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use tracker_core::UserId;
    use tracker_storage::JsonStorage;

    const SECRET: &str = "test-secret";

    async fn app() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(JsonStorage::new(dir.path()).await.unwrap());
        (dir, router(AppState::new(storage, SECRET)))
    }

    fn request(
        method: &str,
        uri: &str,
        user: Option<UserId>,
        body: Option<Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            let token = auth::sign(SECRET, user, 3600);
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response: Response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(app: &Router, user: UserId, name: &str) -> String {
        let (status, body) = send(
            app,
            request("POST", "/api/habits", Some(user), Some(json!({ "name": name }))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let (_dir, app) = app().await;

        let (status, body) = send(&app, request("GET", "/", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Ultimate Tracker API running");

        let (status, body) = send(&app, request("GET", "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_or_bad_bearer_is_unauthorized() {
        let (_dir, app) = app().await;

        let (status, body) = send(&app, request("GET", "/api/habits", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Not authorized");

        let user = UserId::new();
        let bad_tokens = [
            "not-a-token".to_string(),
            user.to_string(),
            auth::sign("wrong-secret", user, 3600),
            auth::sign(SECRET, user, -3600),
        ];
        for token in bad_tokens {
            let req = Request::builder()
                .uri("/api/habits")
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap();
            let (status, body) = send(&app, req).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["message"], "Invalid token");
        }
    }

    #[tokio::test]
    async fn test_unreachable_storage_is_503_and_retryable() {
        let (dir, app) = app().await;
        let user = UserId::new();
        std::fs::remove_dir_all(dir.path()).unwrap();

        let (status, body) = send(&app, request("GET", "/health", None, None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");

        let (status, body) = send(
            &app,
            request("POST", "/api/habits", Some(user), Some(json!({ "name": "Run" }))),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["retryable"], true);
    }

    #[tokio::test]
    async fn test_create_and_toggle() {
        let (_dir, app) = app().await;
        let user = UserId::new();
        let id = create(&app, user, "Meditate").await;

        // 2024-06-02 is a Sunday
        let uri = format!("/api/habits/{id}/toggle?today=2024-06-02");
        let (status, body) = send(&app, request("PATCH", &uri, Some(user), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completedToday"], true);
        assert_eq!(body["streak"], 1);
        assert_eq!(body["bestStreak"], 1);
        assert_eq!(body["weekProgress"][0], true);

        let (status, body) = send(&app, request("PATCH", &uri, Some(user), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completedToday"], false);
        assert_eq!(body["streak"], 0);
        assert_eq!(body["bestStreak"], 1);
        assert_eq!(body["weekProgress"][0], false);

        let (status, list) = send(&app, request("GET", "/api/habits", Some(user), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_month_progress() {
        let (_dir, app) = app().await;
        let user = UserId::new();
        let id = create(&app, user, "Stretch").await;
        let uri = format!("/api/habits/{id}/month-progress");

        let (status, body) = send(
            &app,
            request(
                "PATCH",
                &uri,
                Some(user),
                Some(json!({
                    "monthKey": "2024-02",
                    "dayIndex": 28,
                    "value": true,
                    "daysInMonth": 29
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let days = body["progress"]["2024-02"].as_array().unwrap();
        assert_eq!(days.len(), 29);
        assert_eq!(days[28], true);
        assert_eq!(body["streak"], 0);

        // Length defaults to the calendar month
        let (status, body) = send(
            &app,
            request(
                "PATCH",
                &uri,
                Some(user),
                Some(json!({ "monthKey": "2024-04", "dayIndex": 0, "value": true })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["progress"]["2024-04"].as_array().unwrap().len(), 30);

        let (status, body) = send(
            &app,
            request(
                "PATCH",
                &uri,
                Some(user),
                Some(json!({
                    "monthKey": "2024-02",
                    "dayIndex": 29,
                    "value": true,
                    "daysInMonth": 29
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["retryable"], false);

        let (status, _) = send(
            &app,
            request(
                "PATCH",
                &uri,
                Some(user),
                Some(json!({ "monthKey": "2024-13", "dayIndex": 0, "value": true })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_not_found_for_unknown_deleted_or_foreign_habit() {
        let (_dir, app) = app().await;
        let owner = UserId::new();
        let other = UserId::new();
        let id = create(&app, owner, "Journal").await;

        let uri = format!("/api/habits/{id}");
        let (status, _) = send(&app, request("GET", &uri, Some(other), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let garbage = request("GET", "/api/habits/garbage", Some(owner), None);
        let (status, _) = send(&app, garbage).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, request("DELETE", &uri, Some(owner), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["id"], id.as_str());

        let toggle = format!("/api/habits/{id}/toggle");
        let (status, body) = send(&app, request("PATCH", &toggle, Some(owner), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Habit not found");
    }

    #[tokio::test]
    async fn test_update_habit() {
        let (_dir, app) = app().await;
        let user = UserId::new();
        let id = create(&app, user, "Walk").await;

        let (status, body) = send(
            &app,
            request(
                "PUT",
                &format!("/api/habits/{id}"),
                Some(user),
                Some(json!({ "difficulty": "hard", "notes": "after lunch" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Walk");
        assert_eq!(body["difficulty"], "hard");
        assert_eq!(body["notes"], "after lunch");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (_dir, app) = app().await;
        let user = UserId::new();

        let (status, body) = send(
            &app,
            request("POST", "/api/habits", Some(user), Some(json!({ "category": "health" }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["retryable"], false);

        let (status, _) = send(
            &app,
            request("POST", "/api/habits", Some(user), Some(json!({ "name": "   " }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_money_flow() {
        let (_dir, app) = app().await;
        let user = UserId::new();

        let (status, budget) = send(
            &app,
            request(
                "POST",
                "/api/money/budgets",
                Some(user),
                Some(json!({ "category": "food", "limit": 200 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(budget["period"], "monthly");

        let (status, transaction) = send(
            &app,
            request(
                "POST",
                "/api/money/transactions",
                Some(user),
                Some(json!({
                    "type": "expense",
                    "amount": 35.5,
                    "category": "food",
                    "date": "2024-06-01"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(transaction["type"], "expense");

        let (status, goal) = send(
            &app,
            request(
                "POST",
                "/api/money/goals",
                Some(user),
                Some(json!({ "name": "Holiday", "target": 1500, "priority": "high" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(goal["priority"], "high");

        let (status, overview) = send(&app, request("GET", "/api/money", Some(user), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(overview["transactions"].as_array().unwrap().len(), 1);
        assert_eq!(overview["budgets"][0]["spent"], 35.5);
        assert_eq!(overview["goals"].as_array().unwrap().len(), 1);

        let uri = format!("/api/money/transactions/{}", transaction["id"].as_str().unwrap());
        let (status, _) = send(&app, request("DELETE", &uri, Some(UserId::new()), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, request("DELETE", &uri, Some(user), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Deleted");

        let (_, overview) = send(&app, request("GET", "/api/money", Some(user), None)).await;
        assert_eq!(overview["budgets"][0]["spent"], 0.0);
    }
}
