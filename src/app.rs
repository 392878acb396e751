use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, ratings, stores, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router(&state))
                .merge(users::router(&state))
                .merge(stores::router(&state))
                .merge(ratings::router(&state))
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::ensure_admin;
    use crate::config::AdminSeed;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let req = match body {
            Some(b) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn register(app: &Router, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        call(
            app,
            Method::POST,
            "/api/register",
            None,
            Some(json!({ "name": name, "email": email, "password": password })),
        )
        .await
    }

    async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
        call(
            app,
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    async fn token_for(app: &Router, email: &str, password: &str) -> String {
        let (status, body) = login(app, email, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn with_admin() -> (AppState, Router, String) {
        let state = AppState::fake();
        ensure_admin(
            state.users.as_ref(),
            &AdminSeed {
                name: "Root".into(),
                email: "root@x.com".into(),
                password: "Root!pass1".into(),
            },
        )
        .await
        .unwrap();
        let app = build_app(state.clone());
        let token = token_for(&app, "root@x.com", "Root!pass1").await;
        (state, app, token)
    }

    #[tokio::test]
    async fn register_then_login() {
        let app = build_app(AppState::fake());

        let (status, user) = register(&app, "A", "a@x.com", "Abc!2345").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user["email"], "a@x.com");
        assert_eq!(user["role"], "NORMAL_USER");
        assert!(user.get("password").is_none());
        assert!(user.get("passwordHash").is_none());

        let (status, body) = login(&app, "a@x.com", "Abc!2345").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["token"].as_str().unwrap().is_empty());
        assert_eq!(body["user"]["id"], user["id"]);
    }

    #[tokio::test]
    async fn requested_role_is_ignored() {
        let app = build_app(AppState::fake());
        let (status, user) = call(
            &app,
            Method::POST,
            "/api/register",
            None,
            Some(json!({ "name": "Eve", "email": "eve@x.com", "password": "Abc!2345", "role": "SYSTEM_ADMIN" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user["role"], "NORMAL_USER");
    }

    #[tokio::test]
    async fn register_validation_and_conflict() {
        let app = build_app(AppState::fake());

        let (status, body) = register(&app, "A", "", "Abc!2345").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());

        assert_eq!(register(&app, "A", "a@x.com", "Abc!2345").await.0, StatusCode::CREATED);
        let (status, _) = register(&app, "B", "A@x.com", "Other!123").await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = login(&app, "a@x.com", "Abc!2345").await;
        assert_eq!(body["user"]["name"], "A");
    }

    #[tokio::test]
    async fn login_failures_are_identical() {
        let app = build_app(AppState::fake());
        register(&app, "A", "a@x.com", "Abc!2345").await;

        let wrong = login(&app, "a@x.com", "Nope!1234").await;
        let missing = login(&app, "ghost@x.com", "Abc!2345").await;
        assert_eq!(wrong.0, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong, missing);
    }

    #[tokio::test]
    async fn users_listing_is_admin_only() {
        let (_state, app, admin) = with_admin().await;
        register(&app, "A", "a@x.com", "Abc!2345").await;
        let user = token_for(&app, "a@x.com", "Abc!2345").await;

        assert_eq!(call(&app, Method::GET, "/api/users", None, None).await.0, StatusCode::UNAUTHORIZED);
        assert_eq!(
            call(&app, Method::GET, "/api/users", Some("garbage"), None).await.0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(call(&app, Method::GET, "/api/users", Some(&user), None).await.0, StatusCode::FORBIDDEN);

        let (status, list) = call(&app, Method::GET, "/api/users?role=NORMAL_USER", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["email"], "a@x.com");

        let (_, page) = call(&app, Method::GET, "/api/users?limit=1&offset=1", Some(&admin), None).await;
        assert_eq!(page.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stores_created_by_admin_and_rated_by_users() {
        let (_state, app, admin) = with_admin().await;
        register(&app, "A", "a@x.com", "Abc!2345").await;
        let user = token_for(&app, "a@x.com", "Abc!2345").await;

        let new_store = json!({ "name": "Corner Shop", "address": "1 High St" });
        let (status, _) = call(&app, Method::POST, "/api/stores", Some(&user), Some(new_store.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, store) = call(&app, Method::POST, "/api/stores", Some(&admin), Some(new_store)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(store["ownerId"], Value::Null);
        let store_id = store["id"].as_i64().unwrap();
        let ratings_uri = format!("/api/stores/{store_id}/ratings");

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/stores",
            Some(&admin),
            Some(json!({ "name": "Ghost", "ownerId": 9999 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let rating = json!({ "score": 4, "comment": "friendly" });
        let (status, body) = call(&app, Method::POST, &ratings_uri, Some(&user), Some(rating.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["storeId"], store_id);
        let (status, _) = call(&app, Method::POST, &ratings_uri, Some(&user), Some(rating.clone())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = call(&app, Method::POST, &ratings_uri, Some(&admin), Some(rating)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, list) = call(&app, Method::GET, "/api/stores", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list[0]["name"], "Corner Shop");
        assert_eq!(list[0]["ratingCount"], 1);
        assert_eq!(list[0]["averageRating"], 4.0);

        let (status, list) = call(&app, Method::GET, &ratings_uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_password_flow() {
        let app = build_app(AppState::fake());
        register(&app, "A", "a@x.com", "Abc!2345").await;
        register(&app, "B", "b@x.com", "Abc!2345").await;
        let token = token_for(&app, "a@x.com", "Abc!2345").await;

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/update-password",
            None,
            Some(json!({ "email": "a@x.com", "newPassword": "Abcdefg!" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/update-password",
            Some(&token),
            Some(json!({ "email": "a@x.com", "newPassword": "abcdefgh" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/update-password",
            Some(&token),
            Some(json!({ "email": "b@x.com", "newPassword": "Abcdefg!" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/update-password",
            Some(&token),
            Some(json!({ "email": "a@x.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/update-password",
            Some(&token),
            Some(json!({ "email": "a@x.com", "newPassword": "Abcdefg!" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(login(&app, "a@x.com", "Abcdefg!").await.0, StatusCode::OK);
        assert_eq!(login(&app, "a@x.com", "Abc!2345").await.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn deleting_users_respects_references() {
        let (state, app, admin) = with_admin().await;
        let (_, owner) = register(&app, "Owner", "owner@x.com", "Abc!2345").await;
        let (_, rater) = register(&app, "Rater", "rater@x.com", "Abc!2345").await;
        let owner_id = owner["id"].as_i64().unwrap();
        let rater_id = rater["id"].as_i64().unwrap();

        let (_, store) = call(
            &app,
            Method::POST,
            "/api/stores",
            Some(&admin),
            Some(json!({ "name": "Owned", "ownerId": owner_id })),
        )
        .await;
        assert_eq!(store["ownerId"], owner_id);
        let store_id = store["id"].as_i64().unwrap();

        let rater_token = token_for(&app, "rater@x.com", "Abc!2345").await;
        call(
            &app,
            Method::POST,
            &format!("/api/stores/{store_id}/ratings"),
            Some(&rater_token),
            Some(json!({ "score": 5 })),
        )
        .await;

        let (status, _) = call(&app, Method::DELETE, &format!("/api/users/{owner_id}"), Some(&admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, list) = call(&app, Method::GET, "/api/stores", None, None).await;
        assert_eq!(list[0]["id"], store_id);
        assert_eq!(list[0]["ownerId"], Value::Null);

        let (status, _) = call(&app, Method::DELETE, &format!("/api/users/{rater_id}"), Some(&admin), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(state.users.find_user(rater_id).await.unwrap().is_some());

        let (status, _) = call(&app, Method::DELETE, "/api/users/424242", Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn registration_only_requires_fields() {
        let app = build_app(AppState::fake());
        let (status, user) = register(&app, "A", "a@x.com", "password").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user["role"], "NORMAL_USER");
        assert_eq!(login(&app, "a@x.com", "password").await.0, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_requests_are_bad_requests() {
        let app = build_app(AppState::fake());

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/register",
            None,
            Some(json!({ "name": null, "email": "a@x.com", "password": "Abc!2345" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());

        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/login")
                    .body(Body::from(r#"{"email":"a@x.com","password":"x"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["message"].is_string());

        let (status, body) = call(&app, Method::GET, "/api/stores/abc/ratings", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());

        let (status, body) = call(&app, Method::GET, "/api/stores?limit=many", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn deleted_rater_is_not_reported_as_missing_store() {
        let (_state, app, admin) = with_admin().await;
        let (_, user) = register(&app, "A", "a@x.com", "Abc!2345").await;
        let token = token_for(&app, "a@x.com", "Abc!2345").await;
        let (_, store) = call(&app, Method::POST, "/api/stores", Some(&admin), Some(json!({ "name": "Cafe" }))).await;

        let uri = format!("/api/users/{}", user["id"]);
        assert_eq!(call(&app, Method::DELETE, &uri, Some(&admin), None).await.0, StatusCode::NO_CONTENT);

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/stores/{}/ratings", store["id"]),
            Some(&token),
            Some(json!({ "score": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn health() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
