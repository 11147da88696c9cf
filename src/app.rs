use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, members, reminders};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(auth::router())
                .merge(members::router())
                .merge(reminders::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
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

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{password::hash_password, Caller, JwtKeys, Role, User};
    use crate::notify::testing::RecordingNotifier;
    use crate::state::testing::state_at;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use time::macros::date;
    use tower::ServiceExt;

    fn token(state: &AppState, identity: &str, role: Role) -> String {
        let caller = Caller {
            identity: identity.into(),
            name: identity.to_lowercase(),
            role,
        };
        JwtKeys::from_config(&state.config.jwt)
            .sign_access(&caller)
            .unwrap()
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = bearer {
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
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn setup() -> (Router, AppState, Arc<RecordingNotifier>) {
        let (state, notifier) = state_at(date!(2026-10-15));
        (build_app(state.clone()), state, notifier)
    }

    #[tokio::test]
    async fn health_is_public() {
        let (app, _, _) = setup();
        let res = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn members_require_a_token() {
        let (app, _, _) = setup();
        let (status, _) = call(&app, Method::GET, "/api/v1/members", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn end_to_end_asha() {
        let (app, state, notifier) = setup();
        let staff = token(&state, "STAFF001", Role::Staff);

        let (status, added) = call(
            &app,
            Method::POST,
            "/api/v1/members",
            Some(&staff),
            Some(json!({
                "name": "Asha",
                "phone": "+911234567890",
                "plan": "Gold",
                "expiry_date": "2026-10-22"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(added["member"]["days_left"], 7);
        assert_eq!(added["member"]["added_by_identity"], "STAFF001");
        assert_eq!(added["welcome"]["status"], "sent");
        assert_eq!(notifier.sent().len(), 1);

        // first render: reminder fires and the table shows the latch set
        let (status, listed) = call(&app, Method::GET, "/api/v1/members", Some(&staff), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["today"], "2026-10-15");
        assert_eq!(listed["members"][0]["name"], "Asha");
        assert_eq!(listed["members"][0]["days_left"], 7);
        assert_eq!(listed["members"][0]["reminder_sent"], true);
        assert_eq!(listed["reminders"]["reminded"][0]["name"], "Asha");
        assert_eq!(notifier.sent().len(), 2);

        // second render: nothing new
        let (_, listed) = call(&app, Method::GET, "/api/v1/members", Some(&staff), None).await;
        assert_eq!(listed["reminders"]["reminded"], json!([]));
        assert_eq!(notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn add_errors_map_to_statuses() {
        let (app, state, _) = setup();
        let staff = token(&state, "STAFF001", Role::Staff);
        let body = |name: &str, phone: &str, expiry: &str| {
            Some(json!({ "name": name, "phone": phone, "plan": "Gold", "expiry_date": expiry }))
        };

        let (status, _) = call(&app, Method::POST, "/api/v1/members", Some(&staff), body("Asha", "+911234567890", "2026-10-22")).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, err) = call(&app, Method::POST, "/api/v1/members", Some(&staff), body("Asha", "+919999999999", "2026-10-22")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(err["error"].as_str().unwrap().contains("already exists"));

        let (status, _) = call(&app, Method::POST, "/api/v1/members", Some(&staff), body("Ravi", "+919999999999", "2026-10-01")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = call(&app, Method::POST, "/api/v1/members", Some(&staff), body("", "+919999999999", "2026-10-22")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn owner_controls_are_gated_by_role() {
        let (app, state, _) = setup();
        let staff = token(&state, "STAFF001", Role::Staff);
        let owner = token(&state, "OWNER001", Role::Owner);
        call(
            &app,
            Method::POST,
            "/api/v1/members",
            Some(&staff),
            Some(json!({ "name": "Asha", "phone": "+911234567890", "plan": "Gold", "expiry_date": "2026-12-01" })),
        )
        .await;

        let (status, _) = call(&app, Method::DELETE, "/api/v1/members/Asha", Some(&staff), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(&app, Method::PUT, "/api/v1/members/Asha/plan", Some(&staff), Some(json!({ "plan": "Silver" }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, out) = call(&app, Method::PUT, "/api/v1/members/Asha/plan", Some(&owner), Some(json!({ "plan": "Silver" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(out["matched"], true);

        let (status, out) = call(&app, Method::PUT, "/api/v1/members/Asha/expiry", Some(&owner), Some(json!({ "expiry_date": "2027-12-01" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(out["matched"], true);

        let (status, out) = call(&app, Method::DELETE, "/api/v1/members/ghost", Some(&owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(out["matched"], false);

        let (status, out) = call(&app, Method::DELETE, "/api/v1/members/Asha", Some(&owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(out["matched"], true);
    }

    #[tokio::test]
    async fn reminder_run_endpoint_reports_pass() {
        let (app, state, _) = setup();
        let staff = token(&state, "STAFF001", Role::Staff);
        let (status, report) = call(&app, Method::POST, "/api/v1/reminders/run", Some(&staff), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["evaluated"], 0);
        assert_eq!(report["window"]["min_days"], 5);
        assert_eq!(report["window"]["max_days"], 10);
    }

    #[tokio::test]
    async fn login_refresh_and_me() {
        let (app, state, _) = setup();
        state
            .users
            .insert_if_missing(&User {
                identity: "OWNER001".into(),
                name: "Owner".into(),
                role: Role::Owner,
                password_hash: hash_password("open-sesame").unwrap(),
            })
            .await
            .unwrap();

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "identity": "OWNER001", "password": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, auth) = call(
            &app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "identity": "OWNER001", "password": "open-sesame" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(auth["user"]["role"], "owner");
        let access = auth["access_token"].as_str().unwrap().to_string();
        let refresh = auth["refresh_token"].as_str().unwrap().to_string();

        let (status, me) = call(&app, Method::GET, "/api/v1/me", Some(&access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["identity"], "OWNER001");
        assert_eq!(me["name"], "Owner");

        // a refresh token is not an access token
        let (status, _) = call(&app, Method::GET, "/api/v1/me", Some(&refresh), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, renewed) = call(
            &app,
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renewed["user"]["identity"], "OWNER001");
    }
}
