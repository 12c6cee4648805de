//! REST API definitions.

pub mod user;

use axum::Json;
use serde::Serialize;

pub use self::user::{AuthResponse, User};

/// Response of the `GET /health` endpoint.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Health {
    /// Indicator whether the service is operational.
    pub success: bool,

    /// Version of the service.
    pub version: &'static str,
}

/// Handles the `GET /health` endpoint.
///
/// Unauthenticated liveness probe.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn health() -> Json<Health> {
    Json(Health {
        success: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::{self, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt as _;

    use crate::Service;

    fn test_app() -> Router {
        let secret = b"test-secret";
        let config = service::Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(secret),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(secret),
            session_lifetime: Duration::from_secs(24 * 60 * 60),
        };
        crate::router(Service::new(
            config,
            service::infra::InMemory::new(),
        ))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req
                .header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = if let Some(body) = body {
            req.header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        } else {
            req.body(Body::empty()).unwrap()
        };

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn register(app: &Router, email: &str) -> Value {
        let (status, body) = send(
            app,
            Method::POST,
            "/register",
            None,
            Some(json!({
                "name": "Asha Rao",
                "email": email,
                "password": "secret-pass",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    #[tokio::test]
    async fn health_responds_ok() {
        let app = test_app();

        let (status, body) =
            send(&app, Method::GET, "/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
    }

    #[tokio::test]
    async fn register_returns_user_and_verifiable_token() {
        let app = test_app();

        let registered = register(&app, "asha@example.com").await;

        assert_eq!(registered["success"], json!(true));
        assert_eq!(registered["user"]["email"], json!("asha@example.com"));
        assert_eq!(registered["user"]["name"], json!("Asha Rao"));
        let user = registered["user"].as_object().unwrap();
        assert!(!user.contains_key("password"));
        assert!(!user.contains_key("passwordHash"));
        assert!(registered["expiresAt"].is_string());

        let token = registered["token"].as_str().unwrap();
        let (status, me) =
            send(&app, Method::GET, "/me", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["user"]["id"], registered["user"]["id"]);
    }

    #[tokio::test]
    async fn register_duplicate_email_conflicts() {
        let app = test_app();

        drop(register(&app, "asha@example.com").await);
        let (status, body) = send(
            &app,
            Method::POST,
            "/register",
            None,
            Some(json!({
                "name": "Impostor",
                "email": "asha@example.com",
                "password": "secret-pass",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["code"], json!("EMAIL_OCCUPIED"));
    }

    #[tokio::test]
    async fn register_validates_input() {
        let app = test_app();

        let (status, _) = send(
            &app,
            Method::POST,
            "/register",
            None,
            Some(json!({"email": "asha@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::POST,
            "/register",
            None,
            Some(json!({
                "name": "Asha Rao",
                "email": "not-an-email",
                "password": "secret-pass",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("INVALID_EMAIL"));

        let (status, body) = send(
            &app,
            Method::POST,
            "/register",
            None,
            Some(json!({
                "name": "Asha Rao",
                "email": "asha@example.com",
                "password": "short",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("INVALID_PASSWORD"));
    }

    #[tokio::test]
    async fn login_succeeds_with_correct_credentials() {
        let app = test_app();
        drop(register(&app, "asha@example.com").await);

        let (status, body) = send(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({
                "email": "asha@example.com",
                "password": "secret-pass",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert!(body["token"].is_string());
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials() {
        let app = test_app();
        drop(register(&app, "asha@example.com").await);

        let (status, body) = send(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({
                "email": "asha@example.com",
                "password": "wrong-pass",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], json!("WRONG_CREDENTIALS"));

        let (status, body) = send(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({
                "email": "nobody@example.com",
                "password": "secret-pass",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], json!("WRONG_CREDENTIALS"));
    }

    #[tokio::test]
    async fn me_requires_authorization() {
        let app = test_app();

        let (status, body) =
            send(&app, Method::GET, "/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], json!("AUTHORIZATION_REQUIRED"));

        let (status, _) =
            send(&app, Method::GET, "/me", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn update_name_renames_current_user() {
        let app = test_app();
        let registered = register(&app, "asha@example.com").await;
        let token = registered["token"].as_str().unwrap();

        let (status, body) = send(
            &app,
            Method::PUT,
            "/me/name",
            Some(token),
            Some(json!({"name": "Asha R."})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["name"], json!("Asha R."));
    }

    #[tokio::test]
    async fn update_password_requires_the_old_one() {
        let app = test_app();
        let registered = register(&app, "asha@example.com").await;
        let token = registered["token"].as_str().unwrap();

        let (status, body) = send(
            &app,
            Method::PUT,
            "/me/password",
            Some(token),
            Some(json!({
                "oldPassword": "not-the-old-one",
                "newPassword": "brand-new-pass",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], json!("WRONG_PASSWORD"));

        let (status, _) = send(
            &app,
            Method::PUT,
            "/me/password",
            Some(token),
            Some(json!({
                "oldPassword": "secret-pass",
                "newPassword": "brand-new-pass",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({
                "email": "asha@example.com",
                "password": "secret-pass",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({
                "email": "asha@example.com",
                "password": "brand-new-pass",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
