//! Integration test helpers
//!
//! Drives the full router in-process with `tower::ServiceExt::oneshot` and
//! carries the session cookie between requests the way a browser would.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use docdeck_core::MemoryStore;
use docdeck_web::{create_app, AppState, ManualClock, WebConfig};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

// Ensure tracing is only initialized once
static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
});

/// A collected response
pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub content_type: Option<String>,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text)
            .unwrap_or_else(|e| panic!("response is not JSON ({}): {}", e, self.text))
    }

    /// The `error` field of a failure envelope
    pub fn error(&self) -> String {
        self.json()["error"]
            .as_str()
            .unwrap_or_else(|| panic!("no error field in {}", self.text))
            .to_string()
    }
}

/// Test application instance
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub clock: Arc<ManualClock>,
    pub state: AppState,
    cookie: Option<String>,
}

pub fn test_config() -> WebConfig {
    WebConfig {
        dev_mode: true,
        admin_password: ADMIN_PASSWORD.to_string(),
        secret_key: Some("integration-test-signing-key".to_string()),
        session_timeout_minutes: 30,
        static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string(),
        default_db: Some("shop".to_string()),
        ..WebConfig::default()
    }
}

/// Spawn an app over an empty in-memory store
pub fn spawn_app() -> TestApp {
    spawn_app_with_config(test_config())
}

pub fn spawn_app_with_config(config: WebConfig) -> TestApp {
    LazyLock::force(&TRACING);

    let store = MemoryStore::new();
    let clock = Arc::new(ManualClock::default());
    let state = AppState::with_store_and_clock(config, Arc::new(store.clone()), clock.clone());

    TestApp {
        router: create_app(state.clone()),
        store,
        clock,
        state,
        cookie: None,
    }
}

impl TestApp {
    /// Send a request with the current cookie, updating it from `Set-Cookie`
    pub async fn request(&mut self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let cookie = self.cookie.clone();
        let response = self.request_with_cookie(method, path, body, cookie.as_deref()).await;

        if let Some(set_cookie) = &response.set_cookie {
            let pair = set_cookie.split(';').next().unwrap_or_default();
            let value = pair.split_once('=').map(|(_, v)| v).unwrap_or_default();
            self.cookie = if value.is_empty() {
                None
            } else {
                Some(pair.to_string())
            };
        }
        response
    }

    /// Send a request with an explicit cookie, leaving the stored one alone
    pub async fn request_with_cookie(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            set_cookie,
            content_type,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&mut self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn login(&mut self, password: &str) -> TestResponse {
        self.post("/login", serde_json::json!({ "password": password })).await
    }

    /// Log in with the right password and assert it worked
    pub async fn login_ok(&mut self) {
        let response = self.login(ADMIN_PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        assert!(self.cookie.is_some());
    }

    pub fn cookie(&self) -> Option<String> {
        self.cookie.clone()
    }

    pub fn set_cookie(&mut self, cookie: Option<String>) {
        self.cookie = cookie;
    }

    pub fn advance_minutes(&self, minutes: i64) {
        self.clock.advance(chrono::Duration::minutes(minutes));
    }
}
