use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::app::{router, AppState};
use crate::config::AppConfig;
use crate::database::MemoryStudentStore;

/// In-process application over a fresh in-memory store, driven through
/// `tower::ServiceExt::oneshot` without binding a socket
pub struct TestContext {
    app: Router,
    config: AppConfig,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Start from the development preset and adjust it
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;
        adjust(&mut config);

        let state = AppState::new(Arc::new(MemoryStudentStore::new()), config.clone());
        Self {
            app: router(state),
            config,
        }
    }

    /// Bind the router to an ephemeral local port and return its base URL
    pub async fn serve(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let app = self.app.clone();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}", addr)
    }

    pub async fn send(&self, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(method, path, body.map(|b| b.to_string()), None).await
    }

    pub async fn send_raw(&self, method: &str, path: &str, body: &str) -> (StatusCode, Value) {
        self.request(method, path, Some(body.to_string()), None).await
    }

    pub async fn send_authed(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: &str,
    ) -> (StatusCode, Value) {
        self.request(method, path, body.map(|b| b.to_string()), Some(token)).await
    }

    /// Create a record through the public endpoint and return its JSON
    pub async fn seed_student(&self, name: &str, class: &str, section: &str, house: &str) -> Value {
        let (status, body) = self
            .send(
                "POST",
                "/api/students",
                Some(json!({ "name": name, "class": class, "section": section, "house": house })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "seed failed: {}", body);
        body
    }

    pub async fn admin_token(&self) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/auth/login",
                Some(json!({ "password": self.config.security.admin_password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap_or_default().to_string()
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = builder
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .expect("valid request");

        let response = self.app.clone().oneshot(request).await.expect("infallible router");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn contexts_are_isolated() {
        let first = TestContext::new();
        let second = TestContext::new();

        first.seed_student("Asha Rao", "5", "A", "Tagore").await;

        let (_, listed) = second.send("GET", "/api/students", None).await;
        assert_eq!(listed, json!([]));
    }
}
