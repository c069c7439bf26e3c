#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use cctv_api::config::AppConfig;
use cctv_api::database::memory::MemoryStore;
use cctv_api::database::DocumentStore;
use cctv_api::AppState;

pub const SECRET: &str = "integration-secret";
pub const PASSWORD: &str = "hunter22";

/// The router on a fresh in-memory store. Each call is fully isolated.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    pub fn with_env(extra: &[(&str, &str)]) -> Self {
        let mut vars: Vec<(String, String)> = vec![
            ("SECRETKEY".into(), SECRET.into()),
            ("STORAGE_BACKEND".into(), "memory".into()),
        ];
        vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let config = AppConfig::from_lookup(|key| {
            vars.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
        .expect("test config");
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store).expect("test state");
        Self { router: cctv_api::app(state) }
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&value).expect("serialize body"))
            }
            None => Body::empty(),
        };
        self.send_request(builder.body(body).expect("request")).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn signup(&self, first_name: &str, email: &str) -> (StatusCode, Value) {
        let body = json!({ "first_name": first_name, "email": email, "password": PASSWORD });
        self.send(Method::POST, "/signup", None, Some(body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        let body = json!({ "email": email, "password": password });
        self.send(Method::POST, "/login", None, Some(body)).await
    }

    /// Sign up and log in, returning `(user_id, access_token)`.
    pub async fn authed_user(&self, email: &str) -> (String, String) {
        let (status, body) = self.signup("Tester", email).await;
        assert_eq!(status, StatusCode::OK, "signup failed: {}", body);
        let (status, body) = self.login(email, PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        let user_id = body["results"]["user"]["user_id"].as_str().expect("user_id").to_string();
        let token = body["results"]["token"].as_str().expect("token").to_string();
        (user_id, token)
    }

    pub async fn create_contact(&self, token: &str, email: &str) -> String {
        let body = json!({ "first_name": "Dana", "email": email, "address": "12 Harbour Road" });
        let (status, body) = self.post("/contacts", token, body).await;
        assert_eq!(status, StatusCode::OK, "contact create failed: {}", body);
        body["results"]["contact_id"].as_str().expect("contact_id").to_string()
    }

    pub async fn create_cctv(&self, token: &str, contact_id: &str, name: &str, ip: &str) -> String {
        let body = json!({ "name": name, "contact_id": contact_id, "ip_address": ip, "status": "online" });
        let (status, body) = self.post("/cctvs", token, body).await;
        assert_eq!(status, StatusCode::OK, "cctv create failed: {}", body);
        body["results"]["cctv_id"].as_str().expect("cctv_id").to_string()
    }
}

/// The compiled server binary, started on a free port with in-memory storage.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_cctv-api"))
            .env("PORT", port.to_string())
            .env("STORAGE_BACKEND", "memory")
            .env("SECRETKEY", SECRET)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        let server = Self { port, base_url, child };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(format!("{}/ping", self.base_url)).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
