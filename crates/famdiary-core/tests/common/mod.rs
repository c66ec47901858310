//! Fake front-end and family API for exercising the client side.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use famdiary_core::{ApiClient, ClientConfig};
use serde_json::{json, Value};

#[derive(Clone, Default)]
pub struct Backend {
    inner: Arc<BackendState>,
}

#[derive(Default)]
struct BackendState {
    user: Mutex<Option<Value>>,
    members: Mutex<Vec<Value>>,
    me_calls: AtomicUsize,
    me_delay_ms: AtomicU64,
    member_calls: AtomicUsize,
    members_delay_ms: AtomicU64,
    members_fail: AtomicBool,
    logout_fail: AtomicBool,
    last_fields: Mutex<Option<String>>,
}

impl Backend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user: Value) {
        *self.inner.user.lock().unwrap() = Some(user);
    }

    pub fn sign_out(&self) {
        *self.inner.user.lock().unwrap() = None;
    }

    pub fn set_members(&self, members: Value) {
        let list = members.as_array().cloned().unwrap_or_default();
        *self.inner.members.lock().unwrap() = list;
    }

    pub fn me_calls(&self) -> usize {
        self.inner.me_calls.load(Ordering::SeqCst)
    }

    pub fn member_calls(&self) -> usize {
        self.inner.member_calls.load(Ordering::SeqCst)
    }

    pub fn last_fields(&self) -> Option<String> {
        self.inner.last_fields.lock().unwrap().clone()
    }

    pub fn delay_me(&self, ms: u64) {
        self.inner.me_delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn delay_members(&self, ms: u64) {
        self.inner.members_delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn fail_members(&self, fail: bool) {
        self.inner.members_fail.store(fail, Ordering::SeqCst);
    }

    pub fn fail_logout(&self, fail: bool) {
        self.inner.logout_fail.store(fail, Ordering::SeqCst);
    }

    pub async fn spawn(&self) -> SocketAddr {
        let app = Router::new()
            .route("/api/auth/me", get(me))
            .route("/api/auth/logout", post(logout))
            .route("/families/me/members", get(members))
            .route("/families/join-requests", post(join_request))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
        addr
    }
}

async fn delay(ms: &AtomicU64) {
    let ms = ms.load(Ordering::SeqCst);
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

async fn me(State(backend): State<Backend>) -> Response {
    backend.inner.me_calls.fetch_add(1, Ordering::SeqCst);
    delay(&backend.inner.me_delay_ms).await;

    let user = backend.inner.user.lock().unwrap().clone();
    match user {
        Some(user) => Json(json!({"authenticated": true, "user": user})).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Not authenticated"})),
        )
            .into_response(),
    }
}

async fn logout(State(backend): State<Backend>) -> Response {
    if backend.inner.logout_fail.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "logout unavailable").into_response();
    }
    backend.sign_out();
    Json(json!({"success": true})).into_response()
}

async fn members(
    State(backend): State<Backend>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    backend.inner.member_calls.fetch_add(1, Ordering::SeqCst);
    *backend.inner.last_fields.lock().unwrap() = params.get("fields").cloned();
    delay(&backend.inner.members_delay_ms).await;

    if backend.inner.members_fail.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    let data = backend.inner.members.lock().unwrap().clone();
    Json(json!({"data": data})).into_response()
}

async fn join_request(Json(body): Json<Value>) -> Response {
    match body["token"].as_str() {
        Some("valid-invite") => StatusCode::CREATED.into_response(),
        Some("silent-reject") => StatusCode::NOT_FOUND.into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Invitation has expired"})),
        )
            .into_response(),
    }
}

pub fn client_for(addr: SocketAddr) -> ApiClient {
    ApiClient::new(ClientConfig {
        app_url: format!("http://{}", addr),
        api_url: format!("http://{}/", addr),
        request_timeout_secs: Some(5),
    })
    .expect("api client")
}

pub fn family_user(id: &str, family_id: &str) -> Value {
    json!({"id": id, "role": "member", "familyId": family_id, "permissions": ["post"]})
}

pub fn solo_user(id: &str) -> Value {
    json!({"id": id, "role": "user"})
}
