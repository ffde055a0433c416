//! Shared test harness: a full router over the in-memory store, plus the
//! sample fixtures the suites build on.

// Helpers are shared across suites; each test binary only uses a subset.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use cinema_api::auth::{Role, TokenRegistry};
use cinema_api::create_router;
use cinema_api::media::MediaStore;
use cinema_api::models::actor_model::Actor;
use cinema_api::models::booking_model::Ticket;
use cinema_api::models::genre_model::Genre;
use cinema_api::models::hall_model::CinemaHall;
use cinema_api::models::movie_model::Movie;
use cinema_api::models::session_model::MovieSession;
use cinema_api::storage::{
    EntityStore, MemoryStore, NewMovie, NewSession, NewTicket,
};

pub const ADMIN_TOKEN: &str = "admin-token";
pub const USER_TOKEN: &str = "user-token";

/// Minimal JPEG header, enough for format sniffing.
pub const JPEG_BYTES: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00,
];

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    tokens: Arc<TokenRegistry>,
    // Kept alive so uploaded posters have somewhere to live.
    media_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let mut registry = TokenRegistry::new();
        registry.register(ADMIN_TOKEN, Role::Admin);
        registry.register(USER_TOKEN, Role::Regular);
        Self {
            store: Arc::new(MemoryStore::new()),
            tokens: Arc::new(registry),
            media_dir: tempfile::tempdir().expect("failed to create media dir"),
        }
    }

    /// Fresh router over the shared store, the right shape for `oneshot`.
    pub fn router(&self) -> axum::Router {
        create_router(
            self.store.clone(),
            Arc::clone(&self.tokens),
            Arc::new(MediaStore::new(self.media_dir.path().to_path_buf())),
        )
    }
}

async fn send(router: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn with_auth(
    builder: axum::http::request::Builder,
    token: Option<&str>,
) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

pub async fn get_json(app: &TestApp, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let builder = with_auth(Request::builder().method("GET").uri(uri), token);
    send(app.router(), builder.body(Body::empty()).unwrap()).await
}

pub async fn send_json(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    let builder = with_auth(Request::builder().method(method).uri(uri), token)
        .header(header::CONTENT_TYPE, "application/json");
    send(
        app.router(),
        builder
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await
}

pub async fn delete(app: &TestApp, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let builder = with_auth(Request::builder().method("DELETE").uri(uri), token);
    send(app.router(), builder.body(Body::empty()).unwrap()).await
}

/// Posts a multipart body with a single `image` field.
pub async fn upload_image(
    app: &TestApp,
    uri: &str,
    token: Option<&str>,
    content_type: &str,
    bytes: &[u8],
) -> (StatusCode, Value) {
    let boundary = "cinema-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; \
             filename=\"poster.jpg\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let builder = with_auth(Request::builder().method("POST").uri(uri), token).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={boundary}"),
    );
    send(app.router(), builder.body(Body::from(body)).unwrap()).await
}

// Sample fixtures, seeded directly through the store.

pub async fn sample_genre(store: &MemoryStore, name: &str) -> Genre {
    store.insert_genre(name).await.unwrap()
}

pub async fn sample_actor(store: &MemoryStore, first_name: &str, last_name: &str) -> Actor {
    store.insert_actor(first_name, last_name).await.unwrap()
}

pub async fn sample_hall(store: &MemoryStore) -> CinemaHall {
    store.insert_hall("Blue", 20, 20).await.unwrap()
}

pub async fn sample_movie(store: &MemoryStore, title: &str) -> Movie {
    sample_movie_with(store, title, &[], &[]).await
}

pub async fn sample_movie_with(
    store: &MemoryStore,
    title: &str,
    genres: &[i64],
    actors: &[i64],
) -> Movie {
    store
        .insert_movie(NewMovie {
            title: title.to_string(),
            description: "Sample description".to_string(),
            duration: 90,
            genres: genres.to_vec(),
            actors: actors.to_vec(),
        })
        .await
        .unwrap()
}

pub async fn sample_session(store: &MemoryStore, movie_id: i64, hall_id: i64) -> MovieSession {
    store
        .insert_session(NewSession {
            show_time: Utc.with_ymd_and_hms(2022, 6, 2, 14, 0, 0).unwrap(),
            movie_id,
            cinema_hall_id: hall_id,
        })
        .await
        .unwrap()
}

pub async fn sample_ticket(store: &MemoryStore, session_id: i64, row: i32, seat: i32) -> Ticket {
    store
        .insert_ticket(NewTicket {
            movie_session_id: session_id,
            row,
            seat,
        })
        .await
        .unwrap()
}

/// Collects the `title` fields of a JSON listing.
pub fn titles(listing: &Value) -> Vec<String> {
    listing
        .as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|item| item["title"].as_str().unwrap_or_default().to_string())
        .collect()
}
