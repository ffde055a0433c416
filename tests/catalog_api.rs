//! Genre, actor and hall endpoints: admin-gated writes, representations and
//! validation.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{
    delete, get_json, sample_actor, sample_genre, send_json, TestApp, ADMIN_TOKEN, USER_TOKEN,
};

#[tokio::test]
async fn catalog_reads_require_authentication() {
    let app = TestApp::new();
    for uri in ["/genres", "/actors", "/halls"] {
        let (status, _) = get_json(&app, uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        let (status, _) = get_json(&app, uri, Some(USER_TOKEN)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn catalog_writes_require_admin() {
    let app = TestApp::new();
    let (status, _) =
        send_json(&app, "POST", "/genres", Some(USER_TOKEN), json!({"name": "Drama"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let payload = json!({"first_name": "John", "last_name": "Doe"});
    let (status, _) = send_json(&app, "POST", "/actors", Some(USER_TOKEN), payload).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let payload = json!({"name": "Blue", "rows": 20, "seats_in_row": 20});
    let (status, _) = send_json(&app, "POST", "/halls", Some(USER_TOKEN), payload).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_create_and_delete_genre() {
    let app = TestApp::new();
    let (status, body) =
        send_json(&app, "POST", "/genres", Some(ADMIN_TOKEN), json!({"name": "Drama"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Drama");
    let id = body["id"].as_i64().unwrap();

    let (status, _) = delete(&app, &format!("/genres/{id}"), Some(ADMIN_TOKEN)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get_json(&app, &format!("/genres/{id}"), Some(ADMIN_TOKEN)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn genre_names_are_unique() {
    let app = TestApp::new();
    sample_genre(&app.store, "Drama").await;
    let (status, body) =
        send_json(&app, "POST", "/genres", Some(ADMIN_TOKEN), json!({"name": "drama"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["name"].is_array());
}

#[tokio::test]
async fn blank_genre_name_is_rejected() {
    let app = TestApp::new();
    let (status, body) =
        send_json(&app, "POST", "/genres", Some(ADMIN_TOKEN), json!({"name": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn actors_expose_name_parts() {
    let app = TestApp::new();
    let actor = sample_actor(&app.store, "George", "Clooney").await;

    let (status, body) = get_json(&app, &format!("/actors/{}", actor.id), Some(USER_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "George");
    assert_eq!(body["last_name"], "Clooney");

    let payload = json!({"first_name": "", "last_name": "Doe"});
    let (status, body) = send_json(&app, "POST", "/actors", Some(ADMIN_TOKEN), payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["first_name"].is_array());
}

#[tokio::test]
async fn halls_expose_derived_capacity() {
    let app = TestApp::new();
    let payload = json!({"name": "Blue", "rows": 15, "seats_in_row": 12});
    let (status, body) = send_json(&app, "POST", "/halls", Some(ADMIN_TOKEN), payload).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["capacity"], 180);
    let id = body["id"].as_i64().unwrap();

    // Capacity follows a partial update of the dimensions.
    let (status, body) = send_json(
        &app,
        "PATCH",
        &format!("/halls/{id}"),
        Some(ADMIN_TOKEN),
        json!({"rows": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["capacity"], 120);
    assert_eq!(body["seats_in_row"], 12);
}

#[tokio::test]
async fn hall_dimensions_must_be_positive() {
    let app = TestApp::new();
    let payload = json!({"name": "Blue", "rows": 0, "seats_in_row": -2});
    let (status, body) = send_json(&app, "POST", "/halls", Some(ADMIN_TOKEN), payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["rows"].is_array());
    assert!(body["errors"]["seats_in_row"].is_array());
}
