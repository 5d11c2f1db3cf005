//! HTTP tests for user, group, resource and membership endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    app, create_group, create_resource, create_user, empty_request, json_request, send,
};

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, body) = send(&app, empty_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn user_crud_round() {
    let app = app().await;

    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/users",
            serde_json::json!({
                "username": "alice",
                "email": "alice@example.com",
                "name": "Alice Liddell",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["username"], "alice");
    assert!(created["createdAt"].is_string());
    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = send(&app, empty_request("GET", &format!("/api/users/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Alice Liddell");
    assert_eq!(fetched["memberships"], serde_json::json!([]));

    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/users/{id}"),
            serde_json::json!({ "email": "alice@wonderland.example" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["email"], "alice@wonderland.example");
    assert_eq!(updated["username"], "alice");

    let (status, listed) = send(&app, empty_request("GET", "/api/users")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, deleted) = send(&app, empty_request("DELETE", &format!("/api/users/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(deleted["message"].is_string());

    let (status, body) = send(&app, empty_request("GET", &format!("/api/users/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn invalid_user_payloads_are_rejected() {
    let app = app().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/users",
            serde_json::json!({ "username": "alice", "email": "nope" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, body) = send(
        &app,
        json_request("POST", "/api/users", serde_json::json!({ "email": "a@b.example" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, body) = send(&app, empty_request("GET", "/api/users/42")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn duplicates_are_conflicts() {
    let app = app().await;
    create_user(&app, "alice").await;
    create_group(&app, "editors").await;
    create_resource(&app, "reports").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/users",
            serde_json::json!({ "username": "alice", "email": "alice2@example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (status, _) = send(
        &app,
        json_request("POST", "/api/groups", serde_json::json!({ "name": "editors" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        json_request("POST", "/api/resources", serde_json::json!({ "key": "reports" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn membership_endpoints() {
    let app = app().await;
    let user_id = create_user(&app, "alice").await;
    let group_id = create_group(&app, "editors").await;

    let add = || {
        json_request(
            "POST",
            &format!("/api/groups/{group_id}/users"),
            serde_json::json!({ "userId": user_id }),
        )
    };

    let (status, membership) = send(&app, add()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(membership["username"], "alice");
    assert_eq!(membership["groupName"], "editors");

    let (status, body) = send(&app, add()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (status, group) = send(&app, empty_request("GET", &format!("/api/groups/{group_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(group["memberships"].as_array().unwrap().len(), 1);

    let remove = || empty_request("DELETE", &format!("/api/groups/{group_id}/users/{user_id}"));
    let (status, _) = send(&app, remove()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, remove()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn membership_with_unknown_user_is_not_found() {
    let app = app().await;
    let group_id = create_group(&app, "editors").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/groups/{group_id}/users"),
            serde_json::json!({ "userId": uuid::Uuid::new_v4() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn resource_update_and_delete() {
    let app = app().await;
    let id = create_resource(&app, "account/change-password").await;

    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/resources/{id}"),
            serde_json::json!({ "name": "Change password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["key"], "account/change-password");
    assert_eq!(updated["name"], "Change password");

    let (status, _) = send(&app, empty_request("DELETE", &format!("/api/resources/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, empty_request("DELETE", &format!("/api/resources/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
