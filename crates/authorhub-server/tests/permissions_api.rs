//! HTTP tests for permission grants, checks and effective permissions.

mod common;

use axum::Router;
use axum::http::StatusCode;
use common::{
    app, create_group, create_resource, create_user, empty_request, json_request, send,
};

async fn join(app: &Router, group_id: &str, user_id: &str) {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            &format!("/api/groups/{group_id}/users"),
            serde_json::json!({ "userId": user_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
}

async fn grant(
    app: &Router,
    group_id: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        json_request("POST", &format!("/api/permissions/groups/{group_id}"), body),
    )
    .await
}

async fn check(app: &Router, user_id: &str, resource: &str, action: &str) -> bool {
    let (status, body) = send(
        app,
        empty_request(
            "GET",
            &format!(
                "/api/permissions/check?user_id={user_id}&resource={resource}&action={action}"
            ),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["allowed"].as_bool().expect("allowed flag")
}

#[tokio::test]
async fn grant_then_check() {
    let app = app().await;
    let user_id = create_user(&app, "alice").await;
    let group_id = create_group(&app, "editors").await;
    let resource_id = create_resource(&app, "account/change-password").await;
    join(&app, &group_id, &user_id).await;

    let (status, permission) = grant(
        &app,
        &group_id,
        serde_json::json!({ "resourceId": resource_id, "canUpdate": true }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(permission["resourceKey"], "account/change-password");
    assert_eq!(permission["canUpdate"], true);
    assert_eq!(permission["canRead"], false);

    assert!(check(&app, &user_id, "account/change-password", "update").await);
    assert!(!check(&app, &user_id, "account/change-password", "delete").await);
    assert!(!check(&app, &user_id, "account", "update").await);
}

#[tokio::test]
async fn check_validates_its_query() {
    let app = app().await;
    let user_id = create_user(&app, "alice").await;

    let (status, body) = send(
        &app,
        empty_request(
            "GET",
            &format!("/api/permissions/check?user_id={user_id}&resource=reports&action=approve"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, _) = send(
        &app,
        empty_request("GET", "/api/permissions/check?resource=reports&action=read"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        empty_request(
            "GET",
            &format!(
                "/api/permissions/check?user_id={}&resource=reports&action=read",
                uuid::Uuid::new_v4()
            ),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn duplicate_grant_conflicts_and_update_merges() {
    let app = app().await;
    let group_id = create_group(&app, "editors").await;
    let resource_id = create_resource(&app, "reports").await;

    let body = serde_json::json!({ "resourceId": resource_id, "canRead": true });
    let (status, _) = grant(&app, &group_id, body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, conflict) = grant(&app, &group_id, body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict["code"], "conflict");

    let pair = format!("/api/permissions/groups/{group_id}/resources/{resource_id}");
    let (status, updated) = send(
        &app,
        json_request("PUT", &pair, serde_json::json!({ "canDelete": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["canRead"], true);
    assert_eq!(updated["canDelete"], true);

    let (status, _) = send(&app, json_request("PUT", &pair, serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, listed) = send(
        &app,
        empty_request("GET", &format!("/api/permissions/groups/{group_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, empty_request("DELETE", &pair)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, empty_request("DELETE", &pair)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn grant_on_missing_group_or_resource_is_not_found() {
    let app = app().await;
    let group_id = create_group(&app, "editors").await;
    let resource_id = create_resource(&app, "reports").await;

    let (status, _) = grant(
        &app,
        &uuid::Uuid::new_v4().to_string(),
        serde_json::json!({ "resourceId": resource_id }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = grant(
        &app,
        &group_id,
        serde_json::json!({ "resourceId": uuid::Uuid::new_v4() }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        empty_request(
            "GET",
            &format!("/api/permissions/groups/{}", uuid::Uuid::new_v4()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn effective_permissions_keep_group_provenance() {
    let app = app().await;
    let user_id = create_user(&app, "alice").await;
    let editors = create_group(&app, "editors").await;
    let viewers = create_group(&app, "viewers").await;
    let resource_id = create_resource(&app, "reports").await;
    join(&app, &editors, &user_id).await;
    join(&app, &viewers, &user_id).await;

    for group_id in [&editors, &viewers] {
        let (status, _) = grant(
            &app,
            group_id,
            serde_json::json!({ "resourceId": resource_id, "canRead": true }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, effective) = send(
        &app,
        empty_request("GET", &format!("/api/permissions/user/{user_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(effective["userId"], user_id.as_str());
    assert_eq!(effective["groups"].as_array().unwrap().len(), 2);

    let entries = effective["permissions"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    let mut origins: Vec<&str> = entries
        .iter()
        .map(|entry| entry["groupId"].as_str().unwrap())
        .collect();
    origins.sort();
    let mut expected = vec![editors.as_str(), viewers.as_str()];
    expected.sort();
    assert_eq!(origins, expected);
}

#[tokio::test]
async fn deleting_group_removes_its_grants() {
    let app = app().await;
    let user_id = create_user(&app, "alice").await;
    let group_id = create_group(&app, "editors").await;
    let resource_id = create_resource(&app, "reports").await;
    join(&app, &group_id, &user_id).await;
    grant(
        &app,
        &group_id,
        serde_json::json!({ "resourceId": resource_id, "canRead": true }),
    )
    .await;

    let (status, _) = send(&app, empty_request("DELETE", &format!("/api/groups/{group_id}"))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, all) = send(&app, empty_request("GET", "/api/permissions")).await;
    assert!(all.as_array().unwrap().is_empty());
    assert!(!check(&app, &user_id, "reports", "read").await);

    let (_, user) = send(&app, empty_request("GET", &format!("/api/users/{user_id}"))).await;
    assert!(user["memberships"].as_array().unwrap().is_empty());
}
