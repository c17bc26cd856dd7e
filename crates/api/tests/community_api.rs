//! HTTP-level integration tests for community forum posts.
//!
//! Forum posts follow the same moderation contract as text guides through
//! their own endpoints and table.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get, get_auth, post_json_auth, put_json_auth, user_with_token};
use reefnet_core::roles::Role;
use serde_json::{json, Value};
use sqlx::PgPool;

async fn submit(app: axum::Router, token: &str, title: &str) -> i64 {
    let response = post_json_auth(
        app,
        "/community",
        json!({ "title": title, "content": "Anyone keeping seahorses with corals?" }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn public_ids(app: axum::Router) -> Vec<i64> {
    let response = get(app, "/community").await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_post_lifecycle_through_rejection_request(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "admin_ada", Role::Admin).await;
    let (support_id, support) = user_with_token(&pool, "support_sid", Role::Support).await;
    let (_, author) = user_with_token(&pool, "poster_pat", Role::User).await;
    let app = common::build_test_app(pool);

    let id = submit(app.clone(), &author, "Seahorse tankmates").await;
    assert!(!public_ids(app.clone()).await.contains(&id));

    // Admin decision.
    let response = put_json_auth(
        app.clone(),
        &format!("/approve_community/{id}"),
        json!({ "status": "approved" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(public_ids(app.clone()).await.contains(&id));

    // Support review files a rejection request.
    let response = put_json_auth(
        app.clone(),
        &format!("/reject_community/{id}"),
        json!({ "status": "rejected", "rejection_justification": "off-topic" }),
        &support,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["status"], "approved");
    assert_eq!(data["rejection_status"], "pending");
    assert_eq!(data["rejection_requested_by"], support_id);

    let response = get_auth(app.clone(), "/community/rejection_requests", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"][0]["id"], id);

    // Admin ratifies it.
    let response = put_json_auth(
        app.clone(),
        &format!("/rejection_approval/{id}"),
        json!({ "rejection_status": "approved" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["status"], "rejected");
    assert_eq!(data["rejection_status"], "approved");
    assert!(!public_ids(app).await.contains(&id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_posts_and_guides_are_separate(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "admin_abe", Role::Admin).await;
    let app = common::build_test_app(pool);

    let id = submit(app.clone(), &admin, "Published post").await;

    let response = get(app.clone(), &format!("/community/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Same id is not a text guide.
    let response = get(app, &format!("/text_guide/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_my_and_all_community_listings(pool: PgPool) {
    let (_, support) = user_with_token(&pool, "support_sue", Role::Support).await;
    let (_, author) = user_with_token(&pool, "poster_pia", Role::User).await;
    let (_, other) = user_with_token(&pool, "poster_pom", Role::User).await;
    let app = common::build_test_app(pool);

    let mine = submit(app.clone(), &author, "Mine").await;
    let theirs = submit(app.clone(), &other, "Theirs").await;

    let response = get_auth(app.clone(), "/my_community", &author).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data.as_array().unwrap().len(), 1);
    assert_eq!(data[0]["id"], mine);

    let response = get_auth(app.clone(), "/all_community", &author).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, "/all_community?status=pending", &support).await;
    let ids: Vec<Value> = body_json(response).await["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].clone())
        .collect();
    assert!(ids.contains(&json!(mine)) && ids.contains(&json!(theirs)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_post_edit_and_delete(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "admin_avi", Role::Admin).await;
    let (_, author) = user_with_token(&pool, "poster_paz", Role::User).await;
    let (_, other) = user_with_token(&pool, "poster_pev", Role::User).await;
    let app = common::build_test_app(pool);

    let id = submit(app.clone(), &admin, "Staff post").await;
    let uri = format!("/community/{id}");

    let response = put_json_auth(
        app.clone(),
        &uri,
        json!({ "title": "Taken over", "content": "x" }),
        &other,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let own = submit(app.clone(), &author, "My question").await;
    let response = put_json_auth(
        app.clone(),
        &format!("/community/{own}"),
        json!({ "title": "My question (edited)", "content": "More detail." }),
        &author,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "pending");

    let response = delete_auth(app.clone(), &uri, &author).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = delete_auth(app, &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_community_bulk_reject(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "admin_axl", Role::Admin).await;
    let app = common::build_test_app(pool);

    let a = submit(app.clone(), &admin, "One").await;
    let b = submit(app.clone(), &admin, "Two").await;

    let response = post_json_auth(
        app.clone(),
        "/community/bulk_action",
        json!({ "post_ids": [a, b], "action": "reject" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["affected"], 2);
    assert_eq!(data["missing"], json!([]));

    let public = public_ids(app).await;
    assert!(!public.contains(&a) && !public.contains(&b));
}
