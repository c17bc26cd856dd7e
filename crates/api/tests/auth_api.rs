//! HTTP-level integration tests for the auth and admin endpoints.
//!
//! Covers registration, login, token refresh, logout, account lockout and
//! role assignment.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_user, get, get_auth, post_json, post_json_auth, put_json_auth,
    user_with_token, TEST_PASSWORD,
};
use reefnet_core::roles::Role;
use serde_json::json;
use sqlx::PgPool;

/// Log in via the API and return the JSON body.
async fn login(app: axum::Router, username: &str, password: &str) -> serde_json::Value {
    let response = post_json(
        app,
        "/auth/login",
        json!({ "username": username, "password": password }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_creates_user_role_account(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/auth/register",
        json!({ "username": "nemo", "email": "Nemo@Reef.test", "password": "clownfish-1" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "nemo");
    assert_eq!(json["data"]["email"], "nemo@reef.test");
    assert_eq!(json["data"]["role"], "user");
    assert!(json["data"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_short_password_is_400(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/auth/register",
        json!({ "username": "dory", "email": "dory@reef.test", "password": "short" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_invalid_email_is_400(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/auth/register",
        json!({ "username": "gill", "email": "not-an-email", "password": "long-enough-pw" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_duplicate_username_is_409(pool: PgPool) {
    create_user(&pool, "bruce", Role::User).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/auth/register",
        json!({ "username": "bruce", "email": "other@reef.test", "password": "fish-are-friends" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["message"], "Username or email is already registered");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_malformed_body_is_400_json(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/auth/register", json!({ "username": "x" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Login, refresh, logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_returns_tokens_and_role(pool: PgPool) {
    let user = create_user(&pool, "crush", Role::Support).await;
    let app = common::build_test_app(pool);

    let json = login(app, "crush", TEST_PASSWORD).await;

    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "support");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password_is_401(pool: PgPool) {
    create_user(&pool, "squirt", Role::User).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/auth/login",
        json!({ "username": "squirt", "password": "wrong-password" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_unknown_user_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/auth/login",
        json!({ "username": "ghost", "password": "whatever" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_deactivated_account_is_403(pool: PgPool) {
    let user = create_user(&pool, "anchor", Role::User).await;
    sqlx::query("UPDATE users SET is_active = false WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/auth/login",
        json!({ "username": "anchor", "password": TEST_PASSWORD }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_locks_after_repeated_failures(pool: PgPool) {
    create_user(&pool, "chum", Role::User).await;
    let app = common::build_test_app(pool);

    for _ in 0..5 {
        let response = post_json(
            app.clone(),
            "/auth/login",
            json!({ "username": "chum", "password": "bad-guess" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while locked.
    let response = post_json(
        app,
        "/auth/login",
        json!({ "username": "chum", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_lock_restarts_the_failure_count(pool: PgPool) {
    let user = create_user(&pool, "squirt", Role::User).await;
    let app = common::build_test_app(pool.clone());

    for _ in 0..5 {
        let response = post_json(
            app.clone(),
            "/auth/login",
            json!({ "username": "squirt", "password": "bad-guess" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    sqlx::query("UPDATE users SET locked_until = NOW() - INTERVAL '1 minute' WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    // One typo after the lock ran out is a first attempt, not a sixth.
    let response = post_json(
        app.clone(),
        "/auth/login",
        json!({ "username": "squirt", "password": "typo" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    login(app, "squirt", TEST_PASSWORD).await;

    let (count, locked_until): (i32, Option<chrono::DateTime<chrono::Utc>>) =
        sqlx::query_as("SELECT failed_login_count, locked_until FROM users WHERE id = $1")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 0);
    assert!(locked_until.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_wrong_password_does_not_reveal_account_state(pool: PgPool) {
    let user = create_user(&pool, "gurgle", Role::User).await;
    create_user(&pool, "bloat", Role::User).await;
    sqlx::query("UPDATE users SET is_active = false WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE users SET locked_until = NOW() + INTERVAL '10 minutes' WHERE username = 'bloat'")
        .execute(&pool)
        .await
        .unwrap();
    let app = common::build_test_app(pool);

    for username in ["gurgle", "bloat", "nobody"] {
        let response = post_json(
            app.clone(),
            "/auth/login",
            json!({ "username": username, "password": "bad-guess" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Invalid username or password");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_trims_username_like_register(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/auth/register",
        json!({ "username": "  peach ", "email": "peach@reef.test", "password": "starfish-99" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["username"], "peach");

    let json = login(app, " peach  ", "starfish-99").await;
    assert_eq!(json["user"]["username"], "peach");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_rotates_tokens(pool: PgPool) {
    create_user(&pool, "marlin", Role::User).await;
    let app = common::build_test_app(pool);

    let login_json = login(app.clone(), "marlin", TEST_PASSWORD).await;
    let refresh_token = login_json["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        app.clone(),
        "/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_ne!(json["refresh_token"], login_json["refresh_token"]);

    // The old refresh token is single-use.
    let response = post_json(app, "/auth/refresh", json!({ "refresh_token": refresh_token })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logout_revokes_refresh_tokens(pool: PgPool) {
    create_user(&pool, "pearl", Role::User).await;
    let app = common::build_test_app(pool);

    let login_json = login(app.clone(), "pearl", TEST_PASSWORD).await;
    let access = login_json["access_token"].as_str().unwrap();
    let refresh = login_json["refresh_token"].as_str().unwrap();

    let response = post_json_auth(app.clone(), "/auth/logout", json!({}), access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(app, "/auth/refresh", json!({ "refresh_token": refresh })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me_returns_current_user(pool: PgPool) {
    let (user_id, token) = user_with_token(&pool, "sheldon", Role::User).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/auth/me", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], user_id);
    assert_eq!(json["data"]["role"], "user");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_or_bad_token_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/auth/me", "not.a.jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

// ---------------------------------------------------------------------------
// Role assignment
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_assigns_support_role(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "coral", Role::Admin).await;
    let target = create_user(&pool, "tad", Role::User).await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app.clone(),
        &format!("/admin/users/{}/role", target.id),
        json!({ "role": "support" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "support");

    // The next login carries the new role.
    let json = login(app, "tad", TEST_PASSWORD).await;
    assert_eq!(json["user"]["role"], "support");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_admin_cannot_assign_roles(pool: PgPool) {
    let (_, support) = user_with_token(&pool, "deb", Role::Support).await;
    let target = create_user(&pool, "flo", Role::User).await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app,
        &format!("/admin/users/{}/role", target.id),
        json!({ "role": "admin" }),
        &support,
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assign_unknown_role_is_400(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "peach", Role::Admin).await;
    let target = create_user(&pool, "bubbles", Role::User).await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app,
        &format!("/admin/users/{}/role", target.id),
        json!({ "role": "superuser" }),
        &admin,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assign_role_to_missing_user_is_404(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "jacques", Role::Admin).await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app,
        "/admin/users/999999/role",
        json!({ "role": "support" }),
        &admin,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
