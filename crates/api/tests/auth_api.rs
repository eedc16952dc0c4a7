mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, build_test_app_with_notifier, expect_json, get, get_auth,
    post_json, post_json_auth, seed_user, RecordingNotifier, TEST_PASSWORD,
};
use ecoenergy_core::roles::Role;
use ecoenergy_db::repositories::{OrganizationRepo, UserRepo};
use ecoenergy_db::models::organization::CreateOrganization;
use serde_json::json;
use sqlx::PgPool;

async fn login(app: axum::Router, username: &str, password: &str) -> axum::response::Response {
    post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": username, "password": password }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_tokens_with_tenant_context(pool: PgPool) {
    let org = OrganizationRepo::create(
        &pool,
        &CreateOrganization {
            name: "TechCorp S.A.".to_string(),
        },
    )
    .await
    .unwrap();
    seed_user(&pool, "alice", Role::ClientAdmin, Some(org.id), false).await;
    let app = build_test_app(pool);

    let json = expect_json(login(app, "alice", TEST_PASSWORD).await, StatusCode::OK).await;

    assert!(json["access_token"].as_str().unwrap().len() > 20);
    assert!(!json["refresh_token"].as_str().unwrap().is_empty());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["username"], "alice");
    assert_eq!(json["user"]["role"], "client_admin");
    assert_eq!(json["user"]["organization_id"], org.id);
    assert_eq!(json["user"]["is_superuser"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_with_wrong_password_is_unauthorized(pool: PgPool) {
    seed_user(&pool, "bob", Role::ClientTechnician, None, false).await;
    let app = build_test_app(pool);

    let json = expect_json(login(app, "bob", "Wrong12345").await, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Invalid username or password");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_with_unknown_user_is_unauthorized(pool: PgPool) {
    let app = build_test_app(pool);
    let response = login(app, "nobody", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn account_locks_after_repeated_failures(pool: PgPool) {
    seed_user(&pool, "carol", Role::ClientTechnician, None, false).await;
    let app = build_test_app(pool);

    for _ in 0..5 {
        let response = login(app.clone(), "carol", "Wrong12345").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // The correct password no longer works while the lock holds.
    let json = expect_json(login(app, "carol", TEST_PASSWORD).await, StatusCode::FORBIDDEN).await;
    assert!(json["error"].as_str().unwrap().contains("locked"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_creates_missing_profile(pool: PgPool) {
    use ecoenergy_api::auth::password::hash_password;
    use ecoenergy_db::models::user::CreateUser;
    use ecoenergy_db::repositories::{ProfileRepo, UserRepo};

    let user = UserRepo::create(
        &pool,
        &CreateUser {
            username: "legacy".to_string(),
            email: "legacy@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            is_superuser: false,
        },
    )
    .await
    .unwrap();
    let app = build_test_app(pool.clone());

    let json = expect_json(login(app, "legacy", TEST_PASSWORD).await, StatusCode::OK).await;
    assert_eq!(json["user"]["role"], "client_technician");
    assert!(json["user"]["organization_id"].is_null());
    assert!(ProfileRepo::find_by_user_id(&pool, user.id)
        .await
        .unwrap()
        .is_some());
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn protected_route_requires_bearer_token(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app.clone(), "/api/v1/zones").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/api/v1/zones", "not-a-jwt").await;
    let json = expect_json(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["error"], "Invalid or expired token");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_the_refresh_token(pool: PgPool) {
    seed_user(&pool, "dave", Role::ClientTechnician, None, false).await;
    let app = build_test_app(pool);

    let first = body_json(login(app.clone(), "dave", TEST_PASSWORD).await).await;
    let old_refresh = first["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": old_refresh }),
    )
    .await;
    let second = expect_json(response, StatusCode::OK).await;
    assert_ne!(second["refresh_token"], first["refresh_token"]);

    // The old token was revoked by rotation.
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": old_refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_picks_up_new_organization_assignment(pool: PgPool) {
    use ecoenergy_db::repositories::ProfileRepo;

    let user = seed_user(&pool, "erin", Role::ClientTechnician, None, false).await;
    let org = OrganizationRepo::create(
        &pool,
        &CreateOrganization {
            name: "GreenEnergy Ltda.".to_string(),
        },
    )
    .await
    .unwrap();
    let app = build_test_app(pool.clone());

    let first = body_json(login(app.clone(), "erin", TEST_PASSWORD).await).await;
    assert!(first["user"]["organization_id"].is_null());

    ProfileRepo::update_assignment(&pool, user.id, Role::ClientAdmin, Some(org.id))
        .await
        .unwrap();

    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": first["refresh_token"] }),
    )
    .await;
    let second = expect_json(response, StatusCode::OK).await;
    assert_eq!(second["user"]["organization_id"], org.id);
    assert_eq!(second["user"]["role"], "client_admin");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_refresh_tokens(pool: PgPool) {
    seed_user(&pool, "frank", Role::ClientTechnician, None, false).await;
    let app = build_test_app(pool);

    let tokens = body_json(login(app.clone(), "frank", TEST_PASSWORD).await).await;
    let access = tokens["access_token"].as_str().unwrap();

    let response = post_json_auth(app.clone(), "/api/v1/auth/logout", json!({}), access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": tokens["refresh_token"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_unassigned_technician(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({
            "username": "newbie",
            "email": "newbie@example.com",
            "first_name": "New",
            "password": "Sup3rSecret",
            "password_confirm": "Sup3rSecret",
        }),
    )
    .await;
    let json = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(json["user"]["username"], "newbie");
    assert_eq!(json["user"]["role"], "client_technician");
    assert!(json["user"]["organization_id"].is_null());
    assert!(json["access_token"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_taken_username(pool: PgPool) {
    seed_user(&pool, "taken", Role::ClientTechnician, None, false).await;
    let app = build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({
            "username": "taken",
            "email": "other@example.com",
            "password": "Sup3rSecret",
            "password_confirm": "Sup3rSecret",
        }),
    )
    .await;
    let json = expect_json(response, StatusCode::CONFLICT).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_reports_every_invalid_field(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({
            "username": "weak",
            "email": "not-an-email",
            "password": "short",
            "password_confirm": "different",
        }),
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let fields: Vec<&str> = json["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
    assert!(fields.contains(&"password_confirm"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_blank_username(pool: PgPool) {
    let app = build_test_app(pool.clone());

    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({
            "username": "   ",
            "email": "blank@example.com",
            "password": "Welcome123",
            "password_confirm": "Welcome123",
        }),
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["fields"][0]["field"], "username");
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn users_table_rejects_empty_username(pool: PgPool) {
    let err = sqlx::query("INSERT INTO users (username, password_hash) VALUES ('', 'x')")
        .execute(&pool)
        .await
        .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("chk_users_username_length"));
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_reset_flow_sets_new_password(pool: PgPool) {
    seed_user(&pool, "grace", Role::ClientTechnician, None, false).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let app = build_test_app_with_notifier(pool, notifier.clone());

    let response = post_json(
        app.clone(),
        "/api/v1/auth/password-reset",
        json!({ "email": "grace@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let token = notifier.last_token().expect("reset notice delivered");

    let response = post_json(
        app.clone(),
        "/api/v1/auth/password-reset/confirm",
        json!({
            "token": token,
            "new_password": "Brandnew999",
            "new_password_confirm": "Brandnew999",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(
        login(app.clone(), "grace", TEST_PASSWORD).await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        login(app.clone(), "grace", "Brandnew999").await.status(),
        StatusCode::OK
    );

    // Tokens are single use.
    let response = post_json(
        app,
        "/api/v1/auth/password-reset/confirm",
        json!({
            "token": token,
            "new_password": "Another999X",
            "new_password_confirm": "Another999X",
        }),
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["error"], "Invalid or expired reset token");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_reset_for_unknown_email_is_silent(pool: PgPool) {
    let notifier = Arc::new(RecordingNotifier::default());
    let app = build_test_app_with_notifier(pool, notifier.clone());

    let response = post_json(
        app,
        "/api/v1/auth/password-reset",
        json!({ "email": "ghost@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(notifier.count(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_reset_confirm_enforces_password_rules(pool: PgPool) {
    seed_user(&pool, "heidi", Role::ClientTechnician, None, false).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let app = build_test_app_with_notifier(pool, notifier.clone());

    post_json(
        app.clone(),
        "/api/v1/auth/password-reset",
        json!({ "email": "heidi@example.com" }),
    )
    .await;
    let token = notifier.last_token().unwrap();

    let response = post_json(
        app,
        "/api/v1/auth/password-reset/confirm",
        json!({
            "token": token,
            "new_password": "alllowercase",
            "new_password_confirm": "alllowercase",
        }),
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["fields"][0]["field"], "new_password");
}
