mod common;

use axum::http::StatusCode;
use common::{
    body_bytes, build_test_app, delete_auth, expect_json, get_auth, post_json_auth,
    put_json_auth, seed_world,
};
use serde_json::json;
use sqlx::PgPool;

fn ids(json: &serde_json::Value) -> Vec<i64> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_lists_only_their_organization(pool: PgPool) {
    let world = seed_world(&pool).await;
    let app = build_test_app(pool);

    let zones = expect_json(
        get_auth(app.clone(), "/api/v1/zones", &world.a.admin_token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(ids(&zones), vec![world.a.zone_id]);

    let devices = expect_json(
        get_auth(app.clone(), "/api/v1/devices", &world.a.technician_token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(ids(&devices), vec![world.a.device_id]);

    let orgs = expect_json(
        get_auth(app, "/api/v1/organizations", &world.b.admin_token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(ids(&orgs), vec![world.b.org_id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_tenants_objects_are_not_found(pool: PgPool) {
    let world = seed_world(&pool).await;
    let app = build_test_app(pool);
    let token = &world.a.admin_token;

    for uri in [
        format!("/api/v1/organizations/{}", world.b.org_id),
        format!("/api/v1/zones/{}", world.b.zone_id),
        format!("/api/v1/devices/{}", world.b.device_id),
    ] {
        let json = expect_json(get_auth(app.clone(), &uri, token).await, StatusCode::NOT_FOUND).await;
        assert_eq!(json["code"], "NOT_FOUND", "{uri}");
    }

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/devices/{}", world.b.device_id),
        json!({ "name": "Hijacked" }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app, &format!("/api/v1/zones/{}", world.b.zone_id), token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn export_contains_only_visible_devices(pool: PgPool) {
    let world = seed_world(&pool).await;
    let app = build_test_app(pool);

    let response = get_auth(app, "/api/v1/devices/export", &world.a.admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/csv; charset=utf-8"
    );
    let csv = String::from_utf8(body_bytes(response).await).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "id,name,category,zone,organization,watts");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("TechCorp Meter"));
    assert!(!csv.contains("GreenEnergy"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn platform_manager_sees_every_organization(pool: PgPool) {
    let world = seed_world(&pool).await;
    let app = build_test_app(pool);

    let devices = expect_json(
        get_auth(app.clone(), "/api/v1/devices", &world.manager_token).await,
        StatusCode::OK,
    )
    .await;
    let mut found = ids(&devices);
    found.sort();
    let mut expected = vec![world.a.device_id, world.b.device_id];
    expected.sort();
    assert_eq!(found, expected);

    let response = get_auth(
        app,
        &format!("/api/v1/zones/{}", world.b.zone_id),
        &world.manager_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Clients without an organization
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unassigned_client_sees_nothing(pool: PgPool) {
    let world = seed_world(&pool).await;
    let app = build_test_app(pool);

    for uri in [
        "/api/v1/organizations",
        "/api/v1/zones",
        "/api/v1/devices",
        "/api/v1/measurements",
        "/api/v1/alerts",
    ] {
        let json = expect_json(get_auth(app.clone(), uri, &world.orphan_token).await, StatusCode::OK).await;
        assert!(json["data"].as_array().unwrap().is_empty(), "{uri}");
    }

    let response = get_auth(
        app,
        &format!("/api/v1/devices/{}", world.a.device_id),
        &world.orphan_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unassigned_client_cannot_create(pool: PgPool) {
    let world = seed_world(&pool).await;
    let app = build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/zones",
        json!({ "name": "Nowhere" }),
        &world.orphan_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        app,
        "/api/v1/devices",
        json!({ "name": "Ghost", "zone_id": world.a.zone_id }),
        &world.orphan_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Role permissions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn technician_cannot_modify_inventory(pool: PgPool) {
    let world = seed_world(&pool).await;
    let app = build_test_app(pool);
    let token = &world.a.technician_token;

    let response = post_json_auth(app.clone(), "/api/v1/zones", json!({ "name": "Lab" }), token).await;
    let json = expect_json(response, StatusCode::FORBIDDEN).await;
    assert_eq!(json["code"], "FORBIDDEN");

    let response = post_json_auth(
        app.clone(),
        "/api/v1/devices",
        json!({ "name": "Fan", "zone_id": world.a.zone_id }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.clone(), &format!("/api/v1/devices/{}", world.a.device_id), token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Measurements are the one thing technicians record.
    let response = post_json_auth(
        app,
        "/api/v1/measurements",
        json!({ "device_id": world.a.device_id, "consumption_kwh": 12.5 }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_admin_cannot_manage_organizations_or_users(pool: PgPool) {
    let world = seed_world(&pool).await;
    let app = build_test_app(pool);
    let token = &world.a.admin_token;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/organizations",
        json!({ "name": "Rogue Inc." }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, "/api/v1/admin/users", token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_admin_zone_goes_to_own_organization(pool: PgPool) {
    let world = seed_world(&pool).await;
    let app = build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/zones",
        json!({ "name": "Warehouse" }),
        &world.a.admin_token,
    )
    .await;
    let json = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(json["data"]["organization_id"], world.a.org_id);

    let response = post_json_auth(
        app,
        "/api/v1/zones",
        json!({ "name": "Warehouse", "organization_id": world.b.org_id }),
        &world.a.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn device_cannot_reference_other_tenants_zone(pool: PgPool) {
    let world = seed_world(&pool).await;
    let app = build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/devices",
        json!({ "name": "Sneaky", "zone_id": world.b.zone_id }),
        &world.a.admin_token,
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["fields"][0]["field"], "zone_id");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn measurement_cannot_reference_other_tenants_device(pool: PgPool) {
    let world = seed_world(&pool).await;
    let app = build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/measurements",
        json!({ "device_id": world.b.device_id, "consumption_kwh": 5.0 }),
        &world.a.technician_token,
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["fields"][0]["field"], "device_id");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn platform_manager_must_name_zone_organization(pool: PgPool) {
    let world = seed_world(&pool).await;
    let app = build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/zones",
        json!({ "name": "Roof" }),
        &world.manager_token,
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["fields"][0]["field"], "organization_id");

    let response = post_json_auth(
        app,
        "/api/v1/zones",
        json!({ "name": "Roof", "organization_id": world.b.org_id }),
        &world.manager_token,
    )
    .await;
    let json = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(json["data"]["organization_id"], world.b.org_id);
}
