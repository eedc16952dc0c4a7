#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use ecoenergy_api::auth::jwt::{generate_access_token, JwtConfig};
use ecoenergy_api::auth::password::hash_password;
use ecoenergy_api::config::ServerConfig;
use ecoenergy_api::notify::{PasswordResetNotice, ResetNotifier};
use ecoenergy_api::router::build_app_router;
use ecoenergy_api::state::AppState;
use ecoenergy_core::access::Principal;
use ecoenergy_core::device::DeviceCategory;
use ecoenergy_core::roles::Role;
use ecoenergy_core::types::DbId;
use ecoenergy_db::models::device::CreateDevice;
use ecoenergy_db::models::organization::CreateOrganization;
use ecoenergy_db::models::profile::CreateProfile;
use ecoenergy_db::models::user::{CreateUser, User};
use ecoenergy_db::models::zone::CreateZone;
use ecoenergy_db::repositories::{
    DeviceRepo, OrganizationRepo, ProfileRepo, UserRepo, ZoneRepo,
};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Password given to every seeded user.
pub const TEST_PASSWORD: &str = "Changeme123";

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Captures reset notices instead of logging them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<PasswordResetNotice>>,
}

impl RecordingNotifier {
    pub fn last_token(&self) -> Option<String> {
        self.notices.lock().unwrap().last().map(|n| n.token.clone())
    }

    pub fn count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }
}

impl ResetNotifier for RecordingNotifier {
    fn deliver(&self, notice: &PasswordResetNotice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

/// Build the application router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_notifier(pool, Arc::new(RecordingNotifier::default()))
}

pub fn build_test_app_with_notifier(pool: PgPool, notifier: Arc<RecordingNotifier>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        reset_notifier: notifier,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Assert the status and return the parsed body.
pub async fn expect_json(response: Response, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with a profile.
pub async fn seed_user(
    pool: &PgPool,
    username: &str,
    role: Role,
    organization_id: Option<DbId>,
    is_superuser: bool,
) -> User {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            is_superuser,
        },
    )
    .await
    .unwrap();
    ProfileRepo::create(
        pool,
        &CreateProfile {
            user_id: user.id,
            phone: String::new(),
            role,
            organization_id,
        },
    )
    .await
    .unwrap();
    user
}

/// Mint an access token without going through login.
pub fn token_for(user_id: DbId, role: Role, organization_id: Option<DbId>, is_superuser: bool) -> String {
    let principal = Principal {
        user_id,
        role,
        is_superuser,
        organization_id,
    };
    generate_access_token(&principal, &test_config().jwt).unwrap()
}

/// One organization with a zone, a device, an admin and a technician.
pub struct TenantFixture {
    pub org_id: DbId,
    pub zone_id: DbId,
    pub device_id: DbId,
    pub admin_token: String,
    pub technician_token: String,
}

/// Two tenants plus a platform manager and a client without organization.
pub struct World {
    pub a: TenantFixture,
    pub b: TenantFixture,
    pub manager_token: String,
    pub orphan_token: String,
}

pub async fn seed_tenant(pool: &PgPool, name: &str, prefix: &str) -> TenantFixture {
    let org = OrganizationRepo::create(
        pool,
        &CreateOrganization {
            name: name.to_string(),
        },
    )
    .await
    .unwrap();
    let zone = ZoneRepo::create(
        pool,
        &CreateZone {
            name: format!("{name} Office"),
            organization_id: org.id,
        },
    )
    .await
    .unwrap();
    let device = DeviceRepo::create(
        pool,
        &CreateDevice {
            name: format!("{name} Meter"),
            category: DeviceCategory::Sensor,
            zone_id: zone.id,
            watts: 15.5,
        },
    )
    .await
    .unwrap();

    let admin = seed_user(pool, &format!("{prefix}_admin"), Role::ClientAdmin, Some(org.id), false).await;
    let tech = seed_user(
        pool,
        &format!("{prefix}_tech"),
        Role::ClientTechnician,
        Some(org.id),
        false,
    )
    .await;

    TenantFixture {
        org_id: org.id,
        zone_id: zone.id,
        device_id: device.id,
        admin_token: token_for(admin.id, Role::ClientAdmin, Some(org.id), false),
        technician_token: token_for(tech.id, Role::ClientTechnician, Some(org.id), false),
    }
}

pub async fn seed_world(pool: &PgPool) -> World {
    let a = seed_tenant(pool, "TechCorp", "a").await;
    let b = seed_tenant(pool, "GreenEnergy", "b").await;
    let manager = seed_user(pool, "manager", Role::PlatformManager, None, false).await;
    let orphan = seed_user(pool, "orphan", Role::ClientAdmin, None, false).await;
    World {
        a,
        b,
        manager_token: token_for(manager.id, Role::PlatformManager, None, false),
        orphan_token: token_for(orphan.id, Role::ClientAdmin, None, false),
    }
}
