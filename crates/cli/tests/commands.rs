use ecoenergy_cli::commands::repair::{DEFAULT_ORGANIZATION, DEFAULT_ZONE};
use ecoenergy_cli::commands::{diagnose, repair, seed_data, seed_users, GREENENERGY, TECHCORP};
use ecoenergy_core::roles::Role;
use ecoenergy_db::models::profile::CreateProfile;
use ecoenergy_db::models::user::CreateUser;
use ecoenergy_db::repositories::{
    AlertRepo, DeviceRepo, MeasurementRepo, OrganizationRepo, ProfileRepo, UserRepo, ZoneRepo,
};
use sqlx::PgPool;

async fn bare_user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "not-a-real-hash".to_string(),
            is_superuser: false,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// seed-users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn seed_users_creates_one_account_per_role(pool: PgPool) {
    let report = seed_users::run(&pool, "Admin12345", "User12345").await.unwrap();

    assert_eq!(report.organizations_created.len(), 2);
    assert_eq!(report.users_created.len(), 4);
    assert!(report.users_skipped.is_empty());

    let techcorp = OrganizationRepo::find_by_name(&pool, TECHCORP).await.unwrap().unwrap();
    let technician = UserRepo::find_by_username(&pool, "technician").await.unwrap().unwrap();
    let profile = ProfileRepo::find_by_user_id(&pool, technician.id).await.unwrap().unwrap();
    assert_eq!(profile.role, Role::ClientTechnician);
    assert_eq!(profile.organization_id, Some(techcorp.id));

    let manager = UserRepo::find_by_username(&pool, "manager").await.unwrap().unwrap();
    let profile = ProfileRepo::find_by_user_id(&pool, manager.id).await.unwrap().unwrap();
    assert_eq!(profile.role, Role::PlatformManager);
    assert_eq!(profile.organization_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn seed_users_is_idempotent(pool: PgPool) {
    seed_users::run(&pool, "Admin12345", "User12345").await.unwrap();
    let second = seed_users::run(&pool, "Admin12345", "User12345").await.unwrap();

    assert!(second.organizations_created.is_empty());
    assert!(second.users_created.is_empty());
    assert_eq!(second.users_skipped.len(), 4);
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 4);
}

// ---------------------------------------------------------------------------
// seed-data
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn seed_data_requires_seeded_organizations(pool: PgPool) {
    let err = seed_data::run(&pool, 10).await.unwrap_err();
    assert!(err.to_string().contains("seed-users"), "{err}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn seed_data_populates_both_organizations(pool: PgPool) {
    seed_users::run(&pool, "Admin12345", "User12345").await.unwrap();

    let report = seed_data::run(&pool, 3).await.unwrap();
    assert_eq!(report.zones_created, 5);
    assert_eq!(report.devices_created, 9);
    assert_eq!(report.measurements_created, 27);

    let green = OrganizationRepo::find_by_name(&pool, GREENENERGY).await.unwrap().unwrap();
    assert_eq!(ZoneRepo::count(&pool, Some(green.id)).await.unwrap(), 2);
    assert_eq!(DeviceRepo::count(&pool, Some(green.id)).await.unwrap(), 4);
    assert_eq!(MeasurementRepo::count(&pool, None).await.unwrap(), 27);
    assert_eq!(
        AlertRepo::count(&pool, None).await.unwrap(),
        report.alerts_raised as i64
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn seed_data_rerun_adds_nothing(pool: PgPool) {
    seed_users::run(&pool, "Admin12345", "User12345").await.unwrap();
    seed_data::run(&pool, 2).await.unwrap();

    let second = seed_data::run(&pool, 2).await.unwrap();
    assert_eq!(second.zones_created, 0);
    assert_eq!(second.devices_created, 0);
    assert_eq!(second.measurements_created, 0);
    assert_eq!(DeviceRepo::count(&pool, None).await.unwrap(), 9);
}

// ---------------------------------------------------------------------------
// diagnose / repair
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn repair_attaches_orphans_to_default_organization(pool: PgPool) {
    seed_users::run(&pool, "Admin12345", "User12345").await.unwrap();
    let no_profile = bare_user(&pool, "legacy").await;
    let no_org = bare_user(&pool, "drifter").await;
    ProfileRepo::create(
        &pool,
        &CreateProfile {
            user_id: no_org,
            phone: String::new(),
            role: Role::ClientTechnician,
            organization_id: None,
        },
    )
    .await
    .unwrap();

    let before = diagnose::run(&pool).await.unwrap();
    assert_eq!(before.users_without_profile, 1);
    assert_eq!(before.clients_without_organization, 1);
    assert!(before.needs_repair());

    let report = repair::run(&pool).await.unwrap();
    assert!(report.organization_created);
    assert!(report.zone_created);
    assert_eq!(report.profiles_created, vec!["legacy".to_string()]);
    assert_eq!(report.profiles_attached, 1);

    let default_org = OrganizationRepo::find_by_name(&pool, DEFAULT_ORGANIZATION)
        .await
        .unwrap()
        .unwrap();
    let legacy = ProfileRepo::find_by_user_id(&pool, no_profile).await.unwrap().unwrap();
    assert_eq!(legacy.role, Role::ClientAdmin);
    assert_eq!(legacy.organization_id, Some(default_org.id));
    let drifter = ProfileRepo::find_by_user_id(&pool, no_org).await.unwrap().unwrap();
    assert_eq!(drifter.role, Role::ClientTechnician);
    assert_eq!(drifter.organization_id, Some(default_org.id));

    let zones = ZoneRepo::list(&pool, Some(default_org.id)).await.unwrap();
    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0].name, DEFAULT_ZONE);

    // The platform manager stays global.
    let manager = UserRepo::find_by_username(&pool, "manager").await.unwrap().unwrap();
    let profile = ProfileRepo::find_by_user_id(&pool, manager.id).await.unwrap().unwrap();
    assert_eq!(profile.organization_id, None);

    let after = diagnose::run(&pool).await.unwrap();
    assert!(!after.needs_repair());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repair_twice_changes_nothing(pool: PgPool) {
    repair::run(&pool).await.unwrap();
    let second = repair::run(&pool).await.unwrap();

    assert!(!second.organization_created);
    assert!(!second.zone_created);
    assert!(second.profiles_created.is_empty());
    assert_eq!(second.profiles_attached, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn diagnose_report_lists_users_and_zones(pool: PgPool) {
    seed_users::run(&pool, "Admin12345", "User12345").await.unwrap();
    seed_data::run(&pool, 1).await.unwrap();

    let report = diagnose::run(&pool).await.unwrap();
    assert_eq!(report.users.len(), 4);
    assert_eq!(report.organizations.len(), 2);
    assert_eq!(report.zones.len(), 5);
    assert_eq!(report.devices, 9);

    let text = report.to_string();
    assert!(text.contains("technician (client_technician, TechCorp S.A.)"), "{text}");
    assert!(text.contains("Server Room (TechCorp S.A.)"), "{text}");
}
