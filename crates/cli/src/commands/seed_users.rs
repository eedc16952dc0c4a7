//! `ecoenergy seed-users`: demo organizations and one account per role.

use std::fmt;

use anyhow::Context;
use ecoenergy_api::auth::password::hash_password;
use ecoenergy_core::roles::Role;
use ecoenergy_db::models::profile::CreateProfile;
use ecoenergy_db::models::user::CreateUser;
use ecoenergy_db::repositories::{OrganizationRepo, ProfileRepo, UserRepo};
use ecoenergy_db::DbPool;

use super::{GREENENERGY, TECHCORP};

/// Which configured password an account receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PasswordKind {
    Admin,
    User,
}

struct SeedUser {
    username: &'static str,
    email: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    phone: &'static str,
    role: Role,
    organization: Option<&'static str>,
    password: PasswordKind,
}

const SEED_USERS: [SeedUser; 4] = [
    SeedUser {
        username: "manager",
        email: "manager@ecoenergy.com",
        first_name: "Carlos",
        last_name: "Manager",
        phone: "+56911111111",
        role: Role::PlatformManager,
        organization: None,
        password: PasswordKind::Admin,
    },
    SeedUser {
        username: "admin_client",
        email: "admin@techcorp.com",
        first_name: "Maria",
        last_name: "Lead",
        phone: "+56922222222",
        role: Role::ClientAdmin,
        organization: Some(TECHCORP),
        password: PasswordKind::Admin,
    },
    SeedUser {
        username: "technician",
        email: "technician@techcorp.com",
        first_name: "Juan",
        last_name: "Field",
        phone: "+56933333333",
        role: Role::ClientTechnician,
        organization: Some(TECHCORP),
        password: PasswordKind::User,
    },
    SeedUser {
        username: "admin_green",
        email: "admin@greenenergy.com",
        first_name: "Ana",
        last_name: "Director",
        phone: "+56944444444",
        role: Role::ClientAdmin,
        organization: Some(GREENENERGY),
        password: PasswordKind::Admin,
    },
];

/// What a `seed-users` run created.
#[derive(Debug, Default)]
pub struct SeedUsersReport {
    pub organizations_created: Vec<String>,
    pub users_created: Vec<(String, Role)>,
    pub users_skipped: Vec<String>,
}

impl fmt::Display for SeedUsersReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in &self.organizations_created {
            writeln!(f, "* Organization created: {name}")?;
        }
        for (username, role) in &self.users_created {
            writeln!(f, "* {} created: {username}", role.label())?;
        }
        for username in &self.users_skipped {
            writeln!(f, "- {username} already exists, skipped")?;
        }
        writeln!(f)?;
        writeln!(f, "Roles:")?;
        writeln!(f, "- Platform Manager: every organization")?;
        writeln!(f, "- Client Admin: full CRUD within their organization")?;
        writeln!(f, "- Client Technician: readings CRUD, read-only inventory")
    }
}

/// Create the demo organizations and users. Existing usernames are left
/// untouched, so the command can be re-run safely.
pub async fn run(
    pool: &DbPool,
    admin_password: &str,
    user_password: &str,
) -> anyhow::Result<SeedUsersReport> {
    let mut report = SeedUsersReport::default();

    let mut organization_ids = Vec::new();
    for name in [TECHCORP, GREENENERGY] {
        let (org, created) = OrganizationRepo::get_or_create(pool, name)
            .await
            .with_context(|| format!("failed to create organization '{name}'"))?;
        if created {
            report.organizations_created.push(org.name.clone());
        }
        organization_ids.push((name, org.id));
    }

    let admin_hash = hash_password(admin_password)
        .map_err(|e| anyhow::anyhow!("failed to hash admin password: {e}"))?;
    let user_hash = hash_password(user_password)
        .map_err(|e| anyhow::anyhow!("failed to hash user password: {e}"))?;

    for seed in &SEED_USERS {
        if UserRepo::exists_by_username(pool, seed.username).await? {
            report.users_skipped.push(seed.username.to_string());
            continue;
        }

        let organization_id = seed.organization.and_then(|wanted| {
            organization_ids
                .iter()
                .find(|(name, _)| *name == wanted)
                .map(|(_, id)| *id)
        });
        let password_hash = match seed.password {
            PasswordKind::Admin => admin_hash.clone(),
            PasswordKind::User => user_hash.clone(),
        };

        let mut tx = pool.begin().await?;
        let user = UserRepo::create(
            &mut *tx,
            &CreateUser {
                username: seed.username.to_string(),
                email: seed.email.to_string(),
                first_name: seed.first_name.to_string(),
                last_name: seed.last_name.to_string(),
                password_hash,
                is_superuser: false,
            },
        )
        .await
        .with_context(|| format!("failed to create user '{}'", seed.username))?;
        ProfileRepo::create(
            &mut *tx,
            &CreateProfile {
                user_id: user.id,
                phone: seed.phone.to_string(),
                role: seed.role,
                organization_id,
            },
        )
        .await?;
        tx.commit().await?;

        tracing::info!(user_id = user.id, username = seed.username, role = %seed.role, "Seed user created");
        report.users_created.push((user.username, seed.role));
    }

    Ok(report)
}
