//! `ecoenergy diagnose`: tenancy health report.

use std::collections::HashMap;
use std::fmt;

use ecoenergy_core::roles::Role;
use ecoenergy_db::repositories::{
    DeviceRepo, OrganizationRepo, ProfileRepo, UserRepo, ZoneRepo,
};
use ecoenergy_db::DbPool;

/// One line per user: how they are attached to a tenant.
#[derive(Debug)]
pub struct UserLine {
    pub username: String,
    /// `None` when the user has no profile row.
    pub role: Option<Role>,
    pub organization: Option<String>,
}

#[derive(Debug, Default)]
pub struct DiagnoseReport {
    pub users: Vec<UserLine>,
    pub organizations: Vec<String>,
    /// Zone name and owning organization name.
    pub zones: Vec<(String, String)>,
    pub devices: i64,
    pub users_without_profile: usize,
    pub clients_without_organization: usize,
}

impl DiagnoseReport {
    /// Whether `repair` would change anything.
    pub fn needs_repair(&self) -> bool {
        self.users_without_profile > 0 || self.clients_without_organization > 0
    }
}

impl fmt::Display for DiagnoseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Users: {}", self.users.len())?;
        for user in &self.users {
            match user.role {
                Some(role) => writeln!(
                    f,
                    "  - {} ({}, {})",
                    user.username,
                    role,
                    user.organization.as_deref().unwrap_or("no organization")
                )?,
                None => writeln!(f, "  - {} (no profile)", user.username)?,
            }
        }

        writeln!(f, "Organizations: {}", self.organizations.len())?;
        for name in &self.organizations {
            writeln!(f, "  - {name}")?;
        }

        writeln!(f, "Zones: {}", self.zones.len())?;
        for (zone, org) in &self.zones {
            writeln!(f, "  - {zone} ({org})")?;
        }

        writeln!(f, "Devices: {}", self.devices)?;
        writeln!(f)?;
        writeln!(f, "Users without profile: {}", self.users_without_profile)?;
        writeln!(
            f,
            "Client profiles without organization: {}",
            self.clients_without_organization
        )?;
        if self.needs_repair() {
            writeln!(f, "Run `ecoenergy repair` to attach them to a default organization.")?;
        }
        Ok(())
    }
}

/// Collect the report. Read-only.
pub async fn run(pool: &DbPool) -> anyhow::Result<DiagnoseReport> {
    let users = UserRepo::list(pool).await?;
    let organizations = OrganizationRepo::list(pool, None).await?;
    let zones = ZoneRepo::list(pool, None).await?;
    let devices = DeviceRepo::count(pool, None).await?;

    let user_ids: Vec<_> = users.iter().map(|u| u.id).collect();
    let profiles: HashMap<_, _> = ProfileRepo::list_for_users(pool, &user_ids)
        .await?
        .into_iter()
        .map(|p| (p.user_id, p))
        .collect();
    let org_names: HashMap<_, _> = organizations.iter().map(|o| (o.id, o.name.clone())).collect();

    let users_without_profile = UserRepo::list_without_profile(pool).await?.len();
    let clients_without_organization = ProfileRepo::list_client_without_organization(pool)
        .await?
        .len();

    let users = users
        .into_iter()
        .map(|user| {
            let profile = profiles.get(&user.id);
            UserLine {
                username: user.username,
                role: profile.map(|p| p.role),
                organization: profile
                    .and_then(|p| p.organization_id)
                    .and_then(|id| org_names.get(&id).cloned()),
            }
        })
        .collect();

    Ok(DiagnoseReport {
        users,
        organizations: organizations.into_iter().map(|o| o.name).collect(),
        zones: zones
            .into_iter()
            .map(|z| (z.name, z.organization_name))
            .collect(),
        devices,
        users_without_profile,
        clients_without_organization,
    })
}
