//! `ecoenergy repair`: attach orphaned users to a default organization.

use std::fmt;

use ecoenergy_core::roles::Role;
use ecoenergy_db::models::profile::CreateProfile;
use ecoenergy_db::repositories::{OrganizationRepo, ProfileRepo, UserRepo, ZoneRepo};
use ecoenergy_db::DbPool;

pub const DEFAULT_ORGANIZATION: &str = "EcoEnergy Default";
pub const DEFAULT_ZONE: &str = "Main Zone";

#[derive(Debug, Default)]
pub struct RepairReport {
    pub organization_created: bool,
    pub zone_created: bool,
    /// Users that received a new `client_admin` profile.
    pub profiles_created: Vec<String>,
    /// Client profiles attached to the default organization.
    pub profiles_attached: usize,
}

impl fmt::Display for RepairReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.organization_created {
            writeln!(f, "* Organization created: {DEFAULT_ORGANIZATION}")?;
        }
        for username in &self.profiles_created {
            writeln!(f, "* Profile created for {username}")?;
        }
        if self.profiles_attached > 0 {
            writeln!(
                f,
                "* Profiles attached to {DEFAULT_ORGANIZATION}: {}",
                self.profiles_attached
            )?;
        }
        if self.zone_created {
            writeln!(f, "* Zone created: {DEFAULT_ZONE}")?;
        }
        writeln!(
            f,
            "Repair complete. Users without profile found: {}",
            self.profiles_created.len()
        )
    }
}

/// Ensure every user has a profile and every client profile an organization.
///
/// Platform managers are left without an organization. Safe to re-run.
pub async fn run(pool: &DbPool) -> anyhow::Result<RepairReport> {
    let mut report = RepairReport::default();

    let (org, created) = OrganizationRepo::get_or_create(pool, DEFAULT_ORGANIZATION).await?;
    report.organization_created = created;

    for user in UserRepo::list_without_profile(pool).await? {
        ProfileRepo::create(
            pool,
            &CreateProfile {
                user_id: user.id,
                phone: String::new(),
                role: Role::ClientAdmin,
                organization_id: Some(org.id),
            },
        )
        .await?;
        tracing::info!(user_id = user.id, organization_id = org.id, "Profile created");
        report.profiles_created.push(user.username);
    }

    for profile in ProfileRepo::list_client_without_organization(pool).await? {
        ProfileRepo::update_assignment(pool, profile.user_id, profile.role, Some(org.id)).await?;
        tracing::info!(user_id = profile.user_id, organization_id = org.id, "Profile attached");
        report.profiles_attached += 1;
    }

    let (_, zone_created) = ZoneRepo::get_or_create(pool, DEFAULT_ZONE, org.id).await?;
    report.zone_created = zone_created;

    Ok(report)
}
