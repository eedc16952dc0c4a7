//! Repository for the `profiles` table.

use ecoenergy_core::roles::Role;
use ecoenergy_core::types::DbId;
use sqlx::PgPool;

use crate::models::profile::{CreateProfile, Profile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, phone, role, organization_id, created_at, updated_at";

/// Provides operations on user profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert a profile, returning the created row.
    pub async fn create<'e, E>(executor: E, input: &CreateProfile) -> Result<Profile, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO profiles (user_id, phone, role, organization_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(input.user_id)
            .bind(&input.phone)
            .bind(input.role.as_str())
            .bind(input.organization_id)
            .fetch_one(executor)
            .await
    }

    /// Find the profile of a user.
    pub async fn find_by_user_id<'e, E>(
        executor: E,
        user_id: DbId,
    ) -> Result<Option<Profile>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE user_id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// Return the user's profile, creating a default one if missing.
    pub async fn get_or_create(pool: &PgPool, user_id: DbId) -> Result<Profile, sqlx::Error> {
        let insert = format!(
            "INSERT INTO profiles (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        if let Some(created) = sqlx::query_as::<_, Profile>(&insert)
            .bind(user_id)
            .fetch_optional(pool)
            .await?
        {
            return Ok(created);
        }
        Self::find_by_user_id(pool, user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Update the contact phone. Returns `None` if the user has no profile.
    pub async fn update_phone(
        pool: &PgPool,
        user_id: DbId,
        phone: &str,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET phone = $2 WHERE user_id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .bind(phone)
            .fetch_optional(pool)
            .await
    }

    /// Set role and organization together. `organization_id = None` detaches
    /// the user from any tenant.
    pub async fn update_assignment<'e, E>(
        executor: E,
        user_id: DbId,
        role: Role,
        organization_id: Option<DbId>,
    ) -> Result<Option<Profile>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE profiles SET role = $2, organization_id = $3
             WHERE user_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .bind(role.as_str())
            .bind(organization_id)
            .fetch_optional(executor)
            .await
    }

    /// Client-role profiles not attached to any organization.
    pub async fn list_client_without_organization(
        pool: &PgPool,
    ) -> Result<Vec<Profile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM profiles
             WHERE organization_id IS NULL AND role <> 'platform_manager'
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Profile>(&query).fetch_all(pool).await
    }

    /// Profiles for the given users, in no particular order.
    pub async fn list_for_users(
        pool: &PgPool,
        user_ids: &[DbId],
    ) -> Result<Vec<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE user_id = ANY($1)");
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_ids)
            .fetch_all(pool)
            .await
    }
}
