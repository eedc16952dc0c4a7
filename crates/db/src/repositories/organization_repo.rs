//! Repository for the `organizations` table.

use ecoenergy_core::types::DbId;
use sqlx::PgPool;

use crate::models::organization::{CreateOrganization, Organization, UpdateOrganization};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides CRUD operations for organizations.
pub struct OrganizationRepo;

impl OrganizationRepo {
    /// Insert a new organization, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateOrganization,
    ) -> Result<Organization, sqlx::Error> {
        let query = format!(
            "INSERT INTO organizations (name) VALUES ($1) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find an organization by ID, visible only if it matches `org` (when set).
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        org: Option<DbId>,
    ) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM organizations
             WHERE id = $1 AND ($2::BIGINT IS NULL OR id = $2)"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .bind(org)
            .fetch_optional(pool)
            .await
    }

    /// Find an organization by its exact name.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organizations WHERE name = $1");
        sqlx::query_as::<_, Organization>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List organizations ordered by name.
    pub async fn list(pool: &PgPool, org: Option<DbId>) -> Result<Vec<Organization>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM organizations
             WHERE ($1::BIGINT IS NULL OR id = $1)
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(org)
            .fetch_all(pool)
            .await
    }

    /// Rename an organization. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOrganization,
    ) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!(
            "UPDATE organizations SET name = COALESCE($2, name)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .bind(&input.name)
            .fetch_optional(pool)
            .await
    }

    /// Delete an organization and, by cascade, its zones, devices and readings.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Return the organization named `name`, creating it if missing.
    ///
    /// The boolean is `true` when a row was inserted.
    pub async fn get_or_create(
        pool: &PgPool,
        name: &str,
    ) -> Result<(Organization, bool), sqlx::Error> {
        let insert = format!(
            "INSERT INTO organizations (name) VALUES ($1)
             ON CONFLICT (name) DO NOTHING
             RETURNING {COLUMNS}"
        );
        if let Some(created) = sqlx::query_as::<_, Organization>(&insert)
            .bind(name)
            .fetch_optional(pool)
            .await?
        {
            return Ok((created, true));
        }
        let existing = Self::find_by_name(pool, name)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok((existing, false))
    }

    /// Total number of organizations.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM organizations")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
