//! Repository for the `zones` table.

use ecoenergy_core::types::DbId;
use sqlx::PgPool;

use crate::models::zone::{CreateZone, UpdateZone, Zone, ZoneSummary};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, organization_id, created_at, updated_at";

/// Provides tenant-scoped CRUD operations for zones.
pub struct ZoneRepo;

impl ZoneRepo {
    /// Insert a new zone, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateZone) -> Result<Zone, sqlx::Error> {
        let query = format!(
            "INSERT INTO zones (name, organization_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Zone>(&query)
            .bind(&input.name)
            .bind(input.organization_id)
            .fetch_one(pool)
            .await
    }

    /// Find a zone by ID within `org` (all organizations when `None`).
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        org: Option<DbId>,
    ) -> Result<Option<Zone>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM zones
             WHERE id = $1 AND ($2::BIGINT IS NULL OR organization_id = $2)"
        );
        sqlx::query_as::<_, Zone>(&query)
            .bind(id)
            .bind(org)
            .fetch_optional(pool)
            .await
    }

    /// List zones with their organization name and device count, ordered by
    /// organization then zone name.
    pub async fn list(pool: &PgPool, org: Option<DbId>) -> Result<Vec<ZoneSummary>, sqlx::Error> {
        sqlx::query_as::<_, ZoneSummary>(
            "SELECT z.id, z.name, z.organization_id, o.name AS organization_name,
                    COUNT(d.id) AS device_count, z.created_at
             FROM zones z
             JOIN organizations o ON o.id = z.organization_id
             LEFT JOIN devices d ON d.zone_id = z.id
             WHERE ($1::BIGINT IS NULL OR z.organization_id = $1)
             GROUP BY z.id, o.name
             ORDER BY o.name ASC, z.name ASC",
        )
        .bind(org)
        .fetch_all(pool)
        .await
    }

    /// Rename a zone within `org`. Returns `None` if not found in scope.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        org: Option<DbId>,
        input: &UpdateZone,
    ) -> Result<Option<Zone>, sqlx::Error> {
        let query = format!(
            "UPDATE zones SET name = COALESCE($3, name)
             WHERE id = $1 AND ($2::BIGINT IS NULL OR organization_id = $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Zone>(&query)
            .bind(id)
            .bind(org)
            .bind(&input.name)
            .fetch_optional(pool)
            .await
    }

    /// Delete a zone within `org`; its devices and readings cascade.
    pub async fn delete(pool: &PgPool, id: DbId, org: Option<DbId>) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM zones WHERE id = $1 AND ($2::BIGINT IS NULL OR organization_id = $2)",
        )
        .bind(id)
        .bind(org)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Return the zone `name` of `organization_id`, creating it if missing.
    ///
    /// The boolean is `true` when a row was inserted.
    pub async fn get_or_create(
        pool: &PgPool,
        name: &str,
        organization_id: DbId,
    ) -> Result<(Zone, bool), sqlx::Error> {
        let insert = format!(
            "INSERT INTO zones (name, organization_id) VALUES ($1, $2)
             ON CONFLICT (organization_id, name) DO NOTHING
             RETURNING {COLUMNS}"
        );
        if let Some(created) = sqlx::query_as::<_, Zone>(&insert)
            .bind(name)
            .bind(organization_id)
            .fetch_optional(pool)
            .await?
        {
            return Ok((created, true));
        }
        let query = format!("SELECT {COLUMNS} FROM zones WHERE name = $1 AND organization_id = $2");
        let existing = sqlx::query_as::<_, Zone>(&query)
            .bind(name)
            .bind(organization_id)
            .fetch_one(pool)
            .await?;
        Ok((existing, false))
    }

    /// Number of zones within `org`.
    pub async fn count(pool: &PgPool, org: Option<DbId>) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM zones WHERE ($1::BIGINT IS NULL OR organization_id = $1)",
        )
        .bind(org)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
