//! Repository for the `devices` table.
//!
//! Devices carry no organization column; every scoped query joins through
//! the owning zone.

use ecoenergy_core::types::DbId;
use sqlx::PgPool;

use crate::models::device::{CreateDevice, Device, DeviceFilter, UpdateDevice};

/// Projection of a device row `d` joined with its zone `z` and organization `o`.
const SELECT: &str = "SELECT d.id, d.name, d.category, d.watts, d.zone_id, \
                      z.name AS zone_name, z.organization_id, o.name AS organization_name, \
                      d.created_at, d.updated_at";

/// Join clause matching [`SELECT`], with `d` as the devices relation.
const JOINS: &str = "JOIN zones z ON z.id = d.zone_id \
                     JOIN organizations o ON o.id = z.organization_id";

/// Provides tenant-scoped CRUD operations for devices.
pub struct DeviceRepo;

impl DeviceRepo {
    /// Insert a new device, returning it joined with zone and organization.
    pub async fn create(pool: &PgPool, input: &CreateDevice) -> Result<Device, sqlx::Error> {
        let query = format!(
            "WITH d AS (
                INSERT INTO devices (name, category, zone_id, watts)
                VALUES ($1, $2, $3, $4)
                RETURNING *
             )
             {SELECT} FROM d {JOINS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(&input.name)
            .bind(input.category.as_str())
            .bind(input.zone_id)
            .bind(input.watts)
            .fetch_one(pool)
            .await
    }

    /// Find a device by ID within `org` (all organizations when `None`).
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        org: Option<DbId>,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query = format!(
            "{SELECT} FROM devices d {JOINS}
             WHERE d.id = $1 AND ($2::BIGINT IS NULL OR z.organization_id = $2)"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(id)
            .bind(org)
            .fetch_optional(pool)
            .await
    }

    /// Find a device by name inside a zone.
    pub async fn find_by_name_in_zone(
        pool: &PgPool,
        zone_id: DbId,
        name: &str,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query = format!(
            "{SELECT} FROM devices d {JOINS}
             WHERE d.zone_id = $1 AND d.name = $2
             ORDER BY d.id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(zone_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List devices within `org`, optionally filtered by category and zone.
    pub async fn list(
        pool: &PgPool,
        org: Option<DbId>,
        filter: &DeviceFilter,
    ) -> Result<Vec<Device>, sqlx::Error> {
        let query = format!(
            "{SELECT} FROM devices d {JOINS}
             WHERE ($1::BIGINT IS NULL OR z.organization_id = $1)
               AND ($2::TEXT IS NULL OR d.category = $2)
               AND ($3::BIGINT IS NULL OR d.zone_id = $3)
             ORDER BY o.name ASC, z.name ASC, d.name ASC, d.id ASC"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(org)
            .bind(filter.category.map(|c| c.as_str()))
            .bind(filter.zone_id)
            .fetch_all(pool)
            .await
    }

    /// Update a device within `org`. Only non-`None` fields are applied.
    ///
    /// The caller is responsible for checking that a new `zone_id` is in scope.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        org: Option<DbId>,
        input: &UpdateDevice,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query = format!(
            "WITH d AS (
                UPDATE devices SET
                    name = COALESCE($3, name),
                    category = COALESCE($4, category),
                    zone_id = COALESCE($5, zone_id),
                    watts = COALESCE($6, watts)
                WHERE id = $1
                  AND zone_id IN (
                      SELECT id FROM zones WHERE $2::BIGINT IS NULL OR organization_id = $2
                  )
                RETURNING *
             )
             {SELECT} FROM d {JOINS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(id)
            .bind(org)
            .bind(&input.name)
            .bind(input.category.map(|c| c.as_str()))
            .bind(input.zone_id)
            .bind(input.watts)
            .fetch_optional(pool)
            .await
    }

    /// Delete a device within `org`; its measurements and alerts cascade.
    pub async fn delete(pool: &PgPool, id: DbId, org: Option<DbId>) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM devices d USING zones z
             WHERE d.id = $1 AND z.id = d.zone_id
               AND ($2::BIGINT IS NULL OR z.organization_id = $2)",
        )
        .bind(id)
        .bind(org)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of devices within `org`.
    pub async fn count(pool: &PgPool, org: Option<DbId>) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM devices d JOIN zones z ON z.id = d.zone_id
             WHERE ($1::BIGINT IS NULL OR z.organization_id = $1)",
        )
        .bind(org)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
