//! Repository for the `alerts` table.

use ecoenergy_core::types::DbId;
use sqlx::PgPool;

use crate::models::alert::{Alert, AlertFilter, CreateAlert};

const SELECT: &str = "SELECT a.id, a.device_id, d.name AS device_name, z.organization_id, \
                      a.message, a.severity, a.created_at";

const JOINS: &str = "JOIN devices d ON d.id = a.device_id JOIN zones z ON z.id = d.zone_id";

/// Provides tenant-scoped operations for alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Insert an alert. `created_at` defaults to now.
    pub async fn create<'e, E>(executor: E, input: &CreateAlert) -> Result<Alert, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "WITH a AS (
                INSERT INTO alerts (device_id, message, severity, created_at)
                VALUES ($1, $2, $3, COALESCE($4, NOW()))
                RETURNING *
             )
             {SELECT} FROM a {JOINS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(input.device_id)
            .bind(&input.message)
            .bind(input.severity.as_str())
            .bind(input.created_at)
            .fetch_one(executor)
            .await
    }

    /// Find an alert by ID within `org`.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        org: Option<DbId>,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "{SELECT} FROM alerts a {JOINS}
             WHERE a.id = $1 AND ($2::BIGINT IS NULL OR z.organization_id = $2)"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .bind(org)
            .fetch_optional(pool)
            .await
    }

    /// List alerts within `org`, newest first.
    pub async fn list(
        pool: &PgPool,
        org: Option<DbId>,
        filter: &AlertFilter,
    ) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "{SELECT} FROM alerts a {JOINS}
             WHERE ($1::BIGINT IS NULL OR z.organization_id = $1)
               AND ($2::TEXT IS NULL OR a.severity = $2)
               AND ($3::BIGINT IS NULL OR a.device_id = $3)
             ORDER BY a.created_at DESC, a.id DESC"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(org)
            .bind(filter.severity.map(|s| s.as_str()))
            .bind(filter.device_id)
            .fetch_all(pool)
            .await
    }

    /// Delete an alert within `org`.
    pub async fn delete(pool: &PgPool, id: DbId, org: Option<DbId>) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM alerts a USING devices d, zones z
             WHERE a.id = $1 AND d.id = a.device_id AND z.id = d.zone_id
               AND ($2::BIGINT IS NULL OR z.organization_id = $2)",
        )
        .bind(id)
        .bind(org)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of alerts within `org`.
    pub async fn count(pool: &PgPool, org: Option<DbId>) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM alerts a
             JOIN devices d ON d.id = a.device_id JOIN zones z ON z.id = d.zone_id
             WHERE ($1::BIGINT IS NULL OR z.organization_id = $1)",
        )
        .bind(org)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
