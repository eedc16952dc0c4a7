//! Repository for the `measurements` table.

use ecoenergy_core::consumption::{alert_message, classify};
use ecoenergy_core::types::DbId;
use sqlx::PgPool;

use crate::models::alert::{Alert, CreateAlert};
use crate::models::measurement::{
    CreateMeasurement, Measurement, MeasurementFilter, UpdateMeasurement,
};
use crate::repositories::AlertRepo;

const SELECT: &str = "SELECT m.id, m.device_id, d.name AS device_name, z.organization_id, \
                      m.recorded_at, m.consumption_kwh, m.created_at, m.updated_at";

const JOINS: &str = "JOIN devices d ON d.id = m.device_id JOIN zones z ON z.id = d.zone_id";

/// Provides tenant-scoped CRUD operations for measurements.
pub struct MeasurementRepo;

impl MeasurementRepo {
    /// Insert a measurement. `recorded_at` defaults to now.
    pub async fn create<'e, E>(
        executor: E,
        input: &CreateMeasurement,
    ) -> Result<Measurement, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "WITH m AS (
                INSERT INTO measurements (device_id, consumption_kwh, recorded_at)
                VALUES ($1, $2, COALESCE($3, NOW()))
                RETURNING *
             )
             {SELECT} FROM m {JOINS}"
        );
        sqlx::query_as::<_, Measurement>(&query)
            .bind(input.device_id)
            .bind(input.consumption_kwh)
            .bind(input.recorded_at)
            .fetch_one(executor)
            .await
    }

    /// Insert a measurement and, when its consumption crosses a severity
    /// threshold, an alert for the device. Both rows commit together.
    pub async fn record(
        pool: &PgPool,
        input: &CreateMeasurement,
    ) -> Result<(Measurement, Option<Alert>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let measurement = Self::create(&mut *tx, input).await?;

        let alert = match classify(measurement.consumption_kwh) {
            Some(severity) => {
                let alert_input = CreateAlert {
                    device_id: measurement.device_id,
                    message: alert_message(measurement.consumption_kwh),
                    severity,
                    created_at: Some(measurement.recorded_at),
                };
                Some(AlertRepo::create(&mut *tx, &alert_input).await?)
            }
            None => None,
        };

        tx.commit().await?;
        Ok((measurement, alert))
    }

    /// Find a measurement by ID within `org`.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        org: Option<DbId>,
    ) -> Result<Option<Measurement>, sqlx::Error> {
        let query = format!(
            "{SELECT} FROM measurements m {JOINS}
             WHERE m.id = $1 AND ($2::BIGINT IS NULL OR z.organization_id = $2)"
        );
        sqlx::query_as::<_, Measurement>(&query)
            .bind(id)
            .bind(org)
            .fetch_optional(pool)
            .await
    }

    /// List measurements within `org`, newest first.
    pub async fn list(
        pool: &PgPool,
        org: Option<DbId>,
        filter: &MeasurementFilter,
    ) -> Result<Vec<Measurement>, sqlx::Error> {
        let query = format!(
            "{SELECT} FROM measurements m {JOINS}
             WHERE ($1::BIGINT IS NULL OR z.organization_id = $1)
               AND ($2::BIGINT IS NULL OR m.device_id = $2)
             ORDER BY m.recorded_at DESC, m.id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Measurement>(&query)
            .bind(org)
            .bind(filter.device_id)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Every measurement of one device, newest first. The caller has already
    /// checked the device is in scope.
    pub async fn list_for_device(
        pool: &PgPool,
        device_id: DbId,
    ) -> Result<Vec<Measurement>, sqlx::Error> {
        let query = format!(
            "{SELECT} FROM measurements m {JOINS}
             WHERE m.device_id = $1
             ORDER BY m.recorded_at DESC, m.id DESC"
        );
        sqlx::query_as::<_, Measurement>(&query)
            .bind(device_id)
            .fetch_all(pool)
            .await
    }

    /// The `n` most recent measurements within `org`.
    pub async fn latest(
        pool: &PgPool,
        org: Option<DbId>,
        n: i64,
    ) -> Result<Vec<Measurement>, sqlx::Error> {
        let filter = MeasurementFilter {
            device_id: None,
            limit: n,
            offset: 0,
        };
        Self::list(pool, org, &filter).await
    }

    /// Correct a measurement within `org`. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        org: Option<DbId>,
        input: &UpdateMeasurement,
    ) -> Result<Option<Measurement>, sqlx::Error> {
        let query = format!(
            "WITH m AS (
                UPDATE measurements SET
                    consumption_kwh = COALESCE($3, consumption_kwh),
                    recorded_at = COALESCE($4, recorded_at)
                WHERE id = $1
                  AND device_id IN (
                      SELECT d.id FROM devices d JOIN zones z ON z.id = d.zone_id
                      WHERE $2::BIGINT IS NULL OR z.organization_id = $2
                  )
                RETURNING *
             )
             {SELECT} FROM m {JOINS}"
        );
        sqlx::query_as::<_, Measurement>(&query)
            .bind(id)
            .bind(org)
            .bind(input.consumption_kwh)
            .bind(input.recorded_at)
            .fetch_optional(pool)
            .await
    }

    /// Delete a measurement within `org`.
    pub async fn delete(pool: &PgPool, id: DbId, org: Option<DbId>) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM measurements m USING devices d, zones z
             WHERE m.id = $1 AND d.id = m.device_id AND z.id = d.zone_id
               AND ($2::BIGINT IS NULL OR z.organization_id = $2)",
        )
        .bind(id)
        .bind(org)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of measurements within `org`.
    pub async fn count(pool: &PgPool, org: Option<DbId>) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM measurements m
             JOIN devices d ON d.id = m.device_id JOIN zones z ON z.id = d.zone_id
             WHERE ($1::BIGINT IS NULL OR z.organization_id = $1)",
        )
        .bind(org)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
