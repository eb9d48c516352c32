use crate::config::Config;
use crate::errors::Result;
use crate::metrics::{READINGS_FETCHED, REJECTED_ROWS_TOTAL, STORE_QUERY_SECONDS};
use crate::model::{Reading, ReadingRow};
use crate::store::ReadingStore;
use crate::validate::reading_from_row;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions};
use sqlx::query::QueryAs;
use sqlx::Postgres;
use std::time::Duration;
use tracing::{debug, info, warn};

pub async fn make_pool(config: &Config) -> Result<PgPool> {
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.database_url)
        .await?;

    info!("Database connection established");
    if config.skip_migrations {
        info!("Skipping database migrations");
    } else {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&pool).await?;
        info!("Migrations completed");
    }

    Ok(pool)
}

/// SQL counterpart of `validate::reading_from_row`, for queries where rows
/// must be filtered before `LIMIT` applies. Postgres treats `'NaN' = 'NaN'`
/// as true, so `NOT IN` also catches NaN.
const VALID_ROW: &str = "device_id <> ''
             AND pm25 IS NOT NULL AND pm25 NOT IN ('NaN', 'Infinity', '-Infinity')
             AND pm10 IS NOT NULL AND pm10 NOT IN ('NaN', 'Infinity', '-Infinity')
             AND temperature IS NOT NULL AND temperature NOT IN ('NaN', 'Infinity', '-Infinity')
             AND humidity IS NOT NULL AND humidity NOT IN ('NaN', 'Infinity', '-Infinity')";

type ReadingQuery<'q> = QueryAs<'q, Postgres, ReadingRow, PgArguments>;

/// Postgres-backed reading store
#[derive(Debug, Clone)]
pub struct PgReadingStore {
    pool: PgPool,
}

impl PgReadingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, query: ReadingQuery<'_>) -> Result<Vec<Reading>> {
        let timer = STORE_QUERY_SECONDS.start_timer();
        let rows = query.fetch_all(&self.pool).await;
        timer.observe_duration();

        let readings = validated(rows?);
        READINGS_FETCHED.set(readings.len() as f64);
        debug!("Fetched {} readings", readings.len());
        Ok(readings)
    }
}

/// Drops rows that fail validation, logging each one.
fn validated(rows: Vec<ReadingRow>) -> Vec<Reading> {
    rows.into_iter()
        .filter_map(|row| match reading_from_row(row) {
            Ok(reading) => Some(reading),
            Err(e) => {
                warn!("Skipping stored row: {}", e);
                REJECTED_ROWS_TOTAL.inc();
                None
            }
        })
        .collect()
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    async fn all_readings_desc(&self) -> Result<Vec<Reading>> {
        let query = sqlx::query_as::<_, ReadingRow>(
            "SELECT device_id, ts AS timestamp, pm25, pm10, temperature, humidity
             FROM air_quality_readings
             ORDER BY ts DESC",
        );
        self.fetch(query).await
    }

    /// Only valid rows count toward `limit`, so an incomplete newest row
    /// does not hide older readings.
    async fn recent_for_device(&self, device_id: &str, limit: usize) -> Result<Vec<Reading>> {
        let sql = format!(
            "SELECT device_id, ts AS timestamp, pm25, pm10, temperature, humidity
             FROM air_quality_readings
             WHERE device_id = $1 AND {}
             ORDER BY ts DESC
             LIMIT $2",
            VALID_ROW
        );
        let query = sqlx::query_as::<_, ReadingRow>(&sql)
            .bind(device_id)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX));
        self.fetch(query).await
    }

    async fn readings_since(&self, device_id: &str, since: DateTime<Utc>) -> Result<Vec<Reading>> {
        let query = sqlx::query_as::<_, ReadingRow>(
            "SELECT device_id, ts AS timestamp, pm25, pm10, temperature, humidity
             FROM air_quality_readings
             WHERE device_id = $1 AND ts >= $2
             ORDER BY ts ASC",
        )
        .bind(device_id)
        .bind(since);
        self.fetch(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(device_id: &str, pm25: Option<f64>) -> ReadingRow {
        ReadingRow {
            device_id: device_id.to_string(),
            timestamp: Utc::now(),
            pm25,
            pm10: Some(60.0),
            temperature: Some(27.5),
            humidity: Some(40.0),
        }
    }

    #[test]
    fn test_validated_skips_incomplete_rows() {
        let readings = validated(vec![
            row("dev-1", Some(12.0)),
            row("dev-2", None),
            row("", Some(3.0)),
            row("dev-3", Some(f64::INFINITY)),
            row("dev-4", Some(8.5)),
        ]);

        let ids: Vec<&str> = readings.iter().map(|r| r.device_id.as_str()).collect();
        assert_eq!(ids, vec!["dev-1", "dev-4"]);
    }
}
