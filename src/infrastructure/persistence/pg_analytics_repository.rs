//! PostgreSQL implementation of the analytics repository.
//!
//! Click ingestion is incremental: each accepted click inserts one raw row
//! (the dedup gate) and bumps the daily and dimension rollups in the same
//! transaction. Reads never scan raw clicks except for the distinct-visitor
//! count.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::domain::entities::{
    AnalyticsSummary, DIRECT_REFERRER, NewClick, UNKNOWN_BUCKET,
};
use crate::domain::repositories::AnalyticsRepository;
use crate::error::{AppError, map_sqlx_error};

const DIM_COUNTRY: &str = "country";
const DIM_DEVICE: &str = "device";
const DIM_BROWSER: &str = "browser";
const DIM_REFERRER: &str = "referrer";

/// PostgreSQL repository for click records and rollups.
pub struct PgAnalyticsRepository {
    pool: Arc<PgPool>,
}

impl PgAnalyticsRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsRepository for PgAnalyticsRepository {
    async fn record(&self, click: NewClick) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO clicks
                (slug, idempotency_key, occurred_at, country, device, browser,
                 referrer_domain, visitor_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (idempotency_key) DO NOTHING
            "#,
        )
        .bind(&click.slug)
        .bind(click.idempotency_key)
        .bind(click.occurred_at)
        .bind(&click.country)
        .bind(click.device.as_str())
        .bind(&click.browser)
        .bind(&click.referrer_domain)
        .bind(&click.visitor_hash)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if inserted.rows_affected() == 0 {
            // Redelivered event; rollups were already bumped the first time.
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO analytics_daily (slug, day, clicks)
            VALUES ($1, $2, 1)
            ON CONFLICT (slug, day) DO UPDATE SET clicks = analytics_daily.clicks + 1
            "#,
        )
        .bind(&click.slug)
        .bind(click.occurred_at.date_naive())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let country = click
            .country
            .as_deref()
            .unwrap_or(UNKNOWN_BUCKET)
            .to_string();
        let referrer = click
            .referrer_domain
            .as_deref()
            .unwrap_or(DIRECT_REFERRER)
            .to_string();
        let buckets = [
            (DIM_COUNTRY, country),
            (DIM_DEVICE, click.device.as_str().to_string()),
            (DIM_BROWSER, click.browser.clone()),
            (DIM_REFERRER, referrer),
        ];

        for (dimension, bucket) in buckets {
            sqlx::query(
                r#"
                INSERT INTO analytics_dims (slug, dimension, bucket, clicks)
                VALUES ($1, $2, $3, 1)
                ON CONFLICT (slug, dimension, bucket)
                    DO UPDATE SET clicks = analytics_dims.clicks + 1
                "#,
            )
            .bind(&click.slug)
            .bind(dimension)
            .bind(&bucket)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(true)
    }

    async fn summary(&self, slug: &str) -> Result<AnalyticsSummary, AppError> {
        let clicks_by_date: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT day, clicks
            FROM analytics_daily
            WHERE slug = $1
            ORDER BY day
            "#,
        )
        .bind(slug)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        let total_clicks = clicks_by_date.iter().map(|(_, n)| n).sum();

        let unique_visitors: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT visitor_hash) FROM clicks WHERE slug = $1",
        )
        .bind(slug)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        let dim_rows: Vec<(String, String, i64)> = sqlx::query_as(
            r#"
            SELECT dimension, bucket, clicks
            FROM analytics_dims
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        let mut summary = AnalyticsSummary {
            total_clicks,
            unique_visitors,
            clicks_by_date,
            ..Default::default()
        };
        for (dimension, bucket, clicks) in dim_rows {
            let target: &mut HashMap<String, i64> = match dimension.as_str() {
                DIM_COUNTRY => &mut summary.countries,
                DIM_DEVICE => &mut summary.devices,
                DIM_BROWSER => &mut summary.browsers,
                DIM_REFERRER => &mut summary.referrers,
                _ => continue,
            };
            target.insert(bucket, clicks);
        }

        Ok(summary)
    }
}
