//! PostgreSQL implementation of the link repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;

use crate::domain::entities::{ExpiryPolicy, Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    slug: String,
    long_url: String,
    owner_id: Option<String>,
    created_at: DateTime<Utc>,
    clicks: i64,
    click_limit: Option<i64>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link {
            id: row.id,
            slug: row.slug,
            long_url: row.long_url,
            owner_id: row.owner_id,
            created_at: row.created_at,
            clicks: row.clicks,
            expiry: ExpiryPolicy::from_click_limit(row.click_limit),
        }
    }
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Slug uniqueness is carried by the unique index on `links.slug`; a
/// concurrent insert race surfaces as a unique violation, which the error
/// mapper turns into a conflict.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row: LinkRow = sqlx::query_as(
            r#"
            INSERT INTO links (slug, long_url, owner_id, click_limit)
            VALUES ($1, $2, $3, $4)
            RETURNING id, slug, long_url, owner_id, created_at, clicks, click_limit
            "#,
        )
        .bind(&new_link.slug)
        .bind(&new_link.long_url)
        .bind(&new_link.owner_id)
        .bind(new_link.expiry.click_limit())
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError> {
        let row: Option<LinkRow> = sqlx::query_as(
            r#"
            SELECT id, slug, long_url, owner_id, created_at, clicks, click_limit
            FROM links
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn increment_clicks(&self, slug: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE links SET clicks = clicks + 1 WHERE slug = $1")
            .bind(slug)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "slug": slug }),
            ));
        }
        Ok(())
    }

    async fn count_for_owner(&self, owner_id: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Link>, AppError> {
        let rows: Vec<LinkRow> = sqlx::query_as(
            r#"
            SELECT id, slug, long_url, owner_id, created_at, clicks, click_limit
            FROM links
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn recent_slugs_for_owner(
        &self,
        owner_id: &str,
        limit: i64,
    ) -> Result<Vec<String>, AppError> {
        let slugs: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT slug
            FROM links
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(slugs)
    }

    async fn active_owners(
        &self,
        since: DateTime<Utc>,
        min_links: i64,
    ) -> Result<Vec<String>, AppError> {
        let owners: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT owner_id
            FROM links
            WHERE owner_id IS NOT NULL AND created_at >= $1
            GROUP BY owner_id
            HAVING COUNT(*) >= $2
            ORDER BY owner_id
            "#,
        )
        .bind(since)
        .bind(min_links)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(owners)
    }
}
