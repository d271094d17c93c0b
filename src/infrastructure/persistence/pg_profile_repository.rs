//! PostgreSQL implementation of the pattern-profile repository.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entities::{CaseStyle, PatternProfile};
use crate::domain::repositories::ProfileRepository;
use crate::error::{AppError, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: String,
    last_analyzed: DateTime<Utc>,
    components: Vec<String>,
    structure: String,
    separator: String,
    avg_word_count: f64,
    capitalization: String,
    confidence: f64,
    links_analyzed: i64,
}

impl From<ProfileRow> for PatternProfile {
    fn from(row: ProfileRow) -> Self {
        PatternProfile {
            user_id: row.user_id,
            last_analyzed: row.last_analyzed,
            components: row.components,
            structure: row.structure,
            separator: row.separator.chars().next().unwrap_or('.'),
            avg_word_count: row.avg_word_count,
            capitalization: parse_case(&row.capitalization),
            confidence: row.confidence,
            links_analyzed: row.links_analyzed,
        }
    }
}

fn parse_case(value: &str) -> CaseStyle {
    match value {
        "titlecase" => CaseStyle::Titlecase,
        "uppercase" => CaseStyle::Uppercase,
        _ => CaseStyle::Lowercase,
    }
}

/// PostgreSQL repository for per-user naming profiles.
///
/// The cooldown claim lives in its own table so a claim can be taken before
/// the first profile is ever written. The claim upsert is a single statement,
/// so concurrent analyzers serialize on the row and exactly one wins.
pub struct PgProfileRepository {
    pool: Arc<PgPool>,
}

impl PgProfileRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn get(&self, user_id: &str) -> Result<Option<PatternProfile>, AppError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            SELECT user_id, last_analyzed, components, structure, separator,
                   avg_word_count, capitalization, confidence, links_analyzed
            FROM pattern_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn upsert(&self, profile: PatternProfile) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO pattern_profiles
                (user_id, last_analyzed, components, structure, separator,
                 avg_word_count, capitalization, confidence, links_analyzed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id) DO UPDATE SET
                last_analyzed = EXCLUDED.last_analyzed,
                components = EXCLUDED.components,
                structure = EXCLUDED.structure,
                separator = EXCLUDED.separator,
                avg_word_count = EXCLUDED.avg_word_count,
                capitalization = EXCLUDED.capitalization,
                confidence = EXCLUDED.confidence,
                links_analyzed = EXCLUDED.links_analyzed
            "#,
        )
        .bind(&profile.user_id)
        .bind(profile.last_analyzed)
        .bind(&profile.components)
        .bind(&profile.structure)
        .bind(profile.separator.to_string())
        .bind(profile.avg_word_count)
        .bind(profile.capitalization.as_str())
        .bind(profile.confidence)
        .bind(profile.links_analyzed)
        .execute(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn try_claim_analysis(
        &self,
        user_id: &str,
        cooldown: Duration,
        force: bool,
    ) -> Result<bool, AppError> {
        let claimed: Option<String> = sqlx::query_scalar(
            r#"
            INSERT INTO analysis_claims (user_id, claimed_at)
            VALUES ($1, now())
            ON CONFLICT (user_id) DO UPDATE SET claimed_at = now()
            WHERE $3 OR analysis_claims.claimed_at <= now() - make_interval(secs => $2)
            RETURNING user_id
            "#,
        )
        .bind(user_id)
        .bind(cooldown.as_secs_f64())
        .bind(force)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(claimed.is_some())
    }
}
