use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;

use crate::models::{CreatorFilter, CreatorRecord, SortKey, TagFields};
use crate::services::repository::{CreatorRepository, RepositoryError};

const CREATOR_COLUMNS: &str = "id, platform, username, display_name, followers, current_viewers, \
    is_live, tags, current_content, recent_content, region, language, uses_camera, is_vtuber, \
    vertical_fit_score, vertical_compatible, brand_safety_score, total_conversions, avg_cpa, \
    avg_roi, engagement_rate, fraud_status, updated_at";

/// PostgreSQL-backed creator store
///
/// Read-only: the `creators` and `user_favorites` tables are owned and
/// migrated by the enrichment services.
pub struct PostgresCreatorRepository {
    pool: PgPool,
}

impl PostgresCreatorRepository {
    /// Create a new repository from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new repository from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, RepositoryError> {
        tracing::info!("Connecting to PostgreSQL creator store");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Append `WHERE ...` for every constrained field of the filter
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &CreatorFilter) {
    qb.push(" WHERE TRUE");

    if let Some(ids) = &filter.ids {
        qb.push(" AND id = ANY(").push_bind(ids.clone()).push(")");
    }

    if !filter.platforms.is_empty() {
        let platforms: Vec<String> = filter.platforms.iter().map(|p| p.as_str().to_string()).collect();
        qb.push(" AND platform = ANY(").push_bind(platforms).push(")");
    }

    if !filter.regions.is_empty() {
        let regions: Vec<String> = filter.regions.iter().map(|r| r.as_str().to_string()).collect();
        qb.push(" AND region = ANY(").push_bind(regions).push(")");
    }

    if let Some(min) = filter.min_followers {
        qb.push(" AND followers >= ").push_bind(to_i64(min));
    }
    if let Some(max) = filter.max_followers {
        qb.push(" AND followers <= ").push_bind(to_i64(max));
    }

    if let Some(min) = filter.min_viewers {
        qb.push(" AND current_viewers IS NOT NULL AND current_viewers >= ")
            .push_bind(to_i64(min));
    }
    if let Some(max) = filter.max_viewers {
        qb.push(" AND COALESCE(current_viewers, 0) <= ").push_bind(to_i64(max));
    }

    if let Some(live) = filter.is_live {
        qb.push(" AND is_live = ").push_bind(live);
    }
    if let Some(camera) = filter.uses_camera {
        qb.push(" AND uses_camera = ").push_bind(camera);
    }
    if let Some(vtuber) = filter.is_vtuber {
        qb.push(" AND is_vtuber = ").push_bind(vtuber);
    }

    if let Some(language) = &filter.language {
        qb.push(" AND LOWER(language) = ").push_bind(language.to_lowercase());
    }

    if let Some(min) = filter.min_vertical_fit {
        qb.push(" AND vertical_fit_score >= ").push_bind(min);
    }

    if !filter.fraud_statuses.is_empty() {
        let statuses: Vec<String> = filter.fraud_statuses.iter().map(|s| s.as_str().to_string()).collect();
        qb.push(" AND fraud_status = ANY(").push_bind(statuses).push(")");
    }
    if !filter.exclude_fraud_statuses.is_empty() {
        let statuses: Vec<String> = filter
            .exclude_fraud_statuses
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        qb.push(" AND NOT (fraud_status = ANY(").push_bind(statuses).push("))");
    }
}

fn order_clause(order: &[SortKey]) -> String {
    if order.is_empty() {
        return String::new();
    }

    let keys: Vec<&str> = order
        .iter()
        .map(|key| match key {
            SortKey::ViewersDesc => "current_viewers DESC NULLS LAST",
            SortKey::FollowersDesc => "followers DESC",
            SortKey::LiveDesc => "is_live DESC",
            SortKey::IdAsc => "id ASC",
        })
        .collect();

    format!(" ORDER BY {}", keys.join(", "))
}

fn parse_column<T: std::str::FromStr<Err = String>>(
    row: &PgRow,
    column: &str,
) -> Result<T, RepositoryError> {
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(RepositoryError::InvalidRow)
}

fn u64_column(row: &PgRow, column: &str) -> Result<u64, RepositoryError> {
    let value: i64 = row.try_get(column)?;
    Ok(u64::try_from(value).unwrap_or(0))
}

fn creator_from_row(row: &PgRow) -> Result<CreatorRecord, RepositoryError> {
    let region: Option<String> = row.try_get("region")?;
    let region = match region {
        Some(raw) => Some(raw.parse().map_err(RepositoryError::InvalidRow)?),
        None => None,
    };
    let current_viewers: Option<i64> = row.try_get("current_viewers")?;

    Ok(CreatorRecord {
        id: row.try_get("id")?,
        platform: parse_column(row, "platform")?,
        username: row.try_get("username")?,
        display_name: row.try_get("display_name")?,
        followers: u64_column(row, "followers")?,
        current_viewers: current_viewers.map(|v| u64::try_from(v).unwrap_or(0)),
        is_live: row.try_get("is_live")?,
        tags: row.try_get("tags")?,
        current_content: row.try_get("current_content")?,
        recent_content: row.try_get("recent_content")?,
        region,
        language: row.try_get("language")?,
        uses_camera: row.try_get("uses_camera")?,
        is_vtuber: row.try_get("is_vtuber")?,
        vertical_fit_score: row.try_get("vertical_fit_score")?,
        vertical_compatible: row.try_get("vertical_compatible")?,
        brand_safety_score: row.try_get("brand_safety_score")?,
        total_conversions: u64_column(row, "total_conversions")?,
        avg_cpa: row.try_get("avg_cpa")?,
        avg_roi: row.try_get("avg_roi")?,
        engagement_rate: row.try_get("engagement_rate")?,
        fraud_status: parse_column(row, "fraud_status")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CreatorRepository for PostgresCreatorRepository {
    async fn find(
        &self,
        filter: &CreatorFilter,
        order: &[SortKey],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CreatorRecord>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM creators", CREATOR_COLUMNS));
        push_filter(&mut qb, filter);
        qb.push(order_clause(order));
        qb.push(" LIMIT ").push_bind(to_i64(limit as u64));
        qb.push(" OFFSET ").push_bind(to_i64(offset as u64));

        let rows = qb.build().fetch_all(&self.pool).await?;

        tracing::debug!("Fetched {} creators (limit {}, offset {})", rows.len(), limit, offset);

        rows.iter().map(creator_from_row).collect()
    }

    async fn count(&self, filter: &CreatorFilter) -> Result<u64, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM creators");
        push_filter(&mut qb, filter);

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn find_tag_fields(
        &self,
        filter: &CreatorFilter,
        cap: usize,
    ) -> Result<Vec<TagFields>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, tags, current_content, recent_content FROM creators",
        );
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY id ASC LIMIT ").push_bind(to_i64(cap as u64));

        let rows = qb.build().fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<TagFields, RepositoryError> {
                Ok(TagFields {
                    id: row.try_get("id")?,
                    tags: row.try_get("tags")?,
                    current_content: row.try_get("current_content")?,
                    recent_content: row.try_get("recent_content")?,
                })
            })
            .collect()
    }

    async fn find_favorites(&self, user_id: &str) -> Result<Vec<CreatorRecord>, RepositoryError> {
        let query = format!(
            r#"
            SELECT {}
            FROM creators
            WHERE id IN (SELECT creator_id FROM user_favorites WHERE user_id = $1)
            ORDER BY id ASC
            "#,
            CREATOR_COLUMNS
        );

        let rows = sqlx::query(&query).bind(user_id).fetch_all(&self.pool).await?;

        tracing::debug!("User {} has {} favorite creators", user_id, rows.len());

        rows.iter().map(creator_from_row).collect()
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, RepositoryError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
