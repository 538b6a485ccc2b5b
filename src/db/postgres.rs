use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    db::RecordStore,
    error::{AppError, AppResult},
    models::{Rating, WatchRecord},
};

/// Creates a PostgreSQL connection pool
///
/// A personal journal sees little traffic, so the pool stays small.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the migrations under `migrations/`
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[derive(Debug, FromRow)]
struct WatchRecordRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    poster_path: Option<String>,
    overview: String,
    rating: i16,
    comments: Option<String>,
    watched_date: NaiveDate,
    genres: Vec<String>,
    external_id: Option<i64>,
}

impl TryFrom<WatchRecordRow> for WatchRecord {
    type Error = AppError;

    fn try_from(row: WatchRecordRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating)
            .map_err(|_| AppError::Internal(format!("Stored rating out of range: {}", row.rating)))
            .and_then(Rating::try_from)?;

        Ok(WatchRecord {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            poster_path: row.poster_path,
            overview: row.overview,
            rating,
            comments: row.comments,
            watched_date: row.watched_date,
            genres: row.genres,
            external_id: row.external_id,
        })
    }
}

/// Record store backed by the `watch_records` table
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, record: &WatchRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO watch_records
                (id, owner_id, title, poster_path, overview, rating, comments,
                 watched_date, genres, external_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(record.id)
        .bind(record.owner_id)
        .bind(&record.title)
        .bind(&record.poster_path)
        .bind(&record.overview)
        .bind(i16::from(record.rating.value()))
        .bind(&record.comments)
        .bind(record.watched_date)
        .bind(&record.genres)
        .bind(record.external_id)
        .execute(&self.pool)
        .await?;

        tracing::debug!(record_id = %record.id, user_id = %record.owner_id, "Inserted watch record");

        Ok(())
    }

    async fn select_all(&self, owner_id: Uuid) -> AppResult<Vec<WatchRecord>> {
        let rows: Vec<WatchRecordRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, title, poster_path, overview, rating, comments,
                   watched_date, genres, external_id
            FROM watch_records
            WHERE owner_id = $1
            ORDER BY watched_date DESC, created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WatchRecord::try_from).collect()
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM watch_records WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Watch record {}", id)));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
