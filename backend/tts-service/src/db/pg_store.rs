/// Postgres-backed repositories
use super::{ConversionRepository, MediaRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{Conversion, MediaCleanup, MediaFile, User};
use crate::storage::BlobStore;
use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Conversions (any owner) pointing at `media_id`, on the pool or inside a
/// transaction
async fn count_references<'e, E>(executor: E, media_id: Uuid) -> Result<i64>
where
    E: PgExecutor<'e>,
{
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM conversions WHERE media_id = $1",
    )
    .bind(media_id)
    .fetch_one(executor)
    .await?;
    Ok(count)
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::Conflict("email already registered".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl ConversionRepository for PgStore {
    async fn insert_conversion(&self, conversion: &Conversion) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO conversions (
                id, user_id, text, voice_uri, voice_name, voice_lang,
                rate, pitch, volume, media_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(conversion.id)
        .bind(conversion.user_id)
        .bind(&conversion.text)
        .bind(&conversion.voice_uri)
        .bind(&conversion.voice_name)
        .bind(&conversion.voice_lang)
        .bind(conversion.rate)
        .bind(conversion.pitch)
        .bind(conversion.volume)
        .bind(conversion.media_id)
        .bind(conversion.created_at)
        .bind(conversion.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_conversions(&self, owner_id: Uuid, limit: i64) -> Result<Vec<Conversion>> {
        let rows = sqlx::query_as::<_, Conversion>(
            r#"
            SELECT * FROM conversions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_conversion(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Conversion>> {
        let row = sqlx::query_as::<_, Conversion>(
            "SELECT * FROM conversions WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_conversion(&self, owner_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM conversions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_media_references(&self, media_id: Uuid) -> Result<i64> {
        count_references(&self.pool, media_id).await
    }
}

#[async_trait]
impl MediaRepository for PgStore {
    async fn insert_media(&self, media: &MediaFile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO media_files (id, user_id, filename, mime, size_bytes, checksum, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(media.id)
        .bind(media.user_id)
        .bind(&media.filename)
        .bind(&media.mime)
        .bind(media.size_bytes)
        .bind(&media.checksum)
        .bind(media.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_media(&self, owner_id: Uuid, id: Uuid) -> Result<Option<MediaFile>> {
        let row = sqlx::query_as::<_, MediaFile>(
            "SELECT * FROM media_files WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_media_if_unreferenced(
        &self,
        owner_id: Uuid,
        id: Uuid,
        blobs: &BlobStore,
    ) -> Result<MediaCleanup> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent cleanups of the same media; the
        // loser re-reads after commit and finds nothing.
        let media = sqlx::query_as::<_, MediaFile>(
            "SELECT * FROM media_files WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(media) = media else {
            tx.rollback().await?;
            debug!(media_id = %id, "media already gone or owned by another user");
            return Ok(MediaCleanup::Missing);
        };

        let references = count_references(&mut *tx, id).await?;

        if references > 0 {
            tx.rollback().await?;
            return Ok(MediaCleanup::StillReferenced(references));
        }

        blobs.remove(&media.filename).await?;

        sqlx::query("DELETE FROM media_files WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(media_id = %id, user_id = %owner_id, "orphaned media removed");
        Ok(MediaCleanup::Deleted)
    }
}
