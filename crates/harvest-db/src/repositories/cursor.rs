//! PostgreSQL implementation of CursorRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use harvest_core::entities::ChannelCursor;
use harvest_core::traits::{CursorRepository, RepoResult};
use harvest_core::value_objects::{ChannelId, MessageId};

use crate::models::CursorModel;

use super::error::{cursor_exists, cursor_not_found, map_db_error, map_unique_violation};

/// PostgreSQL implementation of CursorRepository
#[derive(Clone)]
pub struct PgCursorRepository {
    pool: PgPool,
}

impl PgCursorRepository {
    /// Create a new PgCursorRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CursorRepository for PgCursorRepository {
    #[instrument(skip(self))]
    async fn find(&self, channel_id: ChannelId) -> RepoResult<Option<ChannelCursor>> {
        let result = sqlx::query_as::<_, CursorModel>(
            r"
            SELECT channel_id, channel_name, last_message_id, last_polled_at
            FROM channel_cursors
            WHERE channel_id = $1
            ",
        )
        .bind(channel_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ChannelCursor::from))
    }

    #[instrument(skip(self, cursor), fields(channel_id = %cursor.channel_id))]
    async fn create(&self, cursor: &ChannelCursor) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO channel_cursors (channel_id, channel_name, last_message_id, last_polled_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(cursor.channel_id.into_inner())
        .bind(&cursor.channel_name)
        .bind(cursor.last_message_id.into_inner())
        .bind(cursor.last_polled_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || cursor_exists(cursor.channel_id)))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn advance(
        &self,
        channel_id: ChannelId,
        to: MessageId,
        at: DateTime<Utc>,
    ) -> RepoResult<bool> {
        // The guard keeps the cursor monotonic even under concurrent writers
        let result = sqlx::query(
            r"
            UPDATE channel_cursors
            SET last_message_id = $2, last_polled_at = $3
            WHERE channel_id = $1 AND last_message_id < $2
            ",
        )
        .bind(channel_id.into_inner())
        .bind(to.into_inner())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM channel_cursors WHERE channel_id = $1)
            ",
        )
        .bind(channel_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        if exists {
            Ok(false)
        } else {
            Err(cursor_not_found(channel_id))
        }
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<ChannelCursor>> {
        let results = sqlx::query_as::<_, CursorModel>(
            r"
            SELECT channel_id, channel_name, last_message_id, last_polled_at
            FROM channel_cursors
            ORDER BY channel_name, channel_id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ChannelCursor::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM channel_cursors")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
