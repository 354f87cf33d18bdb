//! PostgreSQL implementation of PostRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use harvest_core::entities::{MediaAttachment, MediaKind, NewPost, Post, PostId, PostMessage};
use harvest_core::traits::{PostRepository, PostStats, PostSummary, RepoResult};

use crate::mappers::{MediaInsert, PostInsert};
use crate::models::{
    MediaAttachmentModel, MediaKindCountModel, PostMediaCountModel, PostMessageModel, PostModel,
    PostStatsModel,
};

use super::error::map_db_error;

/// PostgreSQL implementation of PostRepository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    /// Create a new PgPostRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    #[instrument(
        skip(self, post, messages, media),
        fields(
            channel_id = %post.channel_id,
            first_message_id = %post.first_message_id,
            messages = messages.len(),
            media = media.len(),
        )
    )]
    async fn insert_group(
        &self,
        post: &NewPost,
        messages: &[PostMessage],
        media: &[MediaAttachment],
    ) -> RepoResult<Option<PostId>> {
        let insert = PostInsert::new(post);
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let post_id = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO posts (channel_id, channel_name, group_id, first_message_id,
                               combined_text, posted_at, ingested_at, message_link)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (channel_id, first_message_id) DO NOTHING
            RETURNING id
            ",
        )
        .bind(insert.channel_id)
        .bind(insert.channel_name)
        .bind(insert.group_id)
        .bind(insert.first_message_id)
        .bind(insert.combined_text)
        .bind(post.posted_at)
        .bind(post.ingested_at)
        .bind(insert.message_link)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let Some(post_id) = post_id else {
            tx.rollback().await.map_err(map_db_error)?;
            debug!("Post already stored");
            return Ok(None);
        };

        for message in messages {
            sqlx::query(
                r"
                INSERT INTO post_messages (post_id, message_id, text)
                VALUES ($1, $2, $3)
                ON CONFLICT (post_id, message_id) DO NOTHING
                ",
            )
            .bind(post_id)
            .bind(message.message_id.into_inner())
            .bind(&message.text)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        for attachment in media {
            let row = MediaInsert::new(attachment);
            sqlx::query(
                r"
                INSERT INTO media_attachments (post_id, kind, file_id, mime_type, file_size, payload)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(post_id)
            .bind(row.kind)
            .bind(row.file_id)
            .bind(row.mime_type)
            .bind(row.file_size)
            .bind(row.payload)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(Some(post_id))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: PostId) -> RepoResult<Option<Post>> {
        let result = sqlx::query_as::<_, PostModel>(
            r"
            SELECT id, channel_id, channel_name, group_id, first_message_id,
                   combined_text, posted_at, ingested_at, message_link
            FROM posts
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Post::from))
    }

    #[instrument(skip(self))]
    async fn find_messages(&self, post_id: PostId) -> RepoResult<Vec<PostMessage>> {
        let results = sqlx::query_as::<_, PostMessageModel>(
            r"
            SELECT message_id, text
            FROM post_messages
            WHERE post_id = $1
            ORDER BY message_id ASC
            ",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(PostMessage::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_media(&self, post_id: PostId) -> RepoResult<Vec<MediaAttachment>> {
        let results = sqlx::query_as::<_, MediaAttachmentModel>(
            r"
            SELECT kind, file_id, mime_type, file_size, payload
            FROM media_attachments
            WHERE post_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(MediaAttachment::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: PostId) -> RepoResult<bool> {
        // Messages and attachments go with the post via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_ingested_before(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        // Messages and attachments go with their posts via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM posts WHERE ingested_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        debug!(posts = result.rows_affected(), "Expired posts removed");

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM posts")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn recent(&self, limit: i64) -> RepoResult<Vec<PostSummary>> {
        let limit = limit.clamp(1, 100);

        let posts = sqlx::query_as::<_, PostModel>(
            r"
            SELECT id, channel_id, channel_name, group_id, first_message_id,
                   combined_text, posted_at, ingested_at, message_link
            FROM posts
            ORDER BY ingested_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = posts.iter().map(|post| post.id).collect();
        let counts = sqlx::query_as::<_, PostMediaCountModel>(
            r"
            SELECT post_id, kind, COUNT(*) AS count
            FROM media_attachments
            WHERE post_id = ANY($1)
            GROUP BY post_id, kind
            ORDER BY post_id, kind
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut by_post: HashMap<i64, Vec<(MediaKind, i64)>> = HashMap::new();
        for row in counts {
            let kind = row.kind.parse::<MediaKind>()?;
            by_post.entry(row.post_id).or_default().push((kind, row.count));
        }

        Ok(posts
            .into_iter()
            .map(|model| {
                let media_counts = by_post.remove(&model.id).unwrap_or_default();
                PostSummary {
                    post: Post::from(model),
                    media_counts,
                }
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> RepoResult<PostStats> {
        let row = sqlx::query_as::<_, PostStatsModel>(
            r"
            SELECT
                (SELECT COUNT(*) FROM posts) AS posts,
                (SELECT COUNT(*) FROM post_messages) AS messages,
                (SELECT COUNT(*) FROM media_attachments) AS attachments
            ",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(PostStats {
            posts: row.posts,
            messages: row.messages,
            attachments: row.attachments,
        })
    }

    #[instrument(skip(self))]
    async fn media_kind_counts(&self) -> RepoResult<Vec<(MediaKind, i64)>> {
        let rows = sqlx::query_as::<_, MediaKindCountModel>(
            r"
            SELECT kind, COUNT(*) AS count
            FROM media_attachments
            GROUP BY kind
            ORDER BY count DESC, kind
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter()
            .map(|row| Ok((row.kind.parse::<MediaKind>()?, row.count)))
            .collect()
    }
}
