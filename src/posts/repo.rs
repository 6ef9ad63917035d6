use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Post record. `author_id` is set at creation and never reassigned.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: OffsetDateTime,
}

impl Post {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Post>> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, content, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn list_all(db: &PgPool, limit: i64, offset: i64) -> sqlx::Result<Vec<Post>> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, content, created_at
            FROM posts
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn list_by_author(
        db: &PgPool,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<Post>> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, content, created_at
            FROM posts
            WHERE author_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        author_id: Uuid,
        title: &str,
        content: &str,
    ) -> sqlx::Result<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (author_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING id, author_id, title, content, created_at
            "#,
        )
        .bind(author_id)
        .bind(title)
        .bind(content)
        .fetch_one(db)
        .await
    }

    /// Content is the only mutable field.
    pub async fn update_content(db: &PgPool, id: Uuid, content: &str) -> sqlx::Result<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET content = $2
            WHERE id = $1
            RETURNING id, author_id, title, content, created_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
        sqlx::query(r#"DELETE FROM posts WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
