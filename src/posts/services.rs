use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::repo::User,
    error::ApiError,
    posts::{
        dto::{CreatePostRequest, CreatedPost, DeletedPost, Pagination, PostData, PostList},
        repo::Post,
    },
};

const NOT_YOUR_POST: &str = "You can only delete or update your posts";

/// Ownership is judged by the author column, never by the post id.
fn ensure_owner(post: &Post, user_id: Uuid) -> Result<(), ApiError> {
    if post.author_id != user_id {
        return Err(ApiError::unauthorized(NOT_YOUR_POST));
    }
    Ok(())
}

async fn fetch_owned(db: &PgPool, caller: &User, id: Uuid) -> Result<Post, ApiError> {
    let post = Post::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    ensure_owner(&post, caller.id)?;
    Ok(post)
}

pub async fn list(db: &PgPool, page: Pagination) -> Result<PostList, ApiError> {
    let posts = Post::list_all(db, page.limit(), page.offset()).await?;
    Ok(PostList {
        posts: posts.into_iter().map(PostData::from).collect(),
    })
}

pub async fn create(
    db: &PgPool,
    author: &User,
    input: CreatePostRequest,
) -> Result<CreatedPost, ApiError> {
    let post = Post::create(db, author.id, &input.title, &input.content).await?;
    info!(post_id = %post.id, author_id = %author.id, "post created");
    Ok(CreatedPost {
        title: post.title,
        content: post.content,
        author: author.name.clone(),
    })
}

pub async fn update(
    db: &PgPool,
    caller: &User,
    id: Uuid,
    content: String,
) -> Result<PostData, ApiError> {
    fetch_owned(db, caller, id).await?;
    let updated = Post::update_content(db, id, &content).await?;
    info!(post_id = %id, author_id = %caller.id, "post updated");
    Ok(PostData::from(updated))
}

pub async fn delete(db: &PgPool, caller: &User, id: Uuid) -> Result<DeletedPost, ApiError> {
    fetch_owned(db, caller, id).await?;
    Post::delete(db, id).await?;
    info!(post_id = %id, author_id = %caller.id, "post deleted");
    Ok(DeletedPost {
        message: "Post deleted successfully".into(),
    })
}

pub async fn user_related(db: &PgPool, caller: &User, page: Pagination) -> Result<PostList, ApiError> {
    let posts = Post::list_by_author(db, caller.id, page.limit(), page.offset()).await?;
    Ok(PostList {
        posts: posts.into_iter().map(PostData::from).collect(),
    })
}
