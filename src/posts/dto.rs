use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::posts::repo::Post;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page/limit as carried on the wire; both are optional and clamped.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// REST carries the id in the path; the body holds the new content.
#[derive(Debug, Deserialize)]
pub struct UpdatePostBody {
    pub content: String,
}

/// RPC carries the id inside the input envelope.
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub id: Uuid,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct DeletePostRequest {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PostData {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: OffsetDateTime,
}

impl From<Post> for PostData {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostList {
    pub posts: Vec<PostData>,
}

/// Creation echoes the content back with the author's display name.
#[derive(Debug, Serialize)]
pub struct CreatedPost {
    pub title: String,
    pub content: String,
    pub author: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedPost {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_apply_to_an_empty_query() {
        let page: Pagination = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn limit_is_clamped_to_the_allowed_range() {
        let oversized = Pagination { page: 1, limit: 5000 };
        assert_eq!(oversized.limit(), MAX_PAGE_SIZE);

        let undersized = Pagination { page: 1, limit: 0 };
        assert_eq!(undersized.limit(), 1);

        let negative = Pagination { page: 1, limit: -3 };
        assert_eq!(negative.limit(), 1);
    }

    #[test]
    fn offset_follows_the_clamped_limit() {
        let page = Pagination { page: 3, limit: 10 };
        assert_eq!(page.offset(), 20);

        let clamped = Pagination { page: 2, limit: 5000 };
        assert_eq!(clamped.offset(), MAX_PAGE_SIZE);
    }

    #[test]
    fn nonpositive_page_is_treated_as_the_first() {
        let page = Pagination { page: 0, limit: 10 };
        assert_eq!(page.offset(), 0);

        let negative = Pagination { page: -4, limit: 10 };
        assert_eq!(negative.offset(), 0);
    }
}
