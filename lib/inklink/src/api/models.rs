//! Request and response bodies of the InkLink API.

use serde::{Deserialize, Serialize};

/// Credentials for `POST /auth/signin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInRequest {
    /// Username or email.
    pub username: String,
    /// Password.
    pub password: String,
}

/// New account for `POST /auth/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpRequest {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Story body for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRequest {
    /// Title.
    pub title: String,
    /// Content.
    pub content: String,
    /// Genre name, e.g. `FANTASY`.
    pub genre: String,
    /// Publication status; the server assumes `DRAFT`.
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    StoryRequest::DRAFT.to_string()
}

impl StoryRequest {
    /// Status of unpublished stories.
    pub const DRAFT: &'static str = "DRAFT";
    /// Status of published stories.
    pub const PUBLISHED: &'static str = "PUBLISHED";

    /// A draft story.
    pub fn draft(
        title: impl Into<String>,
        content: impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            genre: genre.into(),
            status: default_status(),
        }
    }

    /// Same story, published.
    #[must_use]
    pub fn published(mut self) -> Self {
        Self::PUBLISHED.clone_into(&mut self.status);
        self
    }
}

/// Comment body for add and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRequest {
    /// Comment text.
    pub content: String,
}

/// Tag body for `POST /tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRequest {
    /// Tag name.
    pub name: String,
}

/// Batch lookup body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdsRequest {
    /// Ids to fetch.
    pub ids: Vec<u64>,
}

/// Pagination of list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// Zero-based page index.
    pub page: u32,
    /// Page size.
    pub size: u32,
    /// Sort expression such as `createdAt,desc`.
    pub sort: Option<String>,
}

impl PageQuery {
    /// Page `page` of `size` items, unsorted.
    #[must_use]
    pub const fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    /// Set the sort expression.
    #[must_use]
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Query pairs in `page`, `size`, `sort` order.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ];
        if let Some(sort) = &self.sort {
            params.push(("sort".to_string(), sort.clone()));
        }
        params
    }
}

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub story_count: Option<u64>,
    pub published_story_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub total_reads: Option<u64>,
}

/// A comment as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct CommentResponse {
    pub id: u64,
    pub content: String,
    pub user: Option<UserProfile>,
    pub story_id: Option<u64>,
    pub created_at: Option<String>,
    pub can_delete: Option<bool>,
}

/// A story as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct StoryResponse {
    pub id: u64,
    pub title: String,
    pub content: Option<String>,
    pub genre: Option<String>,
    pub status: Option<String>,
    pub read_count: Option<u64>,
    pub author: Option<UserProfile>,
    pub comments: Vec<CommentResponse>,
    pub tags: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub comment_count: Option<u64>,
    pub is_author: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn story_request_defaults_to_draft() {
        let story = StoryRequest::draft("Dawn", "It was early.", "FANTASY");
        assert_eq!(story.status, "DRAFT");
        assert_eq!(story.published().status, "PUBLISHED");

        let parsed: StoryRequest =
            serde_json::from_value(json!({"title": "t", "content": "c", "genre": "HORROR"}))
                .expect("story request");
        assert_eq!(parsed.status, "DRAFT");
    }

    #[test]
    fn page_query_params() {
        let params = PageQuery::new(2, 12).sort("createdAt,desc").to_params();
        assert_eq!(
            params,
            [
                ("page".to_string(), "2".to_string()),
                ("size".to_string(), "12".to_string()),
                ("sort".to_string(), "createdAt,desc".to_string()),
            ]
        );
        assert_eq!(PageQuery::new(0, 10).to_params().len(), 2);
    }

    #[test]
    fn story_response_tolerates_missing_fields() {
        let story: StoryResponse = serde_json::from_value(json!({
            "id": 7,
            "title": "Night Train",
            "author": {"id": 3, "username": "ada"},
            "tags": ["travel"],
            "readCount": 12
        }))
        .expect("story");

        assert_eq!(story.id, 7);
        assert_eq!(story.read_count, Some(12));
        assert_eq!(story.author.map(|a| a.username).as_deref(), Some("ada"));
        assert!(story.comments.is_empty());
    }
}
