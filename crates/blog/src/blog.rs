use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{BlogId, Entity};

use crate::Slug;

/// Blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub id: BlogId,
    pub title: String,
    pub content: String,
    pub preview: Option<String>,
    pub is_published: bool,
    pub slug: Slug,
    pub views_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Blog {
    /// Count one detail view. The caller persists the result.
    pub fn register_view(&mut self) {
        self.views_count = self.views_count.saturating_add(1);
    }
}

impl Entity for Blog {
    type Id = BlogId;

    fn id(&self) -> BlogId {
        self.id
    }
}

/// A validated post ready for insert, slug included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlog {
    pub title: String,
    pub content: String,
    pub preview: Option<String>,
    pub is_published: bool,
    pub slug: Slug,
    pub created_at: DateTime<Utc>,
}

impl NewBlog {
    pub fn into_blog(self, id: BlogId) -> Blog {
        Blog {
            id,
            title: self.title,
            content: self.content,
            preview: self.preview,
            is_published: self.is_published,
            slug: self.slug,
            views_count: 0,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> Blog {
        NewBlog {
            title: "Утренний уход".into(),
            content: "...".into(),
            preview: None,
            is_published: true,
            slug: Slug::from_title("Утренний уход"),
            created_at: Utc::now(),
        }
        .into_blog(BlogId::new(1))
    }

    #[test]
    fn new_posts_start_unviewed() {
        assert_eq!(post().views_count, 0);
    }

    #[test]
    fn register_view_adds_exactly_one() {
        let mut blog = post();
        blog.views_count = 5;
        blog.register_view();
        assert_eq!(blog.views_count, 6);
    }

    #[test]
    fn register_view_saturates() {
        let mut blog = post();
        blog.views_count = u64::MAX;
        blog.register_view();
        assert_eq!(blog.views_count, u64::MAX);
    }
}
