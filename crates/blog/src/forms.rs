use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use catalog_core::FormErrors;

use crate::{Blog, NewBlog, Slug};

/// Fields editable on a post: title, content, preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BlogForm {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub preview: Option<String>,
}

impl BlogForm {
    pub fn clean(&self) -> Result<(), FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };
        errors.require_text("title", &self.title);
        errors.require_text("content", &self.content);
        if !errors.has("title") && Slug::from_title(&self.title).is_empty() {
            errors.add("title", "title must contain letters or digits");
        }
        errors.into_result()
    }

    /// New posts are published straight away; the slug comes from the title.
    pub fn into_new_blog(self, now: DateTime<Utc>) -> NewBlog {
        let title = self.title.trim().to_string();
        NewBlog {
            slug: Slug::from_title(&title),
            title,
            content: self.content,
            preview: self.preview.filter(|p| !p.trim().is_empty()),
            is_published: true,
            created_at: now,
        }
    }

    /// Overwrite the editable fields and re-derive the slug.
    pub fn apply_to(self, blog: &mut Blog) {
        blog.title = self.title.trim().to_string();
        blog.slug = Slug::from_title(&blog.title);
        blog.content = self.content;
        blog.preview = self.preview.filter(|p| !p.trim().is_empty());
    }
}
