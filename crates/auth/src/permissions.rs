use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission codename.
///
/// Permissions are opaque `app.action_model` strings (e.g. "catalog.add_blog").
/// A special wildcard permission `"*"` grants everything without listing
/// codenames in tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    /// Create blog posts.
    pub const ADD_BLOG: Permission = Permission(Cow::Borrowed("catalog.add_blog"));
    /// Edit any blog post.
    pub const CHANGE_BLOG: Permission = Permission(Cow::Borrowed("catalog.change_blog"));
    /// Delete any blog post.
    pub const DELETE_BLOG: Permission = Permission(Cow::Borrowed("catalog.delete_blog"));
    /// Moderate products owned by someone else.
    pub const CHANGE_PRODUCT: Permission = Permission(Cow::Borrowed("catalog.change_product"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
