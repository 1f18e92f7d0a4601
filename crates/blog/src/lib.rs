//! Blog domain module.
//!
//! Posts addressed by id or by a slug derived from their title, with a view
//! counter bumped on every detail view. Pure domain logic (no IO).

pub mod blog;
pub mod forms;
pub mod slug;

pub use blog::{Blog, NewBlog};
pub use forms::BlogForm;
pub use self::slug::Slug;
