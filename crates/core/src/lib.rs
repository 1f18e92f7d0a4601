//! `catalog-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the catalog and
//! blog modules (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod form;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::DomainError;
pub use form::FormErrors;
pub use id::{BlogId, CategoryId, ProductId, UserId, VersionId};
pub use value_object::ValueObject;
