//! Products domain module.
//!
//! Business rules for the catalog: products and their owners, categories,
//! version rows edited through a form-set, and the edit access policy. Pure
//! domain logic (no IO, no HTTP, no storage).

pub mod access;
pub mod category;
pub mod forms;
pub mod product;
pub mod version;

pub use access::{EditGrant, ProductFormVariant, resolve_edit_grant};
pub use category::{Category, CategoryForm, NewCategory, ProductGroup};
pub use forms::{ModeratorProductForm, ProductForm, ProductSubmission};
pub use product::{NewProduct, Product};
pub use version::{
    NewVersion, Version, VersionChanges, VersionDraft, VersionForm, VersionFormSet,
    VersionFormSetErrors, current_version,
};
