//! Product forms: the owner's full field set and the moderator's subset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use catalog_core::{CategoryId, FormErrors, UserId};

use crate::{NewProduct, Product, ProductFormVariant};

/// Words that may not appear in product titles or descriptions.
pub const FORBIDDEN_WORDS: [&str; 9] = [
    "казино",
    "криптовалюта",
    "крипта",
    "биржа",
    "дешево",
    "бесплатно",
    "обман",
    "полиция",
    "радар",
];

fn reject_forbidden_words(errors: &mut FormErrors, field: &str, value: &str) {
    let lowered = value.to_lowercase();
    for word in FORBIDDEN_WORDS {
        if lowered.contains(word) {
            errors.add(field, format!("forbidden word: {word}"));
        }
    }
}

fn check_category(
    errors: &mut FormErrors,
    category_id: CategoryId,
    category_exists: impl Fn(CategoryId) -> bool,
) {
    if !category_exists(category_id) {
        errors.add("category_id", format!("unknown category {category_id}"));
    }
}

fn validation_errors(form: &impl Validate) -> FormErrors {
    match form.validate() {
        Ok(()) => FormErrors::new(),
        Err(e) => FormErrors::from(e),
    }
}

/// Full product form (owners, staff, superusers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProductForm {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub preview: Option<String>,
    pub category_id: CategoryId,
    #[serde(default)]
    pub price: Option<u64>,
}

impl ProductForm {
    pub fn initial(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            preview: product.preview.clone(),
            category_id: product.category_id,
            price: product.price,
        }
    }

    pub fn clean(&self, category_exists: impl Fn(CategoryId) -> bool) -> Result<(), FormErrors> {
        let mut errors = validation_errors(self);
        errors.require_text("title", &self.title);
        reject_forbidden_words(&mut errors, "title", &self.title);
        reject_forbidden_words(&mut errors, "description", &self.description);
        check_category(&mut errors, self.category_id, category_exists);
        errors.into_result()
    }

    /// Build the insertable record, owner included.
    pub fn into_new_product(self, owner: UserId, now: DateTime<Utc>) -> NewProduct {
        NewProduct {
            title: self.title.trim().to_string(),
            description: self.description,
            preview: self.preview.filter(|p| !p.trim().is_empty()),
            category_id: self.category_id,
            price: self.price,
            owner,
            created_at: now,
        }
    }

    fn apply_to(self, product: &mut Product) {
        product.title = self.title.trim().to_string();
        product.description = self.description;
        product.preview = self.preview.filter(|p| !p.trim().is_empty());
        product.category_id = self.category_id;
        product.price = self.price;
    }
}

/// Restricted form for holders of the change permission.
///
/// Title, preview and price stay with the owner; submitted values for them
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ModeratorProductForm {
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub is_published: bool,
}

impl ModeratorProductForm {
    pub fn initial(product: &Product) -> Self {
        Self {
            description: product.description.clone(),
            category_id: product.category_id,
            is_published: product.is_published,
        }
    }

    pub fn clean(&self, category_exists: impl Fn(CategoryId) -> bool) -> Result<(), FormErrors> {
        let mut errors = validation_errors(self);
        reject_forbidden_words(&mut errors, "description", &self.description);
        check_category(&mut errors, self.category_id, category_exists);
        errors.into_result()
    }

    fn apply_to(self, product: &mut Product) {
        product.description = self.description;
        product.category_id = self.category_id;
        product.is_published = self.is_published;
    }
}

/// A product edit bound to the form variant chosen by the access policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProductSubmission {
    Full(ProductForm),
    Moderator(ModeratorProductForm),
}

impl ProductSubmission {
    /// Bind submitted JSON to the variant's field set.
    pub fn parse(variant: ProductFormVariant, value: serde_json::Value) -> Result<Self, FormErrors> {
        Ok(match variant {
            ProductFormVariant::Full => Self::Full(serde_json::from_value(value)?),
            ProductFormVariant::Moderator => Self::Moderator(serde_json::from_value(value)?),
        })
    }

    /// Unbound form pre-filled from the stored product.
    pub fn initial(variant: ProductFormVariant, product: &Product) -> Self {
        match variant {
            ProductFormVariant::Full => Self::Full(ProductForm::initial(product)),
            ProductFormVariant::Moderator => Self::Moderator(ModeratorProductForm::initial(product)),
        }
    }

    pub fn variant(&self) -> ProductFormVariant {
        match self {
            Self::Full(_) => ProductFormVariant::Full,
            Self::Moderator(_) => ProductFormVariant::Moderator,
        }
    }

    pub fn clean(&self, category_exists: impl Fn(CategoryId) -> bool) -> Result<(), FormErrors> {
        match self {
            Self::Full(form) => form.clean(category_exists),
            Self::Moderator(form) => form.clean(category_exists),
        }
    }

    /// Copy the variant's fields onto `product`; other fields are untouched.
    pub fn apply_to(self, product: &mut Product, now: DateTime<Utc>) {
        match self {
            Self::Full(form) => form.apply_to(product),
            Self::Moderator(form) => form.apply_to(product),
        }
        product.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::ProductId;
    use serde_json::json;

    fn any_category(_: CategoryId) -> bool {
        true
    }

    fn form(title: &str, description: &str) -> ProductForm {
        ProductForm {
            title: title.into(),
            description: description.into(),
            preview: None,
            category_id: CategoryId::new(5),
            price: Some(1500),
        }
    }

    fn stored(owner: UserId) -> Product {
        form("Essence", "Snail mucin")
            .into_new_product(owner, Utc::now())
            .into_product(ProductId::new(3))
    }

    #[test]
    fn valid_full_form_builds_owned_product() {
        let owner = UserId::new();
        let f = form("  Sheet mask ", "Hydrating");
        assert!(f.clean(any_category).is_ok());
        let new = f.into_new_product(owner, Utc::now());
        assert_eq!(new.owner, owner);
        assert_eq!(new.title, "Sheet mask");
    }

    #[test]
    fn blank_and_overlong_titles_are_rejected() {
        let errors = form("   ", "").clean(any_category).unwrap_err();
        assert!(errors.has("title"));

        let errors = form(&"а".repeat(151), "").clean(any_category).unwrap_err();
        assert!(errors.has("title"));
    }

    #[test]
    fn forbidden_words_are_rejected_case_insensitively() {
        let errors = form("Лучшее КАЗИНО", "совсем бесплатно").clean(any_category).unwrap_err();
        assert_eq!(errors.get("title"), ["forbidden word: казино".to_string()]);
        assert_eq!(errors.get("description"), ["forbidden word: бесплатно".to_string()]);
    }

    #[test]
    fn unknown_category_is_a_field_error() {
        let errors = form("Serum", "").clean(|_| false).unwrap_err();
        assert!(errors.has("category_id"));
    }

    #[test]
    fn moderator_submission_ignores_owner_fields() {
        let owner = UserId::new();
        let mut product = stored(owner);
        let submission = ProductSubmission::parse(
            ProductFormVariant::Moderator,
            json!({
                "title": "Hijacked",
                "price": 1,
                "description": "Reviewed",
                "category_id": 6,
                "is_published": true
            }),
        )
        .unwrap();

        assert!(submission.clean(any_category).is_ok());
        submission.apply_to(&mut product, Utc::now());

        assert_eq!(product.title, "Essence");
        assert_eq!(product.price, Some(1500));
        assert_eq!(product.description, "Reviewed");
        assert_eq!(product.category_id, CategoryId::new(6));
        assert!(product.is_published);
        assert_eq!(product.owner(), owner);
    }

    #[test]
    fn full_submission_cannot_publish() {
        let mut product = stored(UserId::new());
        let submission = ProductSubmission::parse(
            ProductFormVariant::Full,
            json!({ "title": "Essence 2", "category_id": 5, "is_published": true }),
        )
        .unwrap();
        submission.apply_to(&mut product, Utc::now());
        assert_eq!(product.title, "Essence 2");
        assert!(!product.is_published);
    }

    #[test]
    fn malformed_submission_is_a_non_field_error() {
        let errors = ProductSubmission::parse(ProductFormVariant::Full, json!({ "title": "x" }))
            .unwrap_err();
        assert!(errors.has(catalog_core::form::NON_FIELD_ERRORS));
    }

    #[test]
    fn initial_matches_variant() {
        let product = stored(UserId::new());
        let initial = ProductSubmission::initial(ProductFormVariant::Moderator, &product);
        assert_eq!(initial.variant(), ProductFormVariant::Moderator);
        assert_eq!(
            serde_json::to_value(&initial).unwrap(),
            json!({ "description": "Snail mucin", "category_id": 5, "is_published": false })
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn created_product_is_owned_by_its_creator(
                title in "[a-zA-Zа-яА-Я ]{1,40}",
                price in proptest::option::of(0u64..1_000_000),
                raw_id in 1i64..10_000,
            ) {
                let owner = UserId::new();
                let mut f = form(&title, "");
                f.price = price;
                let product = f.into_new_product(owner, Utc::now()).into_product(ProductId::new(raw_id));
                prop_assert_eq!(product.owner(), owner);
                prop_assert!(product.is_owned_by(owner));
                prop_assert!(!product.is_published);
            }
        }
    }
}
