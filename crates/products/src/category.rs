use serde::{Deserialize, Serialize};
use validator::Validate;

use catalog_core::{CategoryId, Entity, FormErrors};

/// Product category (read-only to the product workflows).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

/// Category ready to be inserted (id assigned by the store).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

impl NewCategory {
    pub fn into_category(self, id: CategoryId) -> Category {
        Category {
            id,
            name: self.name,
            description: self.description,
        }
    }
}

/// Staff-only category submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl CategoryForm {
    pub fn clean(self) -> Result<NewCategory, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };
        errors.require_text("name", &self.name);
        errors.into_result()?;

        Ok(NewCategory {
            name: self.name.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        })
    }
}

/// The three fixed product groups served by the category listing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductGroup {
    Skin,
    Hygiene,
    Home,
}

impl ProductGroup {
    pub const ALL: [ProductGroup; 3] = [ProductGroup::Skin, ProductGroup::Hygiene, ProductGroup::Home];

    /// Category identifier the group is bound to unless configured otherwise.
    pub const fn default_category_id(self) -> CategoryId {
        match self {
            ProductGroup::Skin => CategoryId::new(5),
            ProductGroup::Hygiene => CategoryId::new(6),
            ProductGroup::Home => CategoryId::new(7),
        }
    }

    pub const fn page_title(self) -> &'static str {
        match self {
            ProductGroup::Skin => "Товары по уходу за кожей",
            ProductGroup::Hygiene => "Товары личной гигиены",
            ProductGroup::Home => "Товары для дома",
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_default_to_distinct_categories() {
        let ids: Vec<_> = ProductGroup::ALL
            .iter()
            .map(|g| g.default_category_id())
            .collect();
        assert_eq!(ids, vec![CategoryId::new(5), CategoryId::new(6), CategoryId::new(7)]);
    }

    #[test]
    fn category_form_trims_and_drops_empty_description() {
        let form = CategoryForm {
            name: "  Уход за кожей ".into(),
            description: Some("   ".into()),
        };
        let new = form.clean().unwrap();
        assert_eq!(new.name, "Уход за кожей");
        assert_eq!(new.description, None);
    }

    #[test]
    fn category_form_requires_name() {
        let form = CategoryForm {
            name: " ".into(),
            description: None,
        };
        let errors = form.clean().unwrap_err();
        assert!(errors.has("name"));
    }
}
