//! URL-safe identifiers derived from titles.

use serde::{Deserialize, Serialize};

use catalog_core::ValueObject;

/// Transliterated, lowercase, dash-separated form of a title.
///
/// Non-Latin scripts are transliterated rather than dropped, so a Cyrillic
/// title still yields a readable slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

/// Width of the `blogs.slug` column.
pub const MAX_SLUG_LEN: usize = 255;

impl ValueObject for Slug {}

impl Slug {
    /// Transliteration can expand a letter into several (`щ` -> `shch`), so
    /// long titles are cut back to [`MAX_SLUG_LEN`] on a word boundary.
    pub fn from_title(title: &str) -> Self {
        Self(truncate_slug(::slug::slugify(title)))
    }

    /// Wrap a slug read back from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Slugs are ASCII, so byte offsets are char boundaries.
fn truncate_slug(mut slug: String) -> String {
    if slug.len() <= MAX_SLUG_LEN {
        return slug;
    }
    let cut = match slug[..=MAX_SLUG_LEN].rfind('-') {
        Some(dash) if dash > 0 => dash,
        _ => MAX_SLUG_LEN,
    };
    slug.truncate(cut);
    let trimmed = slug.trim_end_matches('-').len();
    slug.truncate(trimmed);
    slug
}

impl core::fmt::Display for Slug {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn latin_titles_are_lowercased_and_dashed() {
        assert_eq!(Slug::from_title("Hello  World!").as_str(), "hello-world");
        assert_eq!(Slug::from_title("Top 10 serums").as_str(), "top-10-serums");
    }

    #[test]
    fn cyrillic_titles_are_transliterated() {
        assert_eq!(Slug::from_title("Привет мир").as_str(), "privet-mir");
    }

    #[test]
    fn longest_cyrillic_title_fits_the_slug_column() {
        let slug = Slug::from_title(&"щ".repeat(150));
        assert!(!slug.is_empty());
        assert!(slug.as_str().len() <= MAX_SLUG_LEN);
    }

    #[test]
    fn long_slugs_are_cut_between_words() {
        let title = vec!["жужжащий"; 40].join(" ");
        let slug = Slug::from_title(&title);
        assert!(slug.as_str().len() <= MAX_SLUG_LEN);
        assert!(!slug.as_str().ends_with('-'));
        let full = ::slug::slugify(&title);
        assert!(full.starts_with(&format!("{}-", slug.as_str())));
    }

    #[test]
    fn punctuation_only_title_gives_empty_slug() {
        assert!(Slug::from_title("!!!").is_empty());
    }

    proptest! {
        #[test]
        fn slug_is_non_empty_and_url_safe(title in "[A-Za-z0-9][A-Za-z0-9 ,.!?-]{0,60}") {
            let slug = Slug::from_title(&title);
            prop_assert!(!slug.is_empty());
            prop_assert!(slug
                .as_str()
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.as_str().starts_with('-') && !slug.as_str().ends_with('-'));
        }

        #[test]
        fn cyrillic_words_never_slug_to_empty(title in "[а-щА-Щ]{1,30}") {
            prop_assert!(!Slug::from_title(&title).is_empty());
        }
    }
}
