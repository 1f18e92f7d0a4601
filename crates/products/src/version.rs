//! Product versions and the form-set that edits them together with their product.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use catalog_core::{Entity, FormErrors, ProductId, VersionId};

/// A version row owned by one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: VersionId,
    pub product_id: ProductId,
    pub number: String,
    pub name: String,
    pub is_current: bool,
}

impl Entity for Version {
    type Id = VersionId;

    fn id(&self) -> VersionId {
        self.id
    }
}

/// The version flagged current, if any.
pub fn current_version(versions: &[Version]) -> Option<&Version> {
    versions.iter().find(|v| v.is_current)
}

/// Version row ready for insert under a known product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVersion {
    pub product_id: ProductId,
    pub number: String,
    pub name: String,
    pub is_current: bool,
}

impl NewVersion {
    pub fn into_version(self, id: VersionId) -> Version {
        Version {
            id,
            product_id: self.product_id,
            number: self.number,
            name: self.name,
            is_current: self.is_current,
        }
    }
}

/// A validated new row not yet attached to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDraft {
    pub number: String,
    pub name: String,
    pub is_current: bool,
}

impl VersionDraft {
    /// Attach the row to the saved parent product.
    pub fn for_product(self, product_id: ProductId) -> NewVersion {
        NewVersion {
            product_id,
            number: self.number,
            name: self.name,
            is_current: self.is_current,
        }
    }
}

/// One row of the version form-set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct VersionForm {
    #[serde(default)]
    pub id: Option<VersionId>,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub number: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub name: String,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub delete: bool,
}

impl VersionForm {
    fn from_version(v: &Version) -> Self {
        Self {
            id: Some(v.id),
            number: v.number.clone(),
            name: v.name.clone(),
            is_current: v.is_current,
            delete: false,
        }
    }

    /// An untouched extra row: no id and no text.
    pub fn is_blank(&self) -> bool {
        self.id.is_none() && self.number.trim().is_empty() && self.name.trim().is_empty()
    }

    fn clean(&self) -> Result<(), FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };
        errors.require_text("number", &self.number);
        errors.require_text("name", &self.name);
        errors.into_result()
    }
}

/// Errors of a form-set: per-row field errors plus set-level errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionFormSetErrors {
    /// One entry per submitted row (empty map for valid rows).
    pub forms: Vec<FormErrors>,
    pub non_form_errors: Vec<String>,
}

impl VersionFormSetErrors {
    pub fn is_empty(&self) -> bool {
        self.non_form_errors.is_empty() && self.forms.iter().all(FormErrors::is_empty)
    }
}

/// Validated changes to apply once the parent product is saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionChanges {
    pub updates: Vec<Version>,
    pub inserts: Vec<VersionDraft>,
    pub deletes: Vec<VersionId>,
}

impl VersionChanges {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.inserts.is_empty() && self.deletes.is_empty()
    }
}

/// The version rows submitted with a product edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionFormSet {
    pub rows: Vec<VersionForm>,
}

impl VersionFormSet {
    /// Number of blank rows offered after the existing ones.
    pub const EXTRA: usize = 1;

    /// Unbound form-set for the edit page: existing rows then blank extras.
    pub fn initial(existing: &[Version]) -> Self {
        let mut rows: Vec<VersionForm> = existing.iter().map(VersionForm::from_version).collect();
        rows.extend(std::iter::repeat_with(VersionForm::default).take(Self::EXTRA));
        Self { rows }
    }

    /// Validate the whole set against the product's stored versions.
    ///
    /// Rows without an id that are blank or marked for deletion are skipped.
    /// Stored versions absent from the submission stay as they are.
    pub fn clean(
        &self,
        product_id: ProductId,
        existing: &[Version],
    ) -> Result<VersionChanges, VersionFormSetErrors> {
        let mut errors = VersionFormSetErrors {
            forms: vec![FormErrors::new(); self.rows.len()],
            non_form_errors: Vec::new(),
        };
        let mut changes = VersionChanges::default();
        let mut seen: HashSet<VersionId> = HashSet::new();
        let mut current_rows = 0usize;

        for (idx, row) in self.rows.iter().enumerate() {
            if row.id.is_none() && (row.delete || row.is_blank()) {
                continue;
            }

            if let Some(id) = row.id {
                let Some(stored) = existing.iter().find(|v| v.id == id && v.product_id == product_id)
                else {
                    errors.forms[idx].add("id", format!("version {id} does not belong to this product"));
                    continue;
                };
                if !seen.insert(id) {
                    errors.forms[idx].add("id", format!("version {id} submitted twice"));
                    continue;
                }
                if row.delete {
                    changes.deletes.push(id);
                    continue;
                }
                if let Err(e) = row.clean() {
                    errors.forms[idx] = e;
                    continue;
                }
                current_rows += usize::from(row.is_current);
                changes.updates.push(Version {
                    id,
                    product_id: stored.product_id,
                    number: row.number.trim().to_string(),
                    name: row.name.trim().to_string(),
                    is_current: row.is_current,
                });
            } else {
                if let Err(e) = row.clean() {
                    errors.forms[idx] = e;
                    continue;
                }
                current_rows += usize::from(row.is_current);
                changes.inserts.push(VersionDraft {
                    number: row.number.trim().to_string(),
                    name: row.name.trim().to_string(),
                    is_current: row.is_current,
                });
            }
        }

        current_rows += existing
            .iter()
            .filter(|v| v.product_id == product_id && v.is_current && !seen.contains(&v.id))
            .count();
        if current_rows > 1 {
            errors
                .non_form_errors
                .push("only one version can be marked current".to_string());
        }

        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors)
        }
    }
}
