//! Form validation for the catalog endpoints
//!
//! Only presence and length are checked; whether a referenced category exists
//! is up to the handler, which has the database at hand.

use serde::Deserialize;

use crate::catalog::{CatalogError, ItemData};

pub const CATEGORY_NAME_MAX: usize = 30;
pub const ITEM_TITLE_MAX: usize = 30;
pub const ITEM_DESCRIPTION_MAX: usize = 300;

/// Form body of `POST /category/create`
#[derive(Debug, Default, Deserialize)]
pub struct CategoryForm {
    pub name: Option<String>,
}

/// Form body of `POST /item/create` and `POST /item/edit/{id}`
#[derive(Debug, Default, Deserialize)]
pub struct ItemForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl CategoryForm {
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] if the name is missing or too long
    pub fn validate(&self) -> Result<String, CatalogError> {
        extract_required_string("name", self.name.as_deref(), CATEGORY_NAME_MAX)
    }
}

impl ItemForm {
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] for the first field that is missing,
    /// too long, or (for `category`) not an id
    pub fn validate(&self) -> Result<ItemData, CatalogError> {
        let title = extract_required_string("title", self.title.as_deref(), ITEM_TITLE_MAX)?;
        let description = extract_required_string(
            "description",
            self.description.as_deref(),
            ITEM_DESCRIPTION_MAX,
        )?;
        let category_id = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| CatalogError::validation("category", "is required"))?
            .parse::<i64>()
            .map_err(|_| CatalogError::validation("category", "must be a category id"))?;

        Ok(ItemData {
            title,
            description,
            category_id,
        })
    }
}

/// Extract a required, length-limited text field
///
/// Surrounding whitespace is trimmed; the limit counts characters, not bytes.
///
/// # Errors
///
/// Returns [`CatalogError::Validation`] if the field is absent, blank, or longer than `max_len`
pub fn extract_required_string(
    field: &'static str,
    value: Option<&str>,
    max_len: usize,
) -> Result<String, CatalogError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CatalogError::validation(field, "is required"))?;

    if value.chars().count() > max_len {
        return Err(CatalogError::validation(
            field,
            format!("must be at most {max_len} characters"),
        ));
    }
    Ok(value.to_string())
}
