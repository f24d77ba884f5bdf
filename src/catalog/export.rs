//! Whole-catalog dump served by `/catalog.json` and `/catalog.xml`
//!
//! Categories are keyed by id, and each carries its items keyed by id. The XML
//! rendering writes numeric keys as `<key name="N" type="dict">` and tags every
//! scalar with its type, so the same tree can be read back without a schema.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;
use sqlx::SqlitePool;

use crate::catalog::models::{Category, Item};
use crate::utils::markup::escape;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemExport {
    #[serde(rename = "item-id")]
    pub id: i64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryExport {
    #[serde(rename = "category-id")]
    pub id: i64,
    #[serde(rename = "category-name")]
    pub name: String,
    pub items: BTreeMap<i64, ItemExport>,
}

pub type CatalogExport = BTreeMap<i64, CategoryExport>;

/// Group items under their categories
///
/// Items whose category no longer exists are left out.
#[must_use]
pub fn build_export(categories: &[Category], items: &[Item]) -> CatalogExport {
    let mut export: CatalogExport = categories
        .iter()
        .map(|category| {
            (
                category.id,
                CategoryExport {
                    id: category.id,
                    name: category.name.clone(),
                    items: BTreeMap::new(),
                },
            )
        })
        .collect();

    for item in items {
        if let Some(category) = export.get_mut(&item.category_id) {
            category.items.insert(
                item.id,
                ItemExport {
                    id: item.id,
                    title: item.title.clone(),
                    description: item.description.clone(),
                },
            );
        }
    }
    export
}

/// Load the whole catalog from the database
///
/// # Errors
///
/// Returns an error if either query fails
pub async fn load_export(pool: &SqlitePool) -> Result<CatalogExport, sqlx::Error> {
    let categories = Category::find_all(pool).await?;
    let items = Item::find_all(pool).await?;
    Ok(build_export(&categories, &items))
}

/// Render the catalog as XML
#[must_use]
pub fn to_xml(export: &CatalogExport) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8" ?><root>"#);
    for (id, category) in export {
        let _ = write!(xml, r#"<key name="{id}" type="dict">"#);
        push_int(&mut xml, "category-id", category.id);
        push_str(&mut xml, "category-name", &category.name);
        xml.push_str(r#"<items type="dict">"#);
        for (item_id, item) in &category.items {
            let _ = write!(xml, r#"<key name="{item_id}" type="dict">"#);
            push_int(&mut xml, "item-id", item.id);
            push_str(&mut xml, "title", &item.title);
            push_str(&mut xml, "description", &item.description);
            xml.push_str("</key>");
        }
        xml.push_str("</items></key>");
    }
    xml.push_str("</root>");
    xml
}

fn push_int(xml: &mut String, tag: &str, value: i64) {
    let _ = write!(xml, r#"<{tag} type="int">{value}</{tag}>"#);
}

fn push_str(xml: &mut String, tag: &str, value: &str) {
    let _ = write!(xml, r#"<{tag} type="str">{}</{tag}>"#, escape(value));
}
