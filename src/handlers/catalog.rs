// Catalog browsing and CRUD handlers
use std::collections::BTreeMap;

use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;
use sqlx::SqlitePool;

use crate::catalog::{CatalogDb, CatalogError, Category, Item};
use crate::handlers::extractors::LoggedInUser;
use crate::session::SessionManager;
use crate::utils::responses::ResponseBuilder;
use crate::validation::{CategoryForm, ItemForm};

/// Number of items listed on the front page
const LATEST_ITEMS: i64 = 10;

async fn require_category(pool: &SqlitePool, category_id: i64) -> Result<Category, CatalogError> {
    Category::find_by_id(pool, category_id)
        .await?
        .ok_or_else(|| CatalogError::validation("category", "does not exist"))
}

async fn require_item(pool: &SqlitePool, item_id: i64) -> Result<Item, CatalogError> {
    Item::find_by_id(pool, item_id)
        .await?
        .ok_or(CatalogError::NotFound("Item"))
}

/// Front page: every category, the latest items, and the caller's name
///
/// # Errors
/// Returns an error response if the database cannot be queried
pub async fn index(
    req: HttpRequest,
    session_manager: web::Data<SessionManager>,
    catalog: web::Data<CatalogDb>,
) -> Result<HttpResponse, CatalogError> {
    let session = session_manager.load(&req);
    let categories = Category::find_all(&catalog.pool).await?;
    let latest_items = Item::find_latest(&catalog.pool, LATEST_ITEMS).await?;
    let category_names: BTreeMap<i64, &str> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    Ok(ResponseBuilder::ok().json(&json!({
        "categories": categories,
        "latest_items": latest_items,
        "category_names": category_names,
        "username": session.username(),
    })))
}

/// Items of one category
///
/// # Errors
/// Returns 404 if the category does not exist
pub async fn list_items(
    path: web::Path<i64>,
    catalog: web::Data<CatalogDb>,
) -> Result<HttpResponse, CatalogError> {
    let category_id = path.into_inner();
    let category = Category::find_by_id(&catalog.pool, category_id)
        .await?
        .ok_or(CatalogError::NotFound("Category"))?;
    let items = Item::find_by_category(&catalog.pool, category_id).await?;

    Ok(ResponseBuilder::ok().json(&json!({
        "category_name": category.name,
        "category": category,
        "items": items,
    })))
}

/// One item with its category name
///
/// # Errors
/// Returns 404 if the item does not exist
pub async fn show_item(
    path: web::Path<i64>,
    catalog: web::Data<CatalogDb>,
) -> Result<HttpResponse, CatalogError> {
    let item = require_item(&catalog.pool, path.into_inner()).await?;
    let category_name = Category::find_by_id(&catalog.pool, item.category_id)
        .await?
        .map(|c| c.name);

    Ok(ResponseBuilder::ok().json(&json!({
        "item": item,
        "category_name": category_name,
    })))
}

/// # Errors
/// Returns 400 for an invalid name and 409 if the name is taken
pub async fn create_category(
    user: LoggedInUser,
    form: web::Form<CategoryForm>,
    catalog: web::Data<CatalogDb>,
) -> Result<HttpResponse, CatalogError> {
    let name = form.validate()?;
    let duplicate = || CatalogError::Duplicate(format!("Category '{name}' already exists."));

    if Category::find_by_name(&catalog.pool, &name).await?.is_some() {
        return Err(duplicate());
    }
    let category = Category::create(&catalog.pool, &name)
        .await
        .map_err(|e| CatalogError::from_insert(e, &duplicate().to_string()))?;

    info!("{} created category {} ({})", user.username, category.name, category.id);
    Ok(ResponseBuilder::created().json(&category))
}

/// # Errors
/// Returns 400 for invalid fields or an unknown category and 409 if the title is taken
pub async fn create_item(
    user: LoggedInUser,
    form: web::Form<ItemForm>,
    catalog: web::Data<CatalogDb>,
) -> Result<HttpResponse, CatalogError> {
    let data = form.validate()?;
    require_category(&catalog.pool, data.category_id).await?;

    if Item::find_by_title(&catalog.pool, &data.title).await?.is_some() {
        return Err(CatalogError::Duplicate(format!(
            "Item '{}' already exists.",
            data.title
        )));
    }
    let item = Item::create(&catalog.pool, &data).await?;

    info!("{} created item {} ({})", user.username, item.title, item.id);
    Ok(ResponseBuilder::created().json(&item))
}

/// # Errors
/// Returns 404 for an unknown item, 400 for invalid fields and 409 if
/// another item already has the title
pub async fn edit_item(
    user: LoggedInUser,
    path: web::Path<i64>,
    form: web::Form<ItemForm>,
    catalog: web::Data<CatalogDb>,
) -> Result<HttpResponse, CatalogError> {
    let item_id = path.into_inner();
    require_item(&catalog.pool, item_id).await?;

    let data = form.validate()?;
    require_category(&catalog.pool, data.category_id).await?;

    if let Some(other) = Item::find_by_title(&catalog.pool, &data.title).await? {
        if other.id != item_id {
            return Err(CatalogError::Duplicate(format!(
                "Item '{}' already exists.",
                data.title
            )));
        }
    }
    let item = Item::update(&catalog.pool, item_id, &data)
        .await?
        .ok_or(CatalogError::NotFound("Item"))?;

    info!("{} edited item {}", user.username, item.id);
    Ok(ResponseBuilder::ok().json(&item))
}

/// # Errors
/// Returns 404 for an unknown item
pub async fn delete_item(
    user: LoggedInUser,
    path: web::Path<i64>,
    catalog: web::Data<CatalogDb>,
) -> Result<HttpResponse, CatalogError> {
    let item_id = path.into_inner();
    if Item::delete(&catalog.pool, item_id).await? == 0 {
        return Err(CatalogError::NotFound("Item"));
    }

    info!("{} deleted item {item_id}", user.username);
    Ok(ResponseBuilder::ok().json(&json!({
        "message": "Item deleted.",
        "id": item_id,
    })))
}
