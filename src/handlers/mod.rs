// HTTP request handlers for the item catalog
pub mod auth;
pub mod catalog;
pub mod export;
pub mod extractors;
pub mod health;
pub mod pages;

use actix_web::web;

// Re-export the main handler functions
pub use auth::{gconnect, login, logout};
pub use catalog::{create_category, create_item, delete_item, edit_item, index, list_items, show_item};
pub use export::{catalog_json, catalog_xml};
pub use extractors::LoggedInUser;
pub use health::health;

/// Register every route; app data is registered by the caller
pub fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg
        // Sign-in endpoints
        .route("/login", web::get().to(login))
        .route("/gconnect", web::post().to(gconnect))
        .route("/logout", web::get().to(logout))
        // Catalog
        .route("/", web::get().to(index))
        .route("/items/{category_id}", web::get().to(list_items))
        .route("/item/create", web::post().to(create_item))
        .route("/item/edit/{item_id}", web::post().to(edit_item))
        .route("/item/delete/{item_id}", web::post().to(delete_item))
        .route("/item/{item_id}", web::get().to(show_item))
        .route("/category/create", web::post().to(create_category))
        // Export endpoints
        .route("/catalog.json", web::get().to(catalog_json))
        .route("/catalog.xml", web::get().to(catalog_xml))
        // Health endpoint
        .route("/ping", web::get().to(health));
}
