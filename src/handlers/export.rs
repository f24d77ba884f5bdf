use actix_web::{web, HttpResponse};

use crate::catalog::export::{load_export, to_xml};
use crate::catalog::{CatalogDb, CatalogError};
use crate::utils::responses::ResponseBuilder;

/// Whole catalog as JSON
///
/// # Errors
/// Returns an error response if the database cannot be queried
pub async fn catalog_json(catalog: web::Data<CatalogDb>) -> Result<HttpResponse, CatalogError> {
    let export = load_export(&catalog.pool).await?;
    Ok(ResponseBuilder::ok().json(&export))
}

/// Whole catalog as XML
///
/// # Errors
/// Returns an error response if the database cannot be queried
pub async fn catalog_xml(catalog: web::Data<CatalogDb>) -> Result<HttpResponse, CatalogError> {
    let export = load_export(&catalog.pool).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/xml")
        .body(to_xml(&export)))
}
