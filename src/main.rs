#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use item_catalog::{
    AppServices, CatalogDb, CatalogSettings, GoogleIdentityProvider, LoginHandshake,
    SessionManager,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = CatalogSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    let catalog = CatalogDb::connect(&settings.database)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to open catalog database: {e}")))?;

    let provider = GoogleIdentityProvider::from_settings(&settings.google)
        .map_err(|e| std::io::Error::other(format!("Failed to configure Google sign-in: {e}")))?;
    let handshake = LoginHandshake::new(Arc::new(provider.clone()), provider.client_id());

    let services = AppServices {
        session_manager: SessionManager::from_settings(&settings),
        handshake,
        catalog,
    };

    println!("✓ Using stateless sessions with encrypted cookies");
    start_server(services, settings).await
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(services: AppServices, settings: CatalogSettings) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let cors_origins = settings.get_cors_origins();

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["Content-Type", "Accept"])
            .supports_credentials()
            .max_age(3600);

        let services = services.clone();
        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .configure(move |cfg| services.configure(cfg))
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, settings: &CatalogSettings) {
    println!(
        "Starting {} v{} on http://{bind_address}",
        settings.application.name,
        item_catalog::VERSION
    );
    println!("Database: {}", settings.database.url);
    println!();
    println!("Sign-in endpoints:");
    println!("  GET  /login             - Google sign-in page");
    println!("  POST /gconnect?state=…  - Exchange the one-time code (body: code)");
    println!("  GET  /logout            - Revoke the token and clear the session");
    println!();
    println!("Catalog endpoints:");
    println!("  GET  /                  - Categories and latest items");
    println!("  GET  /items/{{id}}        - Items in a category");
    println!("  GET  /item/{{id}}         - Item details");
    println!("  POST /category/create   - Create a category (login required)");
    println!("  POST /item/create       - Create an item (login required)");
    println!("  POST /item/edit/{{id}}    - Edit an item (login required)");
    println!("  POST /item/delete/{{id}}  - Delete an item (login required)");
    println!();
    println!("System endpoints:");
    println!("  GET  /catalog.json      - Catalog export (JSON)");
    println!("  GET  /catalog.xml       - Catalog export (XML)");
    println!("  GET  /ping              - Health check");
}
