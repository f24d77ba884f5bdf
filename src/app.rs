use actix_web::web;

use crate::catalog::CatalogDb;
use crate::handlers;
use crate::oauth::LoginHandshake;
use crate::session::SessionManager;

/// Shared services handed to every worker
#[derive(Clone)]
pub struct AppServices {
    pub session_manager: SessionManager,
    pub handshake: LoginHandshake,
    pub catalog: CatalogDb,
}

impl AppServices {
    /// Register app data and routes
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.session_manager.clone()))
            .app_data(web::Data::new(self.handshake.clone()))
            .app_data(web::Data::new(self.catalog.clone()));
        handlers::configure_services(cfg);
    }
}
