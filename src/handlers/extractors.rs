use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, ResponseError};

use crate::session::SessionManager;
use crate::utils::responses::ResponseBuilder;

/// The caller's display name, present only for logged-in sessions
///
/// Extraction fails with a redirect to `/login` for anonymous callers.
#[derive(Debug, Clone)]
pub struct LoggedInUser {
    pub username: String,
}

#[derive(Debug, thiserror::Error)]
#[error("login required")]
pub struct LoginRequired;

impl ResponseError for LoginRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        ResponseBuilder::login_required()
    }
}

impl FromRequest for LoggedInUser {
    type Error = LoginRequired;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let username = req
            .app_data::<web::Data<SessionManager>>()
            .map(|manager| manager.load(req))
            .and_then(|session| session.username().map(ToString::to_string));

        ready(username.map(|username| Self { username }).ok_or(LoginRequired))
    }
}
