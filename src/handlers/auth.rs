// Authentication handlers: login page, Google connect and logout
use crate::handlers::pages::{login_page, welcome_page};
use crate::oauth::{ConnectOutcome, HandshakeError, LoginHandshake};
use crate::session::store::{SessionStore, STATE};
use crate::session::{LoginSession, SessionManager};
use crate::utils::crypto::generate_state_token;
use crate::utils::responses::ResponseBuilder;
use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder, Result};
use log::{debug, error};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct ConnectQuery {
    pub state: Option<String>,
}

/// Attach the session cookie; a cookie that cannot be sealed is a 500
fn persist_session(
    session_manager: &SessionManager,
    session: &LoginSession,
    builder: &mut HttpResponseBuilder,
) -> Result<(), HttpResponse> {
    session_manager.persist(builder, session).map_err(|e| {
        error!("Failed to persist session: {e}");
        ResponseBuilder::internal_server_error()
            .with_error_code("session_error")
            .with_message("Failed to persist session")
            .build()
    })
}

/// Login page handler
///
/// Issues a fresh anti-forgery state nonce and stores it in the session.
///
/// # Errors
/// Never fails; session cookie errors are rendered as a 500 response
pub async fn login(
    req: HttpRequest,
    session_manager: web::Data<SessionManager>,
    handshake: web::Data<LoginHandshake>,
) -> Result<HttpResponse> {
    let mut session = session_manager.load(&req);
    let state = generate_state_token();
    session.set(STATE, state.clone());
    debug!("Issued login state nonce ({} chars)", state.len());

    let mut builder = HttpResponse::Ok();
    if let Err(response) = persist_session(&session_manager, &session, &mut builder) {
        return Ok(response);
    }
    Ok(builder
        .content_type("text/html; charset=utf-8")
        .body(login_page(&state, handshake.client_id())))
}

/// Google connect handler
///
/// The request body is the one-time authorization code.
///
/// # Errors
/// Returns a [`HandshakeError`] response when any handshake check fails
pub async fn gconnect(
    req: HttpRequest,
    query: web::Query<ConnectQuery>,
    body: web::Bytes,
    session_manager: web::Data<SessionManager>,
    handshake: web::Data<LoginHandshake>,
) -> Result<HttpResponse, HandshakeError> {
    let mut session = session_manager.load(&req);
    let code = String::from_utf8_lossy(&body);

    match handshake
        .connect(&mut session, query.state.as_deref(), code.trim())
        .await?
    {
        ConnectOutcome::AlreadyConnected => {
            Ok(ResponseBuilder::ok().json(&"Current user is already connected."))
        }
        ConnectOutcome::Connected(user) => {
            let mut builder = HttpResponse::Ok();
            if let Err(response) = persist_session(&session_manager, &session, &mut builder) {
                return Ok(response);
            }
            Ok(builder
                .content_type("text/html; charset=utf-8")
                .body(welcome_page(&user)))
        }
    }
}

/// Logout handler
///
/// Revokes the stored access token and clears the identity fields.
///
/// # Errors
/// Returns a [`HandshakeError`] response if the user is not connected or revoke fails
pub async fn logout(
    req: HttpRequest,
    session_manager: web::Data<SessionManager>,
    handshake: web::Data<LoginHandshake>,
) -> Result<HttpResponse, HandshakeError> {
    let mut session = session_manager.load(&req);
    handshake.disconnect(&mut session).await?;

    let mut builder = HttpResponse::Ok();
    if let Err(response) = persist_session(&session_manager, &session, &mut builder) {
        return Ok(response);
    }
    Ok(builder.json("Successfully disconnected. Please visit again."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::USERNAME;
    use crate::testing::constants::{TEST_CODE, TEST_STATE, TEST_USER_NAME};
    use crate::testing::mock::FakeIdentityProvider;
    use crate::testing::TestFixtures;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_login_sets_state_nonce() {
        let services = TestFixtures::services(
            Arc::new(FakeIdentityProvider::new()),
            TestFixtures::catalog_db().await,
        );
        let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let session = TestFixtures::session_from_response(&resp).unwrap();
        let state = session.get(STATE).unwrap();
        assert_eq!(state.len(), 32);

        let body = test::read_body(resp).await;
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains(&format!("/gconnect?state={state}")));
    }

    #[actix_web::test]
    async fn test_gconnect_reads_code_from_body() {
        let services = TestFixtures::services(
            Arc::new(FakeIdentityProvider::new()),
            TestFixtures::catalog_db().await,
        );
        let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri(&format!("/gconnect?state={TEST_STATE}"))
            .cookie(TestFixtures::session_cookie(&TestFixtures::pending_session()))
            .set_payload(format!("{TEST_CODE}\n"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let session = TestFixtures::session_from_response(&resp).unwrap();
        assert_eq!(session.get(USERNAME).as_deref(), Some(TEST_USER_NAME));
    }
}
