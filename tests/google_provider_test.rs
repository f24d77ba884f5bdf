// GoogleIdentityProvider against an in-process stand-in for Google's endpoints
use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer};
use item_catalog::oauth::{
    ConnectOutcome, GoogleEndpoints, GoogleIdentityProvider, IdentityProvider, LoginHandshake,
    ProviderError,
};
use item_catalog::session::store::{GPLUS_ID, USERNAME};
use item_catalog::testing::TestFixtures;
use item_catalog::SessionStore;
use serde_json::json;

const ACCESS_TOKEN: &str = "ya29.fake";
// header.{"sub":"sub-1","email":"user@example.com"}.signature
const ID_TOKEN: &str =
    "eyJhbGciOiJSUzI1NiJ9.eyJzdWIiOiJzdWItMSIsImVtYWlsIjoidXNlckBleGFtcGxlLmNvbSJ9.c2ln";

async fn token(form: web::Form<HashMap<String, String>>) -> HttpResponse {
    let valid = form.get("grant_type").map(String::as_str) == Some("authorization_code")
        && form.get("code").map(String::as_str) == Some("validcode")
        && form.get("client_id").map(String::as_str) == Some("client-x")
        && form.get("client_secret").map(String::as_str) == Some("secret")
        && form.get("redirect_uri").map(String::as_str) == Some("postmessage");
    if !valid {
        return HttpResponse::BadRequest().json(json!({"error": "invalid_grant"}));
    }
    HttpResponse::Ok().json(json!({
        "access_token": ACCESS_TOKEN,
        "id_token": ID_TOKEN,
        "token_type": "Bearer",
        "expires_in": 3599,
        "scope": "openid email profile",
    }))
}

async fn tokeninfo(query: web::Query<HashMap<String, String>>) -> HttpResponse {
    if query.get("access_token").map(String::as_str) != Some(ACCESS_TOKEN) {
        return HttpResponse::BadRequest().json(json!({
            "error": "invalid_token",
            "error_description": "Invalid Value",
        }));
    }
    HttpResponse::Ok().json(json!({
        "issued_to": "client-x",
        "audience": "client-x",
        "user_id": "sub-1",
        "scope": "openid email profile",
        "expires_in": 3599,
        "email": "user@example.com",
    }))
}

async fn userinfo(query: web::Query<HashMap<String, String>>) -> HttpResponse {
    if query.get("access_token").map(String::as_str) != Some(ACCESS_TOKEN)
        || query.get("alt").map(String::as_str) != Some("json")
    {
        return HttpResponse::Unauthorized().json(json!({"error": "invalid_request"}));
    }
    HttpResponse::Ok().json(json!({
        "id": "sub-1",
        "name": "Jane Doe",
        "picture": "https://example.com/jane.png",
        "email": "user@example.com",
    }))
}

async fn revoke(query: web::Query<HashMap<String, String>>) -> HttpResponse {
    if query.get("token").map(String::as_str) == Some(ACCESS_TOKEN) {
        HttpResponse::Ok().finish()
    } else {
        HttpResponse::BadRequest().json(json!({"error": "invalid_token"}))
    }
}

/// Start the stand-in server and return a provider pointed at it
fn provider() -> GoogleIdentityProvider {
    let server = HttpServer::new(|| {
        App::new()
            .route("/token", web::post().to(token))
            .route("/tokeninfo", web::get().to(tokeninfo))
            .route("/userinfo", web::get().to(userinfo))
            .route("/revoke", web::get().to(revoke))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let base = format!("http://{}", server.addrs()[0]);
    actix_web::rt::spawn(server.run());

    GoogleIdentityProvider::new(
        "client-x".to_string(),
        Some("secret".to_string()),
        "postmessage".to_string(),
        GoogleEndpoints {
            token: format!("{base}/token"),
            tokeninfo: format!("{base}/tokeninfo"),
            userinfo: format!("{base}/userinfo"),
            revoke: format!("{base}/revoke"),
        },
    )
}

#[actix_web::test]
async fn test_exchange_code() {
    let google = provider();

    let credentials = google.exchange_code("validcode").await.unwrap();
    assert_eq!(credentials.access_token, ACCESS_TOKEN);
    assert_eq!(credentials.subject, "sub-1");
    assert_eq!(credentials.id_token.as_deref(), Some(ID_TOKEN));
    assert_eq!(credentials.expires_in, Some(3599));

    let err = google.exchange_code("wrongcode").await.unwrap_err();
    assert!(matches!(err, ProviderError::Status { status: 400, .. }));
}

#[actix_web::test]
async fn test_token_info_reports_errors_in_body() {
    let google = provider();

    let info = google.token_info(ACCESS_TOKEN).await.unwrap();
    assert!(info.error.is_none());
    assert_eq!(info.user_id.as_deref(), Some("sub-1"));
    assert_eq!(info.issued_to.as_deref(), Some("client-x"));

    let info = google.token_info("bogus").await.unwrap();
    assert_eq!(info.error.as_deref(), Some("invalid_token"));
}

#[actix_web::test]
async fn test_user_info_and_revoke() {
    let google = provider();

    let user = google.user_info(ACCESS_TOKEN).await.unwrap();
    assert_eq!(user.name, "Jane Doe");
    assert_eq!(user.email, "user@example.com");
    assert!(matches!(
        google.user_info("bogus").await.unwrap_err(),
        ProviderError::Status { status: 401, .. }
    ));

    assert_eq!(google.revoke(ACCESS_TOKEN).await.unwrap(), 200);
    assert_eq!(google.revoke("bogus").await.unwrap(), 400);
}

#[actix_web::test]
async fn test_handshake_against_google_endpoints() {
    let handshake = LoginHandshake::new(Arc::new(provider()), "client-x");
    let mut session = TestFixtures::pending_session();

    let outcome = handshake
        .connect(&mut session, Some("ABC123"), "validcode")
        .await
        .unwrap();
    assert!(matches!(outcome, ConnectOutcome::Connected(_)));
    assert_eq!(session.get(USERNAME).as_deref(), Some("Jane Doe"));
    assert_eq!(session.get(GPLUS_ID).as_deref(), Some("sub-1"));

    handshake.disconnect(&mut session).await.unwrap();
    assert!(!session.contains(USERNAME));
}

#[actix_web::test]
async fn test_unreachable_provider() {
    let google = GoogleIdentityProvider::new(
        "client-x".to_string(),
        None,
        "postmessage".to_string(),
        GoogleEndpoints {
            token: "http://127.0.0.1:9/token".to_string(),
            tokeninfo: "http://127.0.0.1:9/tokeninfo".to_string(),
            userinfo: "http://127.0.0.1:9/userinfo".to_string(),
            revoke: "http://127.0.0.1:9/revoke".to_string(),
        },
    );
    assert!(matches!(
        google.exchange_code("validcode").await.unwrap_err(),
        ProviderError::Http(_)
    ));
    assert!(google.revoke(ACCESS_TOKEN).await.is_err());
}
