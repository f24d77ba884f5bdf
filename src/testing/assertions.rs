//! Custom assertion helpers for common response checks

use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::test;
use serde_json::Value;

/// Assert that a response has the expected status code
///
/// # Panics
///
/// Panics if the response status does not match the expected status code.
pub fn assert_status<B>(response: &ServiceResponse<B>, expected_status: u16) {
    assert_eq!(
        response.status().as_u16(),
        expected_status,
        "Expected status {expected_status}, got {}",
        response.status()
    );
}

/// Assert that a response redirects to the login page
///
/// # Panics
///
/// Panics if the response is not a 302 to `/login`.
pub fn assert_redirects_to_login<B>(response: &ServiceResponse<B>) {
    assert_status(response, 302);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok());
    assert_eq!(location, Some("/login"), "Expected redirect to /login");
}

/// Read a JSON error body and assert its `error` code
///
/// # Panics
///
/// Panics if the body is not JSON or the error code differs.
pub async fn assert_json_error(response: ServiceResponse, expected_status: u16, expected_error: &str) -> Value {
    assert_status(&response, expected_status);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(
        body["error"], expected_error,
        "Unexpected error body: {body}"
    );
    body
}
