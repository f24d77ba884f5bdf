//! HTTP response handling system
//!
//! This module provides a unified interface for creating HTTP responses across the application,
//! offering consistent patterns for errors, redirects, and JSON responses.

use actix_web::{http::header, HttpResponse};
use serde_json::json;

/// Unified response builder that handles all types of HTTP responses
pub struct ResponseBuilder;

impl ResponseBuilder {
    // ===============================
    // ERROR RESPONSE METHODS
    // ===============================

    /// Create a `BadRequest` (400) error response with optional customization
    #[must_use]
    pub fn bad_request() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::BadRequest)
    }

    /// Create an `Unauthorized` (401) error response with optional customization
    #[must_use]
    pub fn unauthorized() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::Unauthorized)
    }

    /// Create a `NotFound` (404) error response with optional customization
    #[must_use]
    pub fn not_found() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::NotFound)
    }

    /// Create a `Conflict` (409) error response with optional customization
    #[must_use]
    pub fn conflict() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::Conflict)
    }

    /// Create an `InternalServerError` (500) error response with optional customization
    #[must_use]
    pub fn internal_server_error() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::InternalServerError)
    }

    /// Create a `BadGateway` (502) error response with optional customization
    #[must_use]
    pub fn bad_gateway() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::BadGateway)
    }

    // ===============================
    // SUCCESS RESPONSE METHODS
    // ===============================

    /// Create a redirect response (302 Found)
    #[must_use]
    pub fn redirect(location: &str) -> RedirectBuilder {
        RedirectBuilder::new(location)
    }

    /// Create an OK response (200) with JSON content
    #[must_use]
    pub fn ok() -> JsonResponseBuilder {
        JsonResponseBuilder::new(200)
    }

    /// Create a Created response (201) with JSON content
    #[must_use]
    pub fn created() -> JsonResponseBuilder {
        JsonResponseBuilder::new(201)
    }

    // ===============================
    // CONVENIENCE METHODS
    // ===============================

    /// Common validation error: invalid field
    #[must_use]
    pub fn invalid_field(field_name: &str, reason: &str) -> HttpResponse {
        Self::bad_request()
            .with_error_code("invalid_field")
            .with_message(&format!("Invalid {field_name}: {reason}"))
            .build()
    }

    /// Redirect anonymous callers to the login page
    #[must_use]
    pub fn login_required() -> HttpResponse {
        Self::redirect("/login").build()
    }
}

// ===============================
// BUILDER TYPES
// ===============================

/// Builder for error responses with fluent interface
pub struct ErrorResponseBuilder {
    error_type: ErrorType,
    error_code: Option<String>,
    message: Option<String>,
}

/// Builder for redirect responses
pub struct RedirectBuilder {
    location: String,
}

/// Builder for JSON responses
pub struct JsonResponseBuilder {
    status_code: u16,
}

/// Supported HTTP error response types
#[derive(Clone, Copy)]
enum ErrorType {
    BadRequest,
    Unauthorized,
    NotFound,
    Conflict,
    InternalServerError,
    BadGateway,
}

// ===============================
// ERROR RESPONSE BUILDER IMPL
// ===============================

impl ErrorResponseBuilder {
    fn new(error_type: ErrorType) -> Self {
        Self {
            error_type,
            error_code: None,
            message: None,
        }
    }

    /// Set a custom error code (e.g., "`invalid_state`", "`duplicate_name`")
    #[must_use]
    pub fn with_error_code(mut self, code: &str) -> Self {
        self.error_code = Some(code.to_string());
        self
    }

    /// Set a custom error message
    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    /// Build the final `HttpResponse`
    #[must_use]
    pub fn build(self) -> HttpResponse {
        let json_body = json!({
            "error": self.error_code.clone().unwrap_or_else(|| self.default_error_code().to_string()),
            "message": self.message.clone().unwrap_or_else(|| self.default_message().to_string()),
        });

        let mut response = match self.error_type {
            ErrorType::BadRequest => HttpResponse::BadRequest(),
            ErrorType::Unauthorized => HttpResponse::Unauthorized(),
            ErrorType::NotFound => HttpResponse::NotFound(),
            ErrorType::Conflict => HttpResponse::Conflict(),
            ErrorType::InternalServerError => HttpResponse::InternalServerError(),
            ErrorType::BadGateway => HttpResponse::BadGateway(),
        };

        response
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .json(json_body)
    }

    fn default_error_code(&self) -> &'static str {
        match self.error_type {
            ErrorType::BadRequest => "invalid_request",
            ErrorType::Unauthorized => "unauthorized",
            ErrorType::NotFound => "not_found",
            ErrorType::Conflict => "conflict",
            ErrorType::InternalServerError => "server_error",
            ErrorType::BadGateway => "bad_gateway",
        }
    }

    fn default_message(&self) -> &'static str {
        match self.error_type {
            ErrorType::BadRequest => "The request is malformed or invalid",
            ErrorType::Unauthorized => "Authentication is required to access this resource",
            ErrorType::NotFound => "The requested resource does not exist",
            ErrorType::Conflict => "The resource already exists",
            ErrorType::InternalServerError => "An internal server error occurred",
            ErrorType::BadGateway => "Failed to reach the identity provider",
        }
    }
}

// ===============================
// REDIRECT BUILDER IMPL
// ===============================

impl RedirectBuilder {
    fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
        }
    }

    /// Build the final redirect response
    #[must_use]
    pub fn build(self) -> HttpResponse {
        HttpResponse::Found()
            .append_header((header::LOCATION, self.location))
            .finish()
    }
}

// ===============================
// JSON RESPONSE BUILDER IMPL
// ===============================

impl JsonResponseBuilder {
    fn new(status_code: u16) -> Self {
        Self { status_code }
    }

    /// Build the response with JSON content
    #[must_use]
    pub fn json<T: serde::Serialize>(self, data: &T) -> HttpResponse {
        let mut builder = match self.status_code {
            201 => HttpResponse::Created(),
            _ => HttpResponse::Ok(),
        };
        builder.json(data)
    }
}
