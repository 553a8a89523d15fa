//!
//! # Error handling
//!
//! `AppError` is the single error type the request layer deals in. Variants
//! map one-to-one onto the rejection outcomes a client may observe; anything
//! carrying internal detail (database text, hashing or signing failures)
//! keeps that detail for the log and renders a fixed generic body instead.
//! No stack trace, constraint name, or driver message ever reaches a client.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

#[derive(Debug)]
pub enum AppError {
    /// Login failed (HTTP 401). Unknown username and wrong password both map
    /// here so the two cases are indistinguishable to the caller.
    InvalidCredentials,
    /// Registration hit the store's username uniqueness constraint (HTTP 409).
    DuplicateUsername,
    /// Input validation failed (HTTP 422). The message only echoes findings
    /// about the caller's own input, never store internals.
    Validation(String),
    /// Bearer token rejected: bad signature, expired, or malformed. One
    /// variant and one response body for all three (HTTP 401).
    Unauthorized(String),
    /// Database operation failed (HTTP 500). Detail is logged, not returned.
    Database(String),
    /// Hashing, signing, or blocking-pool failure (HTTP 500). Detail is
    /// logged, not returned.
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::InvalidCredentials => write!(f, "invalid credentials"),
            AppError::DuplicateUsername => write!(f, "username already taken"),
            AppError::Validation(msg) => write!(f, "validation failed: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "{}", msg),
            AppError::Database(detail) => write!(f, "database error: {}", detail),
            AppError::Internal(detail) => write!(f, "internal error: {}", detail),
        }
    }
}

/// Converts `AppError` variants into HTTP responses.
///
/// The 500-class variants log their detail here, at the point where the
/// response is rendered, so every translated failure leaves a trace even
/// when the handler just used `?`.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::InvalidCredentials => HttpResponse::Unauthorized().json(json!({
                "error": "invalid credentials"
            })),
            AppError::DuplicateUsername => HttpResponse::Conflict().json(json!({
                "error": "username already taken"
            })),
            AppError::Validation(msg) => HttpResponse::UnprocessableEntity().json(json!({
                "error": msg
            })),
            AppError::Unauthorized(detail) => {
                log::debug!("rejected token: {}", detail);
                HttpResponse::Unauthorized().json(json!({
                    "error": "invalid token"
                }))
            }
            AppError::Database(detail) => {
                log::error!("database error: {}", detail);
                HttpResponse::InternalServerError().json(json!({
                    "error": "internal server error"
                }))
            }
            AppError::Internal(detail) => {
                log::error!("internal error: {}", detail);
                HttpResponse::InternalServerError().json(json!({
                    "error": "internal server error"
                }))
            }
        }
    }
}

/// Converts `sqlx::Error` into `AppError::Database`.
///
/// Unique-violation mapping for registration happens in the store, before
/// this blanket conversion; everything else is an internal database error.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        AppError::Database(error.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Hashing/verification errors are server faults: a wrong password is
/// `Ok(false)`, never an error, so anything surfacing here is unexpected.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("bcrypt failure: {}", error))
    }
}

/// A canceled `web::block` call (the blocking pool shut down mid-request).
impl From<actix_web::error::BlockingError> for AppError {
    fn from(error: actix_web::error::BlockingError) -> AppError {
        AppError::Internal(error.to_string())
    }
}
