//! Error taxonomy for the authentication endpoints.
//!
//! Every rejection is surfaced to the caller as a `{message, attempts_left?}`
//! JSON body with a matching HTTP status. Nothing is retried internally and
//! no error is fatal to the process.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unrecognized Client")]
    BadClient,
    #[error("Invalid Email")]
    InvalidEmail,
    #[error("User with this email already exists!")]
    AlreadyRegistered,
    #[error("No User Found")]
    NoUserFound,
    #[error("This email has been temporarily blocked. Please try after some time")]
    TemporarilyBlocked,
    #[error("OTP has expired")]
    Expired,
    #[error("Entered OTP wrong. Please Try Again.")]
    InvalidCode { attempts_left: i32 },
    #[error("OTP attempts limit exceeded. Please try after some time.")]
    AttemptsExceeded,
    #[error("OTP resends limit exceeded. Please try after some time.")]
    ResendsExceeded,
    #[error("Bad Request")]
    BadRequest,
    #[error("Invalid or expired access token")]
    InvalidToken,
    #[error("Bad Password Provided. Please follow good password practices")]
    WeakPassword,
    #[error("Internal Server Error")]
    Internal,
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_left: Option<i32>,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::BadClient
            | AuthError::AlreadyRegistered
            | AuthError::TemporarilyBlocked
            | AuthError::ResendsExceeded => StatusCode::FORBIDDEN,
            AuthError::InvalidEmail
            | AuthError::Expired
            | AuthError::InvalidCode { .. }
            | AuthError::AttemptsExceeded
            | AuthError::BadRequest
            | AuthError::WeakPassword => StatusCode::BAD_REQUEST,
            AuthError::NoUserFound => StatusCode::NOT_FOUND,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Internal | AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn attempts_left(&self) -> Option<i32> {
        match self {
            AuthError::InvalidCode { attempts_left } => Some(*attempts_left),
            AuthError::AttemptsExceeded => Some(0),
            _ => None,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Database(ref e) = self {
            tracing::error!(error = %e, "Database error while handling request");
        }

        let message = match self {
            // Do not leak database details to the caller.
            AuthError::Database(_) => "Internal Server Error".to_string(),
            ref other => other.to_string(),
        };

        let body = ErrorBody {
            message,
            attempts_left: self.attempts_left(),
        };
        (self.status(), Json(body)).into_response()
    }
}
