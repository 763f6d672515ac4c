//! Account endpoints: existence probe and password change.

use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::AppResources;
use crate::api::auth::OAuth2Auth;
use crate::api::otp::MessageResponse;
use crate::error::{AuthError, ErrorBody};
use crate::oauth2::{IdentityService, AUTH_TAG, password};

/// Body of a check-user request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckUserRequest {
    pub email: String,
}

/// Response of a successful check-user request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckUserResponse {
    pub exists: bool,
}

/// Body of a change-password request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(check_user))
        .routes(routes!(change_password))
}

/// Probe whether an account exists for an email.
#[tracing::instrument(skip(resources, payload))]
#[utoipa::path(
    post,
    path = "/check-user",
    tag = AUTH_TAG,
    operation_id = "Check User",
    summary = "Probe whether an account exists for an email",
    request_body = CheckUserRequest,
    responses(
        (status = 200, description = "Account exists", body = CheckUserResponse),
        (status = 404, description = "No account with this email", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn check_user(
    Extension(resources): Extension<AppResources>,
    Json(payload): Json<CheckUserRequest>,
) -> Result<Json<CheckUserResponse>, AuthError> {
    let identity = IdentityService::new(resources.db.clone());
    match identity.find_user(&payload.email).await? {
        Some(_) => Ok(Json(CheckUserResponse { exists: true })),
        None => Err(AuthError::NoUserFound),
    }
}

/// Set a new password for the authenticated user.
#[tracing::instrument(skip_all, fields(user = %auth.0.email))]
#[utoipa::path(
    post,
    path = "/change-password",
    tag = AUTH_TAG,
    operation_id = "Change Password",
    summary = "Set a new password for the authenticated user",
    description = "Requires the Bearer access token obtained from OTP verification. The new \
                   password replaces any previous one.",
    request_body = ChangePasswordRequest,
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Password does not meet requirements", body = ErrorBody),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn change_password(
    auth: OAuth2Auth,
    Extension(resources): Extension<AppResources>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    if payload.new_password.len() < password::MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword);
    }

    let hash = password::hash_password(&payload.new_password).map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        AuthError::Internal
    })?;

    let identity = IdentityService::new(resources.db.clone());
    let user = identity
        .find_user(&auth.0.email)
        .await?
        .ok_or(AuthError::NoUserFound)?;
    identity.set_password_hash(user, hash).await?;

    Ok(Json(MessageResponse {
        message: "Password Reset Successfully".to_string(),
    }))
}
