//! OTP issuance and verification endpoints.

use axum::{Extension, Json};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::AppResources;
use crate::email_templates::{PasswordResetOtpEmailTemplate, SignupOtpEmailTemplate};
use crate::entity::oauth2_client;
use crate::error::{AuthError, ErrorBody};
use crate::mail;
use crate::oauth2::{AUTH_TAG, IdentityService, TokenPairResponse, issue_token_pair};
use crate::otp;

/// Message returned when an OTP was dispatched with resend budget to spare.
pub const OTP_SUCCESS: &str = "OTP Sent Successfully.";

/// Body of a send-OTP request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendOtpRequest {
    /// OAuth2 client the caller belongs to.
    pub client_id: String,
    pub email: String,
}

/// Generic message envelope for endpoints that only report an outcome.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Which flow the submitted code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationContext {
    Signup,
    PasswordReset,
}

/// Body of a verify-OTP request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    pub client_id: String,
    pub email: String,
    /// The one-time code received by email.
    pub otp: String,
    /// Defaults to `signup` when absent.
    pub context: Option<VerificationContext>,
}

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(signup_send_otp))
        .routes(routes!(password_reset_send_otp))
        .routes(routes!(verify_otp))
}

async fn find_client(
    resources: &AppResources,
    client_id: &str,
) -> Result<oauth2_client::Model, AuthError> {
    oauth2_client::Entity::find_by_id(client_id)
        .one(resources.db.as_ref())
        .await?
        .ok_or(AuthError::BadClient)
}

fn issuance_message(outcome: otp::IssueOutcome) -> String {
    match outcome {
        otp::IssueOutcome::Sent => OTP_SUCCESS.to_string(),
        otp::IssueOutcome::LastResend => {
            AuthError::ResendsExceeded.to_string()
        }
    }
}

/// Send a sign-up verification code.
#[tracing::instrument(skip(resources, payload), fields(client_id = %payload.client_id))]
#[utoipa::path(
    post,
    path = "/signup/send-otp",
    tag = AUTH_TAG,
    operation_id = "Send Signup OTP",
    summary = "Email a sign-up verification code",
    description = "Generates a one-time code for the given email and client and dispatches it by \
                   email. Resending against a live code consumes the resend budget; an expired \
                   code is silently refreshed.",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "OTP dispatched", body = MessageResponse),
        (status = 400, description = "Invalid email address", body = ErrorBody),
        (status = 403, description = "Unknown client, registered email, blocked email or exhausted resends", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn signup_send_otp(
    Extension(resources): Extension<AppResources>,
    Json(payload): Json<SendOtpRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let client = find_client(&resources, &payload.client_id).await?;

    if !otp::is_valid_email(&payload.email) {
        return Err(AuthError::InvalidEmail);
    }

    let identity = IdentityService::new(resources.db.clone());
    if let Some(user) = identity.find_user(&payload.email).await? {
        if user.is_active {
            return Err(AuthError::AlreadyRegistered);
        }
    }

    let (record, outcome) =
        otp::issue(resources.db.as_ref(), &resources.config.otp, &payload.email, &client).await?;

    let template = SignupOtpEmailTemplate {
        code: record.one_time_code,
    };
    mail::spawn_send(
        &resources,
        payload.email,
        SignupOtpEmailTemplate::SUBJECT,
        template.render_text(),
    );

    Ok(Json(MessageResponse {
        message: issuance_message(outcome),
    }))
}

/// Send a password-reset verification code.
#[tracing::instrument(skip(resources, payload), fields(client_id = %payload.client_id))]
#[utoipa::path(
    post,
    path = "/password-reset/send-otp",
    tag = AUTH_TAG,
    operation_id = "Send Password Reset OTP",
    summary = "Email a password-reset verification code",
    description = "Same OTP lifecycle as the sign-up flow, but the email must belong to an \
                   existing account.",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "OTP dispatched", body = MessageResponse),
        (status = 400, description = "Invalid email address", body = ErrorBody),
        (status = 403, description = "Unknown client, blocked email or exhausted resends", body = ErrorBody),
        (status = 404, description = "No account with this email", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn password_reset_send_otp(
    Extension(resources): Extension<AppResources>,
    Json(payload): Json<SendOtpRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let client = find_client(&resources, &payload.client_id).await?;

    if !otp::is_valid_email(&payload.email) {
        return Err(AuthError::InvalidEmail);
    }

    let identity = IdentityService::new(resources.db.clone());
    if identity.find_user(&payload.email).await?.is_none() {
        return Err(AuthError::NoUserFound);
    }

    let (record, outcome) =
        otp::issue(resources.db.as_ref(), &resources.config.otp, &payload.email, &client).await?;

    let template = PasswordResetOtpEmailTemplate {
        code: record.one_time_code,
    };
    mail::spawn_send(
        &resources,
        payload.email,
        PasswordResetOtpEmailTemplate::SUBJECT,
        template.render_text(),
    );

    Ok(Json(MessageResponse {
        message: issuance_message(outcome),
    }))
}

/// Verify a code and mint a token pair.
#[tracing::instrument(skip(resources, payload), fields(client_id = %payload.client_id))]
#[utoipa::path(
    post,
    path = "/verify-otp",
    tag = AUTH_TAG,
    operation_id = "Verify OTP",
    summary = "Exchange a one-time code for an access/refresh token pair",
    description = "Checks the submitted code against the stored record. A correct code consumes \
                   the record, resolves the account (creating and activating it for sign-up) and \
                   returns OAuth2 tokens. A wrong code consumes one attempt; exhausting the \
                   attempt budget blocks the email for a cool-down window.",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Code accepted, tokens issued", body = TokenPairResponse),
        (status = 400, description = "No pending code, expired code or wrong code", body = ErrorBody),
        (status = 403, description = "Unknown client or blocked email", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn verify_otp(
    Extension(resources): Extension<AppResources>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<TokenPairResponse>, AuthError> {
    let client = find_client(&resources, &payload.client_id).await?;

    otp::verify(
        resources.db.as_ref(),
        &resources.config.otp,
        &payload.email,
        &client,
        &payload.otp,
    )
    .await?;

    let context = payload.context.unwrap_or(VerificationContext::Signup);
    let identity = IdentityService::new(resources.db.clone());
    let user = identity
        .get_or_create_user(&payload.email, context == VerificationContext::Signup)
        .await?;
    let user = identity.update_last_login(user).await?;

    let tokens =
        issue_token_pair(resources.db.as_ref(), &resources.config.oauth2, &user, &client).await?;

    Ok(Json(tokens))
}
