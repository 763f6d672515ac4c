//! OTP-based authentication service.
//!
//! Implements the one-time-password lifecycle used for sign-up and
//! password-reset verification: code issuance with resend throttling,
//! verification with attempt throttling and temporary email blocking,
//! and OAuth2 access/refresh token issuance on success.

use std::sync::Arc;

use lettre::{AsyncSmtpTransport, Tokio1Executor};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

pub mod api;
pub mod cleanup;
pub mod config;
pub mod email_templates;
pub mod entity;
pub mod error;
pub mod mail;
pub mod oauth2;
pub mod otp;

#[derive(Clone)]
pub struct AppResources {
    pub db: Arc<DatabaseConnection>,
    pub mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    pub config: Arc<AppConfig>,
}
