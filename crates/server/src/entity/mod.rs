//! Database entities.

pub mod oauth2_client;
pub mod oauth2_token;
pub mod oauth2_user;
pub mod signup_otp;
