//! Bearer token extractor for protected endpoints.

use axum::{Extension, extract::FromRequestParts, http::request::Parts};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::AppResources;
use crate::entity::{oauth2_token, oauth2_user};
use crate::error::AuthError;

/// The user resolved from a valid `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub is_active: bool,
    pub scopes: Vec<String>,
}

/// Extractor that validates the Bearer access token against the token store.
///
/// Rejects with 401 when the header is missing, malformed, or the token is
/// unknown, revoked, or expired.
pub struct OAuth2Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for OAuth2Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(resources) = Extension::<AppResources>::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthError::Internal)?;

        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::InvalidToken)?;

        let token_value = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?
            .trim();
        if token_value.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let token = oauth2_token::Entity::find()
            .filter(oauth2_token::Column::AccessToken.eq(token_value))
            .one(resources.db.as_ref())
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !token.is_valid() {
            return Err(AuthError::InvalidToken);
        }

        let user = oauth2_user::Entity::find_by_id(&token.user_id)
            .one(resources.db.as_ref())
            .await?
            .ok_or(AuthError::InvalidToken)?;

        Ok(OAuth2Auth(AuthenticatedUser {
            user_id: user.id,
            email: user.email,
            is_active: user.is_active,
            scopes: token.scopes_list(),
        }))
    }
}
