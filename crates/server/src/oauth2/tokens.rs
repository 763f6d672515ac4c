//! Access/refresh token issuance.

use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use utoipa::ToSchema;

use crate::config::OAuth2Config;
use crate::entity::{oauth2_client, oauth2_token, oauth2_user};
use crate::oauth2::generate_token;

/// Scope granted to tokens minted through OTP verification.
pub const TOKEN_SCOPE: &str = "read write";

/// Token pair returned on successful OTP verification.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires: i64,
    pub scope: String,
    pub token_type: String,
}

/// Mint an access/refresh token pair for `user` against `client` and persist
/// it as a single `oauth2_token` row.
pub async fn issue_token_pair(
    db: &DatabaseConnection,
    cfg: &OAuth2Config,
    user: &oauth2_user::Model,
    client: &oauth2_client::Model,
) -> Result<TokenPairResponse, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    let access_token = generate_token();
    let refresh_token = generate_token();

    let token = oauth2_token::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        access_token: Set(access_token.clone()),
        refresh_token: Set(Some(refresh_token.clone())),
        token_type: Set("Bearer".to_string()),
        client_id: Set(client.id.clone()),
        user_id: Set(user.id.clone()),
        scope: Set(TOKEN_SCOPE.to_string()),
        access_token_expires_at: Set(now + Duration::seconds(cfg.access_token_lifetime)),
        refresh_token_expires_at: Set(Some(now + Duration::seconds(cfg.refresh_token_lifetime))),
        created_at: Set(now),
        revoked_at: Set(None),
    };
    token.insert(db).await?;

    Ok(TokenPairResponse {
        access_token,
        refresh_token,
        expires: cfg.access_token_lifetime,
        scope: TOKEN_SCOPE.to_string(),
        token_type: "Bearer".to_string(),
    })
}
