//! OAuth2 token entity - access and refresh token pairs.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "oauth2_token")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub access_token: String,
    #[sea_orm(unique)]
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub client_id: String,
    pub user_id: String,
    pub scope: String,
    pub access_token_expires_at: OffsetDateTime,
    pub refresh_token_expires_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub revoked_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::oauth2_user::Entity",
        from = "Column::UserId",
        to = "super::oauth2_user::Column::Id"
    )]
    User,
}

impl Related<super::oauth2_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Check if the access token has expired.
    pub fn is_access_token_expired(&self) -> bool {
        self.access_token_expires_at < OffsetDateTime::now_utc()
    }

    /// Check if the refresh token has expired (if present).
    pub fn is_refresh_token_expired(&self) -> bool {
        match self.refresh_token_expires_at {
            Some(expires_at) => expires_at < OffsetDateTime::now_utc(),
            None => true,
        }
    }

    /// Check if this token has been revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Check if this token is valid for use.
    pub fn is_valid(&self) -> bool {
        !self.is_revoked() && !self.is_access_token_expired()
    }

    /// Parse scopes from space-separated string.
    pub fn scopes_list(&self) -> Vec<String> {
        self.scope.split_whitespace().map(String::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn token(expires_in: Duration) -> Model {
        let now = OffsetDateTime::now_utc();
        Model {
            id: "tok-1".into(),
            access_token: "access".into(),
            refresh_token: Some("refresh".into()),
            token_type: "Bearer".into(),
            client_id: "boofar".into(),
            user_id: "user-1".into(),
            scope: "read write".into(),
            access_token_expires_at: now + expires_in,
            refresh_token_expires_at: Some(now + expires_in),
            created_at: now,
            revoked_at: None,
        }
    }

    #[test]
    fn live_token_is_valid() {
        let t = token(Duration::hours(1));
        assert!(t.is_valid());
        assert_eq!(t.scopes_list(), vec!["read", "write"]);
    }

    #[test]
    fn expired_token_is_invalid() {
        let t = token(Duration::seconds(-1));
        assert!(!t.is_valid());
    }

    #[test]
    fn revoked_token_is_invalid() {
        let mut t = token(Duration::hours(1));
        t.revoked_at = Some(OffsetDateTime::now_utc());
        assert!(t.is_revoked());
        assert!(!t.is_valid());
    }

    #[test]
    fn missing_refresh_token_counts_as_expired() {
        let mut t = token(Duration::hours(1));
        t.refresh_token_expires_at = None;
        assert!(t.is_refresh_token_expired());
    }
}
