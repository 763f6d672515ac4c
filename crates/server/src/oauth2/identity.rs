//! User account resolution.

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use std::sync::Arc;
use time::OffsetDateTime;

use crate::entity::oauth2_user;

/// Wraps the user store behind the operations the OTP flow needs: lookup by
/// email, create/activate, password update, login stamping.
#[derive(Clone)]
pub struct IdentityService {
    db: Arc<DatabaseConnection>,
}

impl IdentityService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by email.
    pub async fn find_user(&self, email: &str) -> Result<Option<oauth2_user::Model>, sea_orm::DbErr> {
        oauth2_user::Entity::find()
            .filter(oauth2_user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
    }

    /// Resolve a user by email, creating the account when missing.
    ///
    /// `activate` marks the account active; a found-but-inactive account is
    /// activated in place. Used by sign-up verification. Password-reset
    /// verification passes `activate = false` and leaves the flag untouched.
    pub async fn get_or_create_user(
        &self,
        email: &str,
        activate: bool,
    ) -> Result<oauth2_user::Model, sea_orm::DbErr> {
        if let Some(user) = self.find_user(email).await? {
            if activate && !user.is_active {
                let mut active: oauth2_user::ActiveModel = user.into();
                active.is_active = Set(true);
                return active.update(self.db.as_ref()).await;
            }
            return Ok(user);
        }

        let user = oauth2_user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            email: Set(email.to_string()),
            is_active: Set(activate),
            password_hash: Set(None),
            created_at: Set(OffsetDateTime::now_utc()),
            last_login_at: Set(None),
        };
        user.insert(self.db.as_ref()).await
    }

    /// Store a new password hash on the user.
    pub async fn set_password_hash(
        &self,
        user: oauth2_user::Model,
        password_hash: String,
    ) -> Result<oauth2_user::Model, sea_orm::DbErr> {
        let mut active: oauth2_user::ActiveModel = user.into();
        active.password_hash = Set(Some(password_hash));
        active.update(self.db.as_ref()).await
    }

    /// Update the user's last login time.
    pub async fn update_last_login(
        &self,
        user: oauth2_user::Model,
    ) -> Result<oauth2_user::Model, sea_orm::DbErr> {
        let mut active: oauth2_user::ActiveModel = user.into();
        active.last_login_at = Set(Some(OffsetDateTime::now_utc()));
        active.update(self.db.as_ref()).await
    }
}
