//! OTP record entity - one pending verification per email.
//!
//! The row is the whole state machine: a code with an expiry, an attempt
//! counter that blocks the email when exhausted, and a resend counter that
//! throttles issuance against an unexpired code. Successful verification
//! deletes the row (single use).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "signup_otp")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub client_id: String,
    pub one_time_code: String,
    pub expires_at: OffsetDateTime,
    pub blocked_until: Option<OffsetDateTime>,
    pub attempts_used: i32,
    pub resends_used: i32,
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::oauth2_client::Entity",
        from = "Column::ClientId",
        to = "super::oauth2_client::Column::Id"
    )]
    Client,
}

impl Related<super::oauth2_client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Check if the code has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= OffsetDateTime::now_utc()
    }

    /// Check if the email is currently blocked. A block timestamp in the
    /// past no longer counts.
    pub fn is_blocked(&self) -> bool {
        match self.blocked_until {
            Some(until) => until > OffsetDateTime::now_utc(),
            None => false,
        }
    }

    /// Failed attempts remaining before the email is blocked.
    pub fn attempts_left(&self, max_attempts: i32) -> i32 {
        (max_attempts - self.attempts_used).max(0)
    }

    /// Check if the resend budget for the current code is used up.
    pub fn is_resend_exhausted(&self, max_resends: i32) -> bool {
        self.resends_used >= max_resends
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn record(expires_in: Duration) -> Model {
        let now = OffsetDateTime::now_utc();
        Model {
            id: "otp-1".into(),
            email: "a@b.com".into(),
            client_id: "boofar".into(),
            one_time_code: "x7Kp2Q".into(),
            expires_at: now + expires_in,
            blocked_until: None,
            attempts_used: 0,
            resends_used: 0,
            created_at: now,
        }
    }

    #[test]
    fn fresh_record_is_live() {
        let otp = record(Duration::minutes(5));
        assert!(!otp.is_expired());
        assert!(!otp.is_blocked());
        assert_eq!(otp.attempts_left(5), 5);
        assert!(!otp.is_resend_exhausted(3));
    }

    #[test]
    fn past_expiry_is_expired() {
        let otp = record(Duration::seconds(-1));
        assert!(otp.is_expired());
    }

    #[test]
    fn block_timestamp_in_future_blocks() {
        let mut otp = record(Duration::minutes(5));
        otp.blocked_until = Some(OffsetDateTime::now_utc() + Duration::hours(2));
        assert!(otp.is_blocked());
    }

    #[test]
    fn elapsed_block_no_longer_blocks() {
        let mut otp = record(Duration::minutes(5));
        otp.blocked_until = Some(OffsetDateTime::now_utc() - Duration::seconds(1));
        assert!(!otp.is_blocked());
    }

    #[test]
    fn attempts_left_never_negative() {
        let mut otp = record(Duration::minutes(5));
        otp.attempts_used = 7;
        assert_eq!(otp.attempts_left(5), 0);
    }

    #[test]
    fn resend_budget_exhausts_at_max() {
        let mut otp = record(Duration::minutes(5));
        otp.resends_used = 2;
        assert!(!otp.is_resend_exhausted(3));
        otp.resends_used = 3;
        assert!(otp.is_resend_exhausted(3));
    }
}
