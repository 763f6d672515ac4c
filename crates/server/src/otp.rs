//! The OTP state machine.
//!
//! A record moves through `ACTIVE -> (expired) -> ACTIVE-refreshed`,
//! `ACTIVE -> (max attempts) -> BLOCKED -> (block elapses) -> ACTIVE`, and
//! `ACTIVE -> (correct code) -> DELETED`. Blocked is terminal until the
//! timestamp lapses; deleted is terminal absolutely.
//!
//! Resend policy (one consistent choice, see DESIGN.md): a fresh record
//! starts with zero resends; refreshing an expired code starts a new resend
//! cycle at one; issuance against a live code increments the counter and is
//! refused once the budget was already spent, while the increment that lands
//! exactly on the limit still sends and reports the exceeded message.

use rand::{Rng, distributions::Alphanumeric, thread_rng};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter,
};
use time::{Duration, OffsetDateTime};

use crate::config::OtpConfig;
use crate::entity::{oauth2_client, signup_otp};
use crate::error::AuthError;

/// Length of the one-time code sent by email.
pub const OTP_LENGTH: usize = 6;

/// Generate a random alphanumeric one-time code.
pub fn generate_code() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(OTP_LENGTH)
        .map(char::from)
        .collect()
}

/// Syntactic email check. Kept deliberately simple: one `@`, non-empty
/// local part, dotted domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// How an issuance request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueOutcome {
    /// Code created or resent with budget to spare.
    Sent,
    /// Code was sent, but this was the last resend of the cycle.
    LastResend,
}

/// Create, refresh or resend the OTP record for (email, client).
///
/// The caller is responsible for the issuance preconditions (valid email,
/// client resolved, account checks) and for dispatching the email with the
/// returned record's code.
#[tracing::instrument(skip(db, cfg, client), fields(client_id = %client.id))]
pub async fn issue(
    db: &DatabaseConnection,
    cfg: &OtpConfig,
    email: &str,
    client: &oauth2_client::Model,
) -> Result<(signup_otp::Model, IssueOutcome), AuthError> {
    let now = OffsetDateTime::now_utc();

    let existing = signup_otp::Entity::find()
        .filter(signup_otp::Column::Email.eq(email))
        .filter(signup_otp::Column::ClientId.eq(&client.id))
        .one(db)
        .await?;

    let Some(record) = existing else {
        let fresh = signup_otp::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            email: Set(email.to_string()),
            client_id: Set(client.id.clone()),
            one_time_code: Set(generate_code()),
            expires_at: Set(now + Duration::seconds(cfg.expiry_seconds)),
            blocked_until: Set(None),
            attempts_used: Set(0),
            resends_used: Set(0),
            created_at: Set(now),
        };
        let record = fresh.insert(db).await?;
        tracing::info!(email = %record.email, "Created fresh OTP record");
        return Ok((record, IssueOutcome::Sent));
    };

    if record.is_blocked() {
        return Err(AuthError::TemporarilyBlocked);
    }

    if record.is_expired() {
        // New code, new resend cycle; the refreshed send counts as its first.
        let mut active: signup_otp::ActiveModel = record.into();
        active.one_time_code = Set(generate_code());
        active.expires_at = Set(now + Duration::seconds(cfg.expiry_seconds));
        active.resends_used = Set(1);
        let record = active.update(db).await?;
        tracing::info!(email = %record.email, "Refreshed expired OTP record");
        let outcome = outcome_for(&record, cfg);
        return Ok((record, outcome));
    }

    if record.is_resend_exhausted(cfg.max_resends) {
        return Err(AuthError::ResendsExceeded);
    }

    let resends = record.resends_used + 1;
    let mut active: signup_otp::ActiveModel = record.into();
    active.resends_used = Set(resends);
    let record = active.update(db).await?;
    tracing::info!(email = %record.email, resends_used = record.resends_used, "Resent OTP");
    let outcome = outcome_for(&record, cfg);
    Ok((record, outcome))
}

fn outcome_for(record: &signup_otp::Model, cfg: &OtpConfig) -> IssueOutcome {
    if record.is_resend_exhausted(cfg.max_resends) {
        IssueOutcome::LastResend
    } else {
        IssueOutcome::Sent
    }
}

/// Check a submitted code against the stored record.
///
/// Blocked and expired records are rejected without consuming an attempt.
/// Otherwise the attempt counter is incremented and persisted regardless of
/// the comparison outcome; the increment that exhausts the budget on a
/// mismatch blocks the email. A correct code deletes the record.
#[tracing::instrument(skip(db, cfg, client, submitted), fields(client_id = %client.id))]
pub async fn verify(
    db: &DatabaseConnection,
    cfg: &OtpConfig,
    email: &str,
    client: &oauth2_client::Model,
    submitted: &str,
) -> Result<(), AuthError> {
    let record = signup_otp::Entity::find()
        .filter(signup_otp::Column::Email.eq(email))
        .filter(signup_otp::Column::ClientId.eq(&client.id))
        .one(db)
        .await?
        .ok_or(AuthError::BadRequest)?;

    if record.is_blocked() {
        return Err(AuthError::TemporarilyBlocked);
    }

    if record.is_expired() {
        return Err(AuthError::Expired);
    }

    let matched = record.one_time_code == submitted;
    let attempts = record.attempts_used + 1;
    let exhausted = attempts >= cfg.max_attempts;

    let mut active: signup_otp::ActiveModel = record.into();
    active.attempts_used = Set(attempts);
    if !matched && exhausted {
        active.blocked_until = Set(Some(
            OffsetDateTime::now_utc() + Duration::seconds(cfg.block_seconds),
        ));
    }
    let record = active.update(db).await?;

    if matched {
        record.delete(db).await?;
        tracing::info!(email = %email, "OTP verified, record deleted");
        return Ok(());
    }

    if exhausted {
        tracing::warn!(email = %email, "OTP attempt limit reached, email blocked");
        Err(AuthError::AttemptsExceeded)
    } else {
        Err(AuthError::InvalidCode {
            attempts_left: record.attempts_left(cfg.max_attempts),
        })
    }
}
