//! Periodic garbage collection of dead rows.
//!
//! OTP records that verified successfully delete themselves; everything else
//! is left to expire and is swept here, together with tokens that can never
//! be used again.

use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter};
use time::OffsetDateTime;
use tokio::time::{Duration, interval};

use crate::AppResources;
use crate::entity::{oauth2_token, signup_otp};

/// How often the sweep runs.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Delete expired, unblocked OTP rows and dead token rows.
///
/// Blocked OTP rows are kept even when expired so the block window keeps
/// rejecting requests until it lapses.
///
/// Returns (otp rows deleted, token rows deleted).
#[tracing::instrument(skip(db))]
pub async fn run_cleanup(db: &DatabaseConnection) -> Result<(u64, u64), sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();

    let otps = signup_otp::Entity::delete_many()
        .filter(signup_otp::Column::ExpiresAt.lte(now))
        .filter(
            Condition::any()
                .add(signup_otp::Column::BlockedUntil.is_null())
                .add(signup_otp::Column::BlockedUntil.lte(now)),
        )
        .exec(db)
        .await?;

    let tokens = oauth2_token::Entity::delete_many()
        .filter(
            Condition::any()
                .add(oauth2_token::Column::RevokedAt.is_not_null())
                .add(
                    Condition::all()
                        .add(oauth2_token::Column::AccessTokenExpiresAt.lte(now))
                        .add(
                            Condition::any()
                                .add(oauth2_token::Column::RefreshTokenExpiresAt.is_null())
                                .add(oauth2_token::Column::RefreshTokenExpiresAt.lte(now)),
                        ),
                ),
        )
        .exec(db)
        .await?;

    Ok((otps.rows_affected, tokens.rows_affected))
}

/// Spawn the hourly cleanup task.
pub fn spawn_cleanup_task(resources: AppResources) {
    tokio::spawn(async move {
        let mut interval = interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match run_cleanup(resources.db.as_ref()).await {
                Ok((otps, tokens)) if otps > 0 || tokens > 0 => {
                    tracing::info!(otps, tokens, "Cleanup swept dead rows");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Cleanup sweep failed");
                }
            }
        }
    });
}
