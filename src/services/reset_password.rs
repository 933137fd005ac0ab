use std::sync::Arc;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use crate::services::ServiceContext;
use crate::utils::errors::{ErrorCode, WardenError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

///
/// Replace a member's password, gated by a recovery token.
///
/// The member is saved before the token is burned: a crash between the two writes
/// leaves the token usable (the caller can retry), never a burned token with an
/// unchanged password.
///
pub async fn reset_password(State(ctx): State<Arc<ServiceContext>>, Json(request): Json<ResetPasswordRequest>)
    -> Result<StatusCode, WardenError> {

    let now = ctx.now();

    // Used tokens are filtered out at lookup - a consumed token is indistinguishable
    // from one that never existed.
    let record = ctx.recovery().find_unused(&request.token).await?
        .ok_or_else(|| ErrorCode::RecoveryTokenInvalid
            .with_msg("The recovery token is invalid or has already been used"))?;

    // Expired-but-unused tokens are rejected on use, not purged - the record stays as-is.
    if record.expired(now) {
        return Err(ErrorCode::RecoveryTokenExpired
            .with_msg("The recovery token has expired, request a new one"))
    }

    let mut member = ctx.members().find_by_email(&record.member_email).await?
        .ok_or_else(|| ErrorCode::RecoveryTokenInvalid
            .with_msg("The recovery token is invalid or has already been used"))?;

    // Hashing is CPU-bound, keep it off the async worker threads.
    let new_password = request.new_password;
    let phc = tokio::task::spawn_blocking(move || bcrypt::hash(&new_password, bcrypt::DEFAULT_COST))
        .await??;

    member.password_hash = phc;
    ctx.members().save(&member).await?;

    // The conditional flip decides the winner if two resets raced on this token.
    let claimed = ctx.recovery().mark_used(&record.token).await?;
    if !claimed {
        return Err(ErrorCode::RecoveryTokenInvalid
            .with_msg("The recovery token is invalid or has already been used"))
    }

    tracing::info!("Password reset completed for member {}", member.member_id);

    Ok(StatusCode::NO_CONTENT)
}
