use std::sync::Arc;
use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use crate::model::lockout::{self, FailureOutcome, LockoutCheck, LOCKOUT_DURATION_MINS, MAX_ATTEMPTS};
use crate::model::member::{normalise_email, MemberStatus};
use crate::services::ServiceContext;
use crate::token::ACCESS_TOKEN_TTL_SECS;
use crate::utils::errors::{ErrorCode, WardenError};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

///
/// Authenticate a member and mint an access/refresh token pair.
///
/// The whole attempt - lockout check, password verification and counter update - runs
/// under a per-account lock so parallel guesses can't under-count failures. Each call
/// is exactly one attempt; nothing is retried internally.
///
pub async fn login(State(ctx): State<Arc<ServiceContext>>, Json(request): Json<LoginRequest>)
    -> Result<Json<LoginResponse>, WardenError> {

    let email = normalise_email(&request.email);

    // The handle is returned to the context once the attempt is over, so scans of
    // made-up emails don't leave a map entry behind per address.
    let lock = ctx.login_lock(&email);
    let result = {
        let _guard = lock.lock().await;
        attempt(&ctx, &email, request.password).await
    };
    ctx.release_login_lock(&email, lock);

    result
}

async fn attempt(ctx: &ServiceContext, email: &str, password: String)
    -> Result<Json<LoginResponse>, WardenError> {

    let now = ctx.now();

    // An unknown email answers exactly like a bad password - no account-existence oracle.
    let mut member = match ctx.members().find_by_email(email).await? {
        Some(member) => member,
        None => return Err(invalid_credentials(None)),
    };

    // The lockout gate comes before password verification, so a locked account never
    // learns whether the supplied password was correct.
    match lockout::check(&mut member, now) {
        LockoutCheck::StillLocked { remaining } => {
            return Err(ErrorCode::AccountLocked.with_msg(&format!(
                "Account locked due to repeated failed attempts. Try again in {} minutes.",
                lockout::remaining_minutes(remaining))))
        },
        LockoutCheck::Proceed { just_unlocked } => {
            // Persist the cleared fields straight away, so a failure below counts from
            // zero rather than from the stale pre-lock total.
            if just_unlocked {
                ctx.members().save(&member).await?;
            }
        },
    }

    if member.status == MemberStatus::Inactive {
        tracing::debug!("Login rejected for inactive member {}", member.member_id);
        return Err(invalid_credentials(None))
    }

    // Password verification is CPU-bound, keep it off the async worker threads.
    let password_hash = member.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
        .await??;

    if valid {
        lockout::on_success(&mut member);
        ctx.members().save(&member).await?;

        let access_token = ctx.tokens().issue_access_token(&member.email, now)?;
        let refresh_token = ctx.tokens().issue_refresh_token(&member.email, now)?;

        return Ok(Json(LoginResponse {
            access_token,
            refresh_token,
            token_type: String::from("Bearer"),
            expires_in: ACCESS_TOKEN_TTL_SECS,
        }))
    }

    match lockout::on_failure(&mut member, now) {
        FailureOutcome::LockedNow => {
            ctx.members().save(&member).await?;
            tracing::warn!("Member {} locked after {} failed attempts", member.member_id, MAX_ATTEMPTS);

            Err(ErrorCode::AccountLocked.with_msg(&format!(
                "Your account has been locked after {} failed attempts. Try again in {} minutes.",
                MAX_ATTEMPTS, LOCKOUT_DURATION_MINS)))
        },
        FailureOutcome::AttemptsRemaining(remaining) => {
            ctx.members().save(&member).await?;
            Err(invalid_credentials(Some(remaining)))
        },
    }
}

fn invalid_credentials(attempts_remaining: Option<u32>) -> WardenError {
    match attempts_remaining {
        Some(remaining) => ErrorCode::InvalidCredentials.with_msg(&format!(
            "Invalid email or password. {} of {} attempts remaining.", remaining, MAX_ATTEMPTS)),
        None => ErrorCode::InvalidCredentials.with_msg("Invalid email or password."),
    }
}
