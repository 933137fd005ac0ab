use chrono::{DateTime, Duration, Utc};
use crate::model::member::Member;

/// Consecutive failures allowed before the account locks.
pub const MAX_ATTEMPTS: u32 = 3;

/// How long a locked account stays locked.
pub const LOCKOUT_DURATION_MINS: i64 = 15;

#[derive(Debug, PartialEq)]
pub enum LockoutCheck {
    /// The attempt may proceed. If the lock expired on this check the caller must
    /// persist the cleared fields before verifying any credentials.
    Proceed { just_unlocked: bool },
    StillLocked { remaining: Duration },
}

#[derive(Debug, PartialEq)]
pub enum FailureOutcome {
    AttemptsRemaining(u32),
    LockedNow,
}

///
/// Decide whether a login attempt against this member may proceed.
///
/// An expired lock is cleared in place - failed_attempts restarts from zero so a
/// subsequent failure doesn't immediately re-lock the account.
///
pub fn check(member: &mut Member, now: DateTime<Utc>) -> LockoutCheck {
    if !member.locked {
        return LockoutCheck::Proceed { just_unlocked: false }
    }

    let locked_at: DateTime<Utc> = member.locked_at
        .expect("a locked member must have a locked_at timestamp")
        .into();
    let unlock_at = locked_at + Duration::minutes(LOCKOUT_DURATION_MINS);

    if now >= unlock_at {
        member.locked = false;
        member.locked_at = None;
        member.failed_attempts = 0;
        return LockoutCheck::Proceed { just_unlocked: true }
    }

    LockoutCheck::StillLocked { remaining: unlock_at - now }
}

///
/// Clear every lockout field after a successful login.
///
pub fn on_success(member: &mut Member) {
    member.failed_attempts = 0;
    member.locked = false;
    member.locked_at = None;
}

///
/// Record a failed login attempt, locking the account at the threshold.
///
pub fn on_failure(member: &mut Member, now: DateTime<Utc>) -> FailureOutcome {
    member.failed_attempts += 1;

    if member.failed_attempts >= MAX_ATTEMPTS {
        member.locked = true;
        member.locked_at = Some(bson::DateTime::from_chrono(now));
        return FailureOutcome::LockedNow
    }

    FailureOutcome::AttemptsRemaining(MAX_ATTEMPTS - member.failed_attempts)
}

///
/// Remaining lockout time in whole minutes, rounded up for the user-facing message.
///
pub fn remaining_minutes(remaining: Duration) -> i64 {
    let seconds = remaining.num_seconds().max(0);
    (seconds + 59) / 60
}
