mod common;

use axum::http::StatusCode;
use serde_json::json;
use warden::db::MemberStore;
use crate::common::{at, error_code, get_with_bearer, post_json, seed_member, start_warden};

const GOOD_PWD: &str = "W!bbl321";
const BAD_PWD: &str = "Hello456!";

#[tokio::test]
async fn test_a_valid_login_returns_a_token_pair() {
    let harness = start_warden();
    seed_member(&harness, "a@x.com", GOOD_PWD).await;

    let (status, body) = post_json(&harness.router, "/auth/login",
        json!({ "email": "a@x.com", "password": GOOD_PWD })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokenType"], "Bearer");
    assert_eq!(body["expiresIn"], 3600);
    assert_ne!(body["accessToken"].as_str().unwrap().len(), 0);
    assert_ne!(body["refreshToken"].as_str().unwrap().len(), 0);

    // The access token resolves back to the member on a protected route.
    let (status, body) = get_with_bearer(&harness.router, "/auth/me",
        body["accessToken"].as_str()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@x.com");
}

#[tokio::test]
async fn test_email_lookup_is_case_insensitive() {
    let harness = start_warden();
    seed_member(&harness, "a@x.com", GOOD_PWD).await;

    let (status, _) = post_json(&harness.router, "/auth/login",
        json!({ "email": "  A@X.Com ", "password": GOOD_PWD })).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_exactly_three_failures_lock_the_account() {
    let harness = start_warden();
    seed_member(&harness, "a@x.com", GOOD_PWD).await;

    // Two plain failures, counting down the remaining attempts.
    for remaining in [2, 1] {
        let (status, body) = post_json(&harness.router, "/auth/login",
            json!({ "email": "a@x.com", "password": BAD_PWD })).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&body), 2101 /* InvalidCredentials */);
        assert!(body["message"].as_str().unwrap().contains(&format!("{} of 3", remaining)));
    }

    // The third failure answers locked, not invalid-credentials.
    let (status, body) = post_json(&harness.router, "/auth/login",
        json!({ "email": "a@x.com", "password": BAD_PWD })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), 2102 /* AccountLocked */);

    // Even the correct password is refused while the lock holds.
    let (status, body) = post_json(&harness.router, "/auth/login",
        json!({ "email": "a@x.com", "password": GOOD_PWD })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), 2102);
}

#[tokio::test]
async fn test_the_lock_expires_after_fifteen_minutes() {
    let harness = start_warden();
    seed_member(&harness, "a@x.com", GOOD_PWD).await;

    // Lock the account at a fixed point in time.
    harness.ctx.set_now(Some(at("2021-08-23T09:30:00Z")));
    for _ in 0..3 {
        post_json(&harness.router, "/auth/login",
            json!({ "email": "a@x.com", "password": BAD_PWD })).await;
    }

    // One second shy of the window the account is still locked.
    harness.ctx.set_now(Some(at("2021-08-23T09:44:59Z")));
    let (status, body) = post_json(&harness.router, "/auth/login",
        json!({ "email": "a@x.com", "password": GOOD_PWD })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), 2102 /* AccountLocked */);

    // Just past the window the correct password gets in.
    harness.ctx.set_now(Some(at("2021-08-23T09:45:01Z")));
    let (status, _) = post_json(&harness.router, "/auth/login",
        json!({ "email": "a@x.com", "password": GOOD_PWD })).await;
    assert_eq!(status, StatusCode::OK);

    // And the counters were reset by the successful attempt.
    let member = harness.members.find_by_email("a@x.com").await.unwrap().unwrap();
    assert_eq!(member.failed_attempts, 0);
    assert_eq!(member.locked, false);
    assert_eq!(member.locked_at, None);
}

#[tokio::test]
async fn test_unlock_by_expiry_restarts_the_failure_count() {
    let harness = start_warden();
    seed_member(&harness, "a@x.com", GOOD_PWD).await;

    harness.ctx.set_now(Some(at("2021-08-23T09:30:00Z")));
    for _ in 0..3 {
        post_json(&harness.router, "/auth/login",
            json!({ "email": "a@x.com", "password": BAD_PWD })).await;
    }

    // After the lock expires, a failure counts as attempt 1 of 3 - not a re-lock.
    harness.ctx.set_now(Some(at("2021-08-23T09:46:00Z")));
    let (status, body) = post_json(&harness.router, "/auth/login",
        json!({ "email": "a@x.com", "password": BAD_PWD })).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), 2101 /* InvalidCredentials */);
    assert!(body["message"].as_str().unwrap().contains("2 of 3"));
}

#[tokio::test]
async fn test_unknown_email_and_locked_account_answer_the_same_status() {
    let harness = start_warden();
    seed_member(&harness, "a@x.com", GOOD_PWD).await;

    for _ in 0..3 {
        post_json(&harness.router, "/auth/login",
            json!({ "email": "a@x.com", "password": BAD_PWD })).await;
    }

    let (unknown_status, unknown_body) = post_json(&harness.router, "/auth/login",
        json!({ "email": "nobody@x.com", "password": GOOD_PWD })).await;
    let (locked_status, _) = post_json(&harness.router, "/auth/login",
        json!({ "email": "a@x.com", "password": GOOD_PWD })).await;

    // Indistinguishable in status - an attacker can't probe which emails exist.
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(locked_status, StatusCode::UNAUTHORIZED);

    // And the unknown-email message says nothing about attempts or account state.
    assert_eq!(unknown_body["message"], "Invalid email or password.");
}

#[tokio::test]
async fn test_two_prior_failures_then_a_third_locks_with_the_attempt_timestamp() {
    let harness = start_warden();
    seed_member(&harness, "a@x.com", GOOD_PWD).await;

    // Two failures already on the clock.
    let mut member = harness.members.find_by_email("a@x.com").await.unwrap().unwrap();
    member.failed_attempts = 2;
    harness.members.save(&member).await.unwrap();

    // The wrong password at T is the third failure - locked now.
    let locked_at = at("2021-08-23T09:30:00Z");
    harness.ctx.set_now(Some(locked_at));
    let (status, body) = post_json(&harness.router, "/auth/login",
        json!({ "email": "a@x.com", "password": BAD_PWD })).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), 2102 /* AccountLocked */);
    assert!(body["message"].as_str().unwrap().contains("locked after 3 failed attempts"));

    let member = harness.members.find_by_email("a@x.com").await.unwrap().unwrap();
    assert_eq!(member.failed_attempts, 3);
    assert_eq!(member.locked, true);
    assert_eq!(member.locked_at, Some(bson::DateTime::from_chrono(locked_at)));

    // A minute later even the correct password is refused, with ~14 minutes to go.
    harness.ctx.set_now(Some(at("2021-08-23T09:31:00Z")));
    let (status, body) = post_json(&harness.router, "/auth/login",
        json!({ "email": "a@x.com", "password": GOOD_PWD })).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), 2102);
    assert!(body["message"].as_str().unwrap().contains("14 minutes"));
}

#[tokio::test]
async fn test_simultaneous_failures_are_counted_one_by_one() {
    let harness = start_warden();
    seed_member(&harness, "a@x.com", GOOD_PWD).await;

    // Three wrong guesses in flight at once. The per-account serialisation must count
    // every one of them - an under-count would mean fewer than three on the record and
    // no lock.
    let mut attempts = Vec::new();
    for _ in 0..3 {
        let router = harness.router.clone();
        attempts.push(tokio::spawn(async move {
            post_json(&router, "/auth/login",
                json!({ "email": "a@x.com", "password": BAD_PWD })).await
        }));
    }

    let mut codes = Vec::new();
    for attempt in attempts {
        let (status, body) = attempt.await.unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        codes.push(error_code(&body));
    }

    // Exactly one of the three was the locking attempt, whichever ran last.
    assert_eq!(codes.iter().filter(|&&code| code == 2102 /* AccountLocked */).count(), 1);
    assert_eq!(codes.iter().filter(|&&code| code == 2101 /* InvalidCredentials */).count(), 2);

    let member = harness.members.find_by_email("a@x.com").await.unwrap().unwrap();
    assert_eq!(member.failed_attempts, 3);
    assert!(member.locked);
}

#[tokio::test]
async fn test_an_inactive_member_cannot_log_in() {
    let harness = start_warden();
    seed_member(&harness, "a@x.com", GOOD_PWD).await;

    let mut member = harness.members.find_by_email("a@x.com").await.unwrap().unwrap();
    member.status = warden::model::member::MemberStatus::Inactive;
    harness.members.save(&member).await.unwrap();

    let (status, body) = post_json(&harness.router, "/auth/login",
        json!({ "email": "a@x.com", "password": GOOD_PWD })).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), 2101 /* InvalidCredentials */);

    // Inactive rejections don't advance the lockout counter.
    let member = harness.members.find_by_email("a@x.com").await.unwrap().unwrap();
    assert_eq!(member.failed_attempts, 0);
}
