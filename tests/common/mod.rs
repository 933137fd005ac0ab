#![allow(dead_code)] // Not every test binary uses every helper.

use std::sync::Arc;
use axum::Router;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use warden::db::MemberStore;
use warden::db::memory::{InMemoryMemberStore, InMemoryRecoveryStore};
use warden::db::mongo::generate_id;
use warden::model::member::Member;
use warden::services::{self, ServiceContext};
use warden::utils::config::Configuration;

///
/// Everything a test needs to talk to the service: a router wired over in-memory
/// stores, the context (for pinning the clock) and the stores themselves (for
/// seeding and inspecting members).
///
pub struct TestHarness {
    pub ctx: Arc<ServiceContext>,
    pub members: Arc<InMemoryMemberStore>,
    pub router: Router,
}

///
/// Build the service against fresh in-memory stores - same wiring as lib_main, minus
/// the database.
///
pub fn start_warden() -> TestHarness {
    let config = Configuration::from_env().expect("The test configuration is not correct");
    let members = Arc::new(InMemoryMemberStore::new());
    let recovery = Arc::new(InMemoryRecoveryStore::new());

    let ctx = Arc::new(ServiceContext::new(config, members.clone(), recovery));
    let router = services::router(ctx.clone());

    TestHarness { ctx, members, router }
}

///
/// Seed an active member with a bcrypt-hashed password. The minimum cost keeps the
/// test suite fast - verification doesn't care.
///
pub async fn seed_member(harness: &TestHarness, email: &str, password: &str) -> Member {
    let hash = bcrypt::hash(password, 4).expect("Unable to hash the seed password");
    let member = Member::new(&generate_id(), email, &hash, "USER");

    harness.members.save(&member).await.expect("Unable to seed the member");
    member
}

pub fn at(timestamp: &str) -> DateTime<Utc> {
    timestamp.parse().expect("Bad test timestamp")
}

pub async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    send(router, request).await
}

pub async fn get_with_bearer(router: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("GET").uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    send(router, builder.body(Body::empty()).unwrap()).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let body = match bytes.is_empty() {
        true => Value::Null,
        false => serde_json::from_slice(&bytes).unwrap(),
    };

    (status, body)
}

///
/// The numeric error code carried in an error response body.
///
pub fn error_code(body: &Value) -> u64 {
    body["error"].as_u64().expect("No error code in the response body")
}
