mod forgot_password;
mod guard;
mod login;
mod me;
mod refresh;
mod reset_password;

pub use guard::AuthenticatedMember;

use std::collections::HashMap;
use std::sync::Arc;
use axum::{middleware, Router};
use axum::routing::{get, post};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use crate::db::{MemberStore, RecoveryStore};
use crate::token::{SigningKey, TokenService};
use crate::utils::clock::Clock;
use crate::utils::config::Configuration;

///
/// The context is available to every handler and gives it access to the stores, the
/// token service, config and the service clock.
///
pub struct ServiceContext {
    config: Configuration,
    members: Arc<dyn MemberStore>,
    recovery: Arc<dyn RecoveryStore>,
    tokens: TokenService,
    clock: RwLock<Clock>,

    // One async mutex per account so concurrent login attempts for the same member
    // can't interleave their read-modify-write of the lockout counters. Entries are
    // evicted when the last attempt hands its handle back.
    login_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ServiceContext {
    pub fn new(
        config: Configuration,
        members: Arc<dyn MemberStore>,
        recovery: Arc<dyn RecoveryStore>) -> Self {

        let tokens = TokenService::new(&SigningKey::new(&config.jwt_secret), &config.token_issuer);

        ServiceContext {
            config,
            members,
            recovery,
            tokens,
            clock: RwLock::new(Clock::default()),
            login_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.read().now()
    }

    ///
    /// Pin or release the service clock - used by tests to cross time windows.
    ///
    pub fn set_now(&self, now: Option<DateTime<Utc>>) {
        match now {
            Some(fixed) => self.clock.write().fix(fixed),
            None => self.clock.write().resume(),
        }
    }

    pub fn members(&self) -> &dyn MemberStore {
        self.members.as_ref()
    }

    pub fn recovery(&self) -> &dyn RecoveryStore {
        self.recovery.as_ref()
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    ///
    /// The per-account serialisation handle for login attempts against the given email.
    /// Callers must hand the handle back via release_login_lock once the attempt is over.
    ///
    pub fn login_lock(&self, email: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.login_locks.lock();
        locks.entry(email.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    ///
    /// Return a handle obtained from login_lock, evicting the map entry once no other
    /// attempt is holding one. The map is keyed by caller-supplied emails, so without
    /// eviction a scan of made-up addresses would grow it without bound.
    ///
    pub fn release_login_lock(&self, email: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.login_locks.lock();
        drop(lock);

        // Handles are only cloned out under the map lock, so the count can't change
        // between the check and the removal.
        if locks.get(email).map(Arc::strong_count) == Some(1) {
            locks.remove(email);
        }
    }
}

///
/// Build the HTTP surface. Everything under /auth/me sits behind the bearer guard;
/// the rest is reachable unauthenticated by design.
///
pub fn router(ctx: Arc<ServiceContext>) -> Router {
    Router::new()
        .route("/auth/me", get(me::get_me))
        .route_layer(middleware::from_fn_with_state(ctx.clone(), guard::require_bearer))
        .route("/auth/login", post(login::login))
        .route("/auth/refresh", post(refresh::refresh))
        .route("/auth/forgot-password", post(forgot_password::forgot_password))
        .route("/auth/reset-password", post(reset_password::reset_password))
        .with_state(ctx)
}
