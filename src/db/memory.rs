use std::collections::HashMap;
use async_trait::async_trait;
use parking_lot::RwLock;
use crate::db::{MemberStore, RecoveryStore};
use crate::model::member::Member;
use crate::model::recovery::RecoveryToken;
use crate::utils::errors::WardenError;

///
/// A member directory held in process memory, keyed by email.
///
/// Used by the test suites (and handy for local tinkering) - the production wiring
/// uses the Mongo-backed stores.
///
#[derive(Default)]
pub struct InMemoryMemberStore {
    members: RwLock<HashMap<String, Member>>,
}

impl InMemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&self, email: &str) {
        self.members.write().remove(email);
    }
}

#[async_trait]
impl MemberStore for InMemoryMemberStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, WardenError> {
        Ok(self.members.read().get(email).cloned())
    }

    async fn save(&self, member: &Member) -> Result<(), WardenError> {
        self.members.write().insert(member.email.clone(), member.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRecoveryStore {
    tokens: RwLock<Vec<RecoveryToken>>,
}

impl InMemoryRecoveryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecoveryStore for InMemoryRecoveryStore {
    async fn insert(&self, token: &RecoveryToken) -> Result<(), WardenError> {
        self.tokens.write().push(token.clone());
        Ok(())
    }

    async fn find_unused(&self, token: &str) -> Result<Option<RecoveryToken>, WardenError> {
        let tokens = self.tokens.read();
        Ok(tokens.iter().find(|t| t.token == token && !t.used).cloned())
    }

    async fn mark_used(&self, token: &str) -> Result<bool, WardenError> {
        // Check-and-flip under the one write lock, mirroring the conditional update the
        // Mongo store performs.
        let mut tokens = self.tokens.write();
        match tokens.iter_mut().find(|t| t.token == token && !t.used) {
            Some(found) => {
                found.used = true;
                Ok(true)
            },
            None => Ok(false),
        }
    }
}
