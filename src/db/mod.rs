pub mod member;
pub mod memory;
pub mod mongo;
pub mod recovery;

use async_trait::async_trait;
use crate::model::member::Member;
use crate::model::recovery::RecoveryToken;
use crate::utils::errors::WardenError;

///
/// The member directory the core authenticates against.
///
/// Lookup is by (normalised) email. The core only writes back lockout fields and the
/// password hash - it never creates or removes members.
///
#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Member>, WardenError>;
    async fn save(&self, member: &Member) -> Result<(), WardenError>;
}

///
/// Persistence for recovery tokens.
///
#[async_trait]
pub trait RecoveryStore: Send + Sync {
    async fn insert(&self, token: &RecoveryToken) -> Result<(), WardenError>;

    /// Look up a token by its exact value, ignoring tokens that are already used.
    async fn find_unused(&self, token: &str) -> Result<Option<RecoveryToken>, WardenError>;

    ///
    /// Flip the used flag on the token, as a single conditional update - two callers
    /// racing on the same token value see exactly one true.
    ///
    async fn mark_used(&self, token: &str) -> Result<bool, WardenError>;
}
