use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use crate::model::member::Member;

/// How long a recovery token stays usable after issue.
pub const RECOVERY_WINDOW_MINS: i64 = 30;

/// 32 bytes of CSPRNG output - 256 bits of entropy per token.
const TOKEN_BYTES: usize = 32;

///
/// A single-use, time-boxed secret authorising one password reset.
///
/// Created unused; flips to used exactly once, at a successful reset. A token that is
/// used or past its expiration is permanently invalid. Issuing a new token does not
/// invalidate earlier ones - several may be outstanding for the same member.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RecoveryToken {
    pub recovery_id: String,
    pub token: String,
    pub member_email: String,
    pub expiration: bson::DateTime,
    pub used: bool,
}

impl RecoveryToken {
    ///
    /// Mint a fresh, unused token for the member, expiring a fixed window from now.
    ///
    pub fn issue(member: &Member, now: DateTime<Utc>) -> Self {
        RecoveryToken {
            recovery_id: crate::db::mongo::generate_id(),
            token: generate_token_value(),
            member_email: member.email.clone(),
            expiration: bson::DateTime::from_chrono(now + Duration::minutes(RECOVERY_WINDOW_MINS)),
            used: false,
        }
    }

    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        let expiration: DateTime<Utc> = self.expiration.into();
        expiration <= now
    }
}

///
/// A high-entropy, URL-safe token value with no padding.
///
fn generate_token_value() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::encode_config(bytes, base64::URL_SAFE_NO_PAD)
}
