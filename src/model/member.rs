use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
}

///
/// A member of the team directory.
///
/// The authentication core only ever mutates the lockout fields and the password hash -
/// everything else is owned by the wider member-management system.
///
/// Invariant: locked == true implies locked_at is set. failed_attempts is only
/// meaningful while the member is unlocked.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Member {
    pub member_id: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub status: MemberStatus,
    #[serde(default)]
    pub failed_attempts: u32,
    #[serde(default)]
    pub locked: bool,
    pub locked_at: Option<bson::DateTime>,
}

impl Member {
    pub fn new(member_id: &str, email: &str, password_hash: &str, role: &str) -> Self {
        Member {
            member_id: member_id.to_string(),
            email: normalise_email(email),
            password_hash: password_hash.to_string(),
            role: role.to_string(),
            status: MemberStatus::Active,
            failed_attempts: 0,
            locked: false,
            locked_at: None,
        }
    }
}

///
/// Emails are the directory's lookup key and are matched case-insensitively, so they
/// are folded to lower case at the boundary and stored that way.
///
pub fn normalise_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emails_are_folded_to_lower_case() {
        assert_eq!(normalise_email("  Jo@Example.COM "), "jo@example.com");
    }
}
