use serde::{Deserialize, Serialize};

///
/// Discriminates the two bearer token flavours. An access token must never be accepted
/// where a refresh token is required, and vice versa.
///
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

///
/// The claim set carried inside every signed bearer token.
///
/// Timestamps are Unix seconds in UTC - issuance and verification always compare in
/// the same offset so there's no skew between the two.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_kind_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&TokenKind::Access).unwrap(), r#""access""#);
        assert_eq!(serde_json::to_string(&TokenKind::Refresh).unwrap(), r#""refresh""#);
    }
}
