use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use crate::model::claims::{Claims, TokenKind};
use crate::utils::errors::{ErrorCode, WardenError};

/// Access tokens authorise API calls for a short window.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Refresh tokens exist solely to mint new access tokens.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

///
/// The process-wide symmetric signing key, loaded from configuration at start-up and
/// handed to the token service on construction. Rotating it invalidates every
/// outstanding token.
///
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn new(secret: &str) -> Self {
        SigningKey(secret.as_bytes().to_vec())
    }
}

///
/// Signs and verifies the compact, self-contained bearer tokens the service issues.
///
/// Tokens are stateless - nothing is persisted, validity rests entirely on the HMAC
/// signature and the claims inside the token.
///
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl TokenService {
    pub fn new(key: &SigningKey, issuer: &str) -> Self {
        TokenService {
            encoding_key: EncodingKey::from_secret(&key.0),
            decoding_key: DecodingKey::from_secret(&key.0),
            issuer: issuer.to_string(),
        }
    }

    pub fn issue_access_token(&self, subject: &str, now: DateTime<Utc>) -> Result<String, WardenError> {
        self.issue(subject, TokenKind::Access, now, now + Duration::seconds(ACCESS_TOKEN_TTL_SECS))
    }

    pub fn issue_refresh_token(&self, subject: &str, now: DateTime<Utc>) -> Result<String, WardenError> {
        self.issue(subject, TokenKind::Refresh, now, now + Duration::days(REFRESH_TOKEN_TTL_DAYS))
    }

    fn issue(&self, subject: &str, kind: TokenKind, now: DateTime<Utc>, expires_at: DateTime<Utc>)
        -> Result<String, WardenError> {

        let claims = Claims {
            iss: self.issuer.clone(),
            sub: subject.to_string(),
            kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    ///
    /// Verify the signature, issuer, type claim and expiry of a token and return its
    /// subject.
    ///
    /// Every failure collapses into the same error kind - callers (and attackers)
    /// don't get to learn which check rejected the token.
    ///
    pub fn verify_and_extract_subject(&self, token: &str, expected: TokenKind, now: DateTime<Utc>)
        -> Result<String, WardenError> {

        // The library checks exp against the wall clock, so expiry is checked manually
        // below against the service clock instead.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = Default::default();

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        let claims = data.claims;

        if claims.iss != self.issuer {
            tracing::debug!("Token rejected: unexpected issuer");
            return Err(ErrorCode::TokenInvalid.with_msg("The token is not valid"))
        }

        if claims.kind != expected {
            tracing::debug!("Token rejected: wrong token type");
            return Err(ErrorCode::TokenInvalid.with_msg("The token is not valid"))
        }

        // Strictly before - a token presented at its exact expiry instant is dead.
        if now.timestamp() >= claims.exp {
            tracing::debug!("Token rejected: expired");
            return Err(ErrorCode::TokenInvalid.with_msg("The token is not valid"))
        }

        Ok(claims.sub)
    }
}
