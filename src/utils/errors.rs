use serde_json::json;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bcrypt::BcryptError;
use mongodb::bson;
use tokio::task::JoinError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ErrorCode {
    ServerStartError                = 0400,
    HashThreadingIssue              = 0401,
    UnableToReadCredentials         = 0500,
    IOError                         = 0501,
    ConfigurationError              = 0502,
    MongoDBError                    = 0503,
    InvalidBSON                     = 0504,
    InvalidJSON                     = 0505,
    HashingError                    = 0509,
    InvalidCredentials              = 2101,
    AccountLocked                   = 2102,
    TokenInvalid                    = 2103,
    UnknownSubject                  = 2105,
    RecoveryTokenInvalid            = 2200,
    RecoveryTokenExpired            = 2201,
    MemberNotFound                  = 2300,
}

impl ErrorCode {
    pub fn with_msg(&self, message: &str) -> WardenError {
        WardenError::new(*self, message)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WardenError {
    error_code: ErrorCode,
    message: String,
}

impl WardenError {
    pub fn new(error_code: ErrorCode, message: &str) -> Self {
        WardenError { error_code, message: message.to_string() }
    }

    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for WardenError {
    fn from(error: std::io::Error) -> Self {
        ErrorCode::IOError.with_msg(&format!("IO error: {}", error))
    }
}

impl From<config::ConfigError> for WardenError {
    fn from(error: config::ConfigError) -> Self {
        ErrorCode::ConfigurationError.with_msg(&format!("The service configuration is not correct: {}", error))
    }
}

impl From<serde_json::Error> for WardenError {
    fn from(error: serde_json::Error) -> Self {
        ErrorCode::InvalidJSON.with_msg(&format!("Unable to convert to json: {}", error))
    }
}

impl From<mongodb::error::Error> for WardenError {
    fn from(error: mongodb::error::Error) -> Self {
        ErrorCode::MongoDBError.with_msg(&format!("MongoDB error: {}", error))
    }
}

impl From<bson::ser::Error> for WardenError {
    fn from(error: bson::ser::Error) -> Self {
        ErrorCode::InvalidBSON.with_msg(&format!("Unable to serialise BSON: {}", error))
    }
}

impl From<bson::de::Error> for WardenError {
    fn from(error: bson::de::Error) -> Self {
        ErrorCode::InvalidBSON.with_msg(&format!("Unable to deserialise BSON: {}", error))
    }
}

impl From<JoinError> for WardenError {
    fn from(error: JoinError) -> Self {
        ErrorCode::HashThreadingIssue.with_msg(&format!("Unable to hash: {}", error))
    }
}

impl From<BcryptError> for WardenError {
    fn from(error: BcryptError) -> Self {
        ErrorCode::HashingError.with_msg(&format!("Unable to verify: {}", error))
    }
}

///
/// Collapse every bearer token failure (bad signature, malformed, wrong algorithm, ...) into a
/// single error kind so the caller can't tell which check rejected it.
///
impl From<jsonwebtoken::errors::Error> for WardenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!("Token rejected: {}", error);
        ErrorCode::TokenInvalid.with_msg("The token is not valid")
    }
}

///
/// Convert our internal error into an HTTP response.
///
/// The body carries the numeric error code so clients can react to a specific failure
/// without having to parse the message.
///
impl IntoResponse for WardenError {
    fn into_response(self) -> Response {
        use ErrorCode::*;

        let status = match &self.error_code {
            InvalidCredentials |
            AccountLocked      |
            TokenInvalid       |
            UnknownSubject => StatusCode::UNAUTHORIZED,

            RecoveryTokenInvalid |
            RecoveryTokenExpired => StatusCode::BAD_REQUEST,

            MemberNotFound => StatusCode::NOT_FOUND,

            ServerStartError        |
            HashThreadingIssue      |
            UnableToReadCredentials |
            IOError                 |
            ConfigurationError      |
            MongoDBError            |
            InvalidBSON             |
            InvalidJSON             |
            HashingError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Never leak internal failure details to the caller.
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Internal error {}: {}", self.error_code as u32, self.message);
                String::from("Internal error")
            },
            _ => self.message,
        };

        let body = Json(json!({ "error": self.error_code as u32, "message": message }));
        (status, body).into_response()
    }
}
