use std::sync::Arc;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use crate::model::claims::TokenKind;
use crate::model::member::Member;
use crate::services::ServiceContext;
use crate::utils::errors::{ErrorCode, WardenError};

///
/// The identity resolved by the bearer guard, attached to the request extensions for
/// downstream handlers.
///
#[derive(Clone, Debug)]
pub struct AuthenticatedMember(pub Member);

///
/// Per-request bearer-token filter for protected routes.
///
/// Extracts the Authorization header, verifies the token as an access token against
/// the service clock, resolves the member from the directory and attaches it to the
/// request. Anything short of that is a 401 and no identity reaches the handler.
///
pub async fn require_bearer(
    State(ctx): State<Arc<ServiceContext>>,
    mut request: Request,
    next: Next) -> Result<Response, WardenError> {

    let header = request.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ErrorCode::TokenInvalid.with_msg("Missing Authorization header"))?;

    let token = header.strip_prefix("Bearer ")
        .ok_or_else(|| ErrorCode::TokenInvalid.with_msg("Invalid Authorization header format"))?;

    // Reject empty bearer values before they reach the token codec.
    if token.is_empty() {
        return Err(ErrorCode::TokenInvalid.with_msg("The token is not valid"))
    }

    let subject = ctx.tokens().verify_and_extract_subject(token, TokenKind::Access, ctx.now())?;

    let member = ctx.members().find_by_email(&subject).await?
        .ok_or_else(|| ErrorCode::TokenInvalid.with_msg("The token is not valid"))?;

    request.extensions_mut().insert(AuthenticatedMember(member));

    Ok(next.run(request).await)
}
