use std::sync::Arc;
use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use crate::model::claims::TokenKind;
use crate::services::ServiceContext;
use crate::token::ACCESS_TOKEN_TTL_SECS;
use crate::utils::errors::{ErrorCode, WardenError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

///
/// Exchange a valid refresh token for a fresh access token.
///
/// The refresh token itself is not rotated or invalidated - it stays valid until its
/// own expiry no matter how many access tokens it has minted.
///
pub async fn refresh(State(ctx): State<Arc<ServiceContext>>, Json(request): Json<RefreshRequest>)
    -> Result<Json<RefreshResponse>, WardenError> {

    let now = ctx.now();

    let subject = ctx.tokens()
        .verify_and_extract_subject(&request.refresh_token, TokenKind::Refresh, now)?;

    // The token verified cryptographically, but the member may have been removed since
    // it was issued.
    let member = ctx.members().find_by_email(&subject).await?
        .ok_or_else(|| ErrorCode::UnknownSubject
            .with_msg(&format!("No member found with e-mail: {}", subject)))?;

    let access_token = ctx.tokens().issue_access_token(&member.email, now)?;

    Ok(Json(RefreshResponse {
        access_token,
        token_type: String::from("Bearer"),
        expires_in: ACCESS_TOKEN_TTL_SECS,
    }))
}
