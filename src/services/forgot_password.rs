use std::sync::Arc;
use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use crate::model::member::normalise_email;
use crate::model::recovery::RecoveryToken;
use crate::services::ServiceContext;
use crate::utils::errors::{ErrorCode, WardenError};

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub recovery_token: String,
}

///
/// Issue a single-use recovery token for the member.
///
/// The token value is returned to the caller for out-of-band delivery (email etc. is
/// someone else's problem). An unknown email is a 404 here - masking it is a gateway
/// policy decision, not ours.
///
pub async fn forgot_password(State(ctx): State<Arc<ServiceContext>>, Json(request): Json<ForgotPasswordRequest>)
    -> Result<Json<ForgotPasswordResponse>, WardenError> {

    let email = normalise_email(&request.email);

    let member = ctx.members().find_by_email(&email).await?
        .ok_or_else(|| ErrorCode::MemberNotFound.with_msg("No member found with the e-mail supplied"))?;

    // Earlier tokens for the same member stay valid - issuing is additive.
    let token = RecoveryToken::issue(&member, ctx.now());
    ctx.recovery().insert(&token).await?;

    tracing::info!("Issued recovery token {} for member {}", token.recovery_id, member.member_id);

    Ok(Json(ForgotPasswordResponse { recovery_token: token.token }))
}
