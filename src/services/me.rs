use axum::{Extension, Json};
use serde::Serialize;
use crate::services::guard::AuthenticatedMember;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub member_id: String,
    pub email: String,
    pub role: String,
}

///
/// Return the identity the bearer guard resolved for this request.
///
pub async fn get_me(Extension(identity): Extension<AuthenticatedMember>) -> Json<MeResponse> {
    let member = identity.0;

    Json(MeResponse {
        member_id: member.member_id,
        email: member.email,
        role: member.role,
    })
}
