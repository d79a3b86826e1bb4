use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "admin@company.com")]
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ForgotPasswordReq {
    #[schema(example = "admin@company.com")]
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct VerifyResetQuery {
    pub email: String,
    /// Token value as delivered in the reset link.
    pub v_token: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ResetPasswordReq {
    pub email: String,
    pub token: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub admin_id: u64,
    pub sub: String, // admin email
    pub exp: usize,
    pub jti: String,
}
