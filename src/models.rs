use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReqDto {
    #[schema(example = "Office Manager")]
    pub name: String,
    #[schema(example = "manager@company.com", format = "email")]
    pub email: String,
    #[schema(example = "s3cret-pass")]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "manager@company.com", format = "email")]
    pub email: String,
    #[schema(example = "s3cret-pass")]
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// User email
    pub sub: String,
    pub exp: usize,
    pub jti: String,
}
