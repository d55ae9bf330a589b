//! Account DTOs: registration, login and password reset.
//!
//! Request fields are optional so that a missing field is reported with the
//! API's own "fill in every field" message instead of a serde error.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::users::User;

pub const INVALID_EMAIL_MESSAGE: &str = "bu email emas tekshirib koring";

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "Ali")]
    pub user_name: Option<String>,
    #[validate(email(message = "bu email emas tekshirib koring"))]
    #[schema(example = "ali@example.com")]
    pub email: Option<String>,
    #[schema(example = "Secret#123")]
    pub password: Option<String>,
    pub tel: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "bu email emas tekshirib koring"))]
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "bu email emas tekshirib koring"))]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(email(message = "bu email emas tekshirib koring"))]
    pub email: Option<String>,
    /// Six-digit code received by email
    #[schema(example = "482913")]
    pub reset_token: Option<String>,
    pub new_password: Option<String>,
}

/// Body of register and login responses. Both tokens are also set as cookies.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenPayload {
    pub access_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserPayload {
    pub user: User,
}
