use tracing::instrument;

use kurs_auth::{
    TokenKind, create_access_token, create_refresh_token, reset_code::is_well_formed, verify_token,
};
use kurs_config::JwtConfig;
use kurs_core::AppError;
use kurs_core::password::check_password_policy;
use kurs_models::auth::{ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest};
use kurs_models::users::{User, UserRecord, UserRole};

use crate::middleware::auth::USER_NOT_FOUND_MESSAGE;
use crate::modules::users::credentials::{CredentialStore, Registration};
use crate::state::AppState;
use crate::store::DUPLICATE_USER_MESSAGE;
use crate::utils::upload::{ImageUpload, remove_file, store_image};

pub const FILL_ALL_FIELDS_MESSAGE: &str = "Maydonni to'liq to'ldiring";
pub const CREDENTIALS_REQUIRED_MESSAGE: &str = "Email va parolni kiriting";
pub const WRONG_PASSWORD_MESSAGE: &str = "Paro'l xato";
pub const REFRESH_TOKEN_MISSING_MESSAGE: &str = "Refresh token topilmadi";
pub const REFRESH_TOKEN_INVALID_MESSAGE: &str = "Yaroqsiz yoki muddati o'tgan refresh token";
pub const EMAIL_REQUIRED_MESSAGE: &str = "Email kiritish majburiy";
pub const EMAIL_NOT_FOUND_MESSAGE: &str = "Bu email bilan foydalanuvchi topilmadi";
pub const EMAIL_SEND_FAILED_MESSAGE: &str = "Email yuborishda xatolik yuz berdi";
pub const RESET_FIELDS_REQUIRED_MESSAGE: &str = "Email, kod va yangi parol kiritish majburiy";
pub const INVALID_RESET_CODE_MESSAGE: &str = "Noto‘g‘ri kod yoki kodning muddati tugagan";

/// Tokens and user produced by a successful register or login.
#[derive(Debug)]
pub struct AuthSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthService;

impl AuthService {
    /// Creates a student account. `image` is stored only once every other
    /// check has passed, and removed again if the insert fails.
    #[instrument(skip(state, dto, image))]
    pub async fn register_user(
        state: &AppState,
        dto: RegisterRequest,
        image: Option<ImageUpload>,
    ) -> Result<AuthSession, AppError> {
        let (Some(user_name), Some(email), Some(password), Some(tel)) = (
            non_blank(dto.user_name),
            non_blank(dto.email),
            dto.password.filter(|p| !p.is_empty()),
            dto.tel,
        ) else {
            return Err(AppError::bad_request(FILL_ALL_FIELDS_MESSAGE));
        };

        let credentials = CredentialStore::new(state.users.clone());
        let email = normalize_email(&email);
        if credentials.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict(DUPLICATE_USER_MESSAGE));
        }

        check_password_policy(&password)?;
        let stored_image = match image {
            Some(image) => Some(
                store_image(
                    state.files.as_ref(),
                    &image,
                    state.upload_config.max_file_size,
                )
                .await?,
            ),
            None => None,
        };

        let registration = Registration {
            user_name,
            email,
            password,
            tel,
            image: stored_image.clone(),
            role: UserRole::Student,
        };
        let record = match credentials.create(registration).await {
            Ok(record) => record,
            Err(err) => {
                if let Some(uploaded) = stored_image.as_deref() {
                    remove_file(state.files.as_ref(), uploaded).await;
                }
                return Err(err);
            }
        };

        tracing::info!(user.id = %record.id, "User registered");
        issue_session(record, &state.jwt_config)
    }

    #[instrument(skip(state, dto))]
    pub async fn login_user(state: &AppState, dto: LoginRequest) -> Result<AuthSession, AppError> {
        let (Some(email), Some(password)) =
            (non_blank(dto.email), dto.password.filter(|p| !p.is_empty()))
        else {
            return Err(AppError::bad_request(CREDENTIALS_REQUIRED_MESSAGE));
        };

        let credentials = CredentialStore::new(state.users.clone());
        let record = credentials
            .find_by_email(&normalize_email(&email))
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND_MESSAGE))?;

        if !credentials.verify(&record, &password) {
            tracing::warn!(security.event = "login_failed", user.id = %record.id);
            return Err(AppError::bad_request(WRONG_PASSWORD_MESSAGE));
        }

        tracing::info!(user.id = %record.id, "User logged in");
        issue_session(record, &state.jwt_config)
    }

    /// Issues a new access token from a refresh token. The refresh token
    /// itself is not rotated.
    #[instrument(skip(state, refresh_token))]
    pub async fn refresh_access_token(
        state: &AppState,
        refresh_token: Option<String>,
    ) -> Result<String, AppError> {
        let refresh_token =
            refresh_token.ok_or_else(|| AppError::forbidden(REFRESH_TOKEN_MISSING_MESSAGE))?;

        let claims = verify_token(&refresh_token, TokenKind::Refresh, &state.jwt_config)
            .map_err(|err| {
                tracing::warn!(security.event = "invalid_refresh_token", error = %err);
                AppError::forbidden(REFRESH_TOKEN_INVALID_MESSAGE)
            })?;
        let user_id = claims
            .user_id()
            .ok_or_else(|| AppError::forbidden(REFRESH_TOKEN_INVALID_MESSAGE))?;

        let record = state
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND_MESSAGE))?;

        create_access_token(record.id, record.role.as_str(), &state.jwt_config)
    }

    /// Persists a fresh reset code and emails it. A failed send does not
    /// roll the code back.
    #[instrument(skip(state, dto))]
    pub async fn forgot_password(
        state: &AppState,
        dto: ForgotPasswordRequest,
    ) -> Result<(), AppError> {
        let email = non_blank(dto.email)
            .map(|email| normalize_email(&email))
            .ok_or_else(|| AppError::bad_request(EMAIL_REQUIRED_MESSAGE))?;

        let credentials = CredentialStore::new(state.users.clone());
        let record = credentials
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::not_found(EMAIL_NOT_FOUND_MESSAGE))?;

        let reset_code = credentials.issue_reset_code(&record).await?;

        if let Err(err) = state
            .email
            .send_reset_code(&record.email, &reset_code.code)
            .await
        {
            tracing::error!(user.id = %record.id, error = ?err.error, "Failed to send reset code");
            return Err(AppError::server_error(EMAIL_SEND_FAILED_MESSAGE));
        }

        tracing::info!(user.id = %record.id, "Reset code sent");
        Ok(())
    }

    #[instrument(skip(state, dto))]
    pub async fn reset_password(
        state: &AppState,
        dto: ResetPasswordRequest,
    ) -> Result<(), AppError> {
        let (Some(email), Some(code), Some(new_password)) = (
            non_blank(dto.email),
            non_blank(dto.reset_token),
            dto.new_password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::bad_request(RESET_FIELDS_REQUIRED_MESSAGE));
        };

        if !is_well_formed(&code) {
            return Err(AppError::bad_request(INVALID_RESET_CODE_MESSAGE));
        }

        let credentials = CredentialStore::new(state.users.clone());
        let record = credentials
            .redeem_reset_code(&normalize_email(&email), &code, &new_password)
            .await?
            .ok_or_else(|| AppError::bad_request(INVALID_RESET_CODE_MESSAGE))?;

        tracing::info!(user.id = %record.id, "Password reset");
        Ok(())
    }
}

fn issue_session(record: UserRecord, jwt_config: &JwtConfig) -> Result<AuthSession, AppError> {
    let access_token = create_access_token(record.id, record.role.as_str(), jwt_config)?;
    let refresh_token = create_refresh_token(record.id, record.role.as_str(), jwt_config)?;

    Ok(AuthSession {
        user: User::from(record),
        access_token,
        refresh_token,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
