use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use kurs_core::AppError;

pub const INVALID_FIELD_TYPE_MESSAGE: &str = "Maydon turi noto'g'ri";

/// JSON body extractor that runs `validator` rules. Every rejection is a
/// 400 carrying one human-readable message.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let error_msg = rejection.body_text();
                tracing::debug!(error = %error_msg, "Rejected JSON body");

                if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
                    return AppError::bad_request(
                        "Missing 'Content-Type: application/json' header",
                    );
                }

                if error_msg.contains("invalid type") || error_msg.contains("invalid value") {
                    return AppError::bad_request(INVALID_FIELD_TYPE_MESSAGE);
                }

                AppError::bad_request("So'rov tanasi noto'g'ri")
            })?;

        value
            .validate()
            .map_err(|errors| AppError::validation(&errors))?;

        Ok(ValidatedJson(value))
    }
}
