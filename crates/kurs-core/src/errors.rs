use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::ValidationErrors;

/// Message returned to clients for failures whose detail must stay in the logs.
pub const SERVER_ERROR_MESSAGE: &str = "Server xatosi";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    /// Whether `error` may be shown to the client. Hidden errors are logged
    /// and replaced by [`SERVER_ERROR_MESSAGE`].
    pub expose: bool,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            expose: !status.is_server_error(),
        }
    }

    fn message<M: Into<String>>(status: StatusCode, message: M) -> Self {
        Self {
            status,
            error: anyhow!(message.into()),
            expose: true,
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    /// A 500 whose message is safe to show, e.g. a failed email delivery.
    pub fn server_error<M: Into<String>>(message: M) -> Self {
        Self::message(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request<M: Into<String>>(message: M) -> Self {
        Self::message(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized<M: Into<String>>(message: M) -> Self {
        Self::message(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden<M: Into<String>>(message: M) -> Self {
        Self::message(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found<M: Into<String>>(message: M) -> Self {
        Self::message(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict<M: Into<String>>(message: M) -> Self {
        Self::message(StatusCode::CONFLICT, message)
    }

    /// Surfaces the first human-readable validation message as a 400.
    pub fn validation(errors: &ValidationErrors) -> Self {
        Self::bad_request(first_validation_message(errors))
    }
}

fn first_validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} noto'g'ri", field))
            })
        })
        .next()
        .unwrap_or_else(|| "Noto'g'ri ma'lumot".to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.expose {
            self.error.to_string()
        } else {
            tracing::error!(status = %self.status.as_u16(), error = ?self.error, "Unhandled error");
            SERVER_ERROR_MESSAGE.to_string()
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct SampleForm {
        #[validate(length(min = 3, message = "nom juda qisqa"))]
        name: String,
    }

    #[test]
    fn test_message_constructors_are_exposed() {
        let err = AppError::conflict("Bu foydalanuvchi tizimda mavjud");
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert!(err.expose);
        assert_eq!(err.error.to_string(), "Bu foydalanuvchi tizimda mavjud");
    }

    #[test]
    fn test_internal_errors_are_hidden() {
        let err = AppError::internal(std::io::Error::other("disk on fire"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.expose);
    }

    #[test]
    fn test_server_error_message_is_exposed() {
        let err = AppError::server_error("Email yuborishda xatolik yuz berdi");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.expose);
    }

    #[test]
    fn test_blanket_from_maps_to_hidden_500() {
        let err: AppError = std::io::Error::other("boom").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.expose);
    }

    #[test]
    fn test_validation_uses_first_message() {
        let errors = SampleForm {
            name: "ab".to_string(),
        }
        .validate()
        .unwrap_err();
        let err = AppError::validation(&errors);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "nom juda qisqa");
    }
}
