use axum::{Router, extract::DefaultBodyLimit, routing::post};

use crate::state::AppState;
use crate::utils::upload::FORM_OVERHEAD_BYTES;

use super::controller::{
    forgot_password, login_user, logout_user, refresh_token, register_user, reset_password,
};

pub fn init_auth_router(state: &AppState) -> Router<AppState> {
    let body_limit = state.upload_config.max_file_size + FORM_OVERHEAD_BYTES;

    Router::new()
        .route(
            "/register",
            post(register_user).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/login", post(login_user))
        .route("/refresh-token", post(refresh_token))
        .route("/logout", post(logout_user))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}
