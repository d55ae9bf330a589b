use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, put},
};

use crate::middleware::auth::authenticate;
use crate::modules::users::controller::{get_profile, update_user};
use crate::state::AppState;
use crate::utils::upload::FORM_OVERHEAD_BYTES;

pub fn init_users_router(state: AppState) -> Router<AppState> {
    let body_limit = state.upload_config.max_file_size + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/profile", get(get_profile))
        .route(
            "/update-user",
            put(update_user).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route_layer(middleware::from_fn_with_state(state, authenticate))
}
