use axum::{
    Router, middleware,
    routing::{delete, get, put},
};

use crate::middleware::auth::authenticate;
use crate::middleware::role::require_admin;
use crate::state::AppState;

use super::controller::{approve_course, delete_user, get_analytics, get_users, update_user_role};

pub fn init_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(get_users))
        .route("/users/{id}/role", put(update_user_role))
        .route("/users/{id}", delete(delete_user))
        .route("/kurs/{id}/approve", put(approve_course))
        .route("/analytics", get(get_analytics))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, authenticate))
}
