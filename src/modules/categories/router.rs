use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::middleware::auth::authenticate;
use crate::middleware::role::require_admin;
use crate::state::AppState;

use super::controller::{add_category, delete_category, get_categories, update_category};

pub fn init_categories_router(state: AppState) -> Router<AppState> {
    let admin_routes = Router::new()
        .route("/add-category", post(add_category))
        .route("/update-category/{id}", put(update_category))
        .route("/delete-category/{id}", delete(delete_category))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, authenticate));

    Router::new()
        .route("/categories", get(get_categories))
        .merge(admin_routes)
}
