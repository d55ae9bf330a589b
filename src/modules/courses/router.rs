use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::middleware::auth::authenticate;
use crate::middleware::role::require_admin;
use crate::state::AppState;

use super::controller::{add_course, delete_course, enroll_course, get_courses, update_course};

pub fn init_courses_router(state: AppState) -> Router<AppState> {
    let admin_routes = Router::new()
        .route("/add-kurs", post(add_course))
        .route("/update-kurs/{id}", put(update_course))
        .route("/delete-kurs/{id}", delete(delete_course))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let student_routes = Router::new()
        .route("/{id}/enroll", post(enroll_course))
        .route_layer(middleware::from_fn_with_state(state, authenticate));

    Router::new()
        .route("/kurslar", get(get_courses))
        .merge(admin_routes)
        .merge(student_routes)
}
