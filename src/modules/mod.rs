pub mod admin;
pub mod auth;
pub mod categories;
pub mod courses;
pub mod users;
