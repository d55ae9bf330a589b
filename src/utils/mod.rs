pub mod cookies;
pub mod email;
pub mod upload;
