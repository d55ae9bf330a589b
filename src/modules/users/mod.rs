pub mod controller;
pub mod credentials;
pub mod router;
pub mod service;
