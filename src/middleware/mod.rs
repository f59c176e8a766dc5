//! Router-level middleware.
pub mod bearer;
pub mod cors;
pub mod http;
