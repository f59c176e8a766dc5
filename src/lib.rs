//! Bearer token (RFC 6750) guard for protected resources, with an axum
//! middleware and a small demo resource server.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
