//! Bearer token (RFC 6750) protection for resource routes.
//!
//! This module is HTTP-framework agnostic apart from `http` types; the axum
//! wiring lives in `middleware::bearer`.

pub mod challenge;
pub mod context;
pub mod guard;
pub mod static_tokens;
pub mod token;
pub mod verifier;

pub use challenge::Challenge;
pub use context::{AuthContext, Outcome};
pub use guard::{BearerGuard, DEFAULT_REALM, Decision, GuardError};
pub use static_tokens::StaticTokenVerifier;
pub use token::{AccessToken, BEARER_TOKEN_PARAM, Extraction, RequestParams, TokenLocation};
pub use verifier::{FnVerifier, TokenVerifier, VerifierError, verifier_fn};
