//! Bearer guard: inspect → (pass through | reject | verify → respond).

use std::sync::Arc;

use axum::http::HeaderMap;
use thiserror::Error;

use super::challenge::Challenge;
use super::context::AuthContext;
use super::token::{AccessToken, Extraction, RequestParams, extract};
use super::verifier::{self, TokenVerifier, VerifierError};

/// Realm used when none is configured.
pub const DEFAULT_REALM: &str = "Bearer";

#[derive(Debug, Error)]
pub enum GuardError {
    #[error(transparent)]
    Verifier(#[from] VerifierError),
}

/// What the embedding layer should do with the request.
#[derive(Debug)]
pub enum Decision {
    /// No bearer credentials: call the handler without a token.
    PassThrough,
    /// Token accepted: call the handler with the token attached.
    Authenticated(AccessToken),
    /// Respond with the challenge; the handler is not called.
    Rejected(Challenge),
}

/// Immutable guard configuration. Cheap to clone and safe to share.
#[derive(Clone)]
pub struct BearerGuard {
    realm: Arc<str>,
    verifier: Arc<dyn TokenVerifier>,
}

impl std::fmt::Debug for BearerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerGuard")
            .field("realm", &self.realm)
            .finish_non_exhaustive()
    }
}

impl BearerGuard {
    pub fn new(verifier: impl TokenVerifier) -> Self {
        Self::from_arc(Arc::new(verifier))
    }

    pub fn from_arc(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            realm: Arc::from(DEFAULT_REALM),
            verifier,
        }
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        let realm: String = realm.into();
        self.realm = Arc::from(realm);
        self
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Classify one request.
    ///
    /// The verifier runs at most once, and only when exactly one token was
    /// found. `Err` means the verifier itself failed; it is not a rejection.
    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
        params: &RequestParams,
    ) -> Result<Decision, GuardError> {
        let (token, location) = match extract(headers, params) {
            Extraction::Absent => {
                tracing::debug!("no bearer token; passing through");
                return Ok(Decision::PassThrough);
            }
            Extraction::Conflict => {
                tracing::warn!(
                    realm = %self.realm,
                    "bearer token supplied in more than one location"
                );
                let challenge = Challenge::conflicting_tokens(&self.realm);
                return Ok(Decision::Rejected(challenge));
            }
            Extraction::Present { token, location } => (token, location),
        };

        let mut ctx = AuthContext::new(token, &*self.realm);

        if let Err(err) = verifier::invoke(self.verifier.as_ref(), &mut ctx).await {
            tracing::error!(error = %err, "token verifier failed");
            return Err(err.into());
        }
        ctx.settle();

        match Challenge::for_context(&ctx) {
            None => {
                tracing::debug!(?location, "bearer token accepted");
                Ok(Decision::Authenticated(AccessToken::new(ctx.access_token())))
            }
            Some(challenge) => {
                tracing::warn!(
                    ?location,
                    outcome = ?ctx.outcome(),
                    status = %challenge.status(),
                    "bearer token rejected"
                );
                Ok(Decision::Rejected(challenge))
            }
        }
    }
}
