use async_trait::async_trait;
use thiserror::Error;
use tower::BoxError;

use super::context::AuthContext;

/// A failure of the verifier itself (backend unreachable, misconfiguration, ...).
///
/// Token rejections are never reported this way; they are signaled on the
/// [`AuthContext`]. A `VerifierError` is not translated into a challenge.
#[derive(Debug, Error)]
#[error("token verifier failed: {0}")]
pub struct VerifierError(#[source] BoxError);

impl VerifierError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }
}

/// Decides whether an access token grants access.
///
/// Implementations inspect `ctx.access_token()` and call at most one of the
/// `mark_*` operations. Returning `Ok(())` without signaling accepts the token.
///
/// Implementations must not keep the context beyond the call.
#[async_trait]
pub trait TokenVerifier: Send + Sync + 'static {
    async fn verify(&self, ctx: &mut AuthContext) -> Result<(), VerifierError>;
}

/// Adapter for synchronous closures: `verifier_fn(|ctx| ctx.mark_invalid_token())`.
#[derive(Clone)]
pub struct FnVerifier<F> {
    f: F,
}

pub fn verifier_fn<F>(f: F) -> FnVerifier<F>
where
    F: Fn(&mut AuthContext) + Send + Sync + 'static,
{
    FnVerifier { f }
}

#[async_trait]
impl<F> TokenVerifier for FnVerifier<F>
where
    F: Fn(&mut AuthContext) + Send + Sync + 'static,
{
    async fn verify(&self, ctx: &mut AuthContext) -> Result<(), VerifierError> {
        (self.f)(ctx);
        Ok(())
    }
}

/// Run the verifier once against `ctx`. Faults propagate unchanged.
pub(crate) async fn invoke(
    verifier: &dyn TokenVerifier,
    ctx: &mut AuthContext,
) -> Result<(), VerifierError> {
    verifier.verify(ctx).await
}
