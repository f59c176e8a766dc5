//! Per-request authentication context handed to the token verifier.

/// Verification outcome recorded on an [`AuthContext`].
///
/// `Unset` after the verifier returns means the token was accepted; the guard
/// then settles it to `Ok`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    Unset,
    Ok,
    InvalidToken,
    InsufficientScope,
    Unauthorized,
    InvalidRequest,
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Unset | Self::Ok)
    }
}

/// The only channel between a verifier and the guard.
///
/// - `access_token` and `realm` are fixed at construction.
/// - Each `mark_*` call overwrites the outcome (last call wins) together with
///   the metadata belonging to it.
/// - A verifier that accepts the token does not call anything.
#[derive(Debug, Clone)]
pub struct AuthContext {
    access_token: String,
    realm: String,
    outcome: Outcome,
    error_description: Option<String>,
    scope: Option<String>,
}

impl AuthContext {
    pub fn new(access_token: impl Into<String>, realm: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            realm: realm.into(),
            outcome: Outcome::Unset,
            error_description: None,
            scope: None,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn error_description(&self) -> Option<&str> {
        self.error_description.as_deref()
    }

    /// Required scope hint; only set for `InsufficientScope`.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// The token is unknown, expired, revoked or malformed.
    pub fn mark_invalid_token(&mut self) {
        self.signal(Outcome::InvalidToken, None, None);
    }

    /// The token is valid but lacks the privileges for this resource.
    pub fn mark_insufficient_scope(&mut self, scope: Option<&str>) {
        self.signal(Outcome::InsufficientScope, None, scope);
    }

    /// Generic rejection without an RFC 6750 error code.
    pub fn mark_unauthorized(&mut self, description: Option<&str>) {
        self.signal(Outcome::Unauthorized, description, None);
    }

    pub fn mark_invalid_request(&mut self, description: Option<&str>) {
        self.signal(Outcome::InvalidRequest, description, None);
    }

    pub(crate) fn settle(&mut self) {
        if self.outcome == Outcome::Unset {
            self.outcome = Outcome::Ok;
        }
    }

    fn signal(&mut self, outcome: Outcome, description: Option<&str>, scope: Option<&str>) {
        self.outcome = outcome;
        self.error_description = description.map(str::to_owned);
        self.scope = scope.map(str::to_owned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_is_unset_and_accepted() {
        let ctx = AuthContext::new("valid_token", "Bearer");
        assert_eq!(ctx.access_token(), "valid_token");
        assert_eq!(ctx.realm(), "Bearer");
        assert_eq!(ctx.outcome(), Outcome::Unset);
        assert!(ctx.outcome().is_accepted());
    }

    #[test]
    fn settle_only_promotes_unset() {
        let mut ctx = AuthContext::new("t", "Bearer");
        ctx.settle();
        assert_eq!(ctx.outcome(), Outcome::Ok);

        let mut ctx = AuthContext::new("t", "Bearer");
        ctx.mark_invalid_token();
        ctx.settle();
        assert_eq!(ctx.outcome(), Outcome::InvalidToken);
    }

    #[test]
    fn insufficient_scope_records_scope() {
        let mut ctx = AuthContext::new("t", "Bearer");
        ctx.mark_insufficient_scope(Some("write"));
        assert_eq!(ctx.outcome(), Outcome::InsufficientScope);
        assert_eq!(ctx.scope(), Some("write"));
        assert_eq!(ctx.error_description(), None);
        assert!(!ctx.outcome().is_accepted());
    }

    #[test]
    fn last_signal_wins_and_drops_stale_metadata() {
        let mut ctx = AuthContext::new("t", "Bearer");
        ctx.mark_insufficient_scope(Some("admin"));
        ctx.mark_unauthorized(Some("account locked"));

        assert_eq!(ctx.outcome(), Outcome::Unauthorized);
        assert_eq!(ctx.error_description(), Some("account locked"));
        assert_eq!(ctx.scope(), None);

        ctx.mark_invalid_token();
        assert_eq!(ctx.outcome(), Outcome::InvalidToken);
        assert_eq!(ctx.error_description(), None);
    }
}
