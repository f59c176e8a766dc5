use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use super::context::AuthContext;
use super::verifier::{TokenVerifier, VerifierError};

/// In-memory verifier backed by a fixed token table.
///
/// - Unknown tokens are rejected with `invalid_token`.
/// - If a required scope is configured, tokens not granted that scope are
///   rejected with `insufficient_scope`.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, HashSet<String>>,
    required_scope: Option<String>,
}

impl StaticTokenVerifier {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = (String, S)>,
        S: IntoIterator<Item = String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|(token, scopes)| (token, scopes.into_iter().collect()))
                .collect(),
            required_scope: None,
        }
    }

    pub fn require_scope(mut self, scope: impl Into<String>) -> Self {
        self.required_scope = Some(scope.into());
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, ctx: &mut AuthContext) -> Result<(), VerifierError> {
        let Some(granted) = self.tokens.get(ctx.access_token()) else {
            ctx.mark_invalid_token();
            return Ok(());
        };

        if let Some(required) = self.required_scope.as_deref() {
            if !granted.contains(required) {
                ctx.mark_insufficient_scope(Some(required));
            }
        }

        Ok(())
    }
}
