use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::{StatusCode, request::Parts};

use crate::services::bearer::AccessToken;

/// Handler-side view of the token attached by `middleware::bearer`.
#[derive(Debug, Clone)]
pub struct AccessTokenExtractor(pub AccessToken);

impl<S> FromRequestParts<S> for AccessTokenExtractor
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AccessToken>()
            .cloned()
            .map(AccessTokenExtractor)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

impl<S> OptionalFromRequestParts<S> for AccessTokenExtractor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AccessToken>()
            .cloned()
            .map(AccessTokenExtractor))
    }
}
