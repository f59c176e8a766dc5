//! Bearer token guard as axum middleware.
//!
//! - Collects request parameters (query string + urlencoded form body)
//! - Runs `BearerGuard::authenticate`
//! - On success, puts `AccessToken` into request extensions for the handler
//!
//! The form body is buffered (bounded) and restored, so handlers can still
//! extract it.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::services::bearer::{BearerGuard, Decision, RequestParams};

/// Upper bound for a buffered form body.
pub const DEFAULT_FORM_LIMIT: usize = 1024 * 1024;

#[derive(Clone)]
struct BearerState {
    guard: BearerGuard,
    form_limit: usize,
}

/// Protect every route of `router` with `guard`.
///
/// ```ignore
/// let protected = middleware::bearer::apply(api::v1::routes(), state.guard.clone());
/// ```
pub fn apply<S>(router: Router<S>, guard: BearerGuard) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    apply_with_form_limit(router, guard, DEFAULT_FORM_LIMIT)
}

pub fn apply_with_form_limit<S>(router: Router<S>, guard: BearerGuard, form_limit: usize) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let state = BearerState { guard, form_limit };
    router.layer(middleware::from_fn_with_state(state, bearer_middleware))
}

async fn bearer_middleware(
    State(state): State<BearerState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let (mut req, params) = collect_params(req, state.form_limit).await?;

    let decision = state.guard.authenticate(req.headers(), &params).await?;

    match decision {
        Decision::PassThrough => Ok(next.run(req).await),
        Decision::Authenticated(token) => {
            // read back by AccessTokenExtractor
            req.extensions_mut().insert(token);
            Ok(next.run(req).await)
        }
        Decision::Rejected(challenge) => Ok(challenge.into_response()),
    }
}

async fn collect_params(
    req: Request<Body>,
    limit: usize,
) -> Result<(Request<Body>, RequestParams), AppError> {
    let mut params = RequestParams::from_query(req.uri().query());
    if !is_form_urlencoded(req.headers()) {
        return Ok((req, params));
    }

    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, limit).await.map_err(|err| {
        tracing::warn!(error = %err, "failed to buffer form body");
        AppError::bad_request("invalid_body", "unreadable form body")
    })?;

    params.extend_urlencoded(&bytes);
    Ok((Request::from_parts(parts, Body::from(bytes)), params))
}

fn is_form_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}
