use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, resource::protected_resource};
use crate::middleware;
use crate::state::AppState;

/// `/health` is public; everything else sits behind the bearer guard.
///
/// `form_limit` bounds the form body the guard buffers to look for
/// `bearer_token`; it follows the router-wide body limit.
pub fn routes(state: &AppState, form_limit: usize) -> Router<AppState> {
    let protected = Router::new().route(
        "/protected_resource",
        get(protected_resource).post(protected_resource),
    );

    Router::new()
        .route("/health", get(health))
        .merge(middleware::bearer::apply_with_form_limit(
            protected,
            state.guard.clone(),
            form_limit,
        ))
}
