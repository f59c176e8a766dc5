//! GET/POST /protected_resource
//!
//! Requests without bearer credentials are served too (anonymous view);
//! the guard has already rejected bad tokens before this handler runs.
use axum::Json;

use crate::api::v1::dto::resource::ResourceResponse;
use crate::api::v1::extractors::AccessTokenExtractor;

pub async fn protected_resource(token: Option<AccessTokenExtractor>) -> Json<ResourceResponse> {
    let authenticated = token.is_some();
    Json(ResourceResponse {
        message: if authenticated {
            "protected resource"
        } else {
            "public view"
        },
        authenticated,
    })
}
