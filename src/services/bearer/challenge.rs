//! `WWW-Authenticate` challenge construction (RFC 6750 §3).

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use super::context::{AuthContext, Outcome};
use crate::error::{ErrorBody, ErrorResponse};

const CONFLICT_DESCRIPTION: &str = "multiple access tokens were supplied";
const BEARER_CHALLENGE_FALLBACK: &str = "Bearer";
// Body code for rejections that carry no RFC 6750 error attribute.
const UNAUTHORIZED_CODE: &str = "unauthorized";

/// A rejection: status code plus the challenge header value.
#[derive(Debug, Clone)]
pub struct Challenge {
    status: StatusCode,
    error: Option<&'static str>,
    description: Option<String>,
    www_authenticate: HeaderValue,
}

impl Challenge {
    /// Map the final context state to a challenge.
    ///
    /// Returns `None` when the verifier accepted the token.
    pub fn for_context(ctx: &AuthContext) -> Option<Self> {
        let (status, error) = match ctx.outcome() {
            Outcome::Unset | Outcome::Ok => return None,
            Outcome::InvalidToken => (StatusCode::UNAUTHORIZED, Some("invalid_token")),
            Outcome::Unauthorized => (StatusCode::UNAUTHORIZED, None),
            Outcome::InsufficientScope => (StatusCode::FORBIDDEN, Some("insufficient_scope")),
            Outcome::InvalidRequest => (StatusCode::BAD_REQUEST, Some("invalid_request")),
        };

        Some(Self::new(
            status,
            ctx.realm(),
            error,
            ctx.error_description(),
            ctx.scope(),
        ))
    }

    /// 400 for a request that carried its token in more than one place.
    pub fn conflicting_tokens(realm: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            realm,
            Some("invalid_request"),
            Some(CONFLICT_DESCRIPTION),
            None,
        )
    }

    fn new(
        status: StatusCode,
        realm: &str,
        error: Option<&'static str>,
        description: Option<&str>,
        scope: Option<&str>,
    ) -> Self {
        let value = www_authenticate(realm, error, description, scope);
        // `quoted` drops every control character, which leaves only bytes
        // `HeaderValue` accepts; the fallback is unreachable.
        let www_authenticate = HeaderValue::from_str(&value)
            .unwrap_or_else(|_| HeaderValue::from_static(BEARER_CHALLENGE_FALLBACK));

        Self {
            status,
            error,
            description: description.map(str::to_owned),
            www_authenticate,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// RFC 6750 error code, if any (`Unauthorized` carries none).
    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn www_authenticate(&self) -> &HeaderValue {
        &self.www_authenticate
    }
}

impl IntoResponse for Challenge {
    fn into_response(self) -> Response {
        let message = self.description.unwrap_or_else(|| {
            self.status
                .canonical_reason()
                .unwrap_or("rejected")
                .to_ascii_lowercase()
        });

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error.unwrap_or(UNAUTHORIZED_CODE),
                message,
            },
        };

        (
            self.status,
            [(header::WWW_AUTHENTICATE, self.www_authenticate)],
            Json(body),
        )
            .into_response()
    }
}

/// Render a Bearer challenge.
///
/// Attributes appear in the order `realm, error, error_description, scope`;
/// absent ones are omitted.
pub fn www_authenticate(
    realm: &str,
    error: Option<&str>,
    description: Option<&str>,
    scope: Option<&str>,
) -> String {
    let attributes = [
        ("realm", Some(realm)),
        ("error", error),
        ("error_description", description),
        ("scope", scope),
    ];

    let rendered = attributes
        .iter()
        .filter_map(|(name, value)| value.map(|v| format!("{name}={}", quoted(v))))
        .collect::<Vec<_>>()
        .join(", ");

    format!("Bearer {rendered}")
}

// RFC 7230 quoted-string: escape DQUOTE and backslash, drop control characters.
fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars().filter(|c| !c.is_control()) {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
