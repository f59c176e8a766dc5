//! Request inspection: locate bearer token candidates in a request.
//!
//! Two transport locations are considered:
//! - `Authorization: Bearer <token>` header(s)
//! - the `bearer_token` request parameter (query string or form body)
//!
//! Exactly one candidate is required for a token to be `Present`. Any request
//! carrying more than one candidate is a `Conflict`, even if the values match.

use axum::http::{HeaderMap, header};

/// Name of the request parameter that may carry the token.
pub const BEARER_TOKEN_PARAM: &str = "bearer_token";

const BEARER_SCHEME: &str = "Bearer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLocation {
    None,
    Header,
    Param,
}

/// Result of scanning a request for bearer token candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Absent,
    Present {
        token: String,
        location: TokenLocation,
    },
    Conflict,
}

impl Extraction {
    pub fn location(&self) -> TokenLocation {
        match self {
            Self::Present { location, .. } => *location,
            Self::Absent | Self::Conflict => TokenLocation::None,
        }
    }
}

/// Merged request parameters (query string first, then form body).
///
/// Order and duplicates are preserved so that repeated `bearer_token`
/// parameters can be detected.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    pairs: Vec<(String, String)>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::new();
        if let Some(query) = query {
            params.extend_urlencoded(query.as_bytes());
        }
        params
    }

    /// Append pairs decoded from an `application/x-www-form-urlencoded` payload.
    pub fn extend_urlencoded(&mut self, input: &[u8]) {
        self.pairs.extend(
            url::form_urlencoded::parse(input).map(|(k, v)| (k.into_owned(), v.into_owned())),
        );
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// The verified access token handed to downstream handlers via request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Return the credentials of a `Bearer` authorization value.
///
/// The scheme match is case-insensitive. Other schemes (Basic, OAuth 1.0
/// signatures, ...) yield `None`. A bare `Bearer` scheme yields `Some("")`:
/// the location is populated and the verifier decides.
pub fn bearer_credentials(value: &str) -> Option<&str> {
    let value = value.trim();
    let (scheme, rest) = value.split_once(char::is_whitespace).unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }

    Some(rest.trim())
}

/// Scan headers and parameters and classify the request.
pub fn extract<'a>(headers: &'a HeaderMap, params: &'a RequestParams) -> Extraction {
    let from_headers = headers
        .get_all(header::AUTHORIZATION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(bearer_credentials)
        .map(|token| (token, TokenLocation::Header));

    let from_params = params
        .get_all(BEARER_TOKEN_PARAM)
        .map(|token| (token, TokenLocation::Param));

    let mut candidates = from_headers.chain(from_params);

    match (candidates.next(), candidates.next()) {
        (None, _) => Extraction::Absent,
        (Some((token, location)), None) => Extraction::Present {
            token: token.to_string(),
            location,
        },
        (Some(_), Some(_)) => Extraction::Conflict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(values: &[&'static str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for v in values {
            headers.append(header::AUTHORIZATION, HeaderValue::from_static(v));
        }
        headers
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_credentials("Bearer abc"), Some("abc"));
        assert_eq!(bearer_credentials("bearer abc"), Some("abc"));
        assert_eq!(bearer_credentials("BEARER   abc  "), Some("abc"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        assert_eq!(bearer_credentials("Basic dXNlcjpwYXNz"), None);
        assert_eq!(
            bearer_credentials(r#"OAuth oauth_consumer_key="key" oauth_token="token""#),
            None
        );
        assert_eq!(bearer_credentials("Bearerabc"), None);
    }

    #[test]
    fn bare_bearer_scheme_has_empty_credentials() {
        assert_eq!(bearer_credentials("Bearer"), Some(""));
        assert_eq!(bearer_credentials("Bearer    "), Some(""));
    }

    #[test]
    fn no_candidates_is_absent() {
        let extraction = extract(&HeaderMap::new(), &RequestParams::new());
        assert_eq!(extraction, Extraction::Absent);
        assert_eq!(extraction.location(), TokenLocation::None);
    }

    #[test]
    fn header_token_is_present() {
        let extraction = extract(&headers_with(&["Bearer valid_token"]), &RequestParams::new());
        assert_eq!(
            extraction,
            Extraction::Present {
                token: "valid_token".into(),
                location: TokenLocation::Header,
            }
        );
    }

    #[test]
    fn query_param_token_is_present() {
        let params = RequestParams::from_query(Some("bearer_token=valid_token&page=2"));
        let extraction = extract(&HeaderMap::new(), &params);
        assert_eq!(extraction.location(), TokenLocation::Param);
        assert_matches::assert_matches!(extraction, Extraction::Present { token, .. } if token == "valid_token");
    }

    #[test]
    fn form_param_is_percent_decoded() {
        let mut params = RequestParams::new();
        params.extend_urlencoded(b"bearer_token=a%2Bb%3D");
        assert_matches::assert_matches!(
            extract(&HeaderMap::new(), &params),
            Extraction::Present { token, .. } if token == "a+b="
        );
    }

    #[test]
    fn header_and_param_conflict_even_when_equal() {
        let params = RequestParams::from_query(Some("bearer_token=valid_token"));
        let extraction = extract(&headers_with(&["Bearer valid_token"]), &params);
        assert_eq!(extraction, Extraction::Conflict);
    }

    #[test]
    fn repeated_locations_conflict() {
        let two_headers = headers_with(&["Bearer a", "Bearer b"]);
        assert_eq!(extract(&two_headers, &RequestParams::new()), Extraction::Conflict);

        let two_params = RequestParams::from_query(Some("bearer_token=a&bearer_token=a"));
        assert_eq!(extract(&HeaderMap::new(), &two_params), Extraction::Conflict);
    }

    #[test]
    fn non_bearer_header_does_not_count_as_candidate() {
        let params = RequestParams::from_query(Some("bearer_token=valid_token"));
        let extraction = extract(&headers_with(&["Basic dXNlcjpwYXNz"]), &params);
        assert_eq!(extraction.location(), TokenLocation::Param);
    }

    #[test]
    fn oauth1_params_are_absent() {
        let params = RequestParams::from_query(Some(
            "oauth_consumer_key=key&oauth_token=token&oauth_signature_method=HMAC-SHA1",
        ));
        assert!(!params.is_empty());
        assert_eq!(extract(&HeaderMap::new(), &params), Extraction::Absent);
    }

    #[test]
    fn lone_empty_param_is_present() {
        let params = RequestParams::from_query(Some("bearer_token="));
        assert_eq!(
            extract(&HeaderMap::new(), &params),
            Extraction::Present {
                token: String::new(),
                location: TokenLocation::Param,
            }
        );
    }

    #[test]
    fn header_with_empty_param_conflicts() {
        let params = RequestParams::from_query(Some("bearer_token="));
        let extraction = extract(&headers_with(&["Bearer valid_token"]), &params);
        assert_eq!(extraction, Extraction::Conflict);
    }

    #[test]
    fn empty_bearer_header_with_param_conflicts() {
        let params = RequestParams::from_query(Some("bearer_token=valid_token"));
        let extraction = extract(&headers_with(&["Bearer"]), &params);
        assert_eq!(extraction, Extraction::Conflict);
    }
}
