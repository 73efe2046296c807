//! Bearer Token Extraction
//!
//! Parses `Authorization: Bearer <token>` headers. Only the header shape is
//! checked here; the token itself is opaque to this module.

use http::{HeaderMap, header};
use thiserror::Error;

const BEARER_SCHEME: &str = "bearer";

/// Why a request carries no usable bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BearerError {
    #[error("missing authorization header")]
    MissingHeader,

    /// Header value is not visible ASCII
    #[error("invalid authorization header")]
    InvalidHeader,

    #[error("invalid authorization header")]
    InvalidScheme,

    #[error("invalid authorization header")]
    EmptyToken,
}

/// Extract the bearer token from the `Authorization` header.
///
/// The scheme match is case-insensitive and surrounding whitespace is
/// ignored, so `"  bearer   abc.def.ghi "` yields `"abc.def.ghi"`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::MissingHeader)?
        .to_str()
        .map_err(|_| BearerError::InvalidHeader)?
        .trim();

    if value.is_empty() {
        return Err(BearerError::MissingHeader);
    }

    let (scheme, token) = match value.split_once(|c: char| c.is_ascii_whitespace()) {
        Some((scheme, rest)) => (scheme, rest.trim()),
        None => (value, ""),
    };

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(BearerError::InvalidScheme);
    }
    if token.is_empty() {
        return Err(BearerError::EmptyToken);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extracts_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_scheme_is_case_insensitive_and_whitespace_tolerant() {
        assert_eq!(extract_bearer_token(&headers("bearer tok")), Ok("tok"));
        assert_eq!(extract_bearer_token(&headers("BEARER tok")), Ok("tok"));
        assert_eq!(extract_bearer_token(&headers("  Bearer    tok  ")), Ok("tok"));
        assert_eq!(extract_bearer_token(&headers("Bearer\ttok")), Ok("tok"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            extract_bearer_token(&HeaderMap::new()),
            Err(BearerError::MissingHeader)
        );
        assert_eq!(
            extract_bearer_token(&headers("   ")),
            Err(BearerError::MissingHeader)
        );
    }

    #[test]
    fn test_wrong_scheme() {
        assert_eq!(
            extract_bearer_token(&headers("Basic dXNlcjpwYXNz")),
            Err(BearerError::InvalidScheme)
        );
        assert_eq!(
            extract_bearer_token(&headers("Bearertoken")),
            Err(BearerError::InvalidScheme)
        );
        assert_eq!(
            extract_bearer_token(&headers("abc.def.ghi")),
            Err(BearerError::InvalidScheme)
        );
    }

    #[test]
    fn test_empty_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer")), Err(BearerError::EmptyToken));
        assert_eq!(extract_bearer_token(&headers("Bearer    ")), Err(BearerError::EmptyToken));
    }

    #[test]
    fn test_non_ascii_header() {
        let mut map = HeaderMap::new();
        map.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        );
        assert_eq!(extract_bearer_token(&map), Err(BearerError::InvalidHeader));
    }
}
