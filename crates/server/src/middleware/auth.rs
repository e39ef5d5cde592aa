use axum::http::{header, HeaderMap};

/// Authorization headers longer than this are ignored
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;

/// Extract the bearer token from the authorization header.
///
/// The scheme is matched case-insensitively. Anything else (missing header,
/// another scheme, an oversized or non-ASCII value) yields `None` and the
/// request proceeds with no credential.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_header = headers.get(header::AUTHORIZATION)?;
    if auth_header.len() > MAX_AUTH_HEADER_BYTES {
        return None;
    }

    let auth_str = auth_header.to_str().ok()?;
    let (scheme, token) = auth_str.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer token123")), Some("token123"));
        assert_eq!(extract_bearer_token(&headers("bearer token123")), Some("token123"));
        assert_eq!(extract_bearer_token(&headers("Bearer   token123  ")), Some("token123"));
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
        assert_eq!(extract_bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer_token(&headers("Bearer")), None);
        assert_eq!(extract_bearer_token(&headers("Bearer    ")), None);
        assert_eq!(extract_bearer_token(&headers("token123")), None);
    }

    #[test]
    fn test_oversized_header_ignored() {
        let huge = format!("Bearer {}", "a".repeat(MAX_AUTH_HEADER_BYTES));
        assert_eq!(extract_bearer_token(&headers(&huge)), None);
    }
}
