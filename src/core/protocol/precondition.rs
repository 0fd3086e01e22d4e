//! Optimistic concurrency: entity tags in, `if-match` out.
//!
//! The server arbitrates concurrent mutation. This module only places the
//! token on the request and recognizes the server's refusal.

use crate::core::error::{BuildError, PRECONDITION_FAILED_STATUS};
use crate::core::protocol::builder::check_header_value;
use crate::core::protocol::constants::headers;
use crate::core::types::{WireRequest, WireResponse};

/// Set `if-match: <token>` when a token is supplied.
///
/// `None` leaves the request untouched, including any `if-match` already set.
/// A token that cannot be carried as a header value is a
/// [`BuildError::InvalidHeaderValue`].
pub fn attach_precondition(
    mut request: WireRequest,
    token: Option<&str>,
) -> Result<WireRequest, BuildError> {
    if let Some(token) = token {
        check_header_value(headers::IF_MATCH, token)?;
        request.set_header(headers::IF_MATCH, token);
    }
    Ok(request)
}

/// Entity tag of the resource state a response describes.
pub fn extract_token(response: &WireResponse) -> Option<&str> {
    response.header(headers::ETAG)
}

/// Whether the server rejected the request's precondition.
#[inline]
pub fn is_precondition_failed(response: &WireResponse) -> bool {
    response.status == PRECONDITION_FAILED_STATUS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Method;

    #[test]
    fn test_attach_sets_if_match() {
        let req = WireRequest::new(Method::Delete, "/policies/p-1");
        let req = attach_precondition(req, Some("etag-7")).unwrap();
        assert_eq!(req.header("If-Match"), Some("etag-7"));
    }

    #[test]
    fn test_attach_none_is_noop() {
        let original = WireRequest::new(Method::Put, "/policies/p-1");
        let req = attach_precondition(original.clone(), None).unwrap();
        assert_eq!(req, original);
    }

    #[test]
    fn test_attach_replaces_existing_token() {
        let req = WireRequest::new(Method::Put, "/x").with_header("If-Match", "old");
        let req = attach_precondition(req, Some("new")).unwrap();
        assert_eq!(req.header("if-match"), Some("new"));
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn test_attach_rejects_line_breaks_in_token() {
        let req = WireRequest::new(Method::Delete, "/policies/p-1");
        let err = attach_precondition(req, Some("etag\r\nx-evil: 1")).unwrap_err();
        assert!(matches!(err, BuildError::InvalidHeaderValue { ref name, .. } if name == "if-match"));
    }

    #[test]
    fn test_extract_token() {
        let response = WireResponse::new(200, "{}").with_header("ETag", "etag-9");
        assert_eq!(extract_token(&response), Some("etag-9"));
        assert_eq!(extract_token(&WireResponse::new(200, "")), None);
    }

    #[test]
    fn test_precondition_status() {
        assert!(is_precondition_failed(&WireResponse::new(412, "")));
        assert!(!is_precondition_failed(&WireResponse::new(409, "")));
    }
}
