//! Bearer-token extraction.
//!
//! The gateway only pulls the token off the request. Verification belongs
//! to the ledger's `CallerVerifier`, so a missing token and an unknown one
//! are rejected by the same code path.

use axum::http::{header, HeaderMap};

/// Token from an `Authorization: Bearer <token>` header, if any.
///
/// The scheme is matched case-insensitively; an empty token counts as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
