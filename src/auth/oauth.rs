//! OAuth state parameter and post-login redirect handling

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

/// Decoded `state` parameter: a CSRF nonce plus the optional landing path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthState {
    pub nonce: String,
    pub next: Option<String>,
}

/// `nonce` or `nonce.base64url(next)`. The nonce alphabet has no dots.
pub fn encode_state(nonce: &str, next: Option<&str>) -> String {
    match next.map(str::trim).filter(|n| !n.is_empty()) {
        Some(next) => format!("{}.{}", nonce, URL_SAFE_NO_PAD.encode(next.as_bytes())),
        None => nonce.to_string(),
    }
}

/// An undecodable `next` segment is dropped, the nonce is kept for the
/// CSRF comparison.
pub fn decode_state(state: &str) -> OAuthState {
    match state.split_once('.') {
        Some((nonce, encoded)) => OAuthState {
            nonce: nonce.to_string(),
            next: URL_SAFE_NO_PAD
                .decode(encoded)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok()),
        },
        None => OAuthState {
            nonce: state.to_string(),
            next: None,
        },
    }
}

/// Only same-origin absolute paths: `/x` yes, `//host`, `/\host`,
/// `https://host` and anything with control characters no.
pub fn is_safe_relative_path(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && !target.contains("://")
        && !target.chars().any(char::is_control)
}

pub fn safe_redirect_target(next: Option<&str>, default: &str) -> String {
    match next {
        Some(target) if is_safe_relative_path(target) => target.to_string(),
        _ => default.to_string(),
    }
}
