//! Set-Cookie construction and Cookie header parsing

use axum::http::{header::COOKIE, HeaderMap};

/// Cookie carrying the session token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// Cookie carrying the OAuth state nonce between login and callback
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
/// Lifetime of the OAuth state nonce
pub const OAUTH_STATE_MAX_AGE: i64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
        }
    }
}

/// Attributes of one `Set-Cookie` header
#[derive(Debug, Clone)]
pub struct CookieSpec {
    pub name: &'static str,
    pub value: String,
    pub path: &'static str,
    pub max_age: i64,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookieSpec {
    pub fn build(&self) -> String {
        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}",
            self.name, self.value, self.path, self.max_age
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str("; SameSite=");
        cookie.push_str(self.same_site.as_str());
        cookie
    }
}

pub fn access_token_cookie(token: &str, max_age: i64, secure: bool) -> String {
    CookieSpec {
        name: ACCESS_TOKEN_COOKIE,
        value: token.to_string(),
        path: "/",
        max_age,
        http_only: true,
        secure,
        same_site: SameSite::Lax,
    }
    .build()
}

pub fn clear_access_token_cookie(secure: bool) -> String {
    access_token_cookie("", 0, secure)
}

// Lax so the cookie survives the top-level redirect back from the provider
pub fn oauth_state_cookie(nonce: &str, secure: bool) -> String {
    CookieSpec {
        name: OAUTH_STATE_COOKIE,
        value: nonce.to_string(),
        path: "/auth",
        max_age: OAUTH_STATE_MAX_AGE,
        http_only: true,
        secure,
        same_site: SameSite::Lax,
    }
    .build()
}

pub fn clear_oauth_state_cookie(secure: bool) -> String {
    CookieSpec {
        name: OAUTH_STATE_COOKIE,
        value: String::new(),
        path: "/auth",
        max_age: 0,
        http_only: true,
        secure,
        same_site: SameSite::Lax,
    }
    .build()
}

/// Value of the named cookie across all `Cookie` headers; empty counts as absent
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim().trim_matches('"').to_string())
        })
        .filter(|value| !value.is_empty())
}
