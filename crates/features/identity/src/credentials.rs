//! Where a request carries its access token, and the cookie that delivers it.

use axum::http::{HeaderMap, HeaderValue, header};
use tally_domain::constants::{ACCESS_TOKEN_COOKIE, TOKEN_TYPE};

/// The bearer token of a request.
///
/// The `access_token` cookie wins over the `Authorization` header. Both hold
/// `Bearer <jwt>`; the cookie value may be quoted.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, ACCESS_TOKEN_COOKIE)
        .and_then(|value| strip_scheme(&value).map(str::to_owned))
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(strip_scheme)
                .map(str::to_owned)
        })
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_owned())
}

fn strip_scheme(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case(TOKEN_TYPE) && !token.is_empty()).then_some(token)
}

/// `Set-Cookie` value storing `Bearer <token>` for browser sessions.
#[must_use]
pub fn access_cookie(token: &str) -> HeaderValue {
    let cookie = format!("{ACCESS_TOKEN_COOKIE}=\"{TOKEN_TYPE} {token}\"; HttpOnly; Path=/; SameSite=Lax");
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| expired_cookie())
}

/// `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn expired_cookie() -> HeaderValue {
    HeaderValue::from_static("access_token=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}
