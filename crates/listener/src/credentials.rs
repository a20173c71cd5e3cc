//! Webhook credential matching.
//!
//! Tracker's activity webhook cannot send an `Authorization` header, but it
//! allows arbitrary query parameters on the webhook URL. Credentials are
//! therefore accepted either as HTTP Basic auth or as `username` / `password`
//! query parameters, in that order of preference.

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderValue};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use subtle::ConstantTimeEq;

/// Credentials supplied through the query string.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialQuery {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// The username/password pair a webhook request must present.
#[derive(Clone)]
pub struct BasicAuthCredentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for BasicAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl BasicAuthCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns `true` if the request carries the expected credentials.
    ///
    /// A well-formed Basic `Authorization` header is authoritative; the query
    /// parameters are only consulted when there is none.
    pub fn matches(&self, headers: &HeaderMap, query: &CredentialQuery) -> bool {
        if let Some((username, password)) = headers.get(AUTHORIZATION).and_then(parse_basic) {
            return self.matches_pair(&username, &password);
        }

        match (&query.username, &query.password) {
            (Some(username), Some(password)) => self.matches_pair(username, password),
            _ => false,
        }
    }

    fn matches_pair(&self, username: &str, password: &str) -> bool {
        let username_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let password_ok = password.as_bytes().ct_eq(self.password.as_bytes());
        (username_ok & password_ok).into()
    }
}

fn parse_basic(value: &HeaderValue) -> Option<(String, String)> {
    let (scheme, encoded) = value.to_str().ok()?.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
