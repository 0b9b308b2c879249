//! Caller identity resolution.
//!
//! Authentication itself is delegated to an identity-aware proxy in front of
//! this server; the proxy injects the authenticated user id as a request
//! header. This module resolves that header into an explicit [`Identity`]
//! value that is threaded into every lifecycle and query call, so the
//! operations never touch ambient request state.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use std::convert::Infallible;
use std::fmt;

/// Opaque identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The caller's identity as resolved from the request, or `None` when the
/// identity header is absent or blank.
#[derive(Debug, Clone)]
pub struct Identity(pub Option<UserId>);

impl Identity {
    pub fn user(&self) -> Option<&UserId> {
        self.0.as_ref()
    }
}

/// State types that know which header carries the user id.
pub trait IdentityHeader {
    fn identity_header(&self) -> &str;
}

/// Resolve the identity from a header map.
pub fn identity_from_headers(headers: &HeaderMap, header_name: &str) -> Identity {
    let user = headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(UserId::new);
    Identity(user)
}

impl<S> FromRequestParts<S> for Identity
where
    S: IdentityHeader + Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(identity_from_headers(&parts.headers, state.identity_header()))
    }
}
