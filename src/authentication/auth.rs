use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::{app_state::SharedState, service_error::ServiceError};

/// Checks `Authorization: Bearer <token>` against the one configured secret.
///
/// Only the SHA-256 digest of the secret is kept, and digests are compared in
/// constant time, so neither the token's bytes nor its length leak through timing.
#[derive(Clone)]
pub struct AuthGate {
    expected_digest: [u8; 32],
}

impl AuthGate {
    pub fn new(token: &str) -> Self {
        Self {
            expected_digest: digest(token),
        }
    }

    pub fn check(&self, headers: &HeaderMap) -> Result<(), ServiceError> {
        let auth_header = headers
            .get(header::AUTHORIZATION)
            .ok_or(ServiceError::Unauthorized("Authorization header missing"))?;

        let auth_header = auth_header
            .to_str()
            .map_err(|_| ServiceError::Unauthorized("Invalid authorization scheme"))?;

        let token = match auth_header.split_whitespace().collect::<Vec<_>>().as_slice() {
            [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => *token,
            _ => return Err(ServiceError::Unauthorized("Invalid authorization scheme")),
        };

        if !constant_time_eq(&digest(token), &self.expected_digest) {
            return Err(ServiceError::Unauthorized("Invalid token"));
        }
        Ok(())
    }
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Runs before body extraction, so a bad token wins over a bad body.
pub async fn auth_middleware(
    State(state): State<SharedState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ServiceError> {
    state.auth_gate.check(request.headers())?;
    Ok(next.run(request).await)
}
