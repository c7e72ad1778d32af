use crate::auth::{claims::AccessTokenClaims, errors::AuthError, issuer::TokenIssuer, verifier::TokenVerifier};
use crate::database::Database;
use crate::repositories::AccessTokenRepository;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::time::Instant;
use tracing::{debug, error, warn};

// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub token_issuer: TokenIssuer,
    pub token_verifier: TokenVerifier,
    pub config: crate::config::AppConfig,
    pub startup_time: Instant,
}

impl AppState {
    pub fn new(database: Database, token_issuer: TokenIssuer, config: crate::config::AppConfig) -> Self {
        let token_verifier = token_issuer.verifier();
        Self {
            database,
            token_issuer,
            token_verifier,
            config,
            startup_time: Instant::now(),
        }
    }
}

/// The resource owner and application behind a valid, unrevoked bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedOwner {
    pub claims: AccessTokenClaims,
}

impl AuthenticatedOwner {
    pub fn resource_owner_id(&self) -> &str {
        &self.claims.sub
    }

    pub fn application_uid(&self) -> &str {
        &self.claims.aud
    }
}

impl FromRequestParts<AppState> for AuthenticatedOwner {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token_from_auth_header(&parts.headers)?;
        authenticate(state, &token).await
    }
}

pub fn extract_token_from_auth_header(headers: &axum::http::HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get("authorization")
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    match auth_header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim().to_string())
        }
        _ => Err(AuthError::InvalidAuthHeader),
    }
}

/// Verifies the token, then checks the token store for revocation.
async fn authenticate(state: &AppState, token: &str) -> Result<AuthenticatedOwner, AuthError> {
    let claims = state.token_verifier.verify(token).map_err(|e| {
        if e.is_authentication_failure() {
            warn!("Rejected bearer token: {}", e);
        } else {
            error!("Bearer token could not be checked: {}", e);
        }
        AuthError::from(e)
    })?;

    debug!("Token verified for resource owner {} via {}", claims.sub, claims.aud);

    let token_repo = AccessTokenRepository::new(state.database.pool().clone());
    let record = token_repo.find_by_jti(claims.jti).await.map_err(|e| {
        error!("Database error while looking up token {}: {:?}", claims.jti, e);
        AuthError::DatabaseError(e.to_string())
    })?;

    match record {
        Some(record) if !record.is_revoked() => Ok(AuthenticatedOwner { claims }),
        Some(_) => {
            warn!("Revoked token presented: {}", claims.jti);
            Err(AuthError::TokenRevoked)
        }
        None => {
            warn!("Token {} has no issuance record", claims.jti);
            Err(AuthError::InvalidToken("unknown token".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        let token = extract_token_from_auth_header(&headers_with("Bearer abc.def.ghi")).unwrap();
        assert_eq!(token, "abc.def.ghi");

        let token = extract_token_from_auth_header(&headers_with("bearer abc.def.ghi")).unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn test_missing_header() {
        let result = extract_token_from_auth_header(&HeaderMap::new());
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[test]
    fn test_wrong_scheme() {
        let result = extract_token_from_auth_header(&headers_with("Basic dXNlcjpwYXNz"));
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));

        let result = extract_token_from_auth_header(&headers_with("Bearer "));
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));

        let result = extract_token_from_auth_header(&headers_with("abc.def.ghi"));
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }
}
