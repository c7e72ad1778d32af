use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures of token issuance and verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid grant input: {0}")]
    InvalidInput(String),
    #[error("Failed to sign token: {0}")]
    Signing(String),
    #[error("Token expired")]
    Expired,
    #[error("Invalid token signature")]
    InvalidSignature,
    #[error("Malformed token: {0}")]
    Malformed(String),
    #[error("Token claim mismatch: {0}")]
    ClaimMismatch(String),
}

impl TokenError {
    /// Verification failures are the client's problem, everything else is ours.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            TokenError::Expired
                | TokenError::InvalidSignature
                | TokenError::Malformed(_)
                | TokenError::ClaimMismatch(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingAuthHeader,
    #[error("Invalid authorization header format")]
    InvalidAuthHeader,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Token revoked")]
    TokenRevoked,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Unsupported grant type: {0}")]
    UnsupportedGrantType(String),
    #[error("Client authentication failed")]
    InvalidClient,
    #[error("Client is not allowed to act on this token")]
    UnauthorizedClient,
    #[error("Invalid resource owner credentials")]
    InvalidGrant,
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::InvalidSignature | TokenError::Malformed(_) | TokenError::ClaimMismatch(_) => {
                AuthError::InvalidToken(err.to_string())
            }
            TokenError::InvalidInput(_) => AuthError::InvalidGrant,
            TokenError::Signing(msg) => AuthError::Internal(msg),
        }
    }
}

impl AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken(_)
            | AuthError::TokenExpired
            | AuthError::TokenRevoked => "invalid_token",
            AuthError::InvalidRequest(_) => "invalid_request",
            AuthError::UnsupportedGrantType(_) => "unsupported_grant_type",
            AuthError::InvalidClient => "invalid_client",
            AuthError::UnauthorizedClient => "unauthorized_client",
            AuthError::InvalidGrant => "invalid_grant",
            AuthError::DatabaseError(_) | AuthError::Internal(_) => "server_error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AuthError::MissingAuthHeader | AuthError::InvalidAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid authorization header".to_string(),
            ),
            AuthError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "The access token is invalid".to_string()),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "The access token expired".to_string()),
            AuthError::TokenRevoked => (StatusCode::UNAUTHORIZED, "The access token was revoked".to_string()),
            AuthError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AuthError::UnsupportedGrantType(grant) => (
                StatusCode::BAD_REQUEST,
                format!("The authorization grant type '{}' is not supported", grant),
            ),
            AuthError::InvalidClient => (StatusCode::UNAUTHORIZED, "Client authentication failed".to_string()),
            AuthError::UnauthorizedClient => (
                StatusCode::FORBIDDEN,
                "The client is not authorized to revoke this token".to_string(),
            ),
            AuthError::InvalidGrant => (
                StatusCode::BAD_REQUEST,
                "The provided authorization grant is invalid".to_string(),
            ),
            AuthError::DatabaseError(_) | AuthError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": self.error_code(),
            "error_description": error_message,
            "status": status.as_u16()
        }));

        if status == StatusCode::UNAUTHORIZED {
            let challenge = format!("Bearer error=\"{}\"", self.error_code());
            return (status, [(header::WWW_AUTHENTICATE, challenge)], body).into_response();
        }

        (status, body).into_response()
    }
}
