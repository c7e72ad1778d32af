use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Signed payload of an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccessTokenClaims {
    pub iss: String, // Issuer
    pub iat: i64,    // Issued at (Unix timestamp)
    pub jti: Uuid,   // Token ID
    pub sub: String, // Resource owner ID (subject)
    pub aud: String, // Application uid (audience)
    pub exp: i64,    // Expiration time (Unix timestamp)
}

impl AccessTokenClaims {
    pub fn new(
        issuer: String,
        token_id: Uuid,
        resource_owner_id: String,
        application_uid: String,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            iss: issuer,
            iat: issued_at.timestamp(),
            jti: token_id,
            sub: resource_owner_id,
            aud: application_uid,
            exp: (issued_at + lifetime).timestamp(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Seconds left before expiry, never negative.
    pub fn expires_in(&self, now: DateTime<Utc>) -> i64 {
        (self.exp - now.timestamp()).max(0)
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.exp - self.iat
    }
}

/// Anything a token can be issued to.
pub trait ClientApplication {
    fn uid(&self) -> &str;
}

impl ClientApplication for str {
    fn uid(&self) -> &str {
        self
    }
}

impl ClientApplication for String {
    fn uid(&self) -> &str {
        self.as_str()
    }
}

/// The resource owner and application an access token is being issued for.
#[derive(Debug, Clone, Copy)]
pub struct GrantContext<'a> {
    pub resource_owner_id: &'a str,
    pub application_uid: &'a str,
}

impl<'a> GrantContext<'a> {
    pub fn new<A: ClientApplication + ?Sized>(resource_owner_id: &'a str, application: &'a A) -> Self {
        Self { resource_owner_id, application_uid: application.uid() }
    }
}

/// A compact JWT together with what went into it.
#[derive(Clone)]
pub struct SignedToken {
    pub token: String,
    pub key_id: String,
    pub claims: AccessTokenClaims,
}

impl fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedToken")
            .field("token", &"[REDACTED]")
            .field("key_id", &self.key_id)
            .field("claims", &self.claims)
            .finish()
    }
}
