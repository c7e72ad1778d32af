use crate::auth::claims::{AccessTokenClaims, GrantContext, SignedToken};
use crate::auth::clock::{Clock, RandomTokenIds, SystemClock, TokenIdSource};
use crate::auth::errors::TokenError;
use crate::auth::keys::SigningKeys;
use crate::auth::verifier::TokenVerifier;
use crate::config::{AuthConfig, ConfigurationError};
use chrono::Duration;
use jsonwebtoken::{encode, Header};
use std::sync::Arc;
use tracing::debug;

/// Turns a grant into a signed access token.
///
/// Construction fails on an unusable signing configuration. Issuing is synchronous and
/// shares no mutable state between clones.
#[derive(Clone)]
pub struct TokenIssuer {
    keys: Arc<SigningKeys>,
    issuer: String,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
    token_ids: Arc<dyn TokenIdSource>,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Result<Self, ConfigurationError> {
        Self::with_sources(config, Arc::new(SystemClock), Arc::new(RandomTokenIds))
    }

    pub fn with_sources(
        config: &AuthConfig,
        clock: Arc<dyn Clock>,
        token_ids: Arc<dyn TokenIdSource>,
    ) -> Result<Self, ConfigurationError> {
        let keys = SigningKeys::from_config(config)?;

        Ok(Self {
            keys: Arc::new(keys),
            issuer: config.issuer.clone(),
            lifetime: config.token_lifetime()?,
            clock,
            token_ids,
        })
    }

    pub fn issue_token(&self, grant: &GrantContext<'_>) -> Result<SignedToken, TokenError> {
        let resource_owner_id = grant.resource_owner_id.trim();
        if resource_owner_id.is_empty() {
            return Err(TokenError::InvalidInput("resource owner id is empty".to_string()));
        }
        let application_uid = grant.application_uid.trim();
        if application_uid.is_empty() {
            return Err(TokenError::InvalidInput("application uid is empty".to_string()));
        }

        let claims = AccessTokenClaims::new(
            self.issuer.clone(),
            self.token_ids.next_id(),
            resource_owner_id.to_string(),
            application_uid.to_string(),
            self.clock.now(),
            self.lifetime,
        );

        let mut header = Header::new(self.keys.algorithm());
        header.kid = Some(application_uid.to_string());

        let token = encode(&header, &claims, &self.keys.for_key_id(application_uid).encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        debug!(
            jti = %claims.jti,
            sub = %claims.sub,
            aud = %claims.aud,
            exp = claims.exp,
            dedicated_key = self.keys.has_dedicated_key(application_uid),
            "Issued access token"
        );

        Ok(SignedToken { token, key_id: application_uid.to_string(), claims })
    }

    /// Verifier sharing this issuer's keys, issuer name and clock.
    pub fn verifier(&self) -> TokenVerifier {
        TokenVerifier::new(self.keys.clone(), self.issuer.clone(), self.clock.clone())
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}
