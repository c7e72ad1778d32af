use crate::config::{AuthConfig, ConfigurationError};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use secrecy::ExposeSecret;
use std::collections::HashMap;

#[derive(Clone)]
pub struct KeyPair {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// HMAC keys used to sign and verify access tokens, selected by `kid`.
///
/// Applications with an entry in `auth.application_keys` get their own secret. Every other
/// application shares the default `auth.jwt_secret`.
#[derive(Clone)]
pub struct SigningKeys {
    algorithm: Algorithm,
    default_key: KeyPair,
    application_keys: HashMap<String, KeyPair>,
}

impl SigningKeys {
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let application_keys = config
            .application_keys
            .iter()
            .map(|(uid, secret)| (uid.clone(), KeyPair::from_secret(secret.expose_secret().as_bytes())))
            .collect();

        Ok(Self {
            algorithm: config.signing_algorithm()?,
            default_key: KeyPair::from_secret(config.jwt_secret.expose_secret().as_bytes()),
            application_keys,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn for_key_id(&self, kid: &str) -> &KeyPair {
        self.application_keys.get(kid).unwrap_or(&self.default_key)
    }

    pub fn has_dedicated_key(&self, kid: &str) -> bool {
        self.application_keys.contains_key(kid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn auth_config(secret: &str) -> AuthConfig {
        AuthConfig {
            issuer: "lubricentro".to_string(),
            algorithm: "HS256".to_string(),
            access_token_lifetime: "2h".to_string(),
            jwt_secret: SecretString::from(secret),
            application_keys: HashMap::new(),
        }
    }

    #[test]
    fn test_empty_secret_is_configuration_error() {
        let result = SigningKeys::from_config(&auth_config(""));
        assert!(matches!(result, Err(ConfigurationError::MissingSigningSecret)));
    }

    #[test]
    fn test_application_key_selected_by_kid() {
        let mut config = auth_config("default-secret");
        config
            .application_keys
            .insert("app-7".to_string(), SecretString::from("app-7-secret"));

        let keys = SigningKeys::from_config(&config).unwrap();
        assert!(keys.has_dedicated_key("app-7"));
        assert!(!keys.has_dedicated_key("app-8"));
        assert_eq!(keys.algorithm(), Algorithm::HS256);
    }
}
