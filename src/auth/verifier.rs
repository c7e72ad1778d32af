use crate::auth::claims::AccessTokenClaims;
use crate::auth::clock::Clock;
use crate::auth::errors::TokenError;
use crate::auth::keys::SigningKeys;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Validation};
use std::sync::Arc;
use tracing::debug;

const REQUIRED_CLAIMS: [&str; 4] = ["exp", "iss", "sub", "aud"];

/// Checks bearer tokens produced by [`crate::auth::TokenIssuer`].
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<SigningKeys>,
    issuer: String,
    clock: Arc<dyn Clock>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: Arc<SigningKeys>, issuer: String, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(keys.algorithm());
        // exp is checked against the injected clock, aud against kid, iss against our issuer
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = REQUIRED_CLAIMS.iter().map(|c| c.to_string()).collect();

        Self { keys, issuer, clock, validation }
    }

    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        check_shape(token)?;

        let header = decode_header(token).map_err(|e| {
            debug!("Rejecting token with undecodable header: {}", e);
            TokenError::InvalidSignature
        })?;

        if header.alg != self.keys.algorithm() {
            debug!("Rejecting token signed with {:?}", header.alg);
            return Err(TokenError::InvalidSignature);
        }

        // Without a kid the default key is tried, so a corrupted header still fails on the signature
        let kid = header.kid.unwrap_or_default();
        let claims = decode::<AccessTokenClaims>(token, &self.keys.for_key_id(&kid).decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(map_decode_error)?;

        if kid.is_empty() {
            return Err(TokenError::Malformed("missing kid header".to_string()));
        }
        if claims.iss != self.issuer {
            return Err(TokenError::ClaimMismatch(format!("unexpected issuer {}", claims.iss)));
        }
        if claims.aud != kid {
            return Err(TokenError::ClaimMismatch("audience does not match kid".to_string()));
        }
        if claims.sub.trim().is_empty() {
            return Err(TokenError::Malformed("empty subject".to_string()));
        }
        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Seconds left before `claims` expire, by this verifier's clock.
    pub fn expires_in(&self, claims: &AccessTokenClaims) -> i64 {
        claims.expires_in(self.clock.now())
    }
}

/// `eyJ` is base64url for `{"`, the first bytes of every JOSE header and JWT payload.
const JSON_OBJECT_PREFIX: &str = "eyJ";

/// A compact JWS is three non-empty base64url segments.
///
/// Input that breaks the shape but still resembles a JWS (two to four segments, with three
/// segments or a segment opening like a JSON object) is a damaged token and fails as a bad
/// signature. Anything else was never a token.
fn check_shape(token: &str) -> Result<(), TokenError> {
    let segments: Vec<&str> = token.split('.').collect();

    let is_base64url = |segment: &str| {
        !segment.is_empty()
            && segment
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    };
    if segments.len() == 3 && segments.iter().all(|segment| is_base64url(segment)) {
        return Ok(());
    }

    let resembles_jws = (2..=4).contains(&segments.len())
        && (segments.len() == 3 || segments.iter().any(|s| s.starts_with(JSON_OBJECT_PREFIX)));
    if resembles_jws {
        debug!("Rejecting damaged token with {} segments", segments.len());
        Err(TokenError::InvalidSignature)
    } else {
        Err(TokenError::Malformed(format!("expected 3 segments, found {}", segments.len())))
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::MissingAlgorithm
        | ErrorKind::Base64(_) => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::MissingRequiredClaim(claim) => TokenError::Malformed(format!("missing claim {}", claim)),
        ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            TokenError::Malformed("claims could not be decoded".to_string())
        }
        _ => TokenError::Malformed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::GrantContext;
    use crate::auth::clock::{FixedClock, RandomTokenIds};
    use crate::auth::issuer::TokenIssuer;
    use crate::config::AuthConfig;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use secrecy::SecretString;
    use serde_json::json;
    use std::collections::HashMap;

    const NOW: i64 = 1_700_000_000;

    fn auth_config(secret: &str) -> AuthConfig {
        AuthConfig {
            issuer: "lubricentro".to_string(),
            algorithm: "HS256".to_string(),
            access_token_lifetime: "2h".to_string(),
            jwt_secret: SecretString::from(secret),
            application_keys: HashMap::new(),
        }
    }

    fn issuer_at(config: &AuthConfig, now: i64) -> TokenIssuer {
        TokenIssuer::with_sources(
            config,
            Arc::new(FixedClock::at_timestamp(now).unwrap()),
            Arc::new(RandomTokenIds),
        )
        .unwrap()
    }

    fn hand_signed(header: Header, payload: serde_json::Value, secret: &str) -> String {
        encode(&header, &payload, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn kid_header(kid: &str) -> Header {
        let mut header = Header::default();
        header.kid = Some(kid.to_string());
        header
    }

    #[test]
    fn test_round_trip() {
        let issuer = issuer_at(&auth_config("secret"), NOW);
        let signed = issuer.issue_token(&GrantContext::new("user-42", "app-7")).unwrap();

        let claims = issuer.verifier().verify(&signed.token).unwrap();
        assert_eq!(claims, signed.claims);
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = auth_config("secret");
        let signed = issuer_at(&config, NOW)
            .issue_token(&GrantContext::new("user-42", "app-7"))
            .unwrap();

        let at_expiry = issuer_at(&config, NOW + 7_200).verifier();
        assert_eq!(at_expiry.verify(&signed.token), Err(TokenError::Expired));

        let just_before = issuer_at(&config, NOW + 7_199).verifier();
        assert!(just_before.verify(&signed.token).is_ok());
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let signed = issuer_at(&auth_config("secret-a"), NOW)
            .issue_token(&GrantContext::new("user-42", "app-7"))
            .unwrap();

        let other = issuer_at(&auth_config("secret-b"), NOW).verifier();
        assert_eq!(other.verify(&signed.token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_application_key_used_for_kid() {
        let mut config = auth_config("default-secret");
        config
            .application_keys
            .insert("app-7".to_string(), SecretString::from("app-7-secret"));
        let issuer = issuer_at(&config, NOW);

        let signed = issuer.issue_token(&GrantContext::new("user-42", "app-7")).unwrap();
        assert!(issuer.verifier().verify(&signed.token).is_ok());

        // the default key must not verify a token signed with the application key
        let default_only = issuer_at(&auth_config("default-secret"), NOW).verifier();
        assert_eq!(default_only.verify(&signed.token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let verifier = issuer_at(&auth_config("secret"), NOW).verifier();
        assert!(matches!(verifier.verify("not-a-token"), Err(TokenError::Malformed(_))));
        assert!(matches!(verifier.verify("a.b"), Err(TokenError::Malformed(_))));
        assert!(matches!(verifier.verify("a.b.c.d.e"), Err(TokenError::Malformed(_))));
        assert!(matches!(verifier.verify(""), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_damaged_token_is_invalid_signature() {
        let issuer = issuer_at(&auth_config("secret"), NOW);
        let verifier = issuer.verifier();
        let token = issuer.issue_token(&GrantContext::new("user-42", "app-7")).unwrap().token;

        assert_eq!(verifier.verify("a..c"), Err(TokenError::InvalidSignature));
        assert_eq!(verifier.verify("a.b.c!"), Err(TokenError::InvalidSignature));

        let first_dot = token.find('.').unwrap();
        let mut merged = token.clone();
        merged.replace_range(first_dot..=first_dot, "A");
        assert_eq!(verifier.verify(&merged), Err(TokenError::InvalidSignature));

        let mut split = token.clone();
        split.replace_range(0..1, ".");
        assert_eq!(verifier.verify(&split), Err(TokenError::InvalidSignature));

        let mut stray = token.clone();
        stray.replace_range(first_dot + 3..first_dot + 4, "!");
        assert_eq!(verifier.verify(&stray), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_missing_kid_is_malformed() {
        let token = hand_signed(
            Header::default(),
            json!({"iss": "lubricentro", "iat": NOW, "jti": uuid::Uuid::new_v4(), "sub": "u", "aud": "a", "exp": NOW + 60}),
            "secret",
        );
        let verifier = issuer_at(&auth_config("secret"), NOW).verifier();
        assert!(matches!(verifier.verify(&token), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_missing_jti_is_malformed() {
        let token = hand_signed(
            kid_header("a"),
            json!({"iss": "lubricentro", "iat": NOW, "sub": "u", "aud": "a", "exp": NOW + 60}),
            "secret",
        );
        let verifier = issuer_at(&auth_config("secret"), NOW).verifier();
        assert!(matches!(verifier.verify(&token), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_missing_exp_is_malformed() {
        let token = hand_signed(
            kid_header("a"),
            json!({"iss": "lubricentro", "iat": NOW, "jti": uuid::Uuid::new_v4(), "sub": "u", "aud": "a"}),
            "secret",
        );
        let verifier = issuer_at(&auth_config("secret"), NOW).verifier();
        assert!(matches!(verifier.verify(&token), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let token = hand_signed(
            kid_header("a"),
            json!({"iss": "someone-else", "iat": NOW, "jti": uuid::Uuid::new_v4(), "sub": "u", "aud": "a", "exp": NOW + 60}),
            "secret",
        );
        let verifier = issuer_at(&auth_config("secret"), NOW).verifier();
        assert!(matches!(verifier.verify(&token), Err(TokenError::ClaimMismatch(_))));
    }

    #[test]
    fn test_audience_must_match_kid() {
        let token = hand_signed(
            kid_header("app-7"),
            json!({"iss": "lubricentro", "iat": NOW, "jti": uuid::Uuid::new_v4(), "sub": "u", "aud": "app-8", "exp": NOW + 60}),
            "secret",
        );
        let verifier = issuer_at(&auth_config("secret"), NOW).verifier();
        assert!(matches!(verifier.verify(&token), Err(TokenError::ClaimMismatch(_))));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let mut header = kid_header("a");
        header.alg = jsonwebtoken::Algorithm::HS512;
        let token = hand_signed(
            header,
            json!({"iss": "lubricentro", "iat": NOW, "jti": uuid::Uuid::new_v4(), "sub": "u", "aud": "a", "exp": NOW + 60}),
            "secret",
        );
        let verifier = issuer_at(&auth_config("secret"), NOW).verifier();
        assert_eq!(verifier.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_expired_token_reports_signature() {
        let config = auth_config("secret");
        let signed = issuer_at(&config, NOW)
            .issue_token(&GrantContext::new("user-42", "app-7"))
            .unwrap();
        let mut tampered = signed.token.clone();
        let middle = tampered.find('.').unwrap() + 5;
        let replacement = if &tampered[middle..=middle] == "A" { "B" } else { "A" };
        tampered.replace_range(middle..=middle, replacement);

        let later = issuer_at(&config, NOW + 10_000).verifier();
        assert_eq!(later.verify(&tampered), Err(TokenError::InvalidSignature));
    }
}
