use jsonwebtoken::{decode_header, Algorithm};
use lubricentro_api::auth::{
    FixedClock, GrantContext, RandomTokenIds, SequentialTokenIds, TokenError, TokenIssuer,
};
use lubricentro_api::config::AuthConfig;
use secrecy::SecretString;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

const ISSUED_AT: i64 = 1_714_000_000;
const BASE64URL: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

fn test_auth_config() -> AuthConfig {
    AuthConfig {
        issuer: "lubricentro".to_string(),
        algorithm: "HS256".to_string(),
        access_token_lifetime: "2h".to_string(),
        jwt_secret: SecretString::from("integration-test-signing-secret"),
        application_keys: Default::default(),
    }
}

fn issuer_at(timestamp: i64) -> TokenIssuer {
    TokenIssuer::with_sources(
        &test_auth_config(),
        Arc::new(FixedClock::at_timestamp(timestamp).unwrap()),
        Arc::new(RandomTokenIds),
    )
    .unwrap()
}

/// Replaces the character at `index` with another base64url character whose leading bit differs.
fn flip_char(token: &str, index: usize) -> String {
    let mut bytes = token.as_bytes().to_vec();
    let position = BASE64URL.iter().position(|&c| c == bytes[index]).unwrap();
    bytes[index] = BASE64URL[position ^ 0b10_0000];
    String::from_utf8(bytes).unwrap()
}

#[test]
fn test_issued_token_matches_grant() {
    let issuer = issuer_at(ISSUED_AT);
    let signed = assert_ok!(issuer.issue_token(&GrantContext::new("user-42", "app-7")));

    let header = decode_header(&signed.token).unwrap();
    assert_eq!(header.alg, Algorithm::HS256);
    assert_eq!(header.kid.as_deref(), Some("app-7"));

    let claims = assert_ok!(issuer.verifier().verify(&signed.token));
    assert_eq!(claims.iss, "lubricentro");
    assert_eq!(claims.sub, "user-42");
    assert_eq!(claims.aud, "app-7");
    assert_eq!(claims.iat, ISSUED_AT);
    assert_eq!(claims.exp - claims.iat, 7200);
    assert_eq!(signed.key_id, "app-7");
}

#[test]
fn test_lifetime_is_two_hours_for_any_grant() {
    let issuer = issuer_at(ISSUED_AT);
    let verifier = issuer.verifier();

    for (owner, app) in [("1", "a"), ("user-42", "app-7"), ("9f1c", "mobile"), ("ñandú", "app with spaces")] {
        let signed = issuer.issue_token(&GrantContext::new(owner, app)).unwrap();
        let claims = verifier.verify(&signed.token).unwrap();

        assert_eq!(claims.exp - claims.iat, 7200);
        assert_eq!(claims.sub, owner);
        assert_eq!(claims.aud, app);
    }
}

#[test]
fn test_token_ids_are_unique() {
    let issuer = TokenIssuer::new(&test_auth_config()).unwrap();
    let mut seen = HashSet::new();

    for _ in 0..10_000 {
        let signed = issuer.issue_token(&GrantContext::new("user-42", "app-7")).unwrap();
        assert!(seen.insert(signed.claims.jti), "duplicate jti {}", signed.claims.jti);
    }
}

#[test]
fn test_injected_sources_make_tokens_reproducible() {
    let build = || {
        TokenIssuer::with_sources(
            &test_auth_config(),
            Arc::new(FixedClock::at_timestamp(ISSUED_AT).unwrap()),
            Arc::new(SequentialTokenIds::starting_at(1)),
        )
        .unwrap()
    };

    let first = build().issue_token(&GrantContext::new("user-42", "app-7")).unwrap();
    let second = build().issue_token(&GrantContext::new("user-42", "app-7")).unwrap();
    assert_eq!(first.token, second.token);
}

#[test]
fn test_any_tampered_byte_fails_signature() {
    let issuer = issuer_at(ISSUED_AT);
    let verifier = issuer.verifier();
    let signed = issuer.issue_token(&GrantContext::new("user-42", "app-7")).unwrap();

    for (index, byte) in signed.token.bytes().enumerate() {
        if byte == b'.' {
            continue;
        }
        let tampered = flip_char(&signed.token, index);
        assert_eq!(
            verifier.verify(&tampered),
            Err(TokenError::InvalidSignature),
            "tampering at byte {} was not detected",
            index
        );
    }
}

#[test]
fn test_any_replaced_byte_fails_signature() {
    let issuer = issuer_at(ISSUED_AT);
    let verifier = issuer.verifier();
    let signed = issuer.issue_token(&GrantContext::new("user-42", "app-7")).unwrap();

    for replacement in ['!', '.', '=', ' ', 'A', '~'] {
        for (index, original) in signed.token.char_indices() {
            if original == replacement {
                continue;
            }
            let mut tampered = signed.token.clone();
            tampered.replace_range(index..index + 1, &replacement.to_string());

            assert_eq!(
                verifier.verify(&tampered),
                Err(TokenError::InvalidSignature),
                "replacing byte {} with {:?} was not detected",
                index,
                replacement
            );
        }
    }
}

#[test]
fn test_expired_token_rejected_with_valid_signature() {
    let signed = issuer_at(ISSUED_AT)
        .issue_token(&GrantContext::new("user-42", "app-7"))
        .unwrap();

    let later = issuer_at(ISSUED_AT + 7200 + 1).verifier();
    assert_eq!(later.verify(&signed.token), Err(TokenError::Expired));

    let still_valid = issuer_at(ISSUED_AT + 3600).verifier();
    let claims = assert_ok!(still_valid.verify(&signed.token));
    assert_eq!(still_valid.expires_in(&claims), 3600);
}

#[test]
fn test_empty_identifiers_rejected() {
    let issuer = issuer_at(ISSUED_AT);

    let err = assert_err!(issuer.issue_token(&GrantContext::new("", "app-7")));
    assert!(matches!(err, TokenError::InvalidInput(_)));

    let err = assert_err!(issuer.issue_token(&GrantContext::new("   ", "app-7")));
    assert!(matches!(err, TokenError::InvalidInput(_)));

    let err = assert_err!(issuer.issue_token(&GrantContext::new("user-42", "")));
    assert!(matches!(err, TokenError::InvalidInput(_)));
}

#[test]
fn test_missing_signing_secret_fails_at_construction() {
    let mut config = test_auth_config();
    config.jwt_secret = SecretString::from("");
    assert!(TokenIssuer::new(&config).is_err());

    let mut config = test_auth_config();
    config.algorithm = "none".to_string();
    assert!(TokenIssuer::new(&config).is_err());
}
