use anyhow::Result;
use axum::{
    extract::State,
    http::HeaderMap,
    response::Json,
    routing::{get, post},
    Form, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::auth::claims::GrantContext;
use crate::auth::extractors::{AppState, AuthenticatedOwner};
use crate::auth::password::{verify_password, DUMMY_HASH};
use crate::auth::AuthError;
use crate::models::Application;
use crate::repositories::{AccessTokenRepository, ApplicationRepository, UserRepository};

const PASSWORD_GRANT: &str = "password";

#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    pub grant_type: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub created_at: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct RevokeRequest {
    pub token: Option<String>,
    pub token_type_hint: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenInfoResponse {
    pub resource_owner_id: String,
    pub application: ApplicationInfo,
    pub token_id: String,
    pub expires_in: i64,
    pub created_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub uid: String,
}

struct ClientCredentials {
    client_id: String,
    client_secret: String,
}

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/token", post(issue_token))
        .route("/revoke", post(revoke_token))
        .route("/token/info", get(token_info));

    Ok(router)
}

/// Resource owner password credentials grant (RFC 6749 section 4.3).
async fn issue_token(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Form(req): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let grant_type = non_empty(req.grant_type.as_deref())
        .ok_or_else(|| AuthError::InvalidRequest("grant_type is required".to_string()))?;
    if grant_type != PASSWORD_GRANT {
        return Err(AuthError::UnsupportedGrantType(grant_type.to_string()));
    }

    let credentials = client_credentials(&headers, req.client_id.as_deref(), req.client_secret.as_deref())?;
    let username = non_empty(req.username.as_deref())
        .ok_or_else(|| AuthError::InvalidRequest("username is required".to_string()))?;
    let password = not_blank(req.password.as_deref())
        .ok_or_else(|| AuthError::InvalidRequest("password is required".to_string()))?;

    let application = authenticate_client(&app_state, &credentials).await?;

    let user_repo = UserRepository::new(app_state.database.pool().clone());
    let user = user_repo
        .find_by_email(username)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

    let hash = user.as_ref().map(|u| u.password_hash.as_str()).unwrap_or(DUMMY_HASH);
    let password_ok = verify_password(password, hash).map_err(|e| {
        error!("Stored password hash could not be parsed: {}", e);
        AuthError::InvalidGrant
    })?;

    let user = match user {
        Some(user) if password_ok && user.active => user,
        Some(user) if password_ok => {
            warn!("Inactive user {} attempted to sign in", user.id);
            return Err(AuthError::InvalidGrant);
        }
        _ => return Err(AuthError::InvalidGrant),
    };

    let resource_owner_id = user.id.to_string();
    let signed = app_state
        .token_issuer
        .issue_token(&GrantContext::new(&resource_owner_id, &application))?;

    let token_repo = AccessTokenRepository::new(app_state.database.pool().clone());
    token_repo
        .record_issued(&signed.claims, application.id)
        .await
        .map_err(|e| {
            error!("Failed to record issued token {}: {:?}", signed.claims.jti, e);
            AuthError::DatabaseError(e.to_string())
        })?;

    info!(
        jti = %signed.claims.jti,
        sub = %signed.claims.sub,
        aud = %signed.claims.aud,
        "Access token granted"
    );

    Ok(Json(TokenResponse {
        expires_in: signed.claims.lifetime_secs(),
        created_at: signed.claims.iat,
        token_type: "Bearer".to_string(),
        access_token: signed.token,
    }))
}

/// Token revocation (RFC 7009). Unknown or already invalid tokens still answer 200.
async fn revoke_token(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Form(req): Form<RevokeRequest>,
) -> Result<Json<Value>, AuthError> {
    let token = non_empty(req.token.as_deref())
        .ok_or_else(|| AuthError::InvalidRequest("token is required".to_string()))?;
    let credentials = client_credentials(&headers, req.client_id.as_deref(), req.client_secret.as_deref())?;
    let application = authenticate_client(&app_state, &credentials).await?;

    let claims = match app_state.token_verifier.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            info!("Revocation requested for a token that does not verify: {}", e);
            return Ok(Json(json!({})));
        }
    };

    if claims.aud != application.uid {
        warn!("Client {} tried to revoke a token issued to {}", application.uid, claims.aud);
        return Err(AuthError::UnauthorizedClient);
    }

    let token_repo = AccessTokenRepository::new(app_state.database.pool().clone());
    let revoked = token_repo
        .revoke(claims.jti, application.id)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

    if revoked {
        info!(jti = %claims.jti, "Access token revoked");
    }

    Ok(Json(json!({})))
}

async fn token_info(
    owner: AuthenticatedOwner,
    State(app_state): State<AppState>,
) -> Result<Json<TokenInfoResponse>, AuthError> {
    let expires_in = app_state.token_verifier.expires_in(&owner.claims);

    Ok(Json(TokenInfoResponse {
        resource_owner_id: owner.claims.sub,
        application: ApplicationInfo { uid: owner.claims.aud },
        token_id: owner.claims.jti.to_string(),
        expires_in,
        created_at: owner.claims.iat,
    }))
}

/// Client credentials from HTTP Basic auth, falling back to the request body.
fn client_credentials(
    headers: &HeaderMap,
    body_id: Option<&str>,
    body_secret: Option<&str>,
) -> Result<ClientCredentials, AuthError> {
    if let Some(value) = headers.get("authorization") {
        let value = value.to_str().map_err(|_| AuthError::InvalidClient)?;
        if let Some((scheme, encoded)) = value.split_once(' ') {
            if scheme.eq_ignore_ascii_case("basic") {
                return parse_basic_credentials(encoded.trim());
            }
        }
    }

    match (non_empty(body_id), not_blank(body_secret)) {
        (Some(id), Some(secret)) => Ok(ClientCredentials {
            client_id: id.to_string(),
            client_secret: secret.to_string(),
        }),
        _ => Err(AuthError::InvalidClient),
    }
}

fn parse_basic_credentials(encoded: &str) -> Result<ClientCredentials, AuthError> {
    let decoded = STANDARD.decode(encoded).map_err(|_| AuthError::InvalidClient)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::InvalidClient)?;
    let (id, secret) = decoded.split_once(':').ok_or(AuthError::InvalidClient)?;

    match (non_empty(Some(id)), not_blank(Some(secret))) {
        (Some(id), Some(secret)) => Ok(ClientCredentials {
            client_id: id.to_string(),
            client_secret: secret.to_string(),
        }),
        _ => Err(AuthError::InvalidClient),
    }
}

async fn authenticate_client(app_state: &AppState, credentials: &ClientCredentials) -> Result<Application, AuthError> {
    let app_repo = ApplicationRepository::new(app_state.database.pool().clone());
    let application = app_repo
        .find_by_uid(&credentials.client_id)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

    // Unknown clients are still checked against a hash
    let hash = application.as_ref().map(|a| a.secret_hash.as_str()).unwrap_or(DUMMY_HASH);
    let secret_ok = verify_password(&credentials.client_secret, hash).unwrap_or(false);

    match application {
        Some(application) if secret_ok => Ok(application),
        _ => {
            warn!("Client authentication failed for {}", credentials.client_id);
            Err(AuthError::InvalidClient)
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Like [`non_empty`] but keeps surrounding whitespace, which is part of a password or secret.
fn not_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
