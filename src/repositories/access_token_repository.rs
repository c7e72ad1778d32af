use crate::auth::claims::AccessTokenClaims;
use crate::models::AccessTokenRecord;
use anyhow::{Context, Result};
use chrono::DateTime;
use sqlx::PgPool;
use uuid::Uuid;

/// Issued-token store used for revocation and token info.
pub struct AccessTokenRepository {
    pool: PgPool,
}

impl AccessTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record_issued(&self, claims: &AccessTokenClaims, application_id: Uuid) -> Result<AccessTokenRecord> {
        let issued_at = DateTime::from_timestamp(claims.iat, 0).context("iat out of range")?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).context("exp out of range")?;

        let record = sqlx::query_as::<_, AccessTokenRecord>(
            "INSERT INTO oauth_access_tokens (jti, resource_owner_id, application_id, issued_at, expires_at) VALUES ($1, $2, $3, $4, $5) RETURNING jti, resource_owner_id, application_id, issued_at, expires_at, revoked_at"
        )
        .bind(claims.jti)
        .bind(&claims.sub)
        .bind(application_id)
        .bind(issued_at)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn find_by_jti(&self, jti: Uuid) -> Result<Option<AccessTokenRecord>> {
        let record = sqlx::query_as::<_, AccessTokenRecord>(
            "SELECT jti, resource_owner_id, application_id, issued_at, expires_at, revoked_at FROM oauth_access_tokens WHERE jti = $1"
        )
        .bind(jti)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Marks the token revoked. Returns false when no live record matched.
    pub async fn revoke(&self, jti: Uuid, application_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE oauth_access_tokens SET revoked_at = NOW() WHERE jti = $1 AND application_id = $2 AND revoked_at IS NULL"
        )
        .bind(jti)
        .bind(application_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Drops records that expired before `before`. Returns how many were removed.
    pub async fn delete_expired(&self, before: DateTime<chrono::Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM oauth_access_tokens WHERE expires_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
