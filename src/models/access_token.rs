use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Issuance record of an access token, kept for revocation and audit.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct AccessTokenRecord {
    pub jti: Uuid,
    pub resource_owner_id: String,
    pub application_id: Uuid,
    pub issued_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub revoked_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl AccessTokenRecord {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}
