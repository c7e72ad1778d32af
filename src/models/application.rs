use crate::auth::claims::ClientApplication;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered OAuth client.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub name: String,
    pub uid: String,
    #[serde(skip_serializing)]
    pub secret_hash: String,
    pub redirect_uri: Option<String>,
    pub confidential: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ClientApplication for Application {
    fn uid(&self) -> &str {
        &self.uid
    }
}
