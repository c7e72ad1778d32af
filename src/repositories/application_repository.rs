use crate::models::Application;
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_application(
        &self,
        name: &str,
        uid: &str,
        secret_hash: &str,
        redirect_uri: Option<&str>,
    ) -> Result<Application> {
        let application = sqlx::query_as::<_, Application>(
            "INSERT INTO oauth_applications (id, name, uid, secret_hash, redirect_uri, confidential) VALUES ($1, $2, $3, $4, $5, true) RETURNING id, name, uid, secret_hash, redirect_uri, confidential, created_at, updated_at"
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(uid)
        .bind(secret_hash)
        .bind(redirect_uri)
        .fetch_one(&self.pool)
        .await?;

        Ok(application)
    }

    pub async fn find_by_uid(&self, uid: &str) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(
            "SELECT id, name, uid, secret_hash, redirect_uri, confidential, created_at, updated_at FROM oauth_applications WHERE uid = $1"
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    pub async fn list_applications(&self) -> Result<Vec<Application>> {
        let applications = sqlx::query_as::<_, Application>(
            "SELECT id, name, uid, secret_hash, redirect_uri, confidential, created_at, updated_at FROM oauth_applications ORDER BY created_at DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }
}
