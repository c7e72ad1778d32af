use crate::models::User;
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, active) VALUES ($1, $2, $3, true) RETURNING id, email, password_hash, active, created_at, updated_at"
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, active, created_at, updated_at FROM users WHERE lower(email) = lower($1)"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Enables or disables sign-in for a user. Returns `None` when no user has that id.
    pub async fn update_user_status(&self, id: Uuid, active: bool) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET active = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING id, email, password_hash, active, created_at, updated_at",
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
