use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    pub service: String,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAppointment {
    pub vehicle_id: Uuid,
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    #[validate(length(min = 1, max = 255))]
    pub service: String,
    pub notes: Option<String>,
}
