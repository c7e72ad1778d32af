use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    pub license_plate: String,
    pub mileage: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewVehicle {
    pub customer_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub brand: String,
    #[validate(length(min = 1, max = 100))]
    pub model: String,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    #[validate(length(min = 1, max = 20))]
    pub license_plate: String,
    #[validate(range(min = 0))]
    pub mileage: Option<i32>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VehicleChanges {
    pub customer_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100))]
    pub brand: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    #[validate(length(min = 1, max = 20))]
    pub license_plate: Option<String>,
    #[validate(range(min = 0))]
    pub mileage: Option<i32>,
}
