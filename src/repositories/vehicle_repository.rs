use crate::models::{NewVehicle, Vehicle, VehicleChanges};
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

const VEHICLE_COLUMNS: &str =
    "id, customer_id, brand, model, year, license_plate, mileage, created_at, updated_at";

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle> {
        let created = sqlx::query_as::<_, Vehicle>(&format!(
            "INSERT INTO vehicles (id, customer_id, brand, model, year, license_plate, mileage) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            VEHICLE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(vehicle.customer_id)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(normalize_plate(&vehicle.license_plate))
        .bind(vehicle.mileage)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn get_vehicle(&self, id: Uuid) -> Result<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {} FROM vehicles WHERE id = $1",
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn count_vehicles(&self, customer_id: Option<Uuid>) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM vehicles WHERE ($1::uuid IS NULL OR customer_id = $1)",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Lists vehicles, optionally only those owned by `customer_id`.
    pub async fn list_vehicles(&self, customer_id: Option<Uuid>, limit: i64, offset: i64) -> Result<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {} FROM vehicles
             WHERE ($1::uuid IS NULL OR customer_id = $1)
             ORDER BY created_at DESC, id
             LIMIT $2 OFFSET $3",
            VEHICLE_COLUMNS
        ))
        .bind(customer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    /// Applies the given changes. A vehicle with appointments keeps its customer, so moving it
    /// updates nothing and returns `None` just like a missing id.
    pub async fn update_vehicle(&self, id: Uuid, changes: &VehicleChanges) -> Result<Option<Vehicle>> {
        let updated = sqlx::query_as::<_, Vehicle>(&format!(
            "UPDATE vehicles SET
                customer_id = COALESCE($2, customer_id),
                brand = COALESCE($3, brand),
                model = COALESCE($4, model),
                year = COALESCE($5, year),
                license_plate = COALESCE($6, license_plate),
                mileage = COALESCE($7, mileage),
                updated_at = NOW()
             WHERE id = $1
               AND ($2::uuid IS NULL
                    OR $2 = customer_id
                    OR NOT EXISTS (SELECT 1 FROM appointments a WHERE a.vehicle_id = $1))
             RETURNING {}",
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .bind(changes.customer_id)
        .bind(&changes.brand)
        .bind(&changes.model)
        .bind(changes.year)
        .bind(changes.license_plate.as_deref().map(normalize_plate))
        .bind(changes.mileage)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn delete_vehicle(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Plates are stored upper-case without surrounding or inner spaces.
pub fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}
