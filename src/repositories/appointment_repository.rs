use crate::models::{Appointment, NewAppointment};
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

const APPOINTMENT_COLUMNS: &str =
    "id, customer_id, vehicle_id, scheduled_at, service, notes, created_at, updated_at";

pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Books an appointment. Returns `None` when the vehicle does not belong to the customer.
    pub async fn create_appointment(
        &self,
        customer_id: Uuid,
        appointment: &NewAppointment,
    ) -> Result<Option<Appointment>> {
        let created = sqlx::query_as::<_, Appointment>(&format!(
            "INSERT INTO appointments (id, customer_id, vehicle_id, scheduled_at, service, notes)
             SELECT $1, $2, v.id, $4, $5, $6 FROM vehicles v WHERE v.id = $3 AND v.customer_id = $2
             RETURNING {}",
            APPOINTMENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(customer_id)
        .bind(appointment.vehicle_id)
        .bind(appointment.scheduled_at)
        .bind(&appointment.service)
        .bind(&appointment.notes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn count_for_customer(&self, customer_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn list_for_customer(&self, customer_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Appointment>> {
        let appointments = sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {} FROM appointments WHERE customer_id = $1 ORDER BY scheduled_at, id LIMIT $2 OFFSET $3",
            APPOINTMENT_COLUMNS
        ))
        .bind(customer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }
}
