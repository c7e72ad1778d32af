use crate::models::{Customer, CustomerChanges, NewCustomer};
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

const CUSTOMER_COLUMNS: &str =
    "id, first_name, last_name, email, phone, document_number, created_at, updated_at";

pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer> {
        let created = sqlx::query_as::<_, Customer>(&format!(
            "INSERT INTO customers (id, first_name, last_name, email, phone, document_number) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            CUSTOMER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.document_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers WHERE id = $1",
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn count_customers(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn list_customers(&self, limit: i64, offset: i64) -> Result<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers ORDER BY last_name, first_name, id LIMIT $1 OFFSET $2",
            CUSTOMER_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn update_customer(&self, id: Uuid, changes: &CustomerChanges) -> Result<Option<Customer>> {
        let updated = sqlx::query_as::<_, Customer>(&format!(
            "UPDATE customers SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                document_number = COALESCE($6, document_number),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .bind(&changes.phone)
        .bind(&changes.document_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn delete_customer(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
