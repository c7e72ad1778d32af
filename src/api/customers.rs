use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::auth::extractors::{AppState, AuthenticatedOwner};
use crate::models::{Appointment, Customer, CustomerChanges, NewAppointment, NewCustomer, Vehicle};
use crate::pagination::{PageParams, Paginated, Pagination};
use crate::repositories::{AppointmentRepository, CustomerRepository, VehicleRepository};

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/{id}",
            get(get_customer)
                .put(update_customer)
                .patch(update_customer)
                .delete(delete_customer),
        )
        .route("/{id}/vehicles", get(list_customer_vehicles))
        .route(
            "/{id}/appointments",
            get(list_customer_appointments).post(create_customer_appointment),
        );

    Ok(router)
}

async fn list_customers(
    _owner: AuthenticatedOwner,
    State(app_state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<Customer>>, ApiError> {
    let customer_repo = CustomerRepository::new(app_state.database.pool().clone());

    let count = customer_repo.count_customers().await.map_err(ApiError::from_repository)?;
    let pagination = Pagination::new(&app_state.config.pagination, &params, count as u64)?;

    let customers = customer_repo
        .list_customers(pagination.limit(), pagination.offset())
        .await
        .map_err(ApiError::from_repository)?;

    Ok(Json(Paginated::new(customers, pagination)))
}

async fn get_customer(
    _owner: AuthenticatedOwner,
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, ApiError> {
    let customer_repo = CustomerRepository::new(app_state.database.pool().clone());

    customer_repo
        .get_customer(id)
        .await
        .map_err(ApiError::from_repository)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn create_customer(
    _owner: AuthenticatedOwner,
    State(app_state): State<AppState>,
    Json(payload): Json<NewCustomer>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    payload.validate()?;

    let customer_repo = CustomerRepository::new(app_state.database.pool().clone());
    let customer = customer_repo
        .create_customer(&payload)
        .await
        .map_err(ApiError::from_repository)?;

    Ok((StatusCode::CREATED, Json(customer)))
}

async fn update_customer(
    _owner: AuthenticatedOwner,
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerChanges>,
) -> Result<Json<Customer>, ApiError> {
    payload.validate()?;

    let customer_repo = CustomerRepository::new(app_state.database.pool().clone());
    customer_repo
        .update_customer(id, &payload)
        .await
        .map_err(ApiError::from_repository)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn delete_customer(
    _owner: AuthenticatedOwner,
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let customer_repo = CustomerRepository::new(app_state.database.pool().clone());

    if customer_repo.delete_customer(id).await.map_err(ApiError::from_repository)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

async fn list_customer_vehicles(
    _owner: AuthenticatedOwner,
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<Vehicle>>, ApiError> {
    ensure_customer_exists(&app_state, id).await?;

    let vehicle_repo = VehicleRepository::new(app_state.database.pool().clone());
    let count = vehicle_repo.count_vehicles(Some(id)).await.map_err(ApiError::from_repository)?;
    let pagination = Pagination::new(&app_state.config.pagination, &params, count as u64)?;

    let vehicles = vehicle_repo
        .list_vehicles(Some(id), pagination.limit(), pagination.offset())
        .await
        .map_err(ApiError::from_repository)?;

    Ok(Json(Paginated::new(vehicles, pagination)))
}

async fn list_customer_appointments(
    _owner: AuthenticatedOwner,
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<Appointment>>, ApiError> {
    ensure_customer_exists(&app_state, id).await?;

    let appointment_repo = AppointmentRepository::new(app_state.database.pool().clone());
    let count = appointment_repo
        .count_for_customer(id)
        .await
        .map_err(ApiError::from_repository)?;
    let pagination = Pagination::new(&app_state.config.pagination, &params, count as u64)?;

    let appointments = appointment_repo
        .list_for_customer(id, pagination.limit(), pagination.offset())
        .await
        .map_err(ApiError::from_repository)?;

    Ok(Json(Paginated::new(appointments, pagination)))
}

async fn create_customer_appointment(
    _owner: AuthenticatedOwner,
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewAppointment>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    payload.validate()?;
    ensure_customer_exists(&app_state, id).await?;

    let appointment_repo = AppointmentRepository::new(app_state.database.pool().clone());
    let appointment = appointment_repo
        .create_appointment(id, &payload)
        .await
        .map_err(ApiError::from_repository)?
        .ok_or_else(|| ApiError::Unprocessable("vehicle does not belong to this customer".to_string()))?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn ensure_customer_exists(app_state: &AppState, id: Uuid) -> Result<(), ApiError> {
    let customer_repo = CustomerRepository::new(app_state.database.pool().clone());
    if customer_repo.exists(id).await.map_err(ApiError::from_repository)? {
        Ok(())
    } else {
        Err(ApiError::NotFound)
    }
}
