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
use crate::models::{NewVehicle, Vehicle, VehicleChanges};
use crate::pagination::{PageParams, Paginated, Pagination};
use crate::repositories::VehicleRepository;

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route(
            "/{id}",
            get(get_vehicle)
                .put(update_vehicle)
                .patch(update_vehicle)
                .delete(delete_vehicle),
        );

    Ok(router)
}

async fn list_vehicles(
    _owner: AuthenticatedOwner,
    State(app_state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<Vehicle>>, ApiError> {
    let vehicle_repo = VehicleRepository::new(app_state.database.pool().clone());

    let count = vehicle_repo.count_vehicles(None).await.map_err(ApiError::from_repository)?;
    let pagination = Pagination::new(&app_state.config.pagination, &params, count as u64)?;

    let vehicles = vehicle_repo
        .list_vehicles(None, pagination.limit(), pagination.offset())
        .await
        .map_err(ApiError::from_repository)?;

    Ok(Json(Paginated::new(vehicles, pagination)))
}

async fn get_vehicle(
    _owner: AuthenticatedOwner,
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, ApiError> {
    let vehicle_repo = VehicleRepository::new(app_state.database.pool().clone());

    vehicle_repo
        .get_vehicle(id)
        .await
        .map_err(ApiError::from_repository)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn create_vehicle(
    _owner: AuthenticatedOwner,
    State(app_state): State<AppState>,
    Json(payload): Json<NewVehicle>,
) -> Result<(StatusCode, Json<Vehicle>), ApiError> {
    payload.validate()?;

    let vehicle_repo = VehicleRepository::new(app_state.database.pool().clone());
    let vehicle = vehicle_repo
        .create_vehicle(&payload)
        .await
        .map_err(ApiError::from_repository)?;

    Ok((StatusCode::CREATED, Json(vehicle)))
}

async fn update_vehicle(
    _owner: AuthenticatedOwner,
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VehicleChanges>,
) -> Result<Json<Vehicle>, ApiError> {
    payload.validate()?;

    let vehicle_repo = VehicleRepository::new(app_state.database.pool().clone());
    if let Some(vehicle) = vehicle_repo
        .update_vehicle(id, &payload)
        .await
        .map_err(ApiError::from_repository)?
    {
        return Ok(Json(vehicle));
    }

    match vehicle_repo.get_vehicle(id).await.map_err(ApiError::from_repository)? {
        Some(_) => Err(ApiError::Conflict(
            "vehicle has appointments with its current customer".to_string(),
        )),
        None => Err(ApiError::NotFound),
    }
}

async fn delete_vehicle(
    _owner: AuthenticatedOwner,
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let vehicle_repo = VehicleRepository::new(app_state.database.pool().clone());

    if vehicle_repo.delete_vehicle(id).await.map_err(ApiError::from_repository)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
