use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, patch};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::vehicle::{Vehicle, VehicleType};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/couriers/:id/vehicles",
            get(list_vehicles).post(create_vehicle),
        )
        .route("/vehicles/:id", patch(update_vehicle).delete(delete_vehicle))
        .route("/vehicles/:id/active", patch(set_active))
}

#[derive(Deserialize)]
pub struct CreateVehicleBody {
    pub vehicle_type: VehicleType,
    pub brand: String,
    pub model: String,
    pub license_plate: String,
    pub capacity: String,
}

#[derive(Deserialize)]
pub struct UpdateVehicleBody {
    pub vehicle_type: Option<VehicleType>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub license_plate: Option<String>,
    pub capacity: Option<String>,
}

#[derive(Deserialize)]
pub struct SetActiveBody {
    pub is_active: bool,
}

async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    Path(courier_id): Path<Uuid>,
    Json(body): Json<CreateVehicleBody>,
) -> Result<Json<Vehicle>, AppError> {
    if body.license_plate.trim().is_empty() {
        return Err(AppError::Validation(
            "license plate cannot be empty".to_string(),
        ));
    }

    let vehicle = Vehicle {
        id: Uuid::new_v4(),
        courier_id,
        vehicle_type: body.vehicle_type,
        brand: body.brand,
        model: body.model,
        license_plate: body.license_plate,
        capacity: body.capacity,
        is_active: true,
        created_at: Utc::now(),
    };

    state.vehicles.insert(vehicle.id, vehicle.clone());
    Ok(Json(vehicle))
}

async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    Path(courier_id): Path<Uuid>,
) -> Json<Vec<Vehicle>> {
    let mut vehicles: Vec<Vehicle> = state
        .vehicles
        .iter()
        .filter(|entry| entry.courier_id == courier_id)
        .map(|entry| entry.clone())
        .collect();
    vehicles.sort_by_key(|v| v.created_at);
    Json(vehicles)
}

async fn update_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateVehicleBody>,
) -> Result<Json<Vehicle>, AppError> {
    let mut vehicle = state
        .vehicles
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("vehicle {} not found", id)))?;

    if let Some(vehicle_type) = body.vehicle_type {
        vehicle.vehicle_type = vehicle_type;
    }
    if let Some(brand) = body.brand {
        vehicle.brand = brand;
    }
    if let Some(model) = body.model {
        vehicle.model = model;
    }
    if let Some(license_plate) = body.license_plate {
        if license_plate.trim().is_empty() {
            return Err(AppError::Validation(
                "license plate cannot be empty".to_string(),
            ));
        }
        vehicle.license_plate = license_plate;
    }
    if let Some(capacity) = body.capacity {
        vehicle.capacity = capacity;
    }

    Ok(Json(vehicle.clone()))
}

/// Toggles assignment eligibility without deleting the vehicle.
async fn set_active(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetActiveBody>,
) -> Result<Json<Vehicle>, AppError> {
    let mut vehicle = state
        .vehicles
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("vehicle {} not found", id)))?;

    vehicle.is_active = body.is_active;
    Ok(Json(vehicle.clone()))
}

async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, AppError> {
    let (_, vehicle) = state
        .vehicles
        .remove(&id)
        .ok_or_else(|| AppError::NotFound(format!("vehicle {} not found", id)))?;

    Ok(Json(vehicle))
}
