use uuid::Uuid;

use crate::error::AppError;
use crate::models::vehicle::Vehicle;

/// Subset of a courier's fleet that may be offered for accepting a job.
/// An empty result means accept must not be offered at all.
pub fn eligible_vehicles(
    vehicles: impl IntoIterator<Item = Vehicle>,
    courier_id: Uuid,
) -> Vec<Vehicle> {
    vehicles
        .into_iter()
        .filter(|v| v.courier_id == courier_id && v.is_active)
        .collect()
}

/// Server-side accept guard: the chosen vehicle must belong to the carrier
/// the request is addressed to, and must be active.
pub fn validate_assignment(vehicle: &Vehicle, carrier_id: Uuid) -> Result<(), AppError> {
    if vehicle.courier_id != carrier_id {
        return Err(AppError::InvalidVehicle(format!(
            "vehicle {} does not belong to carrier {}",
            vehicle.id, carrier_id
        )));
    }
    if !vehicle.is_active {
        return Err(AppError::InvalidVehicle(format!(
            "vehicle {} is inactive",
            vehicle.id
        )));
    }
    Ok(())
}
