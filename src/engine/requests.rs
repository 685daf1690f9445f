use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::eligibility::validate_assignment;
use crate::engine::estimation;
use crate::engine::lifecycle::{self, LifecycleEvent};
use crate::error::AppError;
use crate::models::pricing::CostEstimation;
use crate::models::request::{DeliveryRequest, FeePayer, GeoPoint, RequestStatus};
use crate::state::AppState;

pub struct NewDeliveryRequest {
    pub order_id: Uuid,
    pub carrier_id: Uuid,
    pub sender_name: Option<String>,
    pub order_number: Option<String>,
    pub pickup_address: String,
    pub pickup: GeoPoint,
    pub delivery_address: String,
    pub dropoff: GeoPoint,
    pub distance_meters: u32,
    pub estimated_cost: String,
    pub fee_payer: FeePayer,
}

/// Creates a `PENDING` request from frozen estimation outputs. Fails with
/// `DuplicateRequest` while the order still has a non-terminal request.
pub fn create_request(
    state: &AppState,
    new: NewDeliveryRequest,
) -> Result<DeliveryRequest, AppError> {
    if new.pickup_address.trim().is_empty() || new.delivery_address.trim().is_empty() {
        return Err(AppError::Validation(
            "pickup and delivery addresses are required".to_string(),
        ));
    }
    if !crate::geo::in_bounds(&new.pickup) || !crate::geo::in_bounds(&new.dropoff) {
        return Err(AppError::InvalidCoordinates(
            "pickup or delivery coordinates out of range".to_string(),
        ));
    }
    if !state.carriers.contains_key(&new.carrier_id) {
        return Err(AppError::CarrierNotFound(new.carrier_id));
    }

    let open_for_order = state
        .requests
        .iter()
        .any(|entry| entry.order_id == new.order_id && !entry.status.is_terminal());
    if open_for_order {
        return Err(AppError::DuplicateRequest(new.order_id));
    }

    let now = Utc::now();
    let request = DeliveryRequest {
        id: Uuid::new_v4(),
        order_id: new.order_id,
        carrier_id: new.carrier_id,
        status: RequestStatus::Pending,
        sender_name: new.sender_name,
        order_number: new.order_number,
        pickup_address: new.pickup_address,
        delivery_address: new.delivery_address,
        pickup: new.pickup,
        dropoff: new.dropoff,
        distance_meters: new.distance_meters,
        estimated_cost: new.estimated_cost,
        fee_payer: new.fee_payer,
        assigned_vehicle_id: None,
        delivery_code: lifecycle::generate_delivery_code(state.delivery_code_len),
        created_at: now,
        updated_at: now,
    };

    state.requests.insert(request.id, request.clone());
    state.metrics.open_requests.inc();
    let _ = state.lifecycle_events_tx.send(request.courier_view());

    info!(request_id = %request.id, order_id = %request.order_id, "delivery request created");
    Ok(request)
}

/// Prices a delivery for one carrier. Nothing is stored; the caller copies
/// the frozen outputs into `create_request`.
pub fn estimate_for_carrier(
    state: &AppState,
    pickup: &GeoPoint,
    dropoff: &GeoPoint,
    carrier_id: Uuid,
) -> Result<CostEstimation, AppError> {
    let carrier = state
        .carriers
        .get(&carrier_id)
        .ok_or(AppError::CarrierNotFound(carrier_id))?;

    let result = estimation::estimate(&carrier, pickup, dropoff);
    let outcome = if result.is_ok() { "success" } else { "error" };
    state
        .metrics
        .estimates_total
        .with_label_values(&[outcome])
        .inc();
    result
}

/// Applies a lifecycle event under the request's store entry lock, so
/// concurrent accepts resolve to exactly one winner. Returns the redacted
/// courier view of the updated request.
pub fn apply_transition(
    state: &AppState,
    request_id: Uuid,
    event: LifecycleEvent,
) -> Result<DeliveryRequest, AppError> {
    let mut entry = state
        .requests
        .get_mut(&request_id)
        .ok_or_else(|| AppError::NotFound(format!("request {} not found", request_id)))?;

    // Vehicle guards run under the entry lock so a deactivation racing the
    // accept cannot slip in between the check and the transition. Lock
    // order is requests then vehicles everywhere.
    if let LifecycleEvent::Accept { vehicle_id } = &event {
        let vehicle = state
            .vehicles
            .get(vehicle_id)
            .ok_or_else(|| AppError::InvalidVehicle(format!("vehicle {} not found", vehicle_id)))?;
        validate_assignment(&vehicle, entry.carrier_id)?;
    }

    let result = lifecycle::transition(&mut entry, &event);
    let outcome = if result.is_ok() { "success" } else { "error" };
    state
        .metrics
        .transitions_total
        .with_label_values(&[event.name(), outcome])
        .inc();

    match result {
        Ok(()) => {
            if entry.status.is_terminal() {
                state.metrics.open_requests.dec();
            }
            let view = entry.courier_view();
            drop(entry);
            let _ = state.lifecycle_events_tx.send(view.clone());
            info!(request_id = %request_id, event = event.name(), status = ?view.status, "transition applied");
            Ok(view)
        }
        Err(err) => {
            warn!(request_id = %request_id, event = event.name(), error = %err, "transition refused");
            Err(err)
        }
    }
}

/// `PENDING` requests addressed to this courier, oldest first.
pub fn list_incoming(state: &AppState, courier_id: Uuid) -> Vec<DeliveryRequest> {
    list_where(state, courier_id, |status| status == RequestStatus::Pending)
}

/// Requests this courier is currently working: `ACCEPTED` or `PICKED_UP`.
pub fn list_active(state: &AppState, courier_id: Uuid) -> Vec<DeliveryRequest> {
    list_where(state, courier_id, |status| {
        matches!(status, RequestStatus::Accepted | RequestStatus::PickedUp)
    })
}

fn list_where(
    state: &AppState,
    courier_id: Uuid,
    keep: impl Fn(RequestStatus) -> bool,
) -> Vec<DeliveryRequest> {
    let mut requests: Vec<DeliveryRequest> = state
        .requests
        .iter()
        .filter(|entry| entry.carrier_id == courier_id && keep(entry.status))
        .map(|entry| entry.courier_view())
        .collect();

    requests.sort_by_key(|r| r.created_at);
    requests
}
