use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::lifecycle::LifecycleEvent;
use crate::engine::requests::{self, NewDeliveryRequest};
use crate::error::AppError;
use crate::models::pricing::CostEstimation;
use crate::models::request::{DeliveryRequest, FeePayer, GeoPoint};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/requests", post(create_request))
        .route("/requests/:id", get(get_request))
        .route("/requests/:id/accept", post(accept))
        .route("/requests/:id/reject", post(reject))
        .route("/requests/:id/pickup", post(pickup))
        .route("/requests/:id/complete", post(complete))
        .route("/estimate", post(estimate))
        .route("/couriers/:id/requests/incoming", get(list_incoming))
        .route("/couriers/:id/requests/active", get(list_active))
}

#[derive(Deserialize)]
pub struct CreateRequestBody {
    pub order_id: Uuid,
    pub carrier_id: Uuid,
    pub sender_name: Option<String>,
    pub order_number: Option<String>,
    pub pickup_address: String,
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub delivery_address: String,
    pub delivery_lat: f64,
    pub delivery_lng: f64,
    pub distance_meters: u32,
    pub estimated_cost: String,
    pub fee_payer: FeePayer,
}

#[derive(Deserialize)]
pub struct EstimateBody {
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub delivery_lat: f64,
    pub delivery_lng: f64,
    pub carrier_id: Uuid,
}

#[derive(Deserialize)]
pub struct AcceptBody {
    pub vehicle_id: Uuid,
}

#[derive(Deserialize)]
pub struct CompleteBody {
    pub delivery_code: String,
}

/// Merchant-side create: freezes the estimation outputs onto a new
/// `PENDING` request. The response is the sender view and carries the
/// delivery code.
async fn create_request(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateRequestBody>,
) -> Result<Json<DeliveryRequest>, AppError> {
    let request = requests::create_request(
        &state,
        NewDeliveryRequest {
            order_id: body.order_id,
            carrier_id: body.carrier_id,
            sender_name: body.sender_name,
            order_number: body.order_number,
            pickup_address: body.pickup_address,
            pickup: GeoPoint {
                lat: body.pickup_lat,
                lng: body.pickup_lng,
            },
            delivery_address: body.delivery_address,
            dropoff: GeoPoint {
                lat: body.delivery_lat,
                lng: body.delivery_lng,
            },
            distance_meters: body.distance_meters,
            estimated_cost: body.estimated_cost,
            fee_payer: body.fee_payer,
        },
    )?;

    Ok(Json(request))
}

async fn get_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryRequest>, AppError> {
    let request = state
        .requests
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("request {} not found", id)))?;

    Ok(Json(request.value().clone()))
}

async fn estimate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EstimateBody>,
) -> Result<Json<CostEstimation>, AppError> {
    let estimation = requests::estimate_for_carrier(
        &state,
        &GeoPoint {
            lat: body.pickup_lat,
            lng: body.pickup_lng,
        },
        &GeoPoint {
            lat: body.delivery_lat,
            lng: body.delivery_lng,
        },
        body.carrier_id,
    )?;

    Ok(Json(estimation))
}

async fn accept(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<AcceptBody>,
) -> Result<Json<DeliveryRequest>, AppError> {
    let request = requests::apply_transition(
        &state,
        id,
        LifecycleEvent::Accept {
            vehicle_id: body.vehicle_id,
        },
    )?;
    Ok(Json(request))
}

async fn reject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryRequest>, AppError> {
    let request = requests::apply_transition(&state, id, LifecycleEvent::Reject)?;
    Ok(Json(request))
}

async fn pickup(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryRequest>, AppError> {
    let request = requests::apply_transition(&state, id, LifecycleEvent::Pickup)?;
    Ok(Json(request))
}

async fn complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<CompleteBody>,
) -> Result<Json<DeliveryRequest>, AppError> {
    let request = requests::apply_transition(
        &state,
        id,
        LifecycleEvent::Complete {
            code: body.delivery_code,
        },
    )?;
    Ok(Json(request))
}

async fn list_incoming(
    State(state): State<Arc<AppState>>,
    Path(courier_id): Path<Uuid>,
) -> Json<Vec<DeliveryRequest>> {
    Json(requests::list_incoming(&state, courier_id))
}

async fn list_active(
    State(state): State<Arc<AppState>>,
    Path(courier_id): Path<Uuid>,
) -> Json<Vec<DeliveryRequest>> {
    Json(requests::list_active(&state, courier_id))
}
