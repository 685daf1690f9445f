use std::sync::Arc;

use uuid::Uuid;

use crate::engine::lifecycle::LifecycleEvent;
use crate::engine::requests::{self, NewDeliveryRequest};
use crate::error::AppError;
use crate::models::pricing::CostEstimation;
use crate::models::request::{DeliveryRequest, GeoPoint};
use crate::models::vehicle::Vehicle;
use crate::state::AppState;

pub struct EstimateParams {
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub carrier_id: Uuid,
}

/// The repository operations the lifecycle client consumes. Owns no state;
/// every call marshals one request to the backend and returns its verdict.
pub trait DeliveryGateway {
    fn list_incoming(
        &self,
        courier_id: Uuid,
    ) -> impl Future<Output = Result<Vec<DeliveryRequest>, AppError>> + Send;

    fn list_active(
        &self,
        courier_id: Uuid,
    ) -> impl Future<Output = Result<Vec<DeliveryRequest>, AppError>> + Send;

    fn list_vehicles(
        &self,
        courier_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Vehicle>, AppError>> + Send;

    fn accept(
        &self,
        request_id: Uuid,
        vehicle_id: Uuid,
    ) -> impl Future<Output = Result<DeliveryRequest, AppError>> + Send;

    fn reject(&self, request_id: Uuid) -> impl Future<Output = Result<(), AppError>> + Send;

    fn pickup(
        &self,
        request_id: Uuid,
    ) -> impl Future<Output = Result<DeliveryRequest, AppError>> + Send;

    fn complete(
        &self,
        request_id: Uuid,
        delivery_code: &str,
    ) -> impl Future<Output = Result<DeliveryRequest, AppError>> + Send;

    fn estimate(
        &self,
        params: EstimateParams,
    ) -> impl Future<Output = Result<CostEstimation, AppError>> + Send;

    fn create_delivery_request(
        &self,
        new: NewDeliveryRequest,
    ) -> impl Future<Output = Result<DeliveryRequest, AppError>> + Send;
}

/// Gateway wired straight to the store. Backs the integration tests and the
/// demo flow; a remote HTTP gateway implements the same trait.
#[derive(Clone)]
pub struct InProcessGateway {
    state: Arc<AppState>,
}

impl InProcessGateway {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl DeliveryGateway for InProcessGateway {
    async fn list_incoming(&self, courier_id: Uuid) -> Result<Vec<DeliveryRequest>, AppError> {
        Ok(requests::list_incoming(&self.state, courier_id))
    }

    async fn list_active(&self, courier_id: Uuid) -> Result<Vec<DeliveryRequest>, AppError> {
        Ok(requests::list_active(&self.state, courier_id))
    }

    async fn list_vehicles(&self, courier_id: Uuid) -> Result<Vec<Vehicle>, AppError> {
        let mut vehicles: Vec<Vehicle> = self
            .state
            .vehicles
            .iter()
            .filter(|entry| entry.courier_id == courier_id)
            .map(|entry| entry.clone())
            .collect();
        vehicles.sort_by_key(|v| v.created_at);
        Ok(vehicles)
    }

    async fn accept(
        &self,
        request_id: Uuid,
        vehicle_id: Uuid,
    ) -> Result<DeliveryRequest, AppError> {
        requests::apply_transition(&self.state, request_id, LifecycleEvent::Accept { vehicle_id })
    }

    async fn reject(&self, request_id: Uuid) -> Result<(), AppError> {
        requests::apply_transition(&self.state, request_id, LifecycleEvent::Reject).map(|_| ())
    }

    async fn pickup(&self, request_id: Uuid) -> Result<DeliveryRequest, AppError> {
        requests::apply_transition(&self.state, request_id, LifecycleEvent::Pickup)
    }

    async fn complete(
        &self,
        request_id: Uuid,
        delivery_code: &str,
    ) -> Result<DeliveryRequest, AppError> {
        requests::apply_transition(
            &self.state,
            request_id,
            LifecycleEvent::Complete {
                code: delivery_code.to_string(),
            },
        )
    }

    async fn estimate(&self, params: EstimateParams) -> Result<CostEstimation, AppError> {
        requests::estimate_for_carrier(
            &self.state,
            &params.pickup,
            &params.dropoff,
            params.carrier_id,
        )
    }

    async fn create_delivery_request(
        &self,
        new: NewDeliveryRequest,
    ) -> Result<DeliveryRequest, AppError> {
        requests::create_request(&self.state, new)
    }
}
