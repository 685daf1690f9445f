use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::pricing::Carrier;
use crate::models::request::DeliveryRequest;
use crate::models::vehicle::Vehicle;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub requests: DashMap<Uuid, DeliveryRequest>,
    pub vehicles: DashMap<Uuid, Vehicle>,
    pub carriers: DashMap<Uuid, Carrier>,
    /// Redacted request snapshots, broadcast on every lifecycle change.
    pub lifecycle_events_tx: broadcast::Sender<DeliveryRequest>,
    pub delivery_code_len: usize,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(event_buffer_size: usize, delivery_code_len: usize) -> Self {
        let (lifecycle_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            requests: DashMap::new(),
            vehicles: DashMap::new(),
            carriers: DashMap::new(),
            lifecycle_events_tx,
            delivery_code_len,
            metrics: Metrics::new(),
        }
    }
}
