use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Server-authoritative request status. `ACTIVE` is a legacy client spelling
/// for the accepted state and is tolerated on input only; the canonical wire
/// value is always `ACCEPTED`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    #[serde(alias = "ACTIVE")]
    Accepted,
    PickedUp,
    Completed,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Rejected)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeePayer {
    Sender,
    Receiver,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryRequest {
    pub id: Uuid,
    pub order_id: Uuid,
    /// Courier business the request is addressed to.
    pub carrier_id: Uuid,
    pub status: RequestStatus,
    /// Display-only sender/order references supplied by the creating merchant.
    pub sender_name: Option<String>,
    pub order_number: Option<String>,
    pub pickup_address: String,
    pub delivery_address: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    /// Frozen at estimation time; never recomputed.
    pub distance_meters: u32,
    /// Frozen decimal string copied from the estimation result.
    pub estimated_cost: String,
    pub fee_payer: FeePayer,
    /// Set exactly once by the winning accept; immutable afterward.
    pub assigned_vehicle_id: Option<Uuid>,
    /// Completion secret. Empty in courier-facing views.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub delivery_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DeliveryRequest {
    /// Copy with the completion secret blanked. Every courier-facing
    /// response goes through this; only sender/receiver views keep the code.
    pub fn courier_view(&self) -> Self {
        let mut view = self.clone();
        view.delivery_code = String::new();
        view
    }
}

#[cfg(test)]
mod tests {
    use super::RequestStatus;

    #[test]
    fn canonical_status_spelling_is_accepted() {
        let json = serde_json::to_string(&RequestStatus::Accepted).unwrap();
        assert_eq!(json, "\"ACCEPTED\"");
    }

    #[test]
    fn legacy_active_alias_parses_as_accepted() {
        let status: RequestStatus = serde_json::from_str("\"ACTIVE\"").unwrap();
        assert_eq!(status, RequestStatus::Accepted);
    }

    #[test]
    fn picked_up_round_trips_in_screaming_snake_case() {
        let json = serde_json::to_string(&RequestStatus::PickedUp).unwrap();
        assert_eq!(json, "\"PICKED_UP\"");
        let back: RequestStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RequestStatus::PickedUp);
    }

    #[test]
    fn terminal_states() {
        assert!(RequestStatus::Completed.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(!RequestStatus::Accepted.is_terminal());
        assert!(!RequestStatus::PickedUp.is_terminal());
    }
}
