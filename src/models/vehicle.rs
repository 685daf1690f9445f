use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Bicycle,
    Motorbike,
    Car,
    Van,
    Truck,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub courier_id: Uuid,
    pub vehicle_type: VehicleType,
    pub brand: String,
    pub model: String,
    pub license_plate: String,
    /// Free-text capacity description ("2 crates", "up to 20 kg").
    pub capacity: String,
    /// Gate for assignment eligibility; toggled independently of delete.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
