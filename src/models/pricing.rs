use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named pricing rule owned by a carrier. A tariff either covers a
/// distance bracket `[min_km, max_km)` or is the carrier's default fallback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tariff {
    pub name: String,
    pub base_price: f64,
    pub price_per_km: f64,
    #[serde(default)]
    pub min_km: Option<f64>,
    #[serde(default)]
    pub max_km: Option<f64>,
    #[serde(default)]
    pub is_default: bool,
}

impl Tariff {
    pub fn covers(&self, distance_km: f64) -> bool {
        let above_min = self.min_km.is_none_or(|min| distance_km >= min);
        let below_max = self.max_km.is_none_or(|max| distance_km < max);
        (self.min_km.is_some() || self.max_km.is_some()) && above_min && below_max
    }
}

/// A courier business as referenced from the estimation/creation flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Carrier {
    pub id: Uuid,
    pub name: String,
    /// ISO 4217 code; drives the rounding precision of estimates.
    pub currency: String,
    pub tariffs: Vec<Tariff>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostBreakdown {
    pub base_price: f64,
    pub price_per_km: f64,
    pub distance_cost: f64,
}

/// Ephemeral estimation result; never persisted, only its frozen outputs
/// are copied onto the request at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostEstimation {
    pub distance_km: f64,
    pub tariff_name: String,
    pub cost_breakdown: CostBreakdown,
    pub total_cost: f64,
    pub currency: String,
}
