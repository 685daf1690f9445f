use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::post;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::pricing::{Carrier, Tariff};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/carriers", post(create_carrier).get(list_carriers))
}

#[derive(Deserialize)]
pub struct CreateCarrierBody {
    pub name: String,
    pub currency: String,
    pub tariffs: Vec<Tariff>,
}

/// Registers a courier business with its pricing tariffs. Estimation needs
/// at least one tariff to select from.
async fn create_carrier(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCarrierBody>,
) -> Result<Json<Carrier>, AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if body.tariffs.is_empty() {
        return Err(AppError::Validation(
            "a carrier needs at least one tariff".to_string(),
        ));
    }

    let carrier = Carrier {
        id: Uuid::new_v4(),
        name: body.name,
        currency: body.currency,
        tariffs: body.tariffs,
    };

    state.carriers.insert(carrier.id, carrier.clone());
    Ok(Json(carrier))
}

async fn list_carriers(State(state): State<Arc<AppState>>) -> Json<Vec<Carrier>> {
    let carriers = state
        .carriers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(carriers)
}
