use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::request::{DeliveryRequest, RequestStatus};

/// Mutating lifecycle events. The legal transitions are:
/// `PENDING -> ACCEPTED -> PICKED_UP -> COMPLETED`, with `PENDING ->
/// REJECTED` as the other terminal branch. Everything else is refused.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    Accept { vehicle_id: Uuid },
    Reject,
    Pickup,
    Complete { code: String },
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Accept { .. } => "accept",
            LifecycleEvent::Reject => "reject",
            LifecycleEvent::Pickup => "pickup",
            LifecycleEvent::Complete { .. } => "complete",
        }
    }
}

/// Applies one lifecycle event to a request, or leaves it untouched and
/// reports why. Callers must hold the store entry exclusively while calling
/// this, which is what makes `accept` a conditional update with exactly one
/// winner.
pub fn transition(request: &mut DeliveryRequest, event: &LifecycleEvent) -> Result<(), AppError> {
    match (request.status, event) {
        (RequestStatus::Pending, LifecycleEvent::Accept { vehicle_id }) => {
            request.status = RequestStatus::Accepted;
            request.assigned_vehicle_id = Some(*vehicle_id);
        }
        // A lost accept race is a conflict, not an illegal transition: the
        // loser is expected to refetch, not to report a client bug.
        (_, LifecycleEvent::Accept { .. }) => {
            return Err(AppError::Conflict(format!(
                "request {} is no longer pending",
                request.id
            )));
        }
        (RequestStatus::Pending, LifecycleEvent::Reject) => {
            request.status = RequestStatus::Rejected;
        }
        (RequestStatus::Accepted, LifecycleEvent::Pickup) => {
            request.status = RequestStatus::PickedUp;
        }
        (RequestStatus::PickedUp, LifecycleEvent::Complete { code }) => {
            if *code != request.delivery_code {
                return Err(AppError::CodeMismatch);
            }
            request.status = RequestStatus::Completed;
        }
        (from, event) => {
            return Err(AppError::InvalidTransition {
                from,
                event: event.name(),
            });
        }
    }

    request.updated_at = Utc::now();
    Ok(())
}

/// Completion secret minted at creation time: `len` decimal digits drawn
/// from a v4 UUID's random bits.
pub fn generate_delivery_code(len: usize) -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let mut code = String::with_capacity(len);
    for _ in 0..len {
        code.push(char::from(b'0' + (bits % 10) as u8));
        bits /= 10;
    }
    code
}
