use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::gateway::DeliveryGateway;
use crate::engine::eligibility::eligible_vehicles;
use crate::error::AppError;
use crate::models::request::{DeliveryRequest, RequestStatus};
use crate::models::vehicle::Vehicle;

/// The courier's two working lists, mirrored from the server. Optimistic
/// mutations edit these copies; the server stays authoritative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourierBoard {
    pub incoming: Vec<DeliveryRequest>,
    pub active: Vec<DeliveryRequest>,
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Incoming,
    Active,
}

/// One mutation's undo record: the full affected list as it was before the
/// speculative apply. Rollback restores it wholesale, order included.
struct Speculation {
    list: ListKind,
    snapshot: Vec<DeliveryRequest>,
}

impl Speculation {
    fn rollback(self, board: &mut CourierBoard) {
        match self.list {
            ListKind::Incoming => board.incoming = self.snapshot,
            ListKind::Active => board.active = self.snapshot,
        }
    }
}

/// Releases the per-request exclusivity slot on every exit path.
struct InFlightGuard<'a> {
    slots: &'a DashMap<Uuid, ()>,
    id: Uuid,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.slots.remove(&self.id);
    }
}

/// Wraps every mutating lifecycle call: lock the request id, apply the
/// speculative edit, issue the network call, then reconcile on success or
/// roll back on failure, and always unlock. At most one mutation per
/// request id is in flight at a time; a second attempt is refused locally
/// without touching the network.
pub struct Coordinator<G> {
    gateway: G,
    courier_id: Uuid,
    min_code_len: usize,
    board: Mutex<CourierBoard>,
    in_flight: DashMap<Uuid, ()>,
    /// Bumped every time a mutation acquires its slot; lets a refresh that
    /// was fetching while the mutation started detect it and discard.
    mutation_generation: AtomicU64,
}

impl<G: DeliveryGateway> Coordinator<G> {
    pub fn new(gateway: G, courier_id: Uuid, min_code_len: usize) -> Self {
        Self {
            gateway,
            courier_id,
            min_code_len,
            board: Mutex::new(CourierBoard::default()),
            in_flight: DashMap::new(),
            mutation_generation: AtomicU64::new(0),
        }
    }

    pub fn board(&self) -> CourierBoard {
        self.board.lock().expect("board lock poisoned").clone()
    }

    /// Pulls both lists from the server. While a mutation is in flight the
    /// refresh is deferred (`Ok(false)`) so it cannot overwrite an
    /// optimistic placeholder before the mutation resolves; a mutation that
    /// starts while the fetch is in transit has the same effect, the stale
    /// responses are discarded.
    pub async fn refresh(&self) -> Result<bool, AppError> {
        if !self.in_flight.is_empty() {
            debug!("refresh deferred: mutation in flight");
            return Ok(false);
        }

        let generation = self.mutation_generation.load(Ordering::SeqCst);
        let incoming = self.gateway.list_incoming(self.courier_id).await?;
        let active = self.gateway.list_active(self.courier_id).await?;

        // Speculative edits happen under the board lock after the slot (and
        // generation) is taken, so re-checking here under the same lock
        // cannot miss a mutation that already touched the board.
        let mut board = self.board.lock().expect("board lock poisoned");
        if !self.in_flight.is_empty()
            || self.mutation_generation.load(Ordering::SeqCst) != generation
        {
            debug!("refresh discarded: mutation started mid-fetch");
            return Ok(false);
        }
        board.incoming = incoming;
        board.active = active;
        Ok(true)
    }

    /// Vehicles this courier may accept with. Empty means accept must not
    /// be offered at all.
    pub async fn eligible_fleet(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = self.gateway.list_vehicles(self.courier_id).await?;
        Ok(eligible_vehicles(vehicles, self.courier_id))
    }

    /// Accept with an explicitly chosen vehicle. `None` is a local
    /// validation failure; no default vehicle is ever inferred.
    pub async fn accept(
        &self,
        request_id: Uuid,
        vehicle: Option<Uuid>,
    ) -> Result<(), AppError> {
        let vehicle_id = vehicle
            .ok_or_else(|| AppError::Validation("a vehicle must be selected".to_string()))?;
        if self.eligible_fleet().await?.is_empty() {
            return Err(AppError::NoEligibleVehicle);
        }

        let _guard = self.lock(request_id)?;
        let speculation = self.remove_optimistically(ListKind::Incoming, request_id);

        match self.gateway.accept(request_id, vehicle_id).await {
            Ok(_) => {
                // Acceptance races with other couriers; a full refetch is
                // safer than trusting the single returned entity.
                self.fetch_board().await?;
                Ok(())
            }
            Err(err) => {
                self.roll_back(speculation, request_id, &err);
                Err(err)
            }
        }
    }

    pub async fn reject(&self, request_id: Uuid) -> Result<(), AppError> {
        let _guard = self.lock(request_id)?;
        let speculation = self.remove_optimistically(ListKind::Incoming, request_id);

        match self.gateway.reject(request_id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.roll_back(speculation, request_id, &err);
                Err(err)
            }
        }
    }

    pub async fn pickup(&self, request_id: Uuid) -> Result<(), AppError> {
        let _guard = self.lock(request_id)?;

        let speculation = {
            let mut board = self.board.lock().expect("board lock poisoned");
            let snapshot = board.active.clone();
            if let Some(req) = board.active.iter_mut().find(|r| r.id == request_id) {
                req.status = RequestStatus::PickedUp;
            }
            Speculation {
                list: ListKind::Active,
                snapshot,
            }
        };

        match self.gateway.pickup(request_id).await {
            Ok(canonical) => {
                let mut board = self.board.lock().expect("board lock poisoned");
                if let Some(req) = board.active.iter_mut().find(|r| r.id == request_id) {
                    *req = canonical;
                }
                Ok(())
            }
            Err(err) => {
                self.roll_back(speculation, request_id, &err);
                Err(err)
            }
        }
    }

    pub async fn complete(&self, request_id: Uuid, code: &str) -> Result<(), AppError> {
        let code = code.trim();
        if code.len() < self.min_code_len {
            return Err(AppError::Validation(format!(
                "delivery code must be at least {} characters",
                self.min_code_len
            )));
        }

        let _guard = self.lock(request_id)?;
        let speculation = self.remove_optimistically(ListKind::Active, request_id);

        match self.gateway.complete(request_id, code).await {
            Ok(_) => Ok(()),
            Err(err) => {
                // On CodeMismatch the request reappears as PICKED_UP and
                // the courier retries with a corrected code.
                self.roll_back(speculation, request_id, &err);
                Err(err)
            }
        }
    }

    fn lock(&self, request_id: Uuid) -> Result<InFlightGuard<'_>, AppError> {
        match self.in_flight.entry(request_id) {
            Entry::Occupied(_) => Err(AppError::MutationInFlight(request_id)),
            Entry::Vacant(slot) => {
                slot.insert(());
                self.mutation_generation.fetch_add(1, Ordering::SeqCst);
                Ok(InFlightGuard {
                    slots: &self.in_flight,
                    id: request_id,
                })
            }
        }
    }

    fn remove_optimistically(&self, list: ListKind, request_id: Uuid) -> Speculation {
        let mut board = self.board.lock().expect("board lock poisoned");
        let target = match list {
            ListKind::Incoming => &mut board.incoming,
            ListKind::Active => &mut board.active,
        };
        let snapshot = target.clone();
        target.retain(|r| r.id != request_id);
        Speculation { list, snapshot }
    }

    fn roll_back(&self, speculation: Speculation, request_id: Uuid, err: &AppError) {
        warn!(request_id = %request_id, error = %err, "mutation failed; rolling back");
        let mut board = self.board.lock().expect("board lock poisoned");
        speculation.rollback(&mut board);
    }

    async fn fetch_board(&self) -> Result<(), AppError> {
        let incoming = self.gateway.list_incoming(self.courier_id).await?;
        let active = self.gateway.list_active(self.courier_id).await?;

        let mut board = self.board.lock().expect("board lock poisoned");
        board.incoming = incoming;
        board.active = active;
        Ok(())
    }
}
