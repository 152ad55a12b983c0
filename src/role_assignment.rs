use std::sync::{Arc, Mutex};

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use strum::IntoEnumIterator;

use crate::error::{RelayError, StoreError};
use crate::force::Force;
use crate::marker::{Marker, MarkerSet};
use crate::session_store::MarkerStore;


// Other clients may change the markers between our read and our write. On a lost race
// the decision is recomputed from the fresh markers, but only this many times.
const MAX_ASSIGNMENT_ATTEMPTS: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Readiness {
    // One side is reserved and the other client hasn't shown up yet.
    Wait,
    Go,
}

impl Readiness {
    pub fn is_ready(self) -> bool { self == Readiness::Go }

    pub fn as_str(self) -> &'static str {
        match self {
            Readiness::Wait => "WAIT",
            Readiness::Go => "GO",
        }
    }
}

// Decides which side the caller gets given the current markers, and what the markers
// become afterwards. `flip_coin` is only consulted when starting a fresh game.
pub fn plan_assignment(
    markers: MarkerSet, flip_coin: impl FnOnce() -> Force,
) -> Result<(Force, MarkerSet), RelayError> {
    if markers.is_empty() {
        // Fresh game: reserve both sides, then immediately hand one out.
        let force = flip_coin();
        let next = MarkerSet::new()
            .with(Marker::taken(force.opponent()))
            .with(Marker::awaiting_first_move(force));
        return Ok((force, next));
    }
    for force in Force::iter() {
        if markers.contains(Marker::taken(force)) && !markers.contains(Marker::taken(force.opponent()))
        {
            let next = markers
                .without(Marker::taken(force))
                .with(Marker::awaiting_first_move(force));
            return Ok((force, next));
        }
    }
    Err(RelayError::RoleConflict(markers))
}

pub struct RoleAssignment<S> {
    store: Arc<S>,
    rng: Mutex<StdRng>,
}

impl<S: MarkerStore> RoleAssignment<S> {
    pub fn new(store: Arc<S>) -> Self { Self::with_rng(store, StdRng::from_os_rng()) }

    pub fn with_rng(store: Arc<S>, rng: StdRng) -> Self {
        Self { store, rng: Mutex::new(rng) }
    }

    fn flip_coin(&self) -> Force { Force::random(&mut *self.rng.lock().unwrap()) }

    pub async fn request_new_game(&self) -> Result<Force, RelayError> {
        for _ in 0..MAX_ASSIGNMENT_ATTEMPTS {
            let markers = self.store.markers().await?;
            let (force, next) = plan_assignment(markers, || self.flip_coin())?;
            if self.store.compare_and_swap(markers, next).await? {
                info!("Assigned {:?}; markers {:?} -> {:?}", force, markers, next);
                return Ok(force);
            }
            debug!("Markers changed while assigning a side, re-evaluating");
        }
        Err(StoreError::Contention.into())
    }

    pub async fn check_ready_to_start(&self) -> Result<Readiness, RelayError> {
        let markers = self.store.markers().await?;
        let pending = Force::iter().any(|force| markers.contains(Marker::taken(force)));
        Ok(if pending { Readiness::Wait } else { Readiness::Go })
    }
}
