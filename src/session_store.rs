use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::marker::{Marker, MarkerSet};
use crate::move_record::{MoveId, MoveRecord, PlayerMove};


// Shared boolean flags used to coordinate role assignment between clients.
// Each operation must be atomic on its own. Multi-marker transitions go through
// `compare_and_swap` so that no other client ever observes a half-applied transition.
#[async_trait]
pub trait MarkerStore: Send + Sync {
    async fn markers(&self) -> Result<MarkerSet, StoreError>;

    async fn exists(&self, marker: Marker) -> Result<bool, StoreError> {
        Ok(self.markers().await?.contains(marker))
    }
    async fn set(&self, marker: Marker) -> Result<(), StoreError>;
    async fn clear(&self, marker: Marker) -> Result<(), StoreError>;

    // Replaces the whole marker set with `new` iff it currently equals `expected`.
    // Returns whether the swap happened.
    async fn compare_and_swap(
        &self, expected: MarkerSet, new: MarkerSet,
    ) -> Result<bool, StoreError>;

    // Drops all markers. Used between games and by tests.
    async fn clean(&self) -> Result<(), StoreError>;
}

// Append-only move history. Ids are assigned on insertion and strictly increase.
// Reads must observe every committed append.
#[async_trait]
pub trait MoveLog: Send + Sync {
    async fn append(&self, player_move: PlayerMove) -> Result<MoveId, StoreError>;
    // `MoveId::NONE` if the log is empty.
    async fn max_id(&self) -> Result<MoveId, StoreError>;
    async fn get(&self, id: MoveId) -> Result<Option<MoveRecord>, StoreError>;
}

pub trait SessionStore: MarkerStore + MoveLog {}

impl<T: MarkerStore + MoveLog> SessionStore for T {}


// Single-process store. Good enough when the server is the only writer and for tests.
#[derive(Default)]
pub struct InMemorySessionStore {
    markers: Mutex<MarkerSet>,
    moves: Mutex<Vec<MoveRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_markers(markers: MarkerSet) -> Self {
        Self {
            markers: Mutex::new(markers),
            moves: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MarkerStore for InMemorySessionStore {
    async fn markers(&self) -> Result<MarkerSet, StoreError> { Ok(*self.markers.lock().unwrap()) }

    async fn set(&self, marker: Marker) -> Result<(), StoreError> {
        self.markers.lock().unwrap().insert(marker);
        Ok(())
    }

    async fn clear(&self, marker: Marker) -> Result<(), StoreError> {
        self.markers.lock().unwrap().remove(marker);
        Ok(())
    }

    async fn compare_and_swap(
        &self, expected: MarkerSet, new: MarkerSet,
    ) -> Result<bool, StoreError> {
        let mut markers = self.markers.lock().unwrap();
        if *markers != expected {
            return Ok(false);
        }
        *markers = new;
        Ok(true)
    }

    async fn clean(&self) -> Result<(), StoreError> {
        *self.markers.lock().unwrap() = MarkerSet::new();
        Ok(())
    }
}

#[async_trait]
impl MoveLog for InMemorySessionStore {
    async fn append(&self, player_move: PlayerMove) -> Result<MoveId, StoreError> {
        let mut moves = self.moves.lock().unwrap();
        let id = MoveId(moves.last().map_or(0, |r| r.id.0) + 1);
        moves.push(MoveRecord { id, player_move });
        Ok(id)
    }

    async fn max_id(&self) -> Result<MoveId, StoreError> {
        Ok(self.moves.lock().unwrap().last().map_or(MoveId::NONE, |r| r.id))
    }

    async fn get(&self, id: MoveId) -> Result<Option<MoveRecord>, StoreError> {
        let moves = self.moves.lock().unwrap();
        Ok(moves.binary_search_by_key(&id, |r| r.id).ok().map(|idx| moves[idx]))
    }
}
