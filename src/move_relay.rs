use std::sync::Arc;

use log::{error, info};

use crate::error::{RelayError, StoreError};
use crate::force::Force;
use crate::marker::Marker;
use crate::move_record::{BoardMove, MoveId, MoveRecord, PlayerMove};
use crate::session_store::SessionStore;


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FetchOutcome {
    Move(MoveRecord),
    // Nothing new yet; the caller should poll again later.
    Wait,
}

impl FetchOutcome {
    pub fn into_move(self) -> Option<MoveRecord> {
        match self {
            FetchOutcome::Move(record) => Some(record),
            FetchOutcome::Wait => None,
        }
    }
}

// Relays moves between the two sides. Assumes strict alternation: the newest move in the
// log is always the opponent's from the point of view of a client waiting for one.
pub struct MoveRelay<S> {
    store: Arc<S>,
}

impl<S: SessionStore> MoveRelay<S> {
    pub fn new(store: Arc<S>) -> Self { Self { store } }

    pub async fn submit_move(
        &self, player: Force, board_move: BoardMove,
    ) -> Result<MoveId, RelayError> {
        let player_move = PlayerMove::new(player, board_move);
        let id = self.store.append(player_move).await?;
        info!("Move {} stored: {}", id, player_move);
        // Only after the move is committed: a reader that sees the marker gone must also
        // see the move. The move is in the log at this point, so the caller must not be told
        // to retry even if the marker cannot be cleared.
        if let Err(err) = self.store.clear(Marker::awaiting_first_move(player)).await {
            error!("Move {} stored, but {} marker not cleared: {}", id, player.as_str(), err);
        }
        Ok(id)
    }

    // `last_seen` is the id of the last move the caller knows about, or 0 if none.
    pub async fn fetch_opponent_move(&self, last_seen: i64) -> Result<FetchOutcome, RelayError> {
        if last_seen == 0 {
            // Before white's first move the log may still hold the previous game, so the
            // marker rather than the id decides whether a move exists. The marker is read
            // before the log since `submit_move` writes them in the opposite order.
            if self.store.exists(Marker::WhiteAwaitingFirstMove).await? {
                return Ok(FetchOutcome::Wait);
            }
            let max_id = self.store.max_id().await?;
            if max_id == MoveId::NONE {
                return Ok(FetchOutcome::Wait);
            }
            return self.latest_move(max_id).await.map(FetchOutcome::Move);
        }
        let max_id = self.store.max_id().await?;
        if last_seen > 0 && max_id.0 > last_seen {
            self.latest_move(max_id).await.map(FetchOutcome::Move)
        } else if max_id.0 == last_seen {
            Ok(FetchOutcome::Wait)
        } else {
            Err(RelayError::SyncError { last_seen, max_id })
        }
    }

    async fn latest_move(&self, max_id: MoveId) -> Result<MoveRecord, RelayError> {
        let record = self.store.get(max_id).await?.ok_or_else(|| {
            StoreError::Corrupted(format!("move {max_id} is missing from the log"))
        })?;
        Ok(record)
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::marker::MarkerSet;
    use crate::session_store::{InMemorySessionStore, MarkerStore, MoveLog};

    fn relay_with(markers: MarkerSet) -> (Arc<InMemorySessionStore>, MoveRelay<InMemorySessionStore>) {
        let store = Arc::new(InMemorySessionStore::with_markers(markers));
        (Arc::clone(&store), MoveRelay::new(store))
    }

    #[async_std::test]
    async fn submit_clears_only_own_awaiting_marker() {
        let both_awaiting = MarkerSet::new()
            .with(Marker::WhiteAwaitingFirstMove)
            .with(Marker::BlackAwaitingFirstMove);
        let (store, relay) = relay_with(both_awaiting);
        let id = relay.submit_move(Force::White, BoardMove::new(1, 1, 2, 2)).await.unwrap();
        assert_eq!(id, MoveId(1));
        assert_eq!(
            store.markers().await.unwrap(),
            MarkerSet::new().with(Marker::BlackAwaitingFirstMove)
        );
        let id = relay.submit_move(Force::Black, BoardMove::new(7, 7, 6, 6)).await.unwrap();
        assert_eq!(id, MoveId(2));
        assert!(store.markers().await.unwrap().is_empty());
    }

    #[async_std::test]
    async fn empty_log_without_game_waits() {
        let (_, relay) = relay_with(MarkerSet::new());
        assert_eq!(relay.fetch_opponent_move(0).await, Ok(FetchOutcome::Wait));
    }

    #[async_std::test]
    async fn negative_id_is_out_of_sync() {
        let (_, relay) = relay_with(MarkerSet::new());
        assert_eq!(
            relay.fetch_opponent_move(-1).await,
            Err(RelayError::SyncError { last_seen: -1, max_id: MoveId::NONE })
        );
    }

    #[async_std::test]
    async fn previous_game_moves_are_hidden_until_white_moves() {
        let (store, relay) = relay_with(MarkerSet::new());
        relay.submit_move(Force::White, BoardMove::new(1, 1, 2, 2)).await.unwrap();
        relay.submit_move(Force::Black, BoardMove::new(7, 7, 6, 6)).await.unwrap();

        store.set(Marker::WhiteAwaitingFirstMove).await.unwrap();
        assert_eq!(relay.fetch_opponent_move(0).await, Ok(FetchOutcome::Wait));

        let id = relay.submit_move(Force::White, BoardMove::new(2, 4, 4, 4)).await.unwrap();
        assert_eq!(id, MoveId(3));
        let record = relay.fetch_opponent_move(0).await.unwrap().into_move().unwrap();
        assert_eq!(record.id, MoveId(3));
        assert_eq!(record.player_move.to_string(), "1,2,4,4,4");
    }

    #[async_std::test]
    async fn missing_latest_record_is_corruption() {
        let store = FaultyStore { max_id_override: Some(MoveId(4)), ..FaultyStore::default() };
        let relay = MoveRelay::new(Arc::new(store));
        assert!(matches!(
            relay.fetch_opponent_move(2).await,
            Err(RelayError::Persistence(StoreError::Corrupted(_)))
        ));
    }

    #[async_std::test]
    async fn first_move_racing_with_fetch_is_never_mixed_with_previous_game() {
        let store = Arc::new(FaultyStore::default());
        store.inner.append(PlayerMove::new(Force::White, BoardMove::new(1, 1, 2, 2))).await.unwrap();
        store.inner.append(PlayerMove::new(Force::Black, BoardMove::new(7, 7, 6, 6))).await.unwrap();
        store.inner.set(Marker::WhiteAwaitingFirstMove).await.unwrap();
        let white_first = PlayerMove::new(Force::White, BoardMove::new(2, 4, 4, 4));
        *store.submit_after_read.lock().unwrap() = Some(white_first);

        let relay = MoveRelay::new(Arc::clone(&store));
        // White's move lands right after the first store read of this fetch.
        assert_eq!(relay.fetch_opponent_move(0).await, Ok(FetchOutcome::Wait));
        assert_eq!(
            relay.fetch_opponent_move(0).await,
            Ok(FetchOutcome::Move(MoveRecord { id: MoveId(3), player_move: white_first }))
        );
    }

    #[async_std::test]
    async fn committed_move_is_reported_even_if_marker_clear_fails() {
        let store = Arc::new(FaultyStore { fail_clear: true, ..FaultyStore::default() });
        store.inner.set(Marker::BlackAwaitingFirstMove).await.unwrap();
        let relay = MoveRelay::new(Arc::clone(&store));
        assert_eq!(
            relay.submit_move(Force::Black, BoardMove::new(7, 7, 6, 6)).await,
            Ok(MoveId(1))
        );
        assert_eq!(store.max_id().await, Ok(MoveId(1)));
    }

    // In-memory store with injectable faults.
    #[derive(Default)]
    struct FaultyStore {
        inner: InMemorySessionStore,
        fail_clear: bool,
        max_id_override: Option<MoveId>,
        // Submitted as white (append, then clear the marker) right after the next read.
        submit_after_read: Mutex<Option<PlayerMove>>,
    }

    impl FaultyStore {
        async fn after_read(&self) {
            let pending = self.submit_after_read.lock().unwrap().take();
            if let Some(player_move) = pending {
                self.inner.append(player_move).await.unwrap();
                self.inner.clear(Marker::WhiteAwaitingFirstMove).await.unwrap();
            }
        }
    }

    #[async_trait::async_trait]
    impl MarkerStore for FaultyStore {
        async fn markers(&self) -> Result<MarkerSet, StoreError> {
            let markers = self.inner.markers().await;
            self.after_read().await;
            markers
        }
        async fn set(&self, m: Marker) -> Result<(), StoreError> { self.inner.set(m).await }
        async fn clear(&self, m: Marker) -> Result<(), StoreError> {
            if self.fail_clear {
                return Err(StoreError::Backend("clear failed".to_owned()));
            }
            self.inner.clear(m).await
        }
        async fn compare_and_swap(
            &self, expected: MarkerSet, new: MarkerSet,
        ) -> Result<bool, StoreError> {
            self.inner.compare_and_swap(expected, new).await
        }
        async fn clean(&self) -> Result<(), StoreError> { self.inner.clean().await }
    }

    #[async_trait::async_trait]
    impl MoveLog for FaultyStore {
        async fn append(&self, mv: PlayerMove) -> Result<MoveId, StoreError> {
            self.inner.append(mv).await
        }
        async fn max_id(&self) -> Result<MoveId, StoreError> {
            if let Some(id) = self.max_id_override {
                return Ok(id);
            }
            let max_id = self.inner.max_id().await;
            self.after_read().await;
            max_id
        }
        async fn get(&self, id: MoveId) -> Result<Option<MoveRecord>, StoreError> {
            if self.max_id_override.is_some() {
                return Ok(None);
            }
            self.inner.get(id).await
        }
    }
}
