mod common;

use std::sync::Arc;

use common::*;
use itertools::Itertools;
use pretty_assertions::assert_eq;
use relay_chess::error::RelayError;
use relay_chess::event::{RelayRequest, RelayResponse};
use relay_chess::force::Force;
use relay_chess::marker::{Marker, MarkerSet};
use relay_chess::move_record::MoveId;
use relay_chess::move_relay::FetchOutcome;
use relay_chess::server::RelayServer;
use relay_chess::session_store::{InMemorySessionStore, MarkerStore};
use relay_chess::test_util::{in_memory_server, seeded_rng};
use Force::{Black, White};


#[async_std::test]
async fn second_client_gets_the_other_side() {
    let (store, server) = in_memory_server();
    let first = new_game(&server).await;
    assert!(!is_ready(&server).await);
    assert_eq!(
        store.markers().await.unwrap(),
        MarkerSet::new()
            .with(Marker::taken(first.opponent()))
            .with(Marker::awaiting_first_move(first))
    );

    let second = new_game(&server).await;
    assert_eq!(second, first.opponent());
    assert!(is_ready(&server).await);
    assert_eq!(
        store.markers().await.unwrap(),
        MarkerSet::new()
            .with(Marker::WhiteAwaitingFirstMove)
            .with(Marker::BlackAwaitingFirstMove)
    );
}

#[async_std::test]
async fn coin_flip_picks_both_sides() {
    let mut seen = Vec::new();
    for seed in 0..64 {
        let server = RelayServer::with_rng(Arc::new(InMemorySessionStore::new()), seeded_rng(seed));
        seen.push(new_game(&server).await);
    }
    assert!(seen.contains(&White));
    assert!(seen.contains(&Black));
}

#[async_std::test]
async fn third_client_is_rejected() {
    let (_, server) = in_memory_server();
    start_game(&server).await;
    let result = server.handle(RelayRequest::NewGame).await;
    assert!(matches!(result, Err(RelayError::RoleConflict(_))), "got {result:?}");
}

#[async_std::test]
async fn corrupted_markers_are_a_conflict() {
    let corrupted = MarkerSet::new().with(Marker::WhiteTaken).with(Marker::BlackTaken);
    let server = RelayServer::new(Arc::new(InMemorySessionStore::with_markers(corrupted)));
    assert_eq!(
        server.handle(RelayRequest::NewGame).await,
        Err(RelayError::RoleConflict(corrupted))
    );
    assert!(!is_ready(&server).await);
}

#[async_std::test]
async fn concurrent_new_game_requests_assign_each_side_once() {
    let (_, server) = in_memory_server();
    let server = Arc::new(server);
    let handles = (0..8)
        .map(|_| {
            let server = Arc::clone(&server);
            async_std::task::spawn(async move { server.roles().request_new_game().await })
        })
        .collect_vec();
    let mut assigned = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(force) => assigned.push(force),
            Err(RelayError::RoleConflict(_)) => {}
            Err(err) => panic!("Unexpected error: {err}"),
        }
    }
    assigned.sort();
    assert_eq!(assigned, vec![White, Black]);
    assert!(is_ready(&server).await);
}

#[async_std::test]
async fn readiness_follows_the_game_lifecycle() {
    let (store, server) = in_memory_server();
    assert!(is_ready(&server).await);
    new_game(&server).await;
    assert!(!is_ready(&server).await);
    new_game(&server).await;
    assert!(is_ready(&server).await);

    submit(&server, White, board_move!(2, 5 -> 4, 5)).await;
    submit(&server, Black, board_move!(7, 5 -> 5, 5)).await;
    assert!(is_ready(&server).await);
    assert!(store.markers().await.unwrap().is_empty());

    // Both sides have moved, so the next game can start.
    let next = new_game(&server).await;
    assert!(!is_ready(&server).await);
    assert_eq!(new_game(&server).await, next.opponent());
}

// White submits (1,1,2,2); black, not having seen anything yet, receives it.
#[async_std::test]
async fn black_receives_first_move() {
    let (_, server) = in_memory_server();
    start_game(&server).await;
    assert_eq!(fetch_body(&server, 0).await, "WAIT");

    let id = submit(&server, White, board_move!(1, 1 -> 2, 2)).await;
    assert_eq!(id, MoveId(1));
    assert_eq!(fetch_body(&server, 0).await, "1,1,1,2,2");

    // Black hasn't moved: white polling with its own id keeps waiting.
    assert_eq!(fetch_body(&server, 1).await, "WAIT");
}

#[async_std::test]
async fn client_ahead_of_log_is_out_of_sync() {
    let (_, server) = in_memory_server();
    start_game(&server).await;
    submit(&server, White, board_move!(1, 1 -> 2, 2)).await;
    submit(&server, Black, board_move!(7, 7 -> 6, 6)).await;
    assert_eq!(
        server.handle(RelayRequest::FetchMove { last_seen: 5 }).await,
        Err(RelayError::SyncError { last_seen: 5, max_id: MoveId(2) })
    );
    // An error is never disguised as WAIT.
    assert!(server.handle(RelayRequest::FetchMove { last_seen: 3 }).await.is_err());
}

#[async_std::test]
async fn fetch_is_monotonic() {
    let (_, server) = in_memory_server();
    start_game(&server).await;
    let relay = server.moves();
    let mut last_seen = submit(&server, White, board_move!(2, 4 -> 4, 4)).await;
    for player in [Black, White, Black, White, Black] {
        assert_eq!(relay.fetch_opponent_move(last_seen.0).await, Ok(FetchOutcome::Wait));
        let id = relay.submit_move(player, board_move!(1, 1 -> 3, 3)).await.unwrap();
        let record = relay.fetch_opponent_move(last_seen.0).await.unwrap().into_move().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.player_move.player, player);
        last_seen = record.id;
    }
}

#[async_std::test]
async fn full_game_exchange() {
    let (_, server) = in_memory_server();
    start_game(&server).await;
    assert!(is_ready(&server).await);

    let mut white_seen = 0;
    let mut black_seen = 0;
    let script = [
        (White, board_move!(2, 5 -> 4, 5), "1,2,5,4,5"),
        (Black, board_move!(7, 5 -> 5, 5), "2,7,5,5,5"),
        (White, board_move!(1, 7 -> 3, 6), "1,1,7,3,6"),
        (Black, board_move!(8, 2 -> 6, 3), "2,8,2,6,3"),
    ];
    for (player, board_move, expected) in script {
        let (mover_seen, waiter_seen) = match player {
            White => (&mut white_seen, &mut black_seen),
            Black => (&mut black_seen, &mut white_seen),
        };
        assert_eq!(fetch_body(&server, *waiter_seen).await, "WAIT");
        *mover_seen = submit(&server, player, board_move).await.0;
        assert_eq!(fetch_body(&server, *waiter_seen).await, expected);
        assert_eq!(fetch_body(&server, *mover_seen).await, "WAIT");
    }
}

#[async_std::test]
async fn responses_render_wire_bodies() {
    let (_, server) = in_memory_server();
    let first = new_game(&server).await;
    let body = RelayResponse::Assigned(first).to_body();
    assert!(body == "white" || body == "black");
    assert_eq!(server.handle(RelayRequest::ReadyToStart).await.unwrap().to_body(), "WAIT");
}
