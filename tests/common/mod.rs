// Rust-upgrade (https://github.com/rust-lang/rust/issues/46379):
//   remove `#[allow(dead_code)]` before public functions.

use relay_chess::event::{RelayRequest, RelayResponse};
use relay_chess::force::Force;
use relay_chess::move_record::{BoardMove, MoveId};
use relay_chess::server::RelayServer;
use relay_chess::session_store::InMemorySessionStore;


pub type TestServer = RelayServer<InMemorySessionStore>;

#[macro_export]
macro_rules! board_move {
    ($row1:literal, $col1:literal -> $row2:literal, $col2:literal) => {
        relay_chess::move_record::BoardMove::new($row1, $col1, $row2, $col2)
    };
}

#[allow(dead_code)]
pub async fn new_game(server: &TestServer) -> Force {
    match server.handle(RelayRequest::NewGame).await {
        Ok(RelayResponse::Assigned(force)) => force,
        other => panic!("Expected a side, got {other:?}"),
    }
}

// Runs the two `RequestNewGame` calls that start a game. Returns sides in call order.
#[allow(dead_code)]
pub async fn start_game(server: &TestServer) -> (Force, Force) {
    let first = new_game(server).await;
    let second = new_game(server).await;
    assert_eq!(second, first.opponent());
    (first, second)
}

#[allow(dead_code)]
pub async fn submit(server: &TestServer, player: Force, board_move: BoardMove) -> MoveId {
    match server.handle(RelayRequest::SubmitMove { player, board_move }).await {
        Ok(RelayResponse::MoveStored(id)) => id,
        other => panic!("Expected a move id, got {other:?}"),
    }
}

#[allow(dead_code)]
pub async fn fetch_body(server: &TestServer, last_seen: i64) -> String {
    server
        .handle(RelayRequest::FetchMove { last_seen })
        .await
        .unwrap_or_else(|err| panic!("Fetch after {last_seen} failed: {err}"))
        .to_body()
}

#[allow(dead_code)]
pub async fn is_ready(server: &TestServer) -> bool {
    match server.handle(RelayRequest::ReadyToStart).await {
        Ok(RelayResponse::Readiness(readiness)) => readiness.is_ready(),
        other => panic!("Expected readiness, got {other:?}"),
    }
}
